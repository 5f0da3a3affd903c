//! Field rules and cross-field predicates shared by create and edit flows.
//!
//! # Invariants
//! - Rules append to the caller's `ValidationErrors`; none of them stops the
//!   pass early.
//! - Cross-field predicates only read already-parsed values and return at most
//!   one issue each.

use crate::model::governance::GovernanceSplit;
use crate::model::project::{MemberInput, MemberRole, ProjectMember};
use crate::model::tag::{Tag, TagInput, TagRole, MAX_CATEGORY_TAGS, MAX_TAG_LENGTH};
use crate::validation::error::{
    FieldPath, ValidationErrorKind, ValidationErrors, ValidationIssue,
    GOVERNANCE_SUM_INVALID_MESSAGE, TOO_MANY_CATEGORY_TAGS_MESSAGE,
};
use url::Url;

const TAG_ROLE_CHOICES: &str = "category, relational, custom";
const MEMBER_ROLE_CHOICES: &str = "lead, contributor, participant";

/// Trims `value` and reports `RequiredFieldEmpty` when nothing is left.
pub(crate) fn required_text(
    value: &str,
    path: FieldPath,
    label: &str,
    errors: &mut ValidationErrors,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(ValidationIssue::new(
            path,
            ValidationErrorKind::RequiredFieldEmpty,
            format!("{label} cannot be empty."),
        ));
    }
    trimmed.to_string()
}

/// Required text that must also fit in `max_chars` characters.
pub(crate) fn bounded_text(
    value: &str,
    max_chars: usize,
    path: FieldPath,
    label: &str,
    errors: &mut ValidationErrors,
) -> String {
    let trimmed = required_text(value, path.clone(), label, errors);
    check_max_chars(&trimmed, max_chars, path, label, errors);
    trimmed
}

/// Tag ids pass through untrimmed, so their limit counts surrounding
/// whitespace as well.
pub(crate) fn tag_id(value: &str, path: FieldPath, label: &str, errors: &mut ValidationErrors) {
    required_text(value, path.clone(), label, errors);
    check_max_chars(value, MAX_TAG_LENGTH, path, label, errors);
}

fn check_max_chars(
    value: &str,
    max_chars: usize,
    path: FieldPath,
    label: &str,
    errors: &mut ValidationErrors,
) {
    if value.chars().count() > max_chars {
        errors.push(ValidationIssue::new(
            path,
            ValidationErrorKind::FieldTooLong,
            format!("{label} must be at most {max_chars} characters."),
        ));
    }
}

/// Empty or absent photo URLs normalize to `None`.
pub(crate) fn photo_url(value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = value.map(str::trim).filter(|raw| !raw.is_empty())?;
    if Url::parse(trimmed).is_err() {
        errors.push(ValidationIssue::new(
            FieldPath::field("photoUrl"),
            ValidationErrorKind::InvalidUrl,
            "Photo URL must be a valid absolute URL.",
        ));
    }
    Some(trimmed.to_string())
}

/// Validates every tag and returns those whose role could be parsed.
///
/// Tags with bad ids or labels are still returned so the category cap sees
/// the caller's full intent; the issues already recorded keep the overall
/// result failing.
pub(crate) fn tags(inputs: &[TagInput], errors: &mut ValidationErrors) -> Vec<Tag> {
    let mut parsed = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        tag_id(
            &input.id,
            FieldPath::item("tags", index, "id"),
            &format!("Tag {} id", index + 1),
            errors,
        );
        let display = bounded_text(
            &input.display,
            MAX_TAG_LENGTH,
            FieldPath::item("tags", index, "display"),
            &format!("Tag {} label", index + 1),
            errors,
        );

        match TagRole::parse(&input.role) {
            Some(role) => parsed.push(Tag {
                id: input.id.clone(),
                display,
                role,
            }),
            None => errors.push(ValidationIssue::new(
                FieldPath::item("tags", index, "role"),
                ValidationErrorKind::InvalidEnumValue,
                format!(
                    "Tag role `{}` is invalid; expected one of: {TAG_ROLE_CHOICES}.",
                    input.role
                ),
            )),
        }
    }
    parsed
}

pub(crate) fn team(inputs: &[MemberInput], errors: &mut ValidationErrors) -> Vec<ProjectMember> {
    let mut members = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let user_id = required_text(
            &input.user_id,
            FieldPath::item("team", index, "userId"),
            &format!("Team member {} user", index + 1),
            errors,
        );

        match MemberRole::parse(&input.role) {
            Some(role) => members.push(ProjectMember { user_id, role }),
            None => errors.push(ValidationIssue::new(
                FieldPath::item("team", index, "role"),
                ValidationErrorKind::InvalidEnumValue,
                format!(
                    "Team role `{}` is invalid; expected one of: {MEMBER_ROLE_CHOICES}.",
                    input.role
                ),
            )),
        }
    }
    members
}

/// Category-tag cardinality cap. Applies identically to create and edit.
pub fn check_category_tag_limit(tags: &[Tag]) -> Option<ValidationIssue> {
    let categories = tags.iter().filter(|tag| tag.is_category()).count();
    if categories > MAX_CATEGORY_TAGS {
        return Some(ValidationIssue::new(
            FieldPath::field("tags"),
            ValidationErrorKind::TooManyCategoryTags,
            TOO_MANY_CATEGORY_TAGS_MESSAGE,
        ));
    }
    None
}

/// Governance completeness. An absent split is "not yet defined", not invalid.
pub fn check_governance_sum(governance: Option<&GovernanceSplit>) -> Option<ValidationIssue> {
    match governance {
        Some(split) if !split.is_complete() => Some(ValidationIssue::new(
            FieldPath::field("governance"),
            ValidationErrorKind::GovernanceSumInvalid,
            GOVERNANCE_SUM_INVALID_MESSAGE,
        )),
        _ => None,
    }
}
