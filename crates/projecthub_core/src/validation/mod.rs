//! Project validation engine.
//!
//! # Responsibility
//! - Turn a `ProjectDraft` into a trimmed `NormalizedProject`, or report every
//!   field-level problem found in one pass.
//! - Share the cross-field predicates between create and edit flows.
//!
//! # Invariants
//! - Pure and synchronous: no I/O, no shared state, same input gives the same
//!   output.
//! - Errors are collected, never short-circuited.
//! - Governance is only checked (and only carried) by the edit flow, and only
//!   when present on the draft.
//! - The category-tag cap applies identically to both flows.
//! - Tag ids pass through unchanged; global normalization lives in
//!   `crate::tags`.

pub mod error;
pub mod rules;

use crate::model::project::{NormalizedProject, ProjectDraft};
use error::{FieldPath, ValidationErrors, ValidationIssue};
use serde::Serialize;

pub use error::ValidationErrorKind;
pub use rules::{check_category_tag_limit, check_governance_sum};

/// Which entry point a draft is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFlow {
    Create,
    Edit,
}

impl ValidationFlow {
    fn requires_id(self) -> bool {
        self == Self::Edit
    }

    fn accepts_governance(self) -> bool {
        self == Self::Edit
    }
}

/// Validates a draft submitted by the creation form.
pub fn validate_for_create(draft: &ProjectDraft) -> Result<NormalizedProject, ValidationErrors> {
    validate(draft, ValidationFlow::Create)
}

/// Validates a draft submitted by the edit form. Requires a non-empty `id`.
pub fn validate_for_edit(draft: &ProjectDraft) -> Result<NormalizedProject, ValidationErrors> {
    validate(draft, ValidationFlow::Edit)
}

/// Runs the structural pass followed by the shared cross-field predicates.
pub fn validate(
    draft: &ProjectDraft,
    flow: ValidationFlow,
) -> Result<NormalizedProject, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let id = if flow.requires_id() {
        Some(rules::required_text(
            draft.id.as_deref().unwrap_or_default(),
            FieldPath::field("id"),
            "Project id",
            &mut errors,
        ))
    } else {
        None
    };

    let name = rules::required_text(&draft.name, FieldPath::field("name"), "Name", &mut errors);
    let tagline = rules::required_text(
        &draft.tagline,
        FieldPath::field("tagline"),
        "Tagline",
        &mut errors,
    );
    let description = rules::required_text(
        &draft.description,
        FieldPath::field("description"),
        "Description",
        &mut errors,
    );
    let contribution_needs = rules::required_text(
        &draft.contribution_needs,
        FieldPath::field("contributionNeeds"),
        "Contribution needs",
        &mut errors,
    );
    let photo_url = rules::photo_url(draft.photo_url.as_deref(), &mut errors);
    let tags = rules::tags(&draft.tags, &mut errors);
    let team = rules::team(&draft.team, &mut errors);
    let governance = if flow.accepts_governance() {
        draft.governance
    } else {
        None
    };

    errors.extend(check_category_tag_limit(&tags));
    errors.extend(check_governance_sum(governance.as_ref()));

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NormalizedProject {
        id,
        name,
        tagline,
        description,
        contribution_needs,
        photo_url,
        tags,
        team,
        governance,
    })
}

/// Serializable form of a validation outcome.
///
/// Renders as `{ "ok": true, "value": .. }` or
/// `{ "ok": false, "errors": [{ "path", "message" }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<NormalizedProject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_result(result: Result<NormalizedProject, ValidationErrors>) -> Self {
        match result {
            Ok(value) => Self {
                ok: true,
                value: Some(value),
                errors: Vec::new(),
            },
            Err(errors) => Self {
                ok: false,
                value: None,
                errors: errors.into_issues(),
            },
        }
    }
}

impl From<Result<NormalizedProject, ValidationErrors>> for ValidationReport {
    fn from(value: Result<NormalizedProject, ValidationErrors>) -> Self {
        Self::from_result(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_for_create, validate_for_edit, ValidationReport};
    use crate::model::governance::GovernanceSplit;
    use crate::model::project::ProjectDraft;

    fn minimal_draft() -> ProjectDraft {
        ProjectDraft {
            name: "Foo".to_string(),
            tagline: "T".to_string(),
            description: "D".to_string(),
            contribution_needs: "C".to_string(),
            ..ProjectDraft::default()
        }
    }

    #[test]
    fn create_drops_governance_from_value() {
        let mut draft = minimal_draft();
        draft.governance = Some(GovernanceSplit::new(10, 10, 10));

        let value = validate_for_create(&draft).expect("create ignores governance");
        assert_eq!(value.governance, None);
        assert_eq!(value.id, None);
    }

    #[test]
    fn edit_keeps_complete_governance() {
        let mut draft = minimal_draft();
        draft.id = Some(" p1 ".to_string());
        draft.governance = Some(GovernanceSplit::new(40, 30, 30));

        let value = validate_for_edit(&draft).expect("complete split is valid");
        assert_eq!(value.id.as_deref(), Some("p1"));
        assert_eq!(value.governance, Some(GovernanceSplit::new(40, 30, 30)));
    }

    #[test]
    fn report_serializes_ok_shape() {
        let report = ValidationReport::from_result(validate_for_create(&minimal_draft()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["value"]["name"], "Foo");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn report_serializes_error_shape() {
        let mut draft = minimal_draft();
        draft.name = String::new();
        let report: ValidationReport = validate_for_create(&draft).into();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], false);
        assert!(json.get("value").is_none());
        assert_eq!(json["errors"][0]["path"], "name");
    }
}
