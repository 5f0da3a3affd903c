//! Validation error taxonomy and field-path addressing.
//!
//! Every variant is recoverable: the engine returns them as data and never
//! panics on user input.

use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Message attached to `TooManyCategoryTags` at path `tags`.
pub const TOO_MANY_CATEGORY_TAGS_MESSAGE: &str = "A project can have a maximum of 3 category tags.";
/// Message attached to `GovernanceSumInvalid` at path `governance`.
pub const GOVERNANCE_SUM_INVALID_MESSAGE: &str =
    "The sum of all governance shares must be exactly 100%.";

/// Kind of a single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Mandatory string was empty or whitespace after trimming.
    RequiredFieldEmpty,
    /// String exceeded its declared maximum length.
    FieldTooLong,
    /// Non-empty `photoUrl` is not a well-formed absolute URL.
    InvalidUrl,
    /// Role field held a value outside its recognized set.
    InvalidEnumValue,
    /// More than three tags with role `category`.
    TooManyCategoryTags,
    /// Governance shares present but not totalling 100.
    GovernanceSumInvalid,
}

impl ValidationErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::RequiredFieldEmpty => "required_field_empty",
            Self::FieldTooLong => "field_too_long",
            Self::InvalidUrl => "invalid_url",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::TooManyCategoryTags => "too_many_category_tags",
            Self::GovernanceSumInvalid => "governance_sum_invalid",
        }
    }
}

impl Serialize for ValidationErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Dotted path to the offending field, e.g. `tags.2.display`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path to a top-level draft field.
    pub fn field(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Path to a field of the `index`-th element of a top-level list.
    pub fn item(list: &str, index: usize, field: &str) -> Self {
        Self(format!("{list}.{index}.{field}"))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for FieldPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: FieldPath,
    /// Rendered as `code`, e.g. `too_many_category_tags`.
    #[serde(rename = "code")]
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: FieldPath, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }
}

/// Ordered collection of every failure found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.0.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.0.extend(issues);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether an issue of `kind` is attached to `path`.
    pub fn has(&self, kind: ValidationErrorKind, path: &str) -> bool {
        self.0
            .iter()
            .any(|issue| issue.kind == kind && issue.path == path)
    }

    /// Issues attached to `path`, in collection order.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.0.iter().filter(move |issue| issue.path == path)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "project validation failed with {} error(s)", self.0.len())?;
        for issue in &self.0 {
            write!(f, "; {}: {}", issue.path, issue.message)?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}
