//! Tag model.
//!
//! # Invariants
//! - `id` and `display` are 1..=35 characters once validated.
//! - A project carries at most `MAX_CATEGORY_TAGS` tags with role `category`.

use serde::{Deserialize, Serialize};

/// Maximum characters for tag ids and display labels.
pub const MAX_TAG_LENGTH: usize = 35;
/// Maximum number of `category` tags per project.
pub const MAX_CATEGORY_TAGS: usize = 3;

/// Classification of a tag inside one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagRole {
    /// Top-level category, capped per project.
    Category,
    /// Relates the project to another domain or effort.
    Relational,
    /// Free-form user tag.
    Custom,
}

impl TagRole {
    /// Parses the wire value. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "category" => Some(Self::Category),
            "relational" => Some(Self::Relational),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Relational => "relational",
            Self::Custom => "custom",
        }
    }
}

/// Raw tag as submitted by the caller.
///
/// `role` stays a string so unknown values can be reported per field instead
/// of failing the whole decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagInput {
    pub id: String,
    pub display: String,
    pub role: String,
}

impl TagInput {
    pub fn new(id: impl Into<String>, display: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            role: role.into(),
        }
    }
}

/// Validated project tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Project-local identifier. Global normalization happens in `crate::tags`.
    pub id: String,
    /// Human-readable label.
    pub display: String,
    pub role: TagRole,
}

impl Tag {
    pub fn is_category(&self) -> bool {
        self.role == TagRole::Category
    }
}
