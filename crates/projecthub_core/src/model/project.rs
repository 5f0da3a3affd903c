//! Project draft and normalized project records.
//!
//! # Responsibility
//! - Carry unvalidated form input (`ProjectDraft`) into the validation engine.
//! - Carry validated, trimmed output (`NormalizedProject`) into persistence.
//!
//! # Invariants
//! - A draft is transient and never persisted directly.
//! - `NormalizedProject::governance` is only populated by the edit flow.
//! - Tag insertion order is preserved from draft to normalized value.

use crate::model::governance::GovernanceSplit;
use crate::model::tag::{Tag, TagInput};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a persisted project.
pub type ProjectId = Uuid;

/// Role of a user inside one project team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Lead,
    Contributor,
    Participant,
}

impl MemberRole {
    /// Parses the wire value. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lead" => Some(Self::Lead),
            "contributor" => Some(Self::Contributor),
            "participant" => Some(Self::Participant),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Contributor => "contributor",
            Self::Participant => "participant",
        }
    }
}

/// Raw team member as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberInput {
    /// Foreign user reference; not owned by the project.
    pub user_id: String,
    pub role: String,
}

impl MemberInput {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }
}

/// Validated team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user_id: String,
    pub role: MemberRole,
}

/// Candidate project record built from user input at request time.
///
/// Missing string fields decode as empty strings so the engine can report
/// them as `RequiredFieldEmpty` instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDraft {
    /// Required only by the edit flow.
    pub id: Option<String>,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub contribution_needs: String,
    /// Empty string is treated the same as absent.
    pub photo_url: Option<String>,
    pub tags: Vec<TagInput>,
    pub team: Vec<MemberInput>,
    /// Only meaningful on edit; creation ignores it.
    pub governance: Option<GovernanceSplit>,
}

/// Project record accepted by the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProject {
    /// Trimmed draft id; `None` for creations.
    pub id: Option<String>,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub contribution_needs: String,
    pub photo_url: Option<String>,
    pub tags: Vec<Tag>,
    pub team: Vec<ProjectMember>,
    pub governance: Option<GovernanceSplit>,
}

impl NormalizedProject {
    /// Number of tags with role `category`.
    pub fn category_tag_count(&self) -> usize {
        self.tags.iter().filter(|tag| tag.is_category()).count()
    }
}
