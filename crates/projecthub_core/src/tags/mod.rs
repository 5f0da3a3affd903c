//! Tag normalization service.
//!
//! # Responsibility
//! - Canonicalize project tag ids into the global tag namespace.
//! - Upsert the global record for every tag a validated project introduces.
//!
//! # Invariants
//! - Normalized ids only contain `[a-z0-9_-]` and are at most 35 characters.
//! - Runs after validation succeeds; validating a draft never creates tags.
//! - Output order follows input order; later duplicates (after
//!   normalization) are dropped.
//! - Each upsert commits on its own, ahead of the project write. A project
//!   write that fails afterwards leaves its new tags in place with
//!   `usage_count = 0`; they are reused by the next project naming them.

use crate::model::tag::{Tag, MAX_TAG_LENGTH};
use crate::repo::tag_repo::TagRepository;
use crate::repo::RepoError;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DISALLOWED_TAG_CHAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_-]").expect("valid tag char regex"));

/// Canonicalizes one raw tag id.
///
/// Lowercases, trims, replaces every character outside `[a-z0-9_-]` with `-`
/// and keeps the first 35 characters.
pub fn normalize_tag_id(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let replaced = DISALLOWED_TAG_CHAR_RE.replace_all(lowered.trim(), "-");
    replaced.chars().take(MAX_TAG_LENGTH).collect()
}

/// Service error for tag normalization.
#[derive(Debug)]
pub enum TagServiceError {
    /// Raw id normalized to an empty string.
    EmptyTagId(String),
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTagId(raw) => write!(f, "tag id `{raw}` is empty after normalization"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EmptyTagId(_) => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Tag normalization facade over a tag repository.
pub struct TagService<R: TagRepository> {
    repo: R,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Normalizes every tag id and upserts the global record for each.
    ///
    /// Returns the project tags rewritten to their normalized ids.
    pub fn normalize_and_upsert(&self, tags: &[Tag]) -> Result<Vec<Tag>, TagServiceError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(tags.len());
        let mut created = 0usize;

        for tag in tags {
            let id = normalize_tag_id(&tag.id);
            if id.is_empty() {
                return Err(TagServiceError::EmptyTagId(tag.id.clone()));
            }
            if !seen.insert(id.clone()) {
                debug!("event=tag_normalize module=tags status=duplicate_dropped");
                continue;
            }

            let tag = Tag {
                id,
                display: tag.display.clone(),
                role: tag.role,
            };
            if self.repo.upsert_tag(&tag)?.created {
                created += 1;
            }
            normalized.push(tag);
        }

        info!(
            "event=tag_upsert module=tags status=ok tag_count={} created_count={}",
            normalized.len(),
            created
        );
        Ok(normalized)
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }
}
