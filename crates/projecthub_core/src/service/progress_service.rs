//! Learning-path progress use-case service.
//!
//! # Invariants
//! - Only steps declared by the path can be completed.
//! - Every operation requires a non-blank user id.
//! - Progress counts completed steps that are still part of the path, so a
//!   path edited after the fact never reports more than 100%.

use crate::repo::activity_repo::{ActivityKind, ActivityRepository, NewActivity};
use crate::repo::progress_repo::ProgressRepository;
use crate::repo::RepoError;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ordered list of steps a learner walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    pub steps: Vec<String>,
}

/// Per-user progress snapshot on one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathProgress {
    pub path_id: String,
    pub completed: usize,
    pub total: usize,
    /// Floor of `completed * 100 / total`; 0 for empty paths.
    pub percent: u8,
    /// First step in path order that is not completed yet.
    pub next_step: Option<String>,
}

#[derive(Debug)]
pub enum ProgressServiceError {
    UnknownStep { path_id: String, step_id: String },
    MissingUser,
    Repo(RepoError),
}

impl Display for ProgressServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStep { path_id, step_id } => {
                write!(f, "step `{step_id}` is not part of learning path `{path_id}`")
            }
            Self::MissingUser => write!(f, "user id must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProgressServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProgressServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct ProgressService<R: ProgressRepository, A: ActivityRepository> {
    repo: R,
    activities: A,
}

impl<R: ProgressRepository, A: ActivityRepository> ProgressService<R, A> {
    pub fn new(repo: R, activities: A) -> Self {
        Self { repo, activities }
    }

    /// Marks one step complete and returns the updated snapshot.
    ///
    /// Completing an already completed step is a no-op and records no
    /// activity.
    pub fn complete_step(
        &self,
        user_id: &str,
        path: &LearningPath,
        step_id: &str,
    ) -> Result<PathProgress, ProgressServiceError> {
        let user_id = require_user(user_id)?;
        if !path.steps.iter().any(|step| step == step_id) {
            return Err(ProgressServiceError::UnknownStep {
                path_id: path.id.clone(),
                step_id: step_id.to_string(),
            });
        }

        if self.repo.mark_step_complete(user_id, &path.id, step_id)? {
            self.activities.record_activity(&NewActivity {
                kind: ActivityKind::StepCompleted,
                actor_id: user_id.to_string(),
                project_id: None,
            })?;
            info!("event=step_complete module=service status=ok path_id={}", path.id);
        }

        self.progress(user_id, path)
    }

    pub fn progress(
        &self,
        user_id: &str,
        path: &LearningPath,
    ) -> Result<PathProgress, ProgressServiceError> {
        let user_id = require_user(user_id)?;
        let done: HashSet<String> = self
            .repo
            .completed_steps(user_id, &path.id)?
            .into_iter()
            .collect();
        Ok(summarize(path, &done))
    }

    /// Clears progress so the user can restart the path.
    pub fn reset(
        &self,
        user_id: &str,
        path: &LearningPath,
    ) -> Result<PathProgress, ProgressServiceError> {
        let user_id = require_user(user_id)?;
        self.repo.reset_path(user_id, &path.id)?;
        Ok(summarize(path, &HashSet::new()))
    }
}

fn require_user(user_id: &str) -> Result<&str, ProgressServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(ProgressServiceError::MissingUser);
    }
    Ok(trimmed)
}

fn summarize(path: &LearningPath, done: &HashSet<String>) -> PathProgress {
    let total = path.steps.len();
    let completed = path.steps.iter().filter(|step| done.contains(*step)).count();
    let percent = if total == 0 {
        0
    } else {
        u8::try_from(completed * 100 / total).unwrap_or(100)
    };

    PathProgress {
        path_id: path.id.clone(),
        completed,
        total,
        percent,
        next_step: path.steps.iter().find(|step| !done.contains(*step)).cloned(),
    }
}
