//! Project use-case service.
//!
//! # Responsibility
//! - Run the create/edit flow: validate, normalize tags, persist, record
//!   activity, read back.
//!
//! # Invariants
//! - A draft that fails validation never touches storage.
//! - Tags are upserted into the global namespace only after validation
//!   succeeds and, for edits, after the target project is known to exist.
//! - Log events carry ids and counts only, never user-supplied text.
//! - Once the project write commits, the call returns the stored project;
//!   a failed activity insert is logged, not reported.

use crate::model::project::{NormalizedProject, ProjectDraft, ProjectId};
use crate::repo::activity_repo::{ActivityKind, ActivityRepository, NewActivity};
use crate::repo::project_repo::{ProjectListQuery, ProjectRecord, ProjectRepository};
use crate::repo::tag_repo::TagRepository;
use crate::repo::{RepoError, RepoResult};
use crate::tags::{TagService, TagServiceError};
use crate::validation::error::ValidationErrors;
use crate::validation::{validate_for_create, validate_for_edit};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from project create/edit use-cases.
#[derive(Debug)]
pub enum ProjectServiceError {
    /// Draft failed validation; carries every field-level issue.
    Invalid(ValidationErrors),
    /// Acting user id is blank.
    MissingActor,
    /// Edit draft id is not a project id.
    InvalidProjectId(String),
    ProjectNotFound(ProjectId),
    Tag(TagServiceError),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::MissingActor => write!(f, "acting user id must not be blank"),
            Self::InvalidProjectId(value) => write!(f, "invalid project id: `{value}`"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Tag(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent project state: {details}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Tag(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TagServiceError> for ProjectServiceError {
    fn from(value: TagServiceError) -> Self {
        Self::Tag(value)
    }
}

/// Project facade over project, tag and activity repositories.
pub struct ProjectService<P, T, A>
where
    P: ProjectRepository,
    T: TagRepository,
    A: ActivityRepository,
{
    projects: P,
    tags: TagService<T>,
    activities: A,
}

impl<P, T, A> ProjectService<P, T, A>
where
    P: ProjectRepository,
    T: TagRepository,
    A: ActivityRepository,
{
    pub fn new(projects: P, tags: T, activities: A) -> Self {
        Self {
            projects,
            tags: TagService::new(tags),
            activities,
        }
    }

    /// Validates and persists a new project owned by `owner_id`.
    pub fn create_project(
        &self,
        owner_id: &str,
        draft: &ProjectDraft,
    ) -> Result<ProjectRecord, ProjectServiceError> {
        let owner_id = require_actor(owner_id)?;
        let mut project = validate_for_create(draft).map_err(|errors| {
            warn!(
                "event=project_create module=service status=invalid error_count={}",
                errors.len()
            );
            ProjectServiceError::Invalid(errors)
        })?;

        project.tags = self.tags.normalize_and_upsert(&project.tags)?;
        let id = self.projects.create_project(owner_id, &project)?;
        self.record(ActivityKind::ProjectCreated, owner_id, id);

        info!(
            "event=project_create module=service status=ok project_id={id} tag_count={} team_size={}",
            project.tags.len(),
            project.team.len()
        );
        self.projects
            .get_project(id)?
            .ok_or(ProjectServiceError::InconsistentState(
                "created project not found in read-back",
            ))
    }

    /// Validates and applies an edit draft. `draft.id` selects the project.
    pub fn edit_project(
        &self,
        actor_id: &str,
        draft: &ProjectDraft,
    ) -> Result<ProjectRecord, ProjectServiceError> {
        let actor_id = require_actor(actor_id)?;
        let mut project = validate_for_edit(draft).map_err(|errors| {
            warn!(
                "event=project_edit module=service status=invalid error_count={}",
                errors.len()
            );
            ProjectServiceError::Invalid(errors)
        })?;

        let id = parse_project_id(&project)?;
        if self.projects.get_project(id)?.is_none() {
            return Err(ProjectServiceError::ProjectNotFound(id));
        }

        project.tags = self.tags.normalize_and_upsert(&project.tags)?;
        self.projects
            .update_project(id, &project)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => ProjectServiceError::ProjectNotFound(id),
                other => ProjectServiceError::Repo(other),
            })?;
        self.record(ActivityKind::ProjectUpdated, actor_id, id);

        info!(
            "event=project_edit module=service status=ok project_id={id} tag_count={} governance_set={}",
            project.tags.len(),
            project.governance.is_some()
        );
        self.projects
            .get_project(id)?
            .ok_or(ProjectServiceError::InconsistentState(
                "updated project not found in read-back",
            ))
    }

    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<ProjectRecord>> {
        self.projects.get_project(id)
    }

    /// Lists projects, normalizing the optional tag filter like stored ids.
    pub fn list_projects(
        &self,
        tag: Option<&str>,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<Vec<ProjectRecord>> {
        let query = ProjectListQuery {
            tag: tag
                .map(crate::tags::normalize_tag_id)
                .filter(|value| !value.is_empty()),
            limit,
            offset,
        };
        self.projects.list_projects(&query)
    }

    /// Appends the feed entry for a committed write.
    ///
    /// The project is already committed; a failed insert is only logged.
    fn record(&self, kind: ActivityKind, actor_id: &str, id: ProjectId) {
        let activity = NewActivity {
            kind,
            actor_id: actor_id.to_string(),
            project_id: Some(id.to_string()),
        };
        if let Err(err) = self.activities.record_activity(&activity) {
            warn!(
                "event=activity_record module=service status=error kind={} project_id={id} error={err}",
                kind.as_str()
            );
        }
    }
}

fn require_actor(actor_id: &str) -> Result<&str, ProjectServiceError> {
    let trimmed = actor_id.trim();
    if trimmed.is_empty() {
        return Err(ProjectServiceError::MissingActor);
    }
    Ok(trimmed)
}

fn parse_project_id(project: &NormalizedProject) -> Result<ProjectId, ProjectServiceError> {
    let raw = project.id.as_deref().unwrap_or_default();
    Uuid::parse_str(raw).map_err(|_| ProjectServiceError::InvalidProjectId(raw.to_string()))
}
