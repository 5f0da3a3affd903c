//! Core domain logic for ProjectHub.
//! This crate is the single source of truth for project invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tags;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::governance::GovernanceSplit;
pub use model::project::{
    MemberInput, MemberRole, NormalizedProject, ProjectDraft, ProjectId, ProjectMember,
};
pub use model::tag::{Tag, TagInput, TagRole, MAX_CATEGORY_TAGS, MAX_TAG_LENGTH};
pub use repo::activity_repo::{ActivityKind, ActivityRepository, SqliteActivityRepository};
pub use repo::progress_repo::{ProgressRepository, SqliteProgressRepository};
pub use repo::project_repo::{
    ProjectListQuery, ProjectRecord, ProjectRepository, SqliteProjectRepository,
};
pub use repo::tag_repo::{SqliteTagRepository, TagRecord, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRecord, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::activity_service::{ActivityService, FeedItem};
pub use service::progress_service::{
    LearningPath, PathProgress, ProgressService, ProgressServiceError,
};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use tags::{normalize_tag_id, TagService, TagServiceError};
pub use validation::error::{FieldPath, ValidationErrors, ValidationIssue};
pub use validation::{
    validate_for_create, validate_for_edit, ValidationErrorKind, ValidationFlow,
    ValidationReport,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
