//! Activity log repository.
//!
//! # Invariants
//! - Activity rows are append-only.
//! - `list_recent` returns newest first (`created_at DESC, id DESC`).
//! - Referenced users/projects are not enforced; the feed hydrates them
//!   lazily and tolerates missing rows.

use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const ACTIVITY_LIMIT_MAX: u32 = 100;

/// Kind of recorded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProjectCreated,
    ProjectUpdated,
    StepCompleted,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::StepCompleted => "step_completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "project_created" => Some(Self::ProjectCreated),
            "project_updated" => Some(Self::ProjectUpdated),
            "step_completed" => Some(Self::StepCompleted),
            _ => None,
        }
    }
}

/// Write model for one activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub actor_id: String,
    pub project_id: Option<String>,
}

/// Raw persisted activity, before hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub id: i64,
    pub kind: ActivityKind,
    pub actor_id: String,
    pub project_id: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

pub trait ActivityRepository {
    fn record_activity(&self, activity: &NewActivity) -> RepoResult<i64>;
    /// Newest activities first; `limit` clamps to 100.
    fn list_recent(&self, limit: u32) -> RepoResult<Vec<ActivityRecord>>;
}

pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["activities"])?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn record_activity(&self, activity: &NewActivity) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO activities (kind, actor_id, project_id) VALUES (?1, ?2, ?3);",
            params![
                activity.kind.as_str(),
                activity.actor_id.as_str(),
                activity.project_id.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_recent(&self, limit: u32) -> RepoResult<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, actor_id, project_id, created_at
             FROM activities
             ORDER BY created_at DESC, id DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(limit.min(ACTIVITY_LIMIT_MAX))])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<ActivityRecord> {
    let kind_text: String = row.get("kind")?;
    let kind = ActivityKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid activity kind `{kind_text}` in activities.kind"))
    })?;
    Ok(ActivityRecord {
        id: row.get("id")?,
        kind,
        actor_id: row.get("actor_id")?,
        project_id: row.get("project_id")?,
        created_at: row.get("created_at")?,
    })
}
