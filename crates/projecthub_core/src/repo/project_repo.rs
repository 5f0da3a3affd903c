//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist validated projects with their ordered tag links and team rows.
//! - Keep per-tag `usage_count` in step with project tag links.
//!
//! # Invariants
//! - Only `NormalizedProject` values are written; drafts never reach SQL.
//! - Project row, tag links and team rows change in one transaction.
//! - Linked tags must already exist in the global namespace (foreign key).
//! - Duplicate tag ids or team user ids keep their first occurrence.

use crate::model::governance::GovernanceSplit;
use crate::model::project::{MemberRole, NormalizedProject, ProjectId, ProjectMember};
use crate::model::tag::{Tag, TagRole};
use crate::repo::{ensure_tables, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use serde::Serialize;
use uuid::Uuid;

const PROJECTS_DEFAULT_LIMIT: u32 = 20;
const PROJECTS_LIMIT_MAX: u32 = 100;

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    tagline,
    description,
    contribution_needs,
    photo_url,
    governance_contributors,
    governance_community,
    governance_sustainability,
    created_at,
    updated_at
FROM projects";

/// Read model for a persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub owner_id: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub contribution_needs: String,
    pub photo_url: Option<String>,
    /// Tags in display order.
    pub tags: Vec<Tag>,
    pub team: Vec<ProjectMember>,
    pub governance: Option<GovernanceSplit>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Query options for project listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    /// Optional normalized tag id filter.
    pub tag: Option<String>,
    /// Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for project persistence.
pub trait ProjectRepository {
    /// Inserts a new project owned by `owner_id` and returns its id.
    fn create_project(&self, owner_id: &str, project: &NormalizedProject)
        -> RepoResult<ProjectId>;
    /// Replaces fields, tags and team of an existing project.
    ///
    /// An absent governance split keeps the stored one.
    fn update_project(&self, id: ProjectId, project: &NormalizedProject) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<ProjectRecord>>;
    /// Lists projects ordered by `updated_at DESC, id ASC`.
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<ProjectRecord>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["projects", "project_tags", "project_members", "tags"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(
        &self,
        owner_id: &str,
        project: &NormalizedProject,
    ) -> RepoResult<ProjectId> {
        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let (contributors, community, sustainability) = governance_columns(project.governance);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (
                id,
                owner_id,
                name,
                tagline,
                description,
                contribution_needs,
                photo_url,
                governance_contributors,
                governance_community,
                governance_sustainability
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id_text.as_str(),
                owner_id,
                project.name.as_str(),
                project.tagline.as_str(),
                project.description.as_str(),
                project.contribution_needs.as_str(),
                project.photo_url.as_deref(),
                contributors,
                community,
                sustainability,
            ],
        )?;
        replace_links(&tx, id_text.as_str(), project)?;
        tx.commit()?;

        Ok(id)
    }

    fn update_project(&self, id: ProjectId, project: &NormalizedProject) -> RepoResult<()> {
        let id_text = id.to_string();
        let (contributors, community, sustainability) = governance_columns(project.governance);

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE projects
             SET
                name = ?2,
                tagline = ?3,
                description = ?4,
                contribution_needs = ?5,
                photo_url = ?6,
                governance_contributors = COALESCE(?7, governance_contributors),
                governance_community = COALESCE(?8, governance_community),
                governance_sustainability = COALESCE(?9, governance_sustainability),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                id_text.as_str(),
                project.name.as_str(),
                project.tagline.as_str(),
                project.description.as_str(),
                project.contribution_needs.as_str(),
                project.photo_url.as_deref(),
                contributors,
                community,
                sustainability,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("project", id));
        }

        replace_links(&tx, id_text.as_str(), project)?;
        tx.commit()?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<ProjectRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<ProjectRecord>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(tag) = query.tag.as_ref() {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM project_tags pt
                    WHERE pt.project_id = projects.id
                      AND pt.tag_id = ?
                )",
            );
            bind_values.push(Value::Text(tag.clone()));
        }

        sql.push_str(" ORDER BY updated_at DESC, id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_project_limit(
            query.limit,
        ))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(self.conn, row)?);
        }
        Ok(projects)
    }
}

/// Normalizes list limit according to the project listing contract.
pub fn normalize_project_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PROJECTS_DEFAULT_LIMIT,
        Some(value) if value > PROJECTS_LIMIT_MAX => PROJECTS_LIMIT_MAX,
        Some(value) => value,
    }
}

fn governance_columns(governance: Option<GovernanceSplit>) -> (Option<i32>, Option<i32>, Option<i32>) {
    match governance {
        Some(split) => (
            Some(split.contributors_share),
            Some(split.community_share),
            Some(split.sustainability_share),
        ),
        None => (None, None, None),
    }
}

fn replace_links(
    tx: &Transaction<'_>,
    project_id: &str,
    project: &NormalizedProject,
) -> RepoResult<()> {
    tx.execute(
        "UPDATE tags
         SET usage_count = usage_count - 1
         WHERE id IN (SELECT tag_id FROM project_tags WHERE project_id = ?1);",
        [project_id],
    )?;
    tx.execute(
        "DELETE FROM project_tags WHERE project_id = ?1;",
        [project_id],
    )?;

    for (position, tag) in project.tags.iter().enumerate() {
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO project_tags (project_id, tag_id, display, role, position)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project_id,
                tag.id.as_str(),
                tag.display.as_str(),
                tag.role.as_str(),
                position as i64,
            ],
        )?;
        if inserted == 1 {
            tx.execute(
                "UPDATE tags SET usage_count = usage_count + 1 WHERE id = ?1;",
                [tag.id.as_str()],
            )?;
        }
    }

    tx.execute(
        "DELETE FROM project_members WHERE project_id = ?1;",
        [project_id],
    )?;
    for (position, member) in project.team.iter().enumerate() {
        tx.execute(
            "INSERT OR IGNORE INTO project_members (project_id, user_id, role, position)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                project_id,
                member.user_id.as_str(),
                member.role.as_str(),
                position as i64,
            ],
        )?;
    }

    Ok(())
}

fn parse_project_row(conn: &Connection, row: &Row<'_>) -> RepoResult<ProjectRecord> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in projects.id"))
    })?;

    let governance = match (
        row.get::<_, Option<i32>>("governance_contributors")?,
        row.get::<_, Option<i32>>("governance_community")?,
        row.get::<_, Option<i32>>("governance_sustainability")?,
    ) {
        (Some(contributors), Some(community), Some(sustainability)) => Some(
            GovernanceSplit::new(contributors, community, sustainability),
        ),
        (None, None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(format!(
                "partial governance split for project `{id_text}`"
            )));
        }
    };

    Ok(ProjectRecord {
        id,
        owner_id: row.get("owner_id")?,
        name: row.get("name")?,
        tagline: row.get("tagline")?,
        description: row.get("description")?,
        contribution_needs: row.get("contribution_needs")?,
        photo_url: row.get("photo_url")?,
        tags: load_project_tags(conn, &id_text)?,
        team: load_project_team(conn, &id_text)?,
        governance,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_project_tags(conn: &Connection, project_id: &str) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT tag_id, display, role
         FROM project_tags
         WHERE project_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let role_text: String = row.get("role")?;
        let role = TagRole::parse(&role_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid tag role `{role_text}` in project_tags.role"))
        })?;
        tags.push(Tag {
            id: row.get("tag_id")?,
            display: row.get("display")?,
            role,
        });
    }
    Ok(tags)
}

fn load_project_team(conn: &Connection, project_id: &str) -> RepoResult<Vec<ProjectMember>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, role
         FROM project_members
         WHERE project_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut team = Vec::new();
    while let Some(row) = rows.next()? {
        let role_text: String = row.get("role")?;
        let role = MemberRole::parse(&role_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid member role `{role_text}` in project_members.role"
            ))
        })?;
        team.push(ProjectMember {
            user_id: row.get("user_id")?,
            role,
        });
    }
    Ok(team)
}
