//! Global tag repository.
//!
//! # Responsibility
//! - Own the global tag namespace keyed by normalized tag id.
//! - Create missing tags without ever duplicating an id.
//!
//! # Invariants
//! - `upsert_tag` runs existence-check and insert in one `BEGIN IMMEDIATE`
//!   transaction, so concurrent writers for the same id serialize.
//! - New records start with `is_category = false` and `usage_count = 0`.
//! - Existing records are returned unchanged.

use crate::model::tag::Tag;
use crate::repo::{bool_to_int, ensure_tables, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::Serialize;

/// Persisted global tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    /// Normalized id, see `crate::tags::normalize_tag_id`.
    pub id: String,
    pub display: String,
    pub is_category: bool,
    pub usage_count: i64,
}

/// Result of one upsert call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUpsert {
    pub record: TagRecord,
    /// `true` when this call inserted the record.
    pub created: bool,
}

/// Repository interface for the global tag namespace.
pub trait TagRepository {
    /// Creates the tag when absent, otherwise returns the stored record.
    ///
    /// `tag.id` must already be normalized.
    fn upsert_tag(&self, tag: &Tag) -> RepoResult<TagUpsert>;
    fn get_tag(&self, id: &str) -> RepoResult<Option<TagRecord>>;
    /// Returns all tags sorted by id.
    fn list_tags(&self) -> RepoResult<Vec<TagRecord>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tags"])?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn upsert_tag(&self, tag: &Tag) -> RepoResult<TagUpsert> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if let Some(record) = load_tag(&tx, &tag.id)? {
            tx.commit()?;
            return Ok(TagUpsert {
                record,
                created: false,
            });
        }

        tx.execute(
            "INSERT INTO tags (id, display, is_category, usage_count)
             VALUES (?1, ?2, ?3, 0);",
            params![tag.id.as_str(), tag.display.as_str(), bool_to_int(false)],
        )?;
        let record = load_tag(&tx, &tag.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("tag `{}` missing after insert", tag.id))
        })?;
        tx.commit()?;

        Ok(TagUpsert {
            record,
            created: true,
        })
    }

    fn get_tag(&self, id: &str) -> RepoResult<Option<TagRecord>> {
        load_tag(self.conn, id)
    }

    fn list_tags(&self) -> RepoResult<Vec<TagRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, display, is_category, usage_count
             FROM tags
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }
}

fn load_tag(conn: &Connection, id: &str) -> RepoResult<Option<TagRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, display, is_category, usage_count
         FROM tags
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_tag_row(row)?));
    }
    Ok(None)
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<TagRecord> {
    Ok(TagRecord {
        id: row.get("id")?,
        display: row.get("display")?,
        is_category: int_to_bool(row.get("is_category")?, "tags.is_category")?,
        usage_count: row.get("usage_count")?,
    })
}
