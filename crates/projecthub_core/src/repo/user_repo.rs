//! User profile cache repository.
//!
//! Users are owned by the identity provider. This table only caches the
//! display data needed to hydrate activity feeds.

use crate::repo::{ensure_tables, RepoResult};
use rusqlite::{params, Connection};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub display_name: String,
}

pub trait UserRepository {
    /// Inserts or refreshes the cached profile for `id`.
    fn save_user(&self, id: &str, display_name: &str) -> RepoResult<()>;
    fn get_user(&self, id: &str) -> RepoResult<Option<UserRecord>>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn save_user(&self, id: &str, display_name: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, display_name) VALUES (?1, ?2)
             ON CONFLICT (id) DO UPDATE SET display_name = excluded.display_name;",
            params![id, display_name],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, display_name FROM users WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(UserRecord {
                id: row.get("id")?,
                display_name: row.get("display_name")?,
            }));
        }
        Ok(None)
    }
}
