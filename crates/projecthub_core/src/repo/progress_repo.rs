//! Learning-path progress repository.
//!
//! # Invariants
//! - One row per `(user, path, step)`; marking a step twice is a no-op.

use crate::repo::{ensure_tables, RepoResult};
use rusqlite::{params, Connection};

pub trait ProgressRepository {
    /// Returns `true` when the step was newly marked complete.
    fn mark_step_complete(&self, user_id: &str, path_id: &str, step_id: &str)
        -> RepoResult<bool>;
    /// Completed step ids for one path, in completion order.
    fn completed_steps(&self, user_id: &str, path_id: &str) -> RepoResult<Vec<String>>;
    /// Clears all progress of one user on one path. Returns removed rows.
    fn reset_path(&self, user_id: &str, path_id: &str) -> RepoResult<usize>;
}

pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["learning_progress"])?;
        Ok(Self { conn })
    }
}

impl ProgressRepository for SqliteProgressRepository<'_> {
    fn mark_step_complete(
        &self,
        user_id: &str,
        path_id: &str,
        step_id: &str,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO learning_progress (user_id, path_id, step_id)
             VALUES (?1, ?2, ?3);",
            params![user_id, path_id, step_id],
        )?;
        Ok(inserted == 1)
    }

    fn completed_steps(&self, user_id: &str, path_id: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT step_id
             FROM learning_progress
             WHERE user_id = ?1 AND path_id = ?2
             ORDER BY completed_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query(params![user_id, path_id])?;
        let mut steps = Vec::new();
        while let Some(row) = rows.next()? {
            steps.push(row.get(0)?);
        }
        Ok(steps)
    }

    fn reset_path(&self, user_id: &str, path_id: &str) -> RepoResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM learning_progress WHERE user_id = ?1 AND path_id = ?2;",
            params![user_id, path_id],
        )?;
        Ok(removed)
    }
}
