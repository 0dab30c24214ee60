//! Session database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Session;

impl Database {
    /// Insert a new session.
    pub fn insert_session(&self, session: &Session) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token, profissional_id, role, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.token,
                session.profissional_id,
                session.role,
                session.created_at,
                session.expires_at,
            ],
        )?;
        Ok(())
    }

    /// Get a session by token.
    pub fn get_session(&self, token: &str) -> DbResult<Option<Session>> {
        self.conn
            .query_row(
                "SELECT token, profissional_id, role, created_at, expires_at
                 FROM sessions WHERE token = ?",
                [token],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        profissional_id: row.get(1)?,
                        role: row.get(2)?,
                        created_at: row.get(3)?,
                        expires_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete sessions whose expiry is in the past. Returns the count removed.
    pub fn purge_expired_sessions(&self, now: &str) -> DbResult<usize> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at < ?", [now])?;
        Ok(rows_affected)
    }
}
