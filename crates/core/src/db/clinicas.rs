//! Clinic database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Clinica;

impl Database {
    /// Create a new clinic, returning the row with its generated id.
    pub fn create_clinica(
        &self,
        sindicato: Option<&str>,
        endereco: Option<&str>,
    ) -> DbResult<Clinica> {
        self.conn.execute(
            "INSERT INTO clinicas (sindicato, endereco) VALUES (?1, ?2)",
            params![sindicato, endereco],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_clinica(id)?
            .ok_or_else(|| super::DbError::NotFound(format!("clinica {id}")))
    }

    /// Get a clinic by id.
    pub fn get_clinica(&self, id: i64) -> DbResult<Option<Clinica>> {
        self.conn
            .query_row(
                "SELECT id, sindicato, endereco, created_at FROM clinicas WHERE id = ?",
                [id],
                map_clinica,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all clinics ordered by union name.
    pub fn list_clinicas(&self) -> DbResult<Vec<Clinica>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, sindicato, endereco, created_at FROM clinicas ORDER BY sindicato")?;
        let rows = stmt.query_map([], map_clinica)?;

        let mut clinicas = Vec::new();
        for row in rows {
            clinicas.push(row?);
        }
        Ok(clinicas)
    }
}

fn map_clinica(row: &rusqlite::Row<'_>) -> rusqlite::Result<Clinica> {
    Ok(Clinica {
        id: row.get(0)?,
        sindicato: row.get(1)?,
        endereco: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_list() {
        let db = Database::open_in_memory().unwrap();

        let a = db
            .create_clinica(Some("Sindicato B"), Some("Rua Azul, 10"))
            .unwrap();
        let b = db.create_clinica(Some("Sindicato A"), None).unwrap();
        assert_ne!(a.id, b.id);

        let all = db.list_clinicas().unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by sindicato
        assert_eq!(all[0].sindicato.as_deref(), Some("Sindicato A"));
    }

    #[test]
    fn get_missing_returns_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_clinica(42).unwrap().is_none());
    }
}
