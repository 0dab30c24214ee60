//! Professional database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Profissional;

const COLUMNS: &str =
    "id, nome, funcao, email, telefone, login, senha, role, id_clinica, created_at";

impl Database {
    /// Insert a new professional.
    pub fn insert_profissional(&self, profissional: &Profissional) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO profissionais ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                profissional.id,
                profissional.nome,
                profissional.funcao,
                profissional.email,
                profissional.telefone,
                profissional.login,
                profissional.senha,
                profissional.role,
                profissional.id_clinica,
                profissional.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a professional by id.
    pub fn get_profissional(&self, id: &str) -> DbResult<Option<Profissional>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM profissionais WHERE id = ?"),
                [id],
                map_profissional,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a professional by login identifier.
    pub fn get_profissional_by_login(&self, login: &str) -> DbResult<Option<Profissional>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM profissionais WHERE login = ?"),
                [login],
                map_profissional,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all professionals ordered by name.
    pub fn list_profissionais(&self) -> DbResult<Vec<Profissional>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM profissionais ORDER BY nome"))?;
        let rows = stmt.query_map([], map_profissional)?;

        let mut profissionais = Vec::new();
        for row in rows {
            profissionais.push(row?);
        }
        Ok(profissionais)
    }

    /// Count all professionals.
    pub fn count_profissionais(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM profissionais", [], |row| row.get(0))?)
    }
}

fn map_profissional(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profissional> {
    Ok(Profissional {
        id: row.get(0)?,
        nome: row.get(1)?,
        funcao: row.get(2)?,
        email: row.get(3)?,
        telefone: row.get(4)?,
        login: row.get(5)?,
        senha: row.get(6)?,
        role: row.get(7)?,
        id_clinica: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_by_login() {
        let db = Database::open_in_memory().unwrap();
        let clinica = db.create_clinica(Some("Sindicato A"), None).unwrap();

        let mut profissional = Profissional::new("Ana Souza".into(), Some(clinica.id));
        profissional.login = Some("ana".into());
        profissional.senha = Some("1234".into());
        db.insert_profissional(&profissional).unwrap();

        let found = db.get_profissional_by_login("ana").unwrap().unwrap();
        assert_eq!(found.id, profissional.id);
        assert_eq!(found.nome, "Ana Souza");

        assert!(db.get_profissional_by_login("bob").unwrap().is_none());
        assert_eq!(db.count_profissionais().unwrap(), 1);
    }

    #[test]
    fn duplicate_login_is_rejected() {
        let db = Database::open_in_memory().unwrap();

        let mut a = Profissional::new("Ana".into(), None);
        a.login = Some("ana".into());
        db.insert_profissional(&a).unwrap();

        let mut b = Profissional::new("Outra Ana".into(), None);
        b.login = Some("ana".into());
        assert!(db.insert_profissional(&b).is_err());
    }
}
