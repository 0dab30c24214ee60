//! Materials catalog database operations.

use rusqlite::{params, OptionalExtension};
use suprident_types::Centavos;

use super::{Database, DbResult};
use crate::models::Material;

impl Database {
    /// Insert a new catalog entry.
    pub fn insert_material(&self, material: &Material) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO materiais (id, nome, tipo, preco, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                material.id,
                material.nome,
                material.tipo,
                material.preco.value(),
                material.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a catalog entry by id.
    pub fn get_material(&self, id: &str) -> DbResult<Option<Material>> {
        self.conn
            .query_row(
                "SELECT id, nome, tipo, preco, created_at FROM materiais WHERE id = ?",
                [id],
                map_material,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List the whole catalog ordered by name.
    pub fn list_materiais(&self) -> DbResult<Vec<Material>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, nome, tipo, preco, created_at FROM materiais ORDER BY nome")?;
        let rows = stmt.query_map([], map_material)?;

        let mut materiais = Vec::new();
        for row in rows {
            materiais.push(row?);
        }
        Ok(materiais)
    }

    /// Update the current unit price of a catalog entry.
    ///
    /// Existing line items are untouched: their price is a snapshot taken at
    /// fill time.
    pub fn update_material_preco(&self, id: &str, preco: Centavos) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE materiais SET preco = ?2 WHERE id = ?1",
            params![id, preco.value()],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_material(row: &rusqlite::Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        id: row.get(0)?,
        nome: row.get(1)?,
        tipo: row.get(2)?,
        preco: Centavos(row.get(3)?),
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_and_reprice() {
        let db = Database::open_in_memory().unwrap();

        let material = Material::new("Resina Composta".into(), Some("restauração".into()), Centavos(4500));
        db.insert_material(&material).unwrap();

        let found = db.get_material(&material.id).unwrap().unwrap();
        assert_eq!(found.preco, Centavos(4500));

        assert!(db.update_material_preco(&material.id, Centavos(4990)).unwrap());
        let found = db.get_material(&material.id).unwrap().unwrap();
        assert_eq!(found.preco, Centavos(4990));

        assert!(!db.update_material_preco("nope", Centavos(1)).unwrap());
    }

    #[test]
    fn catalog_is_ordered_by_name() {
        let db = Database::open_in_memory().unwrap();
        db.insert_material(&Material::new("Luvas".into(), None, Centavos(1500)))
            .unwrap();
        db.insert_material(&Material::new("Algodão".into(), None, Centavos(800)))
            .unwrap();

        let all = db.list_materiais().unwrap();
        assert_eq!(all[0].nome, "Algodão");
        assert_eq!(all[1].nome, "Luvas");
    }
}
