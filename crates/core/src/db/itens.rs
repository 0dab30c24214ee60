//! Line-item database operations.

use rusqlite::{params, params_from_iter};
use suprident_types::Centavos;

use super::{Database, DbResult};
use crate::models::{ItemComMaterial, ListaItem, Material};

const COLUMNS: &str = "id, lista_id, material_id, quantidade, preco, observacoes, missing, \
                       missing_reported_by, missing_reported_at, created_at";

impl Database {
    /// Insert a new line item.
    pub fn insert_item(&self, item: &ListaItem) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO lista_materiais_itens ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                item.id,
                item.lista_id,
                item.material_id,
                item.quantidade,
                item.preco.value(),
                item.observacoes,
                item.missing,
                item.missing_reported_by,
                item.missing_reported_at,
                item.created_at,
            ],
        )?;
        Ok(())
    }

    /// All line items of a list.
    pub fn itens_for_lista(&self, lista_id: &str) -> DbResult<Vec<ListaItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM lista_materiais_itens WHERE lista_id = ? ORDER BY created_at"
        ))?;
        let rows = stmt.query_map([lista_id], map_item)?;

        let mut itens = Vec::new();
        for row in rows {
            itens.push(row?);
        }
        Ok(itens)
    }

    /// Line items of a list joined with their catalog entries.
    pub fn itens_com_material(&self, lista_id: &str) -> DbResult<Vec<ItemComMaterial>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.id, i.lista_id, i.material_id, i.quantidade, i.preco, i.observacoes,
                    i.missing, i.missing_reported_by, i.missing_reported_at, i.created_at,
                    m.id, m.nome, m.tipo, m.preco, m.created_at
             FROM lista_materiais_itens i
             JOIN materiais m ON m.id = i.material_id
             WHERE i.lista_id = ?
             ORDER BY m.nome",
        )?;
        let rows = stmt.query_map([lista_id], |row| {
            let item = map_item(row)?;
            let material = Material {
                id: row.get(10)?,
                nome: row.get(11)?,
                tipo: row.get(12)?,
                preco: Centavos(row.get(13)?),
                created_at: row.get(14)?,
            };
            Ok(ItemComMaterial { item, material })
        })?;

        let mut itens = Vec::new();
        for row in rows {
            itens.push(row?);
        }
        Ok(itens)
    }

    /// Sum of requested quantities across all line items.
    pub fn total_quantidade_itens(&self) -> DbResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(quantidade), 0) FROM lista_materiais_itens",
            [],
            |row| row.get(0),
        )?)
    }

    /// Flag a set of line items as missing at delivery time.
    ///
    /// Returns the number of items flagged.
    pub fn flag_itens_missing(
        &self,
        item_ids: &[String],
        reported_by: &str,
        reported_at: &str,
    ) -> DbResult<usize> {
        if item_ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let sql = format!(
            "UPDATE lista_materiais_itens
             SET missing = 1, missing_reported_by = ?, missing_reported_at = ?
             WHERE id IN ({placeholders})"
        );

        let mut values: Vec<&str> = vec![reported_by, reported_at];
        values.extend(item_ids.iter().map(String::as_str));

        let rows_affected = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(rows_affected)
    }
}

fn map_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListaItem> {
    Ok(ListaItem {
        id: row.get(0)?,
        lista_id: row.get(1)?,
        material_id: row.get(2)?,
        quantidade: row.get(3)?,
        preco: Centavos(row.get(4)?),
        observacoes: row.get(5)?,
        missing: row.get(6)?,
        missing_reported_by: row.get(7)?,
        missing_reported_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}
