//! Request-list database operations.

use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::{Deserialize, Serialize};
use suprident_types::Centavos;

use super::{Database, DbError, DbResult};
use crate::models::{ListStatus, Lista};

const COLUMNS: &str = "id, profissional_id, clinica_id, status, month, descricao, preco_total, \
                       delivery_confirmation_id, created_at, filled_at, delivered_at";

/// A list summarised for dashboards: names instead of foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListaResumo {
    pub id: String,
    pub descricao: Option<String>,
    pub profissional: String,
    pub clinica: String,
    pub status: ListStatus,
    pub created_at: String,
    pub valor: Centavos,
}

impl Database {
    /// Insert a new list.
    pub fn insert_lista(&self, lista: &Lista) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO listas ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                lista.id,
                lista.profissional_id,
                lista.clinica_id,
                lista.status.as_str(),
                lista.month,
                lista.descricao,
                lista.preco_total.map(Centavos::value),
                lista.delivery_confirmation_id,
                lista.created_at,
                lista.filled_at,
                lista.delivered_at,
            ],
        )?;
        Ok(())
    }

    /// Get a list by id.
    pub fn get_lista(&self, id: &str) -> DbResult<Option<Lista>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM listas WHERE id = ?"),
                [id],
                map_lista_row,
            )
            .optional()?
            .map(Lista::try_from)
            .transpose()
    }

    /// List all lists for a month, newest first.
    pub fn listas_by_month(&self, month: &str) -> DbResult<Vec<Lista>> {
        self.query_listas(
            &format!("SELECT {COLUMNS} FROM listas WHERE month = ? ORDER BY created_at DESC"),
            [month],
        )
    }

    /// List all lists created inside a date range (inclusive date prefixes).
    pub fn listas_by_range(&self, start: &str, end: &str) -> DbResult<Vec<Lista>> {
        self.query_listas(
            &format!(
                "SELECT {COLUMNS} FROM listas
                 WHERE date(created_at) >= date(?1) AND date(created_at) <= date(?2)
                 ORDER BY created_at DESC"
            ),
            [start, end],
        )
    }

    /// All lists of one professional, newest month first.
    pub fn listas_for_profissional(&self, profissional_id: &str) -> DbResult<Vec<Lista>> {
        self.query_listas(
            &format!(
                "SELECT {COLUMNS} FROM listas WHERE profissional_id = ? ORDER BY month DESC"
            ),
            [profissional_id],
        )
    }

    /// The `filled` lists of a clinic — the ones eligible for delivery.
    pub fn filled_listas_for_clinica(&self, clinica_id: i64) -> DbResult<Vec<Lista>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM listas WHERE clinica_id = ?1 AND status = 'filled'"
        ))?;
        let rows = stmt.query_map([clinica_id], map_lista_row)?;

        let mut listas = Vec::new();
        for row in rows {
            listas.push(Lista::try_from(row?)?);
        }
        Ok(listas)
    }

    /// Recent lists joined with professional and clinic names.
    pub fn recent_listas(&self, limit: usize) -> DbResult<Vec<ListaResumo>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.id, l.descricao, p.nome, c.sindicato, l.status, l.created_at, l.preco_total
             FROM listas l
             JOIN profissionais p ON p.id = l.profissional_id
             JOIN clinicas c ON c.id = l.clinica_id
             ORDER BY l.created_at DESC
             LIMIT ?",
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<i64>>(6)?,
            ))
        })?;

        let mut resumos = Vec::new();
        for row in rows {
            let (id, descricao, profissional, sindicato, status, created_at, valor) = row?;
            resumos.push(ListaResumo {
                id,
                descricao,
                profissional,
                clinica: sindicato.unwrap_or_else(|| "N/A".to_owned()),
                status: parse_status(&status)?,
                created_at,
                valor: Centavos(valor.unwrap_or(0)),
            });
        }
        Ok(resumos)
    }

    /// Advance a `not_filled` list to `filled`, stamping total and timestamp.
    ///
    /// The `status = 'not_filled'` guard makes the transition safe to race:
    /// a second submission affects zero rows.
    pub fn mark_lista_filled(
        &self,
        id: &str,
        preco_total: Centavos,
        filled_at: &str,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE listas SET status = 'filled', preco_total = ?2, filled_at = ?3
             WHERE id = ?1 AND status = 'not_filled'",
            params![id, preco_total.value(), filled_at],
        )?;
        Ok(rows_affected > 0)
    }

    /// Advance a batch of `filled` lists to `delivered`.
    ///
    /// Returns the number of rows updated; callers run this inside a
    /// transaction and verify the count matches the eligible set.
    pub fn mark_listas_delivered(
        &self,
        ids: &[String],
        confirmation_id: &str,
        delivered_at: &str,
    ) -> DbResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "UPDATE listas
             SET status = 'delivered', delivery_confirmation_id = ?, delivered_at = ?
             WHERE id IN ({placeholders}) AND status = 'filled'"
        );

        let mut values: Vec<&str> = vec![confirmation_id, delivered_at];
        values.extend(ids.iter().map(String::as_str));

        let rows_affected = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(rows_affected)
    }

    fn query_listas<P: rusqlite::Params>(&self, sql: &str, params: P) -> DbResult<Vec<Lista>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_lista_row)?;

        let mut listas = Vec::new();
        for row in rows {
            listas.push(Lista::try_from(row?)?);
        }
        Ok(listas)
    }
}

/// Intermediate row struct for database mapping.
pub(crate) struct ListaRow {
    id: String,
    profissional_id: String,
    clinica_id: i64,
    status: String,
    month: Option<String>,
    descricao: Option<String>,
    preco_total: Option<i64>,
    delivery_confirmation_id: Option<String>,
    created_at: String,
    filled_at: Option<String>,
    delivered_at: Option<String>,
}

pub(crate) fn map_lista_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ListaRow> {
    Ok(ListaRow {
        id: row.get(0)?,
        profissional_id: row.get(1)?,
        clinica_id: row.get(2)?,
        status: row.get(3)?,
        month: row.get(4)?,
        descricao: row.get(5)?,
        preco_total: row.get(6)?,
        delivery_confirmation_id: row.get(7)?,
        created_at: row.get(8)?,
        filled_at: row.get(9)?,
        delivered_at: row.get(10)?,
    })
}

impl TryFrom<ListaRow> for Lista {
    type Error = DbError;

    fn try_from(row: ListaRow) -> Result<Self, Self::Error> {
        Ok(Lista {
            id: row.id,
            profissional_id: row.profissional_id,
            clinica_id: row.clinica_id,
            status: parse_status(&row.status)?,
            month: row.month,
            descricao: row.descricao,
            preco_total: row.preco_total.map(Centavos),
            delivery_confirmation_id: row.delivery_confirmation_id,
            created_at: row.created_at,
            filled_at: row.filled_at,
            delivered_at: row.delivered_at,
        })
    }
}

fn parse_status(s: &str) -> Result<ListStatus, DbError> {
    ListStatus::parse(s).ok_or_else(|| DbError::Constraint(format!("Unknown list status: {s}")))
}
