//! Delivery-confirmation database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{ConfirmationTarget, DeliveryConfirmation};

const COLUMNS: &str = "id, lista_id, clinica_id, photo_url, signature_url, observations, \
                       confirmed_by, confirmed_at, created_at";

impl Database {
    /// Insert a new delivery confirmation.
    pub fn insert_confirmation(&self, confirmation: &DeliveryConfirmation) -> DbResult<()> {
        let (lista_id, clinica_id) = match &confirmation.target {
            ConfirmationTarget::Lista(id) => (Some(id.as_str()), None),
            ConfirmationTarget::Clinica(id) => (None, Some(*id)),
        };

        self.conn.execute(
            &format!(
                "INSERT INTO delivery_confirmations ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                confirmation.id,
                lista_id,
                clinica_id,
                confirmation.photo_url,
                confirmation.signature_url,
                confirmation.observations,
                confirmation.confirmed_by,
                confirmation.confirmed_at,
                confirmation.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a confirmation by id.
    pub fn get_confirmation(&self, id: &str) -> DbResult<Option<DeliveryConfirmation>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM delivery_confirmations WHERE id = ?"),
                [id],
                map_confirmation_row,
            )
            .optional()?
            .map(DeliveryConfirmation::try_from)
            .transpose()
    }

    /// Count all confirmations (used to verify zero-write rejections).
    pub fn count_confirmations(&self) -> DbResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM delivery_confirmations",
            [],
            |row| row.get(0),
        )?)
    }

    /// Confirmations recorded against a clinic, newest first.
    pub fn confirmations_for_clinica(&self, clinica_id: i64) -> DbResult<Vec<DeliveryConfirmation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM delivery_confirmations
             WHERE clinica_id = ? ORDER BY confirmed_at DESC"
        ))?;
        let rows = stmt.query_map([clinica_id], map_confirmation_row)?;

        let mut confirmations = Vec::new();
        for row in rows {
            confirmations.push(DeliveryConfirmation::try_from(row?)?);
        }
        Ok(confirmations)
    }
}

/// Intermediate row struct for database mapping.
struct ConfirmationRow {
    id: String,
    lista_id: Option<String>,
    clinica_id: Option<i64>,
    photo_url: String,
    signature_url: Option<String>,
    observations: Option<String>,
    confirmed_by: Option<String>,
    confirmed_at: String,
    created_at: String,
}

fn map_confirmation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConfirmationRow> {
    Ok(ConfirmationRow {
        id: row.get(0)?,
        lista_id: row.get(1)?,
        clinica_id: row.get(2)?,
        photo_url: row.get(3)?,
        signature_url: row.get(4)?,
        observations: row.get(5)?,
        confirmed_by: row.get(6)?,
        confirmed_at: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl TryFrom<ConfirmationRow> for DeliveryConfirmation {
    type Error = DbError;

    fn try_from(row: ConfirmationRow) -> Result<Self, Self::Error> {
        let target = match (row.lista_id, row.clinica_id) {
            (Some(lista_id), None) => ConfirmationTarget::Lista(lista_id),
            (None, Some(clinica_id)) => ConfirmationTarget::Clinica(clinica_id),
            _ => {
                return Err(DbError::Constraint(format!(
                    "confirmation {} has no single target",
                    row.id
                )))
            }
        };

        Ok(DeliveryConfirmation {
            id: row.id,
            target,
            photo_url: row.photo_url,
            signature_url: row.signature_url,
            observations: row.observations,
            confirmed_by: row.confirmed_by,
            confirmed_at: row.confirmed_at,
            created_at: row.created_at,
        })
    }
}
