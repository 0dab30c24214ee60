//! Domain types for the materials-request workflow.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use suprident_types::Centavos;
use uuid::Uuid;

/// Current UTC time as an RFC 3339 string with second precision.
///
/// Second precision keeps the strings parseable by SQLite's date functions.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Role string stored on professionals and sessions for administrators.
pub const ROLE_ADMIN: &str = "admin";

/// Role string for regular professionals.
pub const ROLE_PROFESSIONAL: &str = "professional";

/// Lifecycle state of a request list.
///
/// The only permitted transitions are `NotFilled -> Filled` (the professional
/// submits line items) and `Filled -> Delivered` (an administrator confirms
/// physical delivery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    NotFilled,
    Filled,
    Delivered,
}

impl ListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStatus::NotFilled => "not_filled",
            ListStatus::Filled => "filled",
            ListStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_filled" => Some(ListStatus::NotFilled),
            "filled" => Some(ListStatus::Filled),
            "delivered" => Some(ListStatus::Delivered),
            _ => None,
        }
    }
}

/// An organisational delivery target (a clinic operated by a union).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clinica {
    pub id: i64,
    pub sindicato: Option<String>,
    pub endereco: Option<String>,
    pub created_at: String,
}

/// A professional bound to one clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profissional {
    pub id: String,
    pub nome: String,
    pub funcao: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub login: Option<String>,
    pub senha: Option<String>,
    pub role: String,
    pub id_clinica: Option<i64>,
    pub created_at: String,
}

impl Profissional {
    /// Creates a professional with a fresh id and the default role.
    pub fn new(nome: String, id_clinica: Option<i64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            nome,
            funcao: None,
            email: None,
            telefone: None,
            login: None,
            senha: None,
            role: ROLE_PROFESSIONAL.to_owned(),
            id_clinica,
            created_at: now_rfc3339(),
        }
    }
}

/// A catalog entry. `preco` is the current unit price in centavos; line items
/// snapshot it at submission time, so editing it never rewrites history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub nome: String,
    pub tipo: Option<String>,
    pub preco: Centavos,
    pub created_at: String,
}

impl Material {
    pub fn new(nome: String, tipo: Option<String>, preco: Centavos) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            nome,
            tipo,
            preco,
            created_at: now_rfc3339(),
        }
    }
}

/// One professional's monthly material request to one clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lista {
    pub id: String,
    pub profissional_id: String,
    pub clinica_id: i64,
    pub status: ListStatus,
    pub month: Option<String>,
    pub descricao: Option<String>,
    pub preco_total: Option<Centavos>,
    pub delivery_confirmation_id: Option<String>,
    pub created_at: String,
    pub filled_at: Option<String>,
    pub delivered_at: Option<String>,
}

impl Lista {
    /// Creates an empty `not_filled` list for the given month.
    pub fn new_monthly(profissional_id: String, clinica_id: i64, month: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profissional_id,
            clinica_id,
            status: ListStatus::NotFilled,
            month: Some(month),
            descricao: None,
            preco_total: None,
            delivery_confirmation_id: None,
            created_at: now_rfc3339(),
            filled_at: None,
            delivered_at: None,
        }
    }
}

/// One (material, quantity, snapshot price) row within a list.
///
/// Immutable after the list is filled, except for the missing-item flag set
/// during delivery confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListaItem {
    pub id: String,
    pub lista_id: String,
    pub material_id: String,
    pub quantidade: u32,
    pub preco: Centavos,
    pub observacoes: Option<String>,
    pub missing: bool,
    pub missing_reported_by: Option<String>,
    pub missing_reported_at: Option<String>,
    pub created_at: String,
}

/// A line item joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemComMaterial {
    pub item: ListaItem,
    pub material: Material,
}

/// A list joined with its professional, clinic and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListaDetalhes {
    pub lista: Lista,
    pub profissional: Profissional,
    pub clinica: Clinica,
    pub itens: Vec<ItemComMaterial>,
}

/// What a delivery confirmation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationTarget {
    /// Exactly one `filled` list.
    Lista(String),
    /// Every currently `filled` list of a clinic.
    Clinica(i64),
}

/// Evidence record created when delivery is confirmed. Immutable once
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfirmation {
    pub id: String,
    pub target: ConfirmationTarget,
    pub photo_url: String,
    pub signature_url: Option<String>,
    pub observations: Option<String>,
    pub confirmed_by: Option<String>,
    pub confirmed_at: String,
    pub created_at: String,
}

/// A persisted login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub profissional_id: String,
    pub role: String,
    pub created_at: String,
    pub expires_at: String,
}

/// The resolved identity of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub profissional_id: String,
    pub role: String,
}

impl AuthSession {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for status in [
            ListStatus::NotFilled,
            ListStatus::Filled,
            ListStatus::Delivered,
        ] {
            assert_eq!(ListStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ListStatus::parse("shipped"), None);
    }

    #[test]
    fn admin_role_is_recognised() {
        let session = AuthSession {
            profissional_id: "p1".into(),
            role: ROLE_ADMIN.into(),
        };
        assert!(session.is_admin());

        let session = AuthSession {
            profissional_id: "p2".into(),
            role: ROLE_PROFESSIONAL.into(),
        };
        assert!(!session.is_admin());
    }
}
