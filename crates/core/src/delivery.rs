//! Delivery confirmation workflow.
//!
//! Transitions `filled` lists to `delivered` with photo/signature evidence.
//! The operation has three strictly ordered steps with different failure
//! semantics:
//!
//! 1. **Eligibility check** — before any write. A target with no `filled`
//!    lists is rejected with zero writes.
//! 2. **Evidence commit point** — the confirmation row is inserted on its
//!    own. If the later status update fails, the evidence stands and the
//!    failure is surfaced as [`SupridentError::PartialDelivery`] so the
//!    operator can retry without a duplicate confirmation.
//! 3. **Status batch** — every eligible list advances to `delivered` inside
//!    one transaction (all-or-nothing across the batch).
//!
//! Missing-item flags are applied after the batch commits and are
//! best-effort: a failure there is logged and does not affect the result.

use uuid::Uuid;

use crate::db::{Database, DbError};
use crate::error::{SupridentError, SupridentResult};
use crate::models::{
    now_rfc3339, AuthSession, ConfirmationTarget, DeliveryConfirmation, ListStatus, Lista,
};

/// Input for a delivery confirmation.
///
/// The photo (and optional signature) must already be uploaded; this
/// operation only persists their URLs.
#[derive(Debug, Clone)]
pub struct ConfirmDeliveryInput {
    pub target: ConfirmationTarget,
    pub photo_url: String,
    pub signature_url: Option<String>,
    pub observations: Option<String>,
    pub missing_items: Vec<String>,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub confirmation: DeliveryConfirmation,
    pub lists_delivered: usize,
    pub missing_flagged: usize,
}

/// Service executing the confirmation workflow.
pub struct DeliveryService<'a> {
    db: &'a Database,
}

impl<'a> DeliveryService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Confirms delivery for a single list or a whole clinic.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when the caller is not an administrator (no writes)
    /// - `InvalidInput` when the photo URL is missing (no writes)
    /// - `NotFound` for an unknown list/clinic (no writes)
    /// - `NothingToDeliver` when the target has no `filled` list (no writes)
    /// - `PartialDelivery` when the confirmation row was written but the
    ///   status batch did not apply — lists remain `filled`
    pub fn confirm_delivery(
        &self,
        caller: &AuthSession,
        input: ConfirmDeliveryInput,
    ) -> SupridentResult<DeliveryOutcome> {
        if !caller.is_admin() {
            return Err(SupridentError::Forbidden);
        }

        if input.photo_url.trim().is_empty() {
            return Err(SupridentError::InvalidInput(
                "photo_url is required".into(),
            ));
        }

        let eligible = self.eligible_lists(&input.target)?;

        let confirmed_at = now_rfc3339();
        let confirmation = DeliveryConfirmation {
            id: Uuid::new_v4().to_string(),
            target: input.target,
            photo_url: input.photo_url,
            signature_url: input.signature_url,
            observations: input.observations,
            confirmed_by: Some(caller.profissional_id.clone()),
            confirmed_at: confirmed_at.clone(),
            created_at: confirmed_at.clone(),
        };
        self.db.insert_confirmation(&confirmation)?;

        let lista_ids: Vec<String> = eligible.iter().map(|l| l.id.clone()).collect();
        let lists_delivered = self
            .deliver_batch(&lista_ids, &confirmation.id, &confirmed_at)
            .map_err(|source| SupridentError::PartialDelivery {
                confirmation_id: confirmation.id.clone(),
                source,
            })?;

        let missing_flagged = if input.missing_items.is_empty() {
            0
        } else {
            // Best-effort: the delivery already stands, a failed annotation
            // must not roll it back.
            match self.db.flag_itens_missing(
                &input.missing_items,
                &caller.profissional_id,
                &confirmed_at,
            ) {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(
                        confirmation_id = %confirmation.id,
                        "failed to flag missing items: {err}"
                    );
                    0
                }
            }
        };

        Ok(DeliveryOutcome {
            confirmation,
            lists_delivered,
            missing_flagged,
        })
    }

    /// Resolves the `filled` lists a confirmation would apply to.
    fn eligible_lists(&self, target: &ConfirmationTarget) -> SupridentResult<Vec<Lista>> {
        match target {
            ConfirmationTarget::Lista(lista_id) => {
                let lista = self
                    .db
                    .get_lista(lista_id)?
                    .ok_or(SupridentError::NotFound("lista"))?;
                if lista.status != ListStatus::Filled {
                    return Err(SupridentError::NothingToDeliver);
                }
                Ok(vec![lista])
            }
            ConfirmationTarget::Clinica(clinica_id) => {
                self.db
                    .get_clinica(*clinica_id)?
                    .ok_or(SupridentError::NotFound("clinica"))?;
                let listas = self.db.filled_listas_for_clinica(*clinica_id)?;
                if listas.is_empty() {
                    return Err(SupridentError::NothingToDeliver);
                }
                Ok(listas)
            }
        }
    }

    /// Advances the batch inside one transaction, verifying every eligible
    /// list was still `filled` when the update ran.
    fn deliver_batch(
        &self,
        lista_ids: &[String],
        confirmation_id: &str,
        delivered_at: &str,
    ) -> Result<usize, DbError> {
        let tx = self.db.transaction()?;
        let updated = self
            .db
            .mark_listas_delivered(lista_ids, confirmation_id, delivered_at)?;
        if updated != lista_ids.len() {
            return Err(DbError::Constraint(format!(
                "expected {} lists to advance, {} did",
                lista_ids.len(),
                updated
            )));
        }
        tx.commit()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::{FillItem, ListService};
    use crate::models::{Material, Profissional, ROLE_ADMIN, ROLE_PROFESSIONAL};
    use suprident_types::Centavos;

    struct Fixture {
        db: Database,
        clinica_id: i64,
        lista_ids: Vec<String>,
    }

    fn admin() -> AuthSession {
        AuthSession {
            profissional_id: "admin-1".into(),
            role: ROLE_ADMIN.into(),
        }
    }

    fn input(target: ConfirmationTarget) -> ConfirmDeliveryInput {
        ConfirmDeliveryInput {
            target,
            photo_url: "/files/sha256/abc".into(),
            signature_url: None,
            observations: None,
            missing_items: Vec::new(),
        }
    }

    /// Three professionals at one clinic, each with a filled list.
    fn fixture(filled: usize) -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let clinica = db.create_clinica(Some("Sindicato A"), None).unwrap();
        let material = Material::new("Luvas".into(), None, Centavos(1500));
        db.insert_material(&material).unwrap();

        for i in 0..3 {
            let profissional = Profissional::new(format!("Prof {i}"), Some(clinica.id));
            db.insert_profissional(&profissional).unwrap();
        }
        ListService::new(&db).create_monthly_lists("2026-08").unwrap();

        let lista_ids: Vec<String> = db
            .listas_by_month("2026-08")
            .unwrap()
            .iter()
            .map(|l| l.id.clone())
            .collect();

        for lista_id in lista_ids.iter().take(filled) {
            ListService::new(&db)
                .fill_list(
                    lista_id,
                    &[FillItem {
                        material_id: material.id.clone(),
                        quantidade: 2,
                        observacoes: None,
                    }],
                )
                .unwrap();
        }

        Fixture {
            db,
            clinica_id: clinica.id,
            lista_ids,
        }
    }

    #[test]
    fn non_admin_is_rejected_before_any_write() {
        let f = fixture(3);
        let caller = AuthSession {
            profissional_id: "p1".into(),
            role: ROLE_PROFESSIONAL.into(),
        };

        let result = DeliveryService::new(&f.db)
            .confirm_delivery(&caller, input(ConfirmationTarget::Clinica(f.clinica_id)));
        assert!(matches!(result, Err(SupridentError::Forbidden)));
        assert_eq!(f.db.count_confirmations().unwrap(), 0);
    }

    #[test]
    fn missing_photo_is_rejected_before_any_write() {
        let f = fixture(3);
        let mut bad = input(ConfirmationTarget::Clinica(f.clinica_id));
        bad.photo_url = "  ".into();

        let result = DeliveryService::new(&f.db).confirm_delivery(&admin(), bad);
        assert!(matches!(result, Err(SupridentError::InvalidInput(_))));
        assert_eq!(f.db.count_confirmations().unwrap(), 0);
    }

    #[test]
    fn clinic_with_no_filled_lists_rejects_with_zero_writes() {
        let f = fixture(0);

        let result = DeliveryService::new(&f.db)
            .confirm_delivery(&admin(), input(ConfirmationTarget::Clinica(f.clinica_id)));
        assert!(matches!(result, Err(SupridentError::NothingToDeliver)));

        // No confirmation row and no status change.
        assert_eq!(f.db.count_confirmations().unwrap(), 0);
        for lista_id in &f.lista_ids {
            let lista = f.db.get_lista(lista_id).unwrap().unwrap();
            assert_eq!(lista.status, ListStatus::NotFilled);
        }
    }

    #[test]
    fn single_list_confirmation_advances_exactly_that_list() {
        let f = fixture(2);
        let target_id = f.lista_ids[0].clone();

        let outcome = DeliveryService::new(&f.db)
            .confirm_delivery(&admin(), input(ConfirmationTarget::Lista(target_id.clone())))
            .unwrap();

        assert_eq!(outcome.lists_delivered, 1);
        let lista = f.db.get_lista(&target_id).unwrap().unwrap();
        assert_eq!(lista.status, ListStatus::Delivered);
        assert_eq!(
            lista.delivery_confirmation_id.as_deref(),
            Some(outcome.confirmation.id.as_str())
        );

        // The clinic's other filled list is untouched.
        let other = f.db.get_lista(&f.lista_ids[1]).unwrap().unwrap();
        assert_eq!(other.status, ListStatus::Filled);
    }

    #[test]
    fn single_list_confirmation_requires_filled_state() {
        let f = fixture(1);

        // not_filled list
        let result = DeliveryService::new(&f.db).confirm_delivery(
            &admin(),
            input(ConfirmationTarget::Lista(f.lista_ids[1].clone())),
        );
        assert!(matches!(result, Err(SupridentError::NothingToDeliver)));

        // already delivered list
        DeliveryService::new(&f.db)
            .confirm_delivery(
                &admin(),
                input(ConfirmationTarget::Lista(f.lista_ids[0].clone())),
            )
            .unwrap();
        let result = DeliveryService::new(&f.db).confirm_delivery(
            &admin(),
            input(ConfirmationTarget::Lista(f.lista_ids[0].clone())),
        );
        assert!(matches!(result, Err(SupridentError::NothingToDeliver)));
        assert_eq!(f.db.count_confirmations().unwrap(), 1);
    }

    #[test]
    fn clinic_confirmation_with_missing_item() {
        // Clinic with 3 filled lists, one item reported missing.
        let f = fixture(3);
        let missing_item_id = f.db.itens_for_lista(&f.lista_ids[0]).unwrap()[0].id.clone();

        let mut request = input(ConfirmationTarget::Clinica(f.clinica_id));
        request.signature_url = Some("/files/sha256/sig".into());
        request.missing_items = vec![missing_item_id.clone()];

        let outcome = DeliveryService::new(&f.db)
            .confirm_delivery(&admin(), request)
            .unwrap();

        assert_eq!(outcome.lists_delivered, 3);
        assert_eq!(outcome.missing_flagged, 1);
        assert_eq!(f.db.count_confirmations().unwrap(), 1);

        for lista_id in &f.lista_ids {
            let lista = f.db.get_lista(lista_id).unwrap().unwrap();
            assert_eq!(lista.status, ListStatus::Delivered);
        }

        let item = f
            .db
            .itens_for_lista(&f.lista_ids[0])
            .unwrap()
            .into_iter()
            .find(|i| i.id == missing_item_id)
            .unwrap();
        assert!(item.missing);
        assert_eq!(item.missing_reported_by.as_deref(), Some("admin-1"));
        assert!(item.missing_reported_at.is_some());
    }

    #[test]
    fn failed_status_update_preserves_confirmation_and_filled_state() {
        let f = fixture(3);

        // Force the status batch to fail after the confirmation row exists.
        f.db.conn()
            .execute_batch(
                "CREATE TRIGGER fail_deliver BEFORE UPDATE OF status ON listas
                 BEGIN SELECT RAISE(ABORT, 'forced failure'); END;",
            )
            .unwrap();

        let result = DeliveryService::new(&f.db)
            .confirm_delivery(&admin(), input(ConfirmationTarget::Clinica(f.clinica_id)));

        let confirmation_id = match result {
            Err(SupridentError::PartialDelivery {
                confirmation_id, ..
            }) => confirmation_id,
            other => panic!("expected PartialDelivery, got {other:?}"),
        };

        // Evidence stands; lists did not advance and were not reset.
        assert!(f.db.get_confirmation(&confirmation_id).unwrap().is_some());
        for lista_id in &f.lista_ids {
            let lista = f.db.get_lista(lista_id).unwrap().unwrap();
            assert_eq!(lista.status, ListStatus::Filled);
        }
    }

    #[test]
    fn missing_flag_failure_is_non_fatal() {
        let f = fixture(3);

        // Failing the missing-item update must not fail the confirmation.
        f.db.conn()
            .execute_batch(
                "CREATE TRIGGER fail_missing BEFORE UPDATE OF missing ON lista_materiais_itens
                 BEGIN SELECT RAISE(ABORT, 'forced failure'); END;",
            )
            .unwrap();

        let item_id = f.db.itens_for_lista(&f.lista_ids[0]).unwrap()[0].id.clone();
        let mut request = input(ConfirmationTarget::Clinica(f.clinica_id));
        request.missing_items = vec![item_id];

        let outcome = DeliveryService::new(&f.db)
            .confirm_delivery(&admin(), request)
            .unwrap();

        assert_eq!(outcome.lists_delivered, 3);
        assert_eq!(outcome.missing_flagged, 0);
        for lista_id in &f.lista_ids {
            let lista = f.db.get_lista(lista_id).unwrap().unwrap();
            assert_eq!(lista.status, ListStatus::Delivered);
        }
    }
}
