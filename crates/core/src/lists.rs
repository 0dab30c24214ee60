//! Request-list lifecycle operations.
//!
//! Lists are created in bulk at month start (one `not_filled` list per
//! professional with a clinic), filled once by their professional, and later
//! confirmed delivered by an administrator (see [`crate::delivery`]).

use suprident_types::Centavos;
use uuid::Uuid;

use crate::db::{Database, DbError, ListaResumo};
use crate::error::{SupridentError, SupridentResult};
use crate::models::{now_rfc3339, ItemComMaterial, ListStatus, Lista, ListaDetalhes, ListaItem};
use crate::pricing::{compute_total, LineDraft};

/// One submitted line item of a fill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillItem {
    pub material_id: String,
    pub quantidade: u32,
    pub observacoes: Option<String>,
}

/// Service for list creation, filling and querying.
pub struct ListService<'a> {
    db: &'a Database,
}

impl<'a> ListService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Creates one `not_filled` list per professional for `month`.
    ///
    /// Professionals without a clinic binding are skipped; they have no
    /// delivery target. Returns the number of lists created.
    pub fn create_monthly_lists(&self, month: &str) -> SupridentResult<usize> {
        validate_month(month)?;

        let profissionais = self.db.list_profissionais()?;

        let tx = self.db.transaction()?;
        let mut created = 0;
        for profissional in profissionais {
            let Some(clinica_id) = profissional.id_clinica else {
                continue;
            };
            let lista = Lista::new_monthly(profissional.id, clinica_id, month.to_owned());
            self.db.insert_lista(&lista)?;
            created += 1;
        }
        tx.commit().map_err(DbError::from)?;

        Ok(created)
    }

    /// Fills a `not_filled` list with the submitted items.
    ///
    /// Every item is validated and its material resolved before any write.
    /// The catalog price is snapshotted onto each line item, and the list's
    /// total is set to the reduction over the snapshot — the invariant that
    /// `preco_total` equals the sum of its line items at fill time. Item
    /// inserts and the status transition commit atomically.
    pub fn fill_list(&self, lista_id: &str, items: &[FillItem]) -> SupridentResult<Lista> {
        let lista = self
            .db
            .get_lista(lista_id)?
            .ok_or(SupridentError::NotFound("lista"))?;

        if lista.status != ListStatus::NotFilled {
            return Err(SupridentError::InvalidInput(format!(
                "lista is already {}",
                lista.status.as_str()
            )));
        }

        if items.is_empty() {
            return Err(SupridentError::InvalidInput(
                "at least one item is required".into(),
            ));
        }

        let mut drafts = Vec::with_capacity(items.len());
        for item in items {
            if item.quantidade < 1 {
                return Err(SupridentError::InvalidInput(
                    "quantidade must be at least 1".into(),
                ));
            }
            let material = self
                .db
                .get_material(&item.material_id)?
                .ok_or(SupridentError::NotFound("material"))?;
            drafts.push((
                item,
                LineDraft {
                    material_id: material.id,
                    unit_price: material.preco,
                    quantity: item.quantidade,
                },
            ));
        }

        let total = compute_total(drafts.iter().map(|(_, draft)| draft));
        let filled_at = now_rfc3339();

        let tx = self.db.transaction()?;
        for (item, draft) in &drafts {
            self.db.insert_item(&ListaItem {
                id: Uuid::new_v4().to_string(),
                lista_id: lista_id.to_owned(),
                material_id: draft.material_id.clone(),
                quantidade: draft.quantity,
                preco: draft.unit_price,
                observacoes: item.observacoes.clone(),
                missing: false,
                missing_reported_by: None,
                missing_reported_at: None,
                created_at: filled_at.clone(),
            })?;
        }

        if !self.db.mark_lista_filled(lista_id, total, &filled_at)? {
            // Raced with another submission; dropping the transaction rolls
            // the item inserts back.
            return Err(SupridentError::InvalidInput(
                "lista was filled concurrently".into(),
            ));
        }
        tx.commit().map_err(DbError::from)?;

        self.db
            .get_lista(lista_id)?
            .ok_or(SupridentError::NotFound("lista"))
    }

    /// A list with its professional, clinic and items.
    pub fn get_details(&self, lista_id: &str) -> SupridentResult<ListaDetalhes> {
        let lista = self
            .db
            .get_lista(lista_id)?
            .ok_or(SupridentError::NotFound("lista"))?;
        let profissional = self
            .db
            .get_profissional(&lista.profissional_id)?
            .ok_or(SupridentError::NotFound("profissional"))?;
        let clinica = self
            .db
            .get_clinica(lista.clinica_id)?
            .ok_or(SupridentError::NotFound("clinica"))?;
        let itens: Vec<ItemComMaterial> = self.db.itens_com_material(lista_id)?;

        Ok(ListaDetalhes {
            lista,
            profissional,
            clinica,
            itens,
        })
    }

    pub fn by_month(&self, month: &str) -> SupridentResult<Vec<Lista>> {
        validate_month(month)?;
        Ok(self.db.listas_by_month(month)?)
    }

    pub fn by_range(&self, start: &str, end: &str) -> SupridentResult<Vec<Lista>> {
        Ok(self.db.listas_by_range(start, end)?)
    }

    pub fn recent(&self, limit: usize) -> SupridentResult<Vec<ListaResumo>> {
        Ok(self.db.recent_listas(limit)?)
    }

    pub fn history_for_profissional(&self, profissional_id: &str) -> SupridentResult<Vec<Lista>> {
        Ok(self.db.listas_for_profissional(profissional_id)?)
    }
}

fn validate_month(month: &str) -> SupridentResult<()> {
    let bytes = month.as_bytes();
    let valid = bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && month[5..]
            .parse::<u8>()
            .is_ok_and(|m| (1..=12).contains(&m));
    if !valid {
        return Err(SupridentError::InvalidInput(format!(
            "invalid month {month:?}, expected YYYY-MM"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Material, Profissional};

    struct Fixture {
        db: Database,
        clinica_id: i64,
        profissional_id: String,
        luvas_id: String,
        resina_id: String,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let clinica = db.create_clinica(Some("Sindicato A"), None).unwrap();
        let profissional = Profissional::new("Ana".into(), Some(clinica.id));
        db.insert_profissional(&profissional).unwrap();

        let luvas = Material::new("Luvas".into(), None, Centavos(1500));
        let resina = Material::new("Resina".into(), None, Centavos(999));
        db.insert_material(&luvas).unwrap();
        db.insert_material(&resina).unwrap();

        Fixture {
            db,
            clinica_id: clinica.id,
            profissional_id: profissional.id,
            luvas_id: luvas.id,
            resina_id: resina.id,
        }
    }

    #[test]
    fn monthly_creation_skips_clinicless_professionals() {
        let f = fixture();
        let unbound = Profissional::new("Bruno".into(), None);
        f.db.insert_profissional(&unbound).unwrap();

        let created = ListService::new(&f.db).create_monthly_lists("2026-08").unwrap();
        assert_eq!(created, 1);

        let listas = f.db.listas_by_month("2026-08").unwrap();
        assert_eq!(listas.len(), 1);
        assert_eq!(listas[0].profissional_id, f.profissional_id);
        assert_eq!(listas[0].status, ListStatus::NotFilled);
    }

    #[test]
    fn rejects_malformed_month() {
        let f = fixture();
        let service = ListService::new(&f.db);
        assert!(service.create_monthly_lists("2026-13").is_err());
        assert!(service.create_monthly_lists("08/2026").is_err());
        assert!(service.by_month("agosto").is_err());
    }

    #[test]
    fn fill_snapshots_prices_and_sets_total() {
        let f = fixture();
        let service = ListService::new(&f.db);
        service.create_monthly_lists("2026-08").unwrap();
        let lista_id = f.db.listas_by_month("2026-08").unwrap()[0].id.clone();

        let filled = service
            .fill_list(
                &lista_id,
                &[
                    FillItem {
                        material_id: f.luvas_id.clone(),
                        quantidade: 2,
                        observacoes: None,
                    },
                    FillItem {
                        material_id: f.resina_id.clone(),
                        quantidade: 1,
                        observacoes: Some("caixa pequena".into()),
                    },
                ],
            )
            .unwrap();

        assert_eq!(filled.status, ListStatus::Filled);
        assert_eq!(filled.preco_total, Some(Centavos(3999)));
        assert!(filled.filled_at.is_some());

        // Catalog price edits must not rewrite the snapshot.
        f.db.update_material_preco(&f.luvas_id, Centavos(9_999)).unwrap();
        let itens = f.db.itens_for_lista(&lista_id).unwrap();
        let luvas_item = itens.iter().find(|i| i.material_id == f.luvas_id).unwrap();
        assert_eq!(luvas_item.preco, Centavos(1500));
    }

    #[test]
    fn fill_rejects_wrong_state_and_bad_items() {
        let f = fixture();
        let service = ListService::new(&f.db);
        service.create_monthly_lists("2026-08").unwrap();
        let lista_id = f.db.listas_by_month("2026-08").unwrap()[0].id.clone();

        // Empty submission
        assert!(matches!(
            service.fill_list(&lista_id, &[]),
            Err(SupridentError::InvalidInput(_))
        ));

        // Unknown material leaves no partial writes behind
        let result = service.fill_list(
            &lista_id,
            &[FillItem {
                material_id: "ghost".into(),
                quantidade: 1,
                observacoes: None,
            }],
        );
        assert!(matches!(result, Err(SupridentError::NotFound("material"))));
        assert!(f.db.itens_for_lista(&lista_id).unwrap().is_empty());

        // Fill once, then refilling is a state error
        service
            .fill_list(
                &lista_id,
                &[FillItem {
                    material_id: f.luvas_id.clone(),
                    quantidade: 1,
                    observacoes: None,
                }],
            )
            .unwrap();
        assert!(matches!(
            service.fill_list(
                &lista_id,
                &[FillItem {
                    material_id: f.luvas_id.clone(),
                    quantidade: 1,
                    observacoes: None,
                }]
            ),
            Err(SupridentError::InvalidInput(_))
        ));
    }

    #[test]
    fn details_join_all_pieces() {
        let f = fixture();
        let service = ListService::new(&f.db);
        service.create_monthly_lists("2026-08").unwrap();
        let lista_id = f.db.listas_by_month("2026-08").unwrap()[0].id.clone();
        service
            .fill_list(
                &lista_id,
                &[FillItem {
                    material_id: f.luvas_id.clone(),
                    quantidade: 2,
                    observacoes: None,
                }],
            )
            .unwrap();

        let detalhes = service.get_details(&lista_id).unwrap();
        assert_eq!(detalhes.profissional.nome, "Ana");
        assert_eq!(detalhes.clinica.id, f.clinica_id);
        assert_eq!(detalhes.itens.len(), 1);
        assert_eq!(detalhes.itens[0].material.nome, "Luvas");

        assert!(matches!(
            service.get_details("missing"),
            Err(SupridentError::NotFound("lista"))
        ));
    }

    #[test]
    fn history_is_per_professional() {
        let f = fixture();
        let service = ListService::new(&f.db);
        service.create_monthly_lists("2026-07").unwrap();
        service.create_monthly_lists("2026-08").unwrap();

        let history = service.history_for_profissional(&f.profissional_id).unwrap();
        assert_eq!(history.len(), 2);
        // Newest month first
        assert_eq!(history[0].month.as_deref(), Some("2026-08"));
    }
}
