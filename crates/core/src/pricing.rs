//! Running-total pricing for the material-list form.
//!
//! The aggregator tracks the draft line items of one in-progress form and
//! exposes their running total in centavos. It is an explicit value scoped to
//! the form's lifetime — never process-wide state — so concurrent forms and
//! server-rendered sessions cannot leak entries into each other.
//!
//! The total is recomputed by full re-reduction over the entry set after
//! every mutation rather than patched incrementally. Incremental patching is
//! where the substitution bug lives (subtract the wrong old entry, drift
//! forever); re-reducing a few dozen rows is free.

use std::collections::HashMap;
use suprident_types::Centavos;

/// One draft row of the form: a material selection with price and quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDraft {
    pub material_id: String,
    pub unit_price: Centavos,
    pub quantity: u32,
}

/// Aggregates draft line items into a running total.
///
/// Entries are keyed by a stable per-row draft id, so replacing a row's
/// material selection (substitution) is a plain overwrite and two rows may
/// select the same material without colliding.
#[derive(Debug, Default)]
pub struct PriceAggregator {
    entries: HashMap<String, LineDraft>,
    total: Centavos,
}

/// Pure reduction over a set of drafts: `Σ unit_price × quantity`.
pub fn compute_total<'a, I>(entries: I) -> Centavos
where
    I: IntoIterator<Item = &'a LineDraft>,
{
    entries
        .into_iter()
        .map(|e| Centavos(e.unit_price.value() * i64::from(e.quantity)))
        .sum()
}

impl PriceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `draft_id`.
    ///
    /// A quantity of zero is treated as one, matching the form's minimum.
    pub fn upsert_item(
        &mut self,
        draft_id: &str,
        material_id: &str,
        unit_price: Centavos,
        quantity: u32,
    ) {
        self.entries.insert(
            draft_id.to_owned(),
            LineDraft {
                material_id: material_id.to_owned(),
                unit_price,
                quantity: quantity.max(1),
            },
        );
        self.recompute();
    }

    /// Remove the entry for `draft_id`. No-op when absent.
    pub fn remove_item(&mut self, draft_id: &str) {
        self.entries.remove(draft_id);
        self.recompute();
    }

    /// Current total in centavos.
    pub fn total(&self) -> Centavos {
        self.total
    }

    /// Current total as a pt-BR currency string, e.g. `R$ 39,99`.
    pub fn formatted_total(&self) -> String {
        self.total.format_brl()
    }

    /// Number of draft entries currently present.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries and zero the total. Called when a form is freshly
    /// mounted.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.total = Centavos::ZERO;
    }

    fn recompute(&mut self) {
        self.total = compute_total(self.entries.values());
    }
}
