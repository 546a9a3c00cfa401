use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::raw_material::{RawMaterial, RawMaterialId};

/// Run-scoped working copy of raw-material quantities.
///
/// Seeded once per planning run and decremented as allocations are
/// committed. The source `RawMaterial` records are never touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualStock {
    remaining: HashMap<RawMaterialId, Decimal>,
}

impl VirtualStock {
    /// Later entries win when the same id appears twice.
    pub fn seed(raw_materials: &[RawMaterial]) -> Self {
        let remaining = raw_materials
            .iter()
            .map(|material| (material.id.clone(), material.quantity_stock))
            .collect();
        Self { remaining }
    }

    /// Remaining quantity; materials unknown to this run count as zero.
    pub fn available(&self, raw_material_id: &RawMaterialId) -> Decimal {
        self.remaining.get(raw_material_id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Deducts `amount`. The balance may go negative; readers then see a
    /// material that supports no further units.
    pub fn consume(&mut self, raw_material_id: &RawMaterialId, amount: Decimal) {
        let balance = self.remaining.entry(raw_material_id.clone()).or_insert(Decimal::ZERO);
        *balance = balance.saturating_sub(amount);
    }

}
