use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::product::{Product, ProductId};
use crate::domain::raw_material::RawMaterial;
use crate::domain::recipe::RecipeLine;
use crate::errors::DomainError;

use super::stock::VirtualStock;
use super::types::{ProductionReport, ProductionSuggestion};

/// When the deduct-and-emit step runs while scanning a recipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit after every recipe line whose running minimum is still
    /// positive. A product with several such lines deducts stock and emits a
    /// suggestion once per line.
    #[default]
    PerLine,
    /// Finish the running minimum over the whole recipe, then commit at most
    /// once.
    PerProduct,
}

impl CommitPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerLine => "per_line",
            Self::PerProduct => "per_product",
        }
    }
}

impl FromStr for CommitPolicy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "per_line" => Ok(Self::PerLine),
            "per_product" => Ok(Self::PerProduct),
            other => Err(DomainError::Validation(format!(
                "unsupported commit policy `{other}` (expected per_line|per_product)"
            ))),
        }
    }
}

/// Greedy, single-pass allocator over a shared virtual stock.
///
/// Products must be fed in priority order; stock committed to one product is
/// no longer visible to the products allocated after it.
#[derive(Debug)]
pub struct ProductionPlanner {
    policy: CommitPolicy,
    stock: VirtualStock,
    suggestions: Vec<ProductionSuggestion>,
}

impl ProductionPlanner {
    pub fn new(raw_materials: &[RawMaterial], policy: CommitPolicy) -> Self {
        Self { policy, stock: VirtualStock::seed(raw_materials), suggestions: Vec::new() }
    }

    pub fn stock(&self) -> &VirtualStock {
        &self.stock
    }

    pub fn suggestions(&self) -> &[ProductionSuggestion] {
        &self.suggestions
    }

    /// Allocates stock to one product and returns how many suggestions were
    /// emitted for it. Empty recipes are skipped.
    pub fn allocate(&mut self, product: &Product, recipe: &[RecipeLine]) -> usize {
        if recipe.is_empty() {
            debug!(
                event_name = "production.plan.product_skipped",
                product_id = %product.id.0,
                "product has no recipe"
            );
            return 0;
        }

        let emitted_before = self.suggestions.len();
        // None means unbounded: no line has constrained the product yet.
        let mut quantity_possible: Option<i64> = None;

        for line in recipe {
            let available = self.stock.available(&line.raw_material_id);
            if let Some(units) = units_supported(available, line) {
                if quantity_possible.map_or(true, |current| units < current) {
                    quantity_possible = Some(units);
                }
            }

            if self.policy == CommitPolicy::PerLine {
                if let Some(quantity) = positive(quantity_possible) {
                    self.commit(product, recipe, quantity);
                }
            }
        }

        if self.policy == CommitPolicy::PerProduct {
            if let Some(quantity) = positive(quantity_possible) {
                self.commit(product, recipe, quantity);
            }
        }

        let emitted = self.suggestions.len() - emitted_before;
        debug!(
            event_name = "production.plan.product_allocated",
            product_id = %product.id.0,
            recipe_lines = recipe.len(),
            quantity_possible = quantity_possible.unwrap_or_default(),
            suggestions_emitted = emitted,
            "product allocation evaluated"
        );
        emitted
    }

    pub fn finish(self, products_analyzed: usize) -> ProductionReport {
        ProductionReport::new(self.suggestions, products_analyzed)
    }

    fn commit(&mut self, product: &Product, recipe: &[RecipeLine], quantity: u64) {
        let units = Decimal::from(quantity);
        for line in recipe {
            if line.quantity_needed > Decimal::ZERO {
                let amount = line.quantity_needed.saturating_mul(units);
                self.stock.consume(&line.raw_material_id, amount);
            }
        }
        self.suggestions.push(ProductionSuggestion::new(product, quantity));
    }
}

/// Plans a whole catalog in one call. `recipe_for` is consulted once per
/// product, in the order of `products`.
pub fn plan<'a, F>(
    products: &[Product],
    raw_materials: &[RawMaterial],
    policy: CommitPolicy,
    mut recipe_for: F,
) -> ProductionReport
where
    F: FnMut(&ProductId) -> &'a [RecipeLine],
{
    let mut planner = ProductionPlanner::new(raw_materials, policy);
    for product in products {
        planner.allocate(product, recipe_for(&product.id));
    }
    planner.finish(products.len())
}

/// Whole units of the product that `available` stock supports for one line.
/// Lines with a non-positive requirement impose no constraint.
fn units_supported(available: Decimal, line: &RecipeLine) -> Option<i64> {
    if line.quantity_needed <= Decimal::ZERO {
        return None;
    }
    let saturated = |negative: bool| if negative { i64::MIN } else { i64::MAX };
    match available.checked_div(line.quantity_needed) {
        Some(ratio) => {
            let ratio = ratio.floor();
            Some(ratio.to_i64().unwrap_or(saturated(ratio.is_sign_negative())))
        }
        None => Some(saturated(available.is_sign_negative())),
    }
}

fn positive(quantity_possible: Option<i64>) -> Option<u64> {
    quantity_possible
        .and_then(|quantity| u64::try_from(quantity).ok())
        .filter(|quantity| *quantity > 0)
}
