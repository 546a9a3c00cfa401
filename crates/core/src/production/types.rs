use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// One feasible production opportunity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionSuggestion {
    pub product_id: ProductId,
    pub product_code: String,
    pub product_name: String,
    pub quantity_possible: u64,
    pub unit_value: Decimal,
    /// Always `quantity_possible * unit_value`.
    pub total_value: Decimal,
}

impl ProductionSuggestion {
    pub fn new(product: &Product, quantity_possible: u64) -> Self {
        Self {
            product_id: product.id.clone(),
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            quantity_possible,
            unit_value: product.value,
            total_value: product.value.saturating_mul(Decimal::from(quantity_possible)),
        }
    }
}

/// Result of one planning run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionReport {
    /// Emission order: catalog order, with repeats when a product commits more
    /// than once.
    pub suggestions: Vec<ProductionSuggestion>,
    #[serde(rename = "totalProductionValue")]
    pub total_production_value: Decimal,
    /// Every product fetched for the run, feasible or not.
    #[serde(rename = "productsAnalyzed")]
    pub products_analyzed: usize,
}

impl ProductionReport {
    pub fn new(suggestions: Vec<ProductionSuggestion>, products_analyzed: usize) -> Self {
        let total_production_value = total_value(&suggestions);
        Self { suggestions, total_production_value, products_analyzed }
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// Suggestions ordered by total value, highest first. Ties keep emission
    /// order.
    pub fn ranked_by_value(&self) -> Vec<&ProductionSuggestion> {
        let mut ranked: Vec<&ProductionSuggestion> = self.suggestions.iter().collect();
        ranked.sort_by(|left, right| right.total_value.cmp(&left.total_value));
        ranked
    }
}

pub fn total_value(suggestions: &[ProductionSuggestion]) -> Decimal {
    suggestions
        .iter()
        .fold(Decimal::ZERO, |total, suggestion| total.saturating_add(suggestion.total_value))
}
