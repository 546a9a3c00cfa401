//! Production feasibility planning.
//!
//! Given the product catalog, the raw-material inventory and each product's
//! recipe, works out how many whole units of every product current stock
//! supports. Stock is shared: products are allocated greedily in
//! name-descending order and each allocation depletes a run-scoped virtual
//! stock seen by the products after it.

mod planner;
mod stock;
mod types;

use async_trait::async_trait;
use tracing::info;

pub use planner::{plan, CommitPolicy, ProductionPlanner};
pub use stock::VirtualStock;
pub use types::{total_value, ProductionReport, ProductionSuggestion};

use crate::catalog::SortDirection;
use crate::domain::product::{Product, ProductId};
use crate::domain::raw_material::RawMaterial;
use crate::domain::recipe::RecipeLine;
use crate::errors::ApplicationError;

/// Reads the planner needs. Every call hits the backing store; nothing is
/// cached between runs.
#[async_trait]
pub trait ProductionSource: Send + Sync {
    async fn fetch_all_products(
        &self,
        direction: SortDirection,
    ) -> Result<Vec<Product>, ApplicationError>;

    async fn fetch_all_raw_materials(&self) -> Result<Vec<RawMaterial>, ApplicationError>;

    /// Recipe lines in insertion order; empty when the product has none.
    async fn fetch_recipe(&self, product_id: &ProductId)
        -> Result<Vec<RecipeLine>, ApplicationError>;
}

pub struct ProductionService<S> {
    source: S,
    policy: CommitPolicy,
}

impl<S> ProductionService<S> {
    pub fn new(source: S) -> Self {
        Self::with_policy(source, CommitPolicy::default())
    }

    pub fn with_policy(source: S, policy: CommitPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ProductionSource> ProductionService<S> {
    /// Runs one planning pass. A failed read aborts the run; no partial
    /// report is returned.
    pub async fn calculate_production(&self) -> Result<ProductionReport, ApplicationError> {
        let products = self.source.fetch_all_products(SortDirection::Desc).await?;
        let raw_materials = self.source.fetch_all_raw_materials().await?;

        let mut planner = ProductionPlanner::new(&raw_materials, self.policy);
        for product in &products {
            let recipe = self.source.fetch_recipe(&product.id).await?;
            planner.allocate(product, &recipe);
        }

        let report = planner.finish(products.len());
        info!(
            event_name = "production.plan.completed",
            commit_policy = self.policy.as_str(),
            products_analyzed = report.products_analyzed,
            raw_materials = raw_materials.len(),
            suggestions = report.suggestions.len(),
            total_production_value = %report.total_production_value,
            "production plan calculated"
        );
        Ok(report)
    }
}
