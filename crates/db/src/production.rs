use async_trait::async_trait;

use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{Product, ProductId};
use autoflex_core::domain::raw_material::RawMaterial;
use autoflex_core::domain::recipe::RecipeLine;
use autoflex_core::errors::ApplicationError;
use autoflex_core::production::ProductionSource;

use crate::repositories::CatalogRepositories;

/// Feeds the planner straight from the catalog repositories.
#[derive(Clone)]
pub struct RepositoryProductionSource {
    repositories: CatalogRepositories,
}

impl RepositoryProductionSource {
    pub fn new(repositories: CatalogRepositories) -> Self {
        Self { repositories }
    }
}

#[async_trait]
impl ProductionSource for RepositoryProductionSource {
    async fn fetch_all_products(
        &self,
        direction: SortDirection,
    ) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.repositories.products.list(direction).await?)
    }

    async fn fetch_all_raw_materials(&self) -> Result<Vec<RawMaterial>, ApplicationError> {
        Ok(self.repositories.raw_materials.list(SortDirection::Asc).await?)
    }

    async fn fetch_recipe(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RecipeLine>, ApplicationError> {
        Ok(self.repositories.recipes.list_for_product(product_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use autoflex_core::domain::product::NewProduct;
    use autoflex_core::domain::raw_material::NewRawMaterial;
    use autoflex_core::domain::recipe::NewRecipeLine;
    use autoflex_core::errors::ApplicationError;
    use autoflex_core::production::{CommitPolicy, ProductionService};

    use super::RepositoryProductionSource;
    use crate::catalog::CatalogService;
    use crate::repositories::CatalogRepositories;
    use crate::{connect_with_settings, migrations};

    async fn seeded() -> (sqlx::SqlitePool, CatalogRepositories) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repositories = CatalogRepositories::sql(pool.clone());
        let catalog = CatalogService::new(repositories.clone());

        let bracket = catalog
            .create_product(NewProduct {
                code: "BR-01".into(),
                name: "Bracket".into(),
                value: Decimal::from(12),
            })
            .await
            .expect("bracket");
        let steel = catalog
            .create_raw_material(NewRawMaterial {
                code: "ST".into(),
                name: "Steel".into(),
                quantity_stock: Decimal::from(23),
            })
            .await
            .expect("steel");
        catalog
            .add_recipe_line(NewRecipeLine {
                product_id: bracket.id,
                raw_material_id: steel.id,
                quantity_needed: Decimal::from(5),
            })
            .await
            .expect("line");

        (pool, repositories)
    }

    #[tokio::test]
    async fn plans_from_sqlite_catalog() {
        let (_pool, repositories) = seeded().await;
        let service = ProductionService::new(RepositoryProductionSource::new(repositories));

        let report = service.calculate_production().await.expect("plan");

        assert_eq!(report.products_analyzed, 1);
        assert_eq!(report.suggestions[0].quantity_possible, 4);
        assert_eq!(report.total_production_value, Decimal::from(48));
    }

    #[tokio::test]
    async fn planning_never_writes_stock_back() {
        let (_pool, repositories) = seeded().await;
        let service = ProductionService::with_policy(
            RepositoryProductionSource::new(repositories.clone()),
            CommitPolicy::PerProduct,
        );

        service.calculate_production().await.expect("plan");

        let steel =
            repositories.raw_materials.find_by_code("ST").await.expect("find").expect("row");
        assert_eq!(steel.quantity_stock, Decimal::from(23));
    }

    #[tokio::test]
    async fn closed_pool_surfaces_as_persistence_failure() {
        let (pool, repositories) = seeded().await;
        let service = ProductionService::new(RepositoryProductionSource::new(repositories));
        pool.close().await;

        let result = service.calculate_production().await;

        assert!(matches!(result, Err(ApplicationError::Persistence(_))));
    }
}
