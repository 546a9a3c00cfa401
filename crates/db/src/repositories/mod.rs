use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use thiserror::Error;

use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{Product, ProductId};
use autoflex_core::domain::raw_material::{RawMaterial, RawMaterialId};
use autoflex_core::domain::recipe::RecipeLine;
use autoflex_core::errors::{ApplicationError, DomainError};

use crate::DbPool;

pub mod memory;
pub mod product;
pub mod raw_material;
pub mod recipe;

pub use memory::InMemoryCatalog;
pub use product::SqlProductRepository;
pub use raw_material::SqlRawMaterialRepository;
pub use recipe::SqlRecipeRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(sqlx::Error::Database(ref db_error))
                if db_error.is_unique_violation() =>
            {
                DomainError::Conflict("resource already exists".to_string()).into()
            }
            RepositoryError::Database(sqlx::Error::Database(ref db_error))
                if db_error.is_foreign_key_violation() =>
            {
                DomainError::Validation("referenced resource does not exist".to_string()).into()
            }
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self, direction: SortDirection) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
    /// Returns `false` when no row matched.
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait RawMaterialRepository: Send + Sync {
    async fn list(&self, direction: SortDirection) -> Result<Vec<RawMaterial>, RepositoryError>;
    async fn find_by_id(&self, id: &RawMaterialId)
        -> Result<Option<RawMaterial>, RepositoryError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<RawMaterial>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<RawMaterial>, RepositoryError>;
    async fn save(&self, raw_material: RawMaterial) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &RawMaterialId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Lines for one product in insertion order, joined with their raw material.
    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RecipeLine>, RepositoryError>;

    async fn find_link(
        &self,
        product_id: &ProductId,
        raw_material_id: &RawMaterialId,
    ) -> Result<Option<RecipeLine>, RepositoryError>;

    /// Stores the link columns of `line`; joined raw material fields are ignored.
    async fn insert(&self, line: RecipeLine) -> Result<(), RepositoryError>;
}

/// The three catalog stores behind one handle, shared by the catalog service
/// and the production source.
#[derive(Clone)]
pub struct CatalogRepositories {
    pub products: Arc<dyn ProductRepository>,
    pub raw_materials: Arc<dyn RawMaterialRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
}

impl CatalogRepositories {
    pub fn sql(pool: DbPool) -> Self {
        Self {
            products: Arc::new(SqlProductRepository::new(pool.clone())),
            raw_materials: Arc::new(SqlRawMaterialRepository::new(pool.clone())),
            recipes: Arc::new(SqlRecipeRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryCatalog::default());
        Self { products: store.clone(), raw_materials: store.clone(), recipes: store }
    }
}

fn decode_column<T>(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn decode_decimal(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = decode_column(row, column)?;
    Decimal::from_str(&raw)
        .map_err(|e| RepositoryError::Decode(format!("invalid decimal in `{column}`: {e}")))
}

fn decode_timestamp(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw: String = decode_column(row, column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp in `{column}`: {e}")))
}

#[cfg(test)]
mod tests {
    use autoflex_core::errors::{ApplicationError, DomainError};

    use super::RepositoryError;

    #[test]
    fn decode_errors_surface_as_persistence_failures() {
        let error = ApplicationError::from(RepositoryError::Decode("bad decimal".to_string()));

        assert_eq!(error, ApplicationError::Persistence("decode error: bad decimal".to_string()));
    }

    #[test]
    fn pool_errors_surface_as_persistence_failures() {
        let error = ApplicationError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut));

        assert!(matches!(error, ApplicationError::Persistence(_)));
        assert_ne!(
            error,
            ApplicationError::Domain(DomainError::Conflict("resource already exists".to_string()))
        );
    }
}
