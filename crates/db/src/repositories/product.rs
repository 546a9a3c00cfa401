use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{Product, ProductId};

use super::{decode_column, decode_decimal, decode_timestamp, ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, code, name, value, created_at, updated_at";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, key: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE {column} = ?"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    Ok(Product {
        id: ProductId(decode_column(row, "id")?),
        code: decode_column(row, "code")?,
        name: decode_column(row, "name")?,
        value: decode_decimal(row, "value")?,
        created_at: decode_timestamp(row, "created_at")?,
        updated_at: decode_timestamp(row, "updated_at")?,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self, direction: SortDirection) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY name {}",
            direction.as_sql()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.find_one("id", &id.0).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        self.find_one("code", code).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        self.find_one("name", name).await
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, code, name, value, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 code = excluded.code,
                 name = excluded.name,
                 value = excluded.value,
                 updated_at = excluded.updated_at",
        )
        .bind(&product.id.0)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.value.to_string())
        .bind(product.created_at.to_rfc3339())
        .bind(product.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM product WHERE id = ?").bind(&id.0).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use autoflex_core::catalog::SortDirection;
    use autoflex_core::domain::product::{Product, ProductId};
    use autoflex_core::errors::{ApplicationError, DomainError};

    use super::SqlProductRepository;
    use crate::repositories::ProductRepository;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn product(id: &str, code: &str, name: &str, value: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId(id.to_string()),
            code: code.to_string(),
            name: name.to_string(),
            value: value.parse().expect("decimal"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trips_decimal_text() {
        let repo = SqlProductRepository::new(setup().await);
        repo.save(product("p-1", "CH-01", "Chair", "149.90")).await.expect("save");

        let found = repo.find_by_id(&ProductId("p-1".into())).await.expect("find").expect("row");

        assert_eq!(found.value, Decimal::new(14990, 2));
        assert_eq!(found.code, "CH-01");
        assert!(repo.find_by_code("CH-01").await.expect("by code").is_some());
        assert!(repo.find_by_name("Chair").await.expect("by name").is_some());
        assert!(repo.find_by_name("Stool").await.expect("by name").is_none());
    }

    #[tokio::test]
    async fn list_orders_by_name_in_requested_direction() {
        let repo = SqlProductRepository::new(setup().await);
        repo.save(product("p-1", "A", "Bench", "10")).await.expect("save");
        repo.save(product("p-2", "B", "Table", "20")).await.expect("save");
        repo.save(product("p-3", "C", "Lamp", "5")).await.expect("save");

        let asc: Vec<String> = repo
            .list(SortDirection::Asc)
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        let desc: Vec<String> = repo
            .list(SortDirection::Desc)
            .await
            .expect("list")
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(asc, vec!["Bench", "Lamp", "Table"]);
        assert_eq!(desc, vec!["Table", "Lamp", "Bench"]);
    }

    #[tokio::test]
    async fn save_updates_existing_row() {
        let repo = SqlProductRepository::new(setup().await);
        let mut chair = product("p-1", "CH-01", "Chair", "100");
        repo.save(chair.clone()).await.expect("insert");

        chair.value = Decimal::from(120);
        chair.name = "Armchair".to_string();
        repo.save(chair).await.expect("update");

        let found = repo.find_by_id(&ProductId("p-1".into())).await.expect("find").expect("row");
        assert_eq!(found.name, "Armchair");
        assert_eq!(found.value, Decimal::from(120));
        assert_eq!(repo.list(SortDirection::Asc).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn duplicate_code_maps_to_conflict() {
        let repo = SqlProductRepository::new(setup().await);
        repo.save(product("p-1", "CH-01", "Chair", "100")).await.expect("insert");

        let error = repo
            .save(product("p-2", "CH-01", "Stool", "50"))
            .await
            .expect_err("duplicate code must fail");

        assert_eq!(
            ApplicationError::from(error),
            ApplicationError::Domain(DomainError::Conflict("resource already exists".to_string()))
        );
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let repo = SqlProductRepository::new(setup().await);
        repo.save(product("p-1", "CH-01", "Chair", "100")).await.expect("insert");

        assert!(repo.delete(&ProductId("p-1".into())).await.expect("delete"));
        assert!(!repo.delete(&ProductId("p-1".into())).await.expect("second delete"));
    }
}
