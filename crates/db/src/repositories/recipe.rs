use autoflex_core::domain::product::ProductId;
use autoflex_core::domain::raw_material::RawMaterialId;
use autoflex_core::domain::recipe::{RecipeLine, RecipeLineId};

use super::{decode_column, decode_decimal, decode_timestamp, RecipeRepository, RepositoryError};
use crate::DbPool;

const RECIPE_SELECT: &str = "SELECT prm.id, prm.product_id, prm.raw_material_id,
        rm.code AS raw_material_code, rm.name AS raw_material_name, rm.quantity_stock,
        prm.quantity_needed, prm.created_at
     FROM product_raw_material prm
     JOIN raw_material rm ON rm.id = prm.raw_material_id";

pub struct SqlRecipeRepository {
    pool: DbPool,
}

impl SqlRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_recipe_line(row: &sqlx::sqlite::SqliteRow) -> Result<RecipeLine, RepositoryError> {
    Ok(RecipeLine {
        id: RecipeLineId(decode_column(row, "id")?),
        product_id: ProductId(decode_column(row, "product_id")?),
        raw_material_id: RawMaterialId(decode_column(row, "raw_material_id")?),
        raw_material_code: decode_column(row, "raw_material_code")?,
        raw_material_name: decode_column(row, "raw_material_name")?,
        quantity_stock: decode_decimal(row, "quantity_stock")?,
        quantity_needed: decode_decimal(row, "quantity_needed")?,
        created_at: decode_timestamp(row, "created_at")?,
    })
}

#[async_trait::async_trait]
impl RecipeRepository for SqlRecipeRepository {
    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RecipeLine>, RepositoryError> {
        let rows =
            sqlx::query(&format!("{RECIPE_SELECT} WHERE prm.product_id = ? ORDER BY prm.rowid"))
                .bind(&product_id.0)
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(row_to_recipe_line).collect()
    }

    async fn find_link(
        &self,
        product_id: &ProductId,
        raw_material_id: &RawMaterialId,
    ) -> Result<Option<RecipeLine>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{RECIPE_SELECT} WHERE prm.product_id = ? AND prm.raw_material_id = ?"
        ))
        .bind(&product_id.0)
        .bind(&raw_material_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_recipe_line).transpose()
    }

    async fn insert(&self, line: RecipeLine) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product_raw_material
                 (id, product_id, raw_material_id, quantity_needed, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&line.id.0)
        .bind(&line.product_id.0)
        .bind(&line.raw_material_id.0)
        .bind(line.quantity_needed.to_string())
        .bind(line.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use autoflex_core::domain::product::{Product, ProductId};
    use autoflex_core::domain::raw_material::{RawMaterial, RawMaterialId};
    use autoflex_core::domain::recipe::{RecipeLine, RecipeLineId};
    use autoflex_core::errors::{ApplicationError, DomainError};

    use super::SqlRecipeRepository;
    use crate::repositories::{
        ProductRepository, RawMaterialRepository, RecipeRepository, SqlProductRepository,
        SqlRawMaterialRepository,
    };
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let now = Utc::now();
        SqlProductRepository::new(pool.clone())
            .save(Product {
                id: ProductId("p-table".into()),
                code: "TB-01".into(),
                name: "Table".into(),
                value: Decimal::from(150),
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed product");
        let materials = SqlRawMaterialRepository::new(pool.clone());
        for (id, name, stock) in [("rm-wood", "Wood", 20), ("rm-screw", "Screw", 100)] {
            materials
                .save(RawMaterial {
                    id: RawMaterialId(id.into()),
                    code: id.to_uppercase(),
                    name: name.into(),
                    quantity_stock: Decimal::from(stock),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .expect("seed raw material");
        }
        pool
    }

    fn link(id: &str, raw_material_id: &str, needed: i64) -> RecipeLine {
        RecipeLine {
            id: RecipeLineId(id.into()),
            product_id: ProductId("p-table".into()),
            raw_material_id: RawMaterialId(raw_material_id.into()),
            raw_material_code: String::new(),
            raw_material_name: String::new(),
            quantity_stock: Decimal::ZERO,
            quantity_needed: Decimal::from(needed),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn lines_are_joined_and_kept_in_insertion_order() {
        let pool = setup().await;
        let repo = SqlRecipeRepository::new(pool);
        repo.insert(link("l-2", "rm-wood", 6)).await.expect("insert wood");
        repo.insert(link("l-1", "rm-screw", 8)).await.expect("insert screw");

        let lines = repo.list_for_product(&ProductId("p-table".into())).await.expect("list");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw_material_name, "Wood");
        assert_eq!(lines[0].quantity_stock, Decimal::from(20));
        assert_eq!(lines[1].raw_material_code, "RM-SCREW");
        assert_eq!(lines[1].quantity_needed, Decimal::from(8));
    }

    #[tokio::test]
    async fn duplicate_link_is_a_conflict() {
        let repo = SqlRecipeRepository::new(setup().await);
        repo.insert(link("l-1", "rm-wood", 6)).await.expect("insert");

        let error = repo.insert(link("l-2", "rm-wood", 3)).await.expect_err("duplicate");

        assert_eq!(
            ApplicationError::from(error),
            ApplicationError::Domain(DomainError::Conflict("resource already exists".to_string()))
        );
        assert!(repo
            .find_link(&ProductId("p-table".into()), &RawMaterialId("rm-wood".into()))
            .await
            .expect("find link")
            .is_some());
    }

    #[tokio::test]
    async fn unknown_raw_material_violates_foreign_key() {
        let repo = SqlRecipeRepository::new(setup().await);

        let error = repo.insert(link("l-1", "rm-missing", 1)).await.expect_err("fk violation");

        assert_eq!(
            ApplicationError::from(error),
            ApplicationError::Domain(DomainError::Validation(
                "referenced resource does not exist".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn deleting_parents_cascades_to_lines() {
        let pool = setup().await;
        let repo = SqlRecipeRepository::new(pool.clone());
        repo.insert(link("l-1", "rm-wood", 6)).await.expect("insert wood");
        repo.insert(link("l-2", "rm-screw", 8)).await.expect("insert screw");

        SqlRawMaterialRepository::new(pool.clone())
            .delete(&RawMaterialId("rm-wood".into()))
            .await
            .expect("delete raw material");
        let remaining = repo.list_for_product(&ProductId("p-table".into())).await.expect("list");
        assert_eq!(remaining.len(), 1);

        SqlProductRepository::new(pool)
            .delete(&ProductId("p-table".into()))
            .await
            .expect("delete product");
        let lines = repo.list_for_product(&ProductId("p-table".into())).await.expect("list");
        assert!(lines.is_empty());
    }
}
