//! Deterministic demo catalog for local runs and end-to-end checks.
//!
//! Five products compete for five raw materials. `Bar Stool` has no recipe,
//! so it is analyzed but never suggested.

use sqlx::Executor;

use crate::repositories::RepositoryError;
use crate::DbPool;

pub const DEMO_PRODUCT_IDS: &[&str] =
    &["demo-p-shelf", "demo-p-desk", "demo-p-cabinet", "demo-p-table", "demo-p-stool"];

pub const DEMO_RAW_MATERIAL_IDS: &[&str] =
    &["demo-rm-steel", "demo-rm-oak", "demo-rm-screw", "demo-rm-varnish", "demo-rm-glass"];

pub const DEMO_RECIPE_LINE_COUNT: i64 = 12;

pub struct DemoCatalog;

impl DemoCatalog {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    /// Inserts the demo rows, leaving existing rows with the same ids alone.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        Ok(SeedResult {
            products: DEMO_PRODUCT_IDS.len(),
            raw_materials: DEMO_RAW_MATERIAL_IDS.len(),
            recipe_lines: DEMO_RECIPE_LINE_COUNT as usize,
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let products: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE id IN {}",
            sql_array_from_ids(DEMO_PRODUCT_IDS)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("products", products == DEMO_PRODUCT_IDS.len() as i64));

        let raw_materials: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM raw_material WHERE id IN {}",
            sql_array_from_ids(DEMO_RAW_MATERIAL_IDS)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("raw-materials", raw_materials == DEMO_RAW_MATERIAL_IDS.len() as i64));

        let recipe_lines: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product_raw_material WHERE product_id IN {}",
            sql_array_from_ids(DEMO_PRODUCT_IDS)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("recipe-lines", recipe_lines == DEMO_RECIPE_LINE_COUNT));

        let stool_lines: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM product_raw_material WHERE product_id = 'demo-p-stool'",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("stool-without-recipe", stool_lines == 0));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the demo rows; recipe lines go with their products.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        sqlx::query(&format!(
            "DELETE FROM product WHERE id IN {}",
            sql_array_from_ids(DEMO_PRODUCT_IDS)
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM raw_material WHERE id IN {}",
            sql_array_from_ids(DEMO_RAW_MATERIAL_IDS)
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{id}'")).collect::<Vec<_>>().join(", ");
    format!("({quoted})")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub products: usize,
    pub raw_materials: usize,
    pub recipe_lines: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
