use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::raw_material::{RawMaterial, RawMaterialId};

use super::{
    decode_column, decode_decimal, decode_timestamp, RawMaterialRepository, RepositoryError,
};
use crate::DbPool;

const RAW_MATERIAL_COLUMNS: &str = "id, code, name, quantity_stock, created_at, updated_at";

pub struct SqlRawMaterialRepository {
    pool: DbPool,
}

impl SqlRawMaterialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        column: &str,
        key: &str,
    ) -> Result<Option<RawMaterial>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RAW_MATERIAL_COLUMNS} FROM raw_material WHERE {column} = ?"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_raw_material).transpose()
    }
}

fn row_to_raw_material(row: &sqlx::sqlite::SqliteRow) -> Result<RawMaterial, RepositoryError> {
    Ok(RawMaterial {
        id: RawMaterialId(decode_column(row, "id")?),
        code: decode_column(row, "code")?,
        name: decode_column(row, "name")?,
        quantity_stock: decode_decimal(row, "quantity_stock")?,
        created_at: decode_timestamp(row, "created_at")?,
        updated_at: decode_timestamp(row, "updated_at")?,
    })
}

#[async_trait::async_trait]
impl RawMaterialRepository for SqlRawMaterialRepository {
    async fn list(&self, direction: SortDirection) -> Result<Vec<RawMaterial>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RAW_MATERIAL_COLUMNS} FROM raw_material ORDER BY name {}",
            direction.as_sql()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_raw_material).collect()
    }

    async fn find_by_id(
        &self,
        id: &RawMaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError> {
        self.find_one("id", &id.0).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<RawMaterial>, RepositoryError> {
        self.find_one("code", code).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RawMaterial>, RepositoryError> {
        self.find_one("name", name).await
    }

    async fn save(&self, raw_material: RawMaterial) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO raw_material (id, code, name, quantity_stock, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 code = excluded.code,
                 name = excluded.name,
                 quantity_stock = excluded.quantity_stock,
                 updated_at = excluded.updated_at",
        )
        .bind(&raw_material.id.0)
        .bind(&raw_material.code)
        .bind(&raw_material.name)
        .bind(raw_material.quantity_stock.to_string())
        .bind(raw_material.created_at.to_rfc3339())
        .bind(raw_material.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &RawMaterialId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM raw_material WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
