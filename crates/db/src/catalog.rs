//! Catalog use cases: products, raw materials and the recipe links between
//! them. Validation and uniqueness rules live here; the repositories only
//! store rows.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{NewProduct, Product, ProductId, ProductPatch};
use autoflex_core::domain::raw_material::{
    NewRawMaterial, RawMaterial, RawMaterialId, RawMaterialPatch,
};
use autoflex_core::domain::recipe::{NewRecipeLine, RecipeLine, RecipeLineId};
use autoflex_core::errors::{ApplicationError, DomainError};

use crate::repositories::CatalogRepositories;

const PRODUCT_NOT_FOUND: &str = "Product not found";
const RAW_MATERIAL_NOT_FOUND: &str = "Raw material not found";

fn not_found(message: &str) -> ApplicationError {
    DomainError::NotFound(message.to_string()).into()
}

fn conflict(message: &str) -> ApplicationError {
    DomainError::Conflict(message.to_string()).into()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct CatalogService {
    repositories: CatalogRepositories,
}

impl CatalogService {
    pub fn new(repositories: CatalogRepositories) -> Self {
        Self { repositories }
    }

    pub async fn list_products(
        &self,
        direction: SortDirection,
    ) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.repositories.products.list(direction).await?)
    }

    pub async fn create_product(&self, input: NewProduct) -> Result<Product, ApplicationError> {
        input.validate()?;
        self.ensure_product_unique(None, Some(&input.code), Some(&input.name)).await?;

        let now = Utc::now();
        let product = Product {
            id: ProductId(new_id()),
            code: input.code,
            name: input.name,
            value: input.value,
            created_at: now,
            updated_at: now,
        };
        self.repositories.products.save(product.clone()).await?;

        info!(
            event_name = "catalog.product.created",
            product_id = %product.id.0,
            code = %product.code,
            "product created"
        );
        Ok(product)
    }

    /// Applies a partial update. An empty patch returns the stored row untouched.
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ApplicationError> {
        let mut product = self
            .repositories
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(PRODUCT_NOT_FOUND))?;
        if patch.is_empty() {
            return Ok(product);
        }
        patch.validate()?;

        let code = patch.code.as_deref().filter(|code| *code != product.code);
        let name = patch.name.as_deref().filter(|name| *name != product.name);
        self.ensure_product_unique(Some(id), code, name).await?;

        if let Some(code) = patch.code {
            product.code = code;
        }
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(value) = patch.value {
            product.value = value;
        }
        product.updated_at = Utc::now();
        self.repositories.products.save(product.clone()).await?;

        info!(event_name = "catalog.product.updated", product_id = %id.0, "product updated");
        Ok(product)
    }

    /// Removes the product together with its recipe lines.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApplicationError> {
        if !self.repositories.products.delete(id).await? {
            return Err(not_found(PRODUCT_NOT_FOUND));
        }
        info!(event_name = "catalog.product.deleted", product_id = %id.0, "product deleted");
        Ok(())
    }

    async fn ensure_product_unique(
        &self,
        own_id: Option<&ProductId>,
        code: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), ApplicationError> {
        let products = &self.repositories.products;
        if let Some(code) = code {
            if let Some(existing) = products.find_by_code(code).await? {
                if Some(&existing.id) != own_id {
                    return Err(conflict("Product code already exists"));
                }
            }
        }
        if let Some(name) = name {
            if let Some(existing) = products.find_by_name(name).await? {
                if Some(&existing.id) != own_id {
                    return Err(conflict("Product name already exists"));
                }
            }
        }
        Ok(())
    }

    pub async fn list_raw_materials(
        &self,
        direction: SortDirection,
    ) -> Result<Vec<RawMaterial>, ApplicationError> {
        Ok(self.repositories.raw_materials.list(direction).await?)
    }

    pub async fn create_raw_material(
        &self,
        input: NewRawMaterial,
    ) -> Result<RawMaterial, ApplicationError> {
        input.validate()?;
        self.ensure_raw_material_unique(None, Some(&input.code), Some(&input.name)).await?;

        let now = Utc::now();
        let raw_material = RawMaterial {
            id: RawMaterialId(new_id()),
            code: input.code,
            name: input.name,
            quantity_stock: input.quantity_stock,
            created_at: now,
            updated_at: now,
        };
        self.repositories.raw_materials.save(raw_material.clone()).await?;

        info!(
            event_name = "catalog.raw_material.created",
            raw_material_id = %raw_material.id.0,
            code = %raw_material.code,
            "raw material created"
        );
        Ok(raw_material)
    }

    pub async fn update_raw_material(
        &self,
        id: &RawMaterialId,
        patch: RawMaterialPatch,
    ) -> Result<RawMaterial, ApplicationError> {
        let mut raw_material = self
            .repositories
            .raw_materials
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(RAW_MATERIAL_NOT_FOUND))?;
        if patch.is_empty() {
            return Ok(raw_material);
        }
        patch.validate()?;

        let code = patch.code.as_deref().filter(|code| *code != raw_material.code);
        let name = patch.name.as_deref().filter(|name| *name != raw_material.name);
        self.ensure_raw_material_unique(Some(id), code, name).await?;

        if let Some(code) = patch.code {
            raw_material.code = code;
        }
        if let Some(name) = patch.name {
            raw_material.name = name;
        }
        if let Some(quantity_stock) = patch.quantity_stock {
            raw_material.quantity_stock = quantity_stock;
        }
        raw_material.updated_at = Utc::now();
        self.repositories.raw_materials.save(raw_material.clone()).await?;

        info!(
            event_name = "catalog.raw_material.updated",
            raw_material_id = %id.0,
            "raw material updated"
        );
        Ok(raw_material)
    }

    pub async fn delete_raw_material(&self, id: &RawMaterialId) -> Result<(), ApplicationError> {
        if !self.repositories.raw_materials.delete(id).await? {
            return Err(not_found(RAW_MATERIAL_NOT_FOUND));
        }
        info!(
            event_name = "catalog.raw_material.deleted",
            raw_material_id = %id.0,
            "raw material deleted"
        );
        Ok(())
    }

    async fn ensure_raw_material_unique(
        &self,
        own_id: Option<&RawMaterialId>,
        code: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), ApplicationError> {
        let raw_materials = &self.repositories.raw_materials;
        if let Some(code) = code {
            if let Some(existing) = raw_materials.find_by_code(code).await? {
                if Some(&existing.id) != own_id {
                    return Err(conflict("Raw material code already exists"));
                }
            }
        }
        if let Some(name) = name {
            if let Some(existing) = raw_materials.find_by_name(name).await? {
                if Some(&existing.id) != own_id {
                    return Err(conflict("Raw material name already exists"));
                }
            }
        }
        Ok(())
    }

    /// Recipe of one product in insertion order. An unknown product simply has
    /// no lines.
    pub async fn list_recipe(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RecipeLine>, ApplicationError> {
        Ok(self.repositories.recipes.list_for_product(product_id).await?)
    }

    pub async fn add_recipe_line(
        &self,
        input: NewRecipeLine,
    ) -> Result<RecipeLine, ApplicationError> {
        input.validate()?;

        self.repositories
            .products
            .find_by_id(&input.product_id)
            .await?
            .ok_or_else(|| not_found(PRODUCT_NOT_FOUND))?;
        let raw_material = self
            .repositories
            .raw_materials
            .find_by_id(&input.raw_material_id)
            .await?
            .ok_or_else(|| not_found(RAW_MATERIAL_NOT_FOUND))?;

        let existing =
            self.repositories.recipes.find_link(&input.product_id, &input.raw_material_id).await?;
        if existing.is_some() {
            return Err(conflict("This raw material is already associated with this product"));
        }

        let line = RecipeLine {
            id: RecipeLineId(new_id()),
            product_id: input.product_id,
            raw_material_id: input.raw_material_id,
            raw_material_code: raw_material.code,
            raw_material_name: raw_material.name,
            quantity_stock: raw_material.quantity_stock,
            quantity_needed: input.quantity_needed,
            created_at: Utc::now(),
        };
        self.repositories.recipes.insert(line.clone()).await?;

        info!(
            event_name = "catalog.recipe.line_added",
            product_id = %line.product_id.0,
            raw_material_id = %line.raw_material_id.0,
            quantity_needed = %line.quantity_needed,
            "recipe line added"
        );
        Ok(line)
    }
}
