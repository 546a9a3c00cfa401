use std::collections::HashMap;

use tokio::sync::RwLock;

use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{Product, ProductId};
use autoflex_core::domain::raw_material::{RawMaterial, RawMaterialId};
use autoflex_core::domain::recipe::RecipeLine;

use super::{ProductRepository, RawMaterialRepository, RecipeRepository, RepositoryError};

#[derive(Default)]
struct CatalogState {
    products: HashMap<String, Product>,
    raw_materials: HashMap<String, RawMaterial>,
    recipe_lines: Vec<RecipeLine>,
}

impl CatalogState {
    fn joined(&self, line: &RecipeLine) -> Option<RecipeLine> {
        let raw_material = self.raw_materials.get(&line.raw_material_id.0)?;
        Some(RecipeLine {
            raw_material_code: raw_material.code.clone(),
            raw_material_name: raw_material.name.clone(),
            quantity_stock: raw_material.quantity_stock,
            ..line.clone()
        })
    }
}

/// All three catalog stores over one lock, so deletes cascade to recipe lines
/// the same way the SQL schema does. Uniqueness is left to the caller.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn list(&self, direction: SortDirection) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|left, right| left.name.cmp(&right.name));
        if direction == SortDirection::Desc {
            products.reverse();
        }
        Ok(products)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.get(&id.0).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.values().find(|p| p.code == code).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.products.values().find(|p| p.name == name).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.products.insert(product.id.0.clone(), product);
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.products.remove(&id.0).is_some();
        state.recipe_lines.retain(|line| line.product_id != *id);
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl RawMaterialRepository for InMemoryCatalog {
    async fn list(&self, direction: SortDirection) -> Result<Vec<RawMaterial>, RepositoryError> {
        let state = self.state.read().await;
        let mut raw_materials: Vec<RawMaterial> = state.raw_materials.values().cloned().collect();
        raw_materials.sort_by(|left, right| left.name.cmp(&right.name));
        if direction == SortDirection::Desc {
            raw_materials.reverse();
        }
        Ok(raw_materials)
    }

    async fn find_by_id(
        &self,
        id: &RawMaterialId,
    ) -> Result<Option<RawMaterial>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.raw_materials.get(&id.0).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<RawMaterial>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.raw_materials.values().find(|m| m.code == code).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RawMaterial>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.raw_materials.values().find(|m| m.name == name).cloned())
    }

    async fn save(&self, raw_material: RawMaterial) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.raw_materials.insert(raw_material.id.0.clone(), raw_material);
        Ok(())
    }

    async fn delete(&self, id: &RawMaterialId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.raw_materials.remove(&id.0).is_some();
        state.recipe_lines.retain(|line| line.raw_material_id != *id);
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl RecipeRepository for InMemoryCatalog {
    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<RecipeLine>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .recipe_lines
            .iter()
            .filter(|line| line.product_id == *product_id)
            .filter_map(|line| state.joined(line))
            .collect())
    }

    async fn find_link(
        &self,
        product_id: &ProductId,
        raw_material_id: &RawMaterialId,
    ) -> Result<Option<RecipeLine>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .recipe_lines
            .iter()
            .find(|line| line.product_id == *product_id && line.raw_material_id == *raw_material_id)
            .and_then(|line| state.joined(line)))
    }

    async fn insert(&self, line: RecipeLine) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state.recipe_lines.push(line);
        Ok(())
    }
}
