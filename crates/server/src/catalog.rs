use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use autoflex_core::catalog::SortDirection;
use autoflex_core::domain::product::{NewProduct, Product, ProductId, ProductPatch};
use autoflex_core::domain::raw_material::{
    NewRawMaterial, RawMaterial, RawMaterialId, RawMaterialPatch,
};
use autoflex_core::domain::recipe::{NewRecipeLine, RecipeLine};

use crate::api::{ApiError, AppState, Listing};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub value: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawMaterialRequest {
    pub code: Option<String>,
    pub name: Option<String>,
    pub quantity_stock: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeLineRequest {
    pub raw_material_id: Option<String>,
    pub quantity_needed: Option<Decimal>,
}

fn required<T>(field: Option<T>, message: &str) -> Result<T, ApiError> {
    field.ok_or_else(|| ApiError::bad_request(message))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<Product>>, ApiError> {
    let direction = SortDirection::from_query(query.order_by.as_deref());
    let products = state.catalog.list_products(direction).await?;
    Ok(Json(products.into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(request) = payload?;
    const MISSING: &str = "Code, name and value are required";
    let input = NewProduct {
        code: required(request.code, MISSING)?,
        name: required(request.name, MISSING)?,
        value: required(request.value, MISSING)?,
    };

    let product = state.catalog.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Json(request) = payload?;
    let patch = ProductPatch { code: request.code, name: request.name, value: request.value };

    let product = state.catalog.update_product(&ProductId(id), patch).await?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_product(&ProductId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_raw_materials(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<RawMaterial>>, ApiError> {
    let direction = SortDirection::from_query(query.order_by.as_deref());
    let raw_materials = state.catalog.list_raw_materials(direction).await?;
    Ok(Json(raw_materials.into()))
}

pub async fn create_raw_material(
    State(state): State<AppState>,
    payload: Result<Json<RawMaterialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RawMaterial>), ApiError> {
    let Json(request) = payload?;
    const MISSING: &str = "Code, name and quantity stock are required";
    let input = NewRawMaterial {
        code: required(request.code, MISSING)?,
        name: required(request.name, MISSING)?,
        quantity_stock: required(request.quantity_stock, MISSING)?,
    };

    let raw_material = state.catalog.create_raw_material(input).await?;
    Ok((StatusCode::CREATED, Json(raw_material)))
}

pub async fn update_raw_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RawMaterialRequest>, JsonRejection>,
) -> Result<Json<RawMaterial>, ApiError> {
    let Json(request) = payload?;
    let patch = RawMaterialPatch {
        code: request.code,
        name: request.name,
        quantity_stock: request.quantity_stock,
    };

    let raw_material = state.catalog.update_raw_material(&RawMaterialId(id), patch).await?;
    Ok(Json(raw_material))
}

pub async fn delete_raw_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_raw_material(&RawMaterialId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_recipe(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Listing<RecipeLine>>, ApiError> {
    let lines = state.catalog.list_recipe(&ProductId(product_id)).await?;
    Ok(Json(lines.into()))
}

pub async fn add_recipe_line(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    payload: Result<Json<RecipeLineRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeLine>), ApiError> {
    let Json(request) = payload?;
    const MISSING: &str = "raw_material_id and quantity_needed are required";
    let input = NewRecipeLine {
        product_id: ProductId(product_id),
        raw_material_id: RawMaterialId(required(request.raw_material_id, MISSING)?),
        quantity_needed: required(request.quantity_needed, MISSING)?,
    };

    let line = state.catalog.add_recipe_line(input).await?;
    Ok((StatusCode::CREATED, Json(line)))
}
