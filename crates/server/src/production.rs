use axum::{extract::State, Json};

use autoflex_core::production::ProductionReport;

use crate::api::{ApiError, AppState};

/// Runs the planner against the live catalog. Nothing is persisted.
pub async fn suggestions(
    State(state): State<AppState>,
) -> Result<Json<ProductionReport>, ApiError> {
    let report = state.production.calculate_production().await?;
    Ok(Json(report))
}
