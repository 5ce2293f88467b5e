use std::sync::Arc;

use axum::{extract::State, Json};
use contracts::dashboards::d100_units_map::UnitMapPoint;

use crate::dashboards::d100_units_map;
use crate::shared::error::ApiError;
use crate::state::AppState;

/// GET /api/dashboard/units-map
pub async fn get_units_map(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UnitMapPoint>>, ApiError> {
    d100_units_map::service::get_units_map(&state.resolver)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání mapy vozíků.", e))
}
