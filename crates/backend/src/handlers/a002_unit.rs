use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a002_unit::{Unit, UnitDto, UnitListItem};
use serde_json::{json, Value};

use crate::domain::a002_unit::{self, repository::UnitFilter};
use crate::shared::error::{parse_uuid, ApiError};

/// GET /api/units?q=&status=
pub async fn list(Query(filter): Query<UnitFilter>) -> Result<Json<Vec<UnitListItem>>, ApiError> {
    a002_unit::service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání vozíků.", e))
}

/// GET /api/units/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Unit>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a002_unit::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(ApiError::not_found("Vozík nenalezen.")),
        Err(e) => Err(ApiError::dependency("Chyba při načítání vozíku.", e)),
    }
}

/// POST /api/units
pub async fn create(Json(dto): Json<UnitDto>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = a002_unit::service::create(dto)
        .await
        .map_err(|e| ApiError::from_service("Nepodařilo se uložit vozík.", e))?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))))
}

/// PUT /api/units/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<UnitDto>,
) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a002_unit::service::update(uuid, dto).await {
        Ok(true) => Ok(Json(json!({ "id": id }))),
        Ok(false) => Err(ApiError::not_found("Vozík nenalezen.")),
        Err(e) => Err(ApiError::from_service("Nepodařilo se uložit vozík.", e)),
    }
}

/// DELETE /api/units/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a002_unit::service::delete(uuid).await {
        Ok(true) => Ok(Json(json!({ "success": true }))),
        Ok(false) => Err(ApiError::not_found("Vozík nenalezen.")),
        Err(e) => Err(ApiError::dependency("Nepodařilo se smazat vozík.", e)),
    }
}
