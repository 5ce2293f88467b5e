use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_customer::{Customer, CustomerDto};
use contracts::domain::a002_unit::Unit;
use serde_json::{json, Value};

use crate::domain::a001_customer::{self, repository::CustomerFilter};
use crate::domain::a002_unit;
use crate::shared::error::{parse_uuid, ApiError};

/// GET /api/customers?q=&status=
pub async fn list(Query(filter): Query<CustomerFilter>) -> Result<Json<Vec<Customer>>, ApiError> {
    a001_customer::service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání zákazníků.", e))
}

/// GET /api/customers/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Customer>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a001_customer::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(ApiError::not_found("Zákazník nenalezen.")),
        Err(e) => Err(ApiError::dependency("Chyba při načítání zákazníka.", e)),
    }
}

/// POST /api/customers
pub async fn create(Json(dto): Json<CustomerDto>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = a001_customer::service::create(dto)
        .await
        .map_err(|e| ApiError::from_service("Nepodařilo se uložit zákazníka.", e))?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))))
}

/// PUT /api/customers/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<CustomerDto>,
) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a001_customer::service::update(uuid, dto).await {
        Ok(true) => Ok(Json(json!({ "id": id }))),
        Ok(false) => Err(ApiError::not_found("Zákazník nenalezen.")),
        Err(e) => Err(ApiError::from_service("Nepodařilo se uložit zákazníka.", e)),
    }
}

/// DELETE /api/customers/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a001_customer::service::delete(uuid).await {
        Ok(true) => Ok(Json(json!({ "success": true }))),
        Ok(false) => Err(ApiError::not_found("Zákazník nenalezen.")),
        Err(e) => Err(ApiError::dependency("Nepodařilo se smazat zákazníka.", e)),
    }
}

/// GET /api/customers/:id/units
pub async fn list_units(Path(id): Path<String>) -> Result<Json<Vec<Unit>>, ApiError> {
    let uuid = parse_uuid(&id)?;
    a002_unit::service::list_by_customer(uuid)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání vozíků zákazníka.", e))
}
