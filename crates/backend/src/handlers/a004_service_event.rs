use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a004_service_event::{ServiceEvent, ServiceEventDto};
use serde_json::{json, Value};

use crate::domain::a004_service_event;
use crate::shared::error::{parse_uuid, ApiError};

/// GET /api/customers/:id/service-events
pub async fn list_by_customer(Path(id): Path<String>) -> Result<Json<Vec<ServiceEvent>>, ApiError> {
    let uuid = parse_uuid(&id)?;
    a004_service_event::service::list_by_customer(uuid)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání servisní historie.", e))
}

/// POST /api/customers/:id/service-events
pub async fn create(
    Path(id): Path<String>,
    Json(dto): Json<ServiceEventDto>,
) -> Result<(StatusCode, Json<ServiceEvent>), ApiError> {
    let uuid = parse_uuid(&id)?;
    match a004_service_event::service::create(uuid, dto).await {
        Ok(Some(event)) => Ok((StatusCode::CREATED, Json(event))),
        Ok(None) => Err(ApiError::not_found("Zákazník nenalezen.")),
        Err(e) => Err(ApiError::from_service("Nepodařilo se uložit servisní zásah.", e)),
    }
}

/// DELETE /api/service-events/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a004_service_event::service::delete(uuid).await {
        Ok(true) => Ok(Json(json!({ "success": true }))),
        Ok(false) => Err(ApiError::not_found("Servisní zásah nenalezen.")),
        Err(e) => Err(ApiError::dependency("Nepodařilo se smazat servisní zásah.", e)),
    }
}
