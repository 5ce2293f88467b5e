use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a005_part_purchase::{PartPurchaseDto, PartPurchaseListItem, PartPurchasePatch};
use serde_json::{json, Value};

use crate::domain::a005_part_purchase;
use crate::shared::error::{parse_uuid, ApiError};

/// GET /api/customers/:id/part-purchases
pub async fn list_by_customer(
    Path(id): Path<String>,
) -> Result<Json<Vec<PartPurchaseListItem>>, ApiError> {
    let uuid = parse_uuid(&id)?;
    a005_part_purchase::service::list_by_customer(uuid)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání nákupů náhradních dílů.", e))
}

/// POST /api/customers/:id/part-purchases
pub async fn create(
    Path(id): Path<String>,
    Json(dto): Json<PartPurchaseDto>,
) -> Result<(StatusCode, Json<PartPurchaseListItem>), ApiError> {
    let uuid = parse_uuid(&id)?;
    match a005_part_purchase::service::create(uuid, dto).await {
        Ok(Some(item)) => Ok((StatusCode::CREATED, Json(item))),
        Ok(None) => Err(ApiError::not_found("Zákazník nenalezen.")),
        Err(e) => Err(ApiError::from_service(
            "Nepodařilo se uložit nákup náhradního dílu.",
            e,
        )),
    }
}

/// PATCH /api/part-purchases/:id
pub async fn update(
    Path(id): Path<String>,
    Json(patch): Json<PartPurchasePatch>,
) -> Result<Json<PartPurchaseListItem>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a005_part_purchase::service::update(uuid, patch).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(ApiError::not_found("Nákup nenalezen.")),
        Err(e) => Err(ApiError::from_service(
            "Nepodařilo se upravit nákup náhradního dílu.",
            e,
        )),
    }
}

/// DELETE /api/part-purchases/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a005_part_purchase::service::delete(uuid).await {
        Ok(true) => Ok(Json(json!({ "success": true }))),
        Ok(false) => Err(ApiError::not_found("Nákup nenalezen.")),
        Err(e) => Err(ApiError::dependency("Nepodařilo se smazat nákup náhradního dílu.", e)),
    }
}
