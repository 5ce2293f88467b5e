use axum::{
    extract::{Multipart, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use contracts::domain::a003_part::{Part, PartDto, StockImportResult};
use serde_json::{json, Value};

use crate::domain::a003_part::{
    self,
    repository::PartFilter,
    stock_export,
    stock_import,
};
use crate::shared::error::{parse_uuid, ApiError};

/// GET /api/parts?category=&q=
pub async fn list(Query(filter): Query<PartFilter>) -> Result<Json<Vec<Part>>, ApiError> {
    a003_part::service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| ApiError::dependency("Chyba při načítání dílů.", e))
}

/// GET /api/parts/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Part>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a003_part::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(ApiError::not_found("Díl nenalezen.")),
        Err(e) => Err(ApiError::dependency("Chyba při načítání dílu.", e)),
    }
}

/// POST /api/parts
pub async fn create(Json(dto): Json<PartDto>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = a003_part::service::create(dto)
        .await
        .map_err(|e| ApiError::from_service("Nepodařilo se uložit díl.", e))?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id.to_string() }))))
}

/// PUT /api/parts/:id
pub async fn update(
    Path(id): Path<String>,
    Json(dto): Json<PartDto>,
) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a003_part::service::update(uuid, dto).await {
        Ok(true) => Ok(Json(json!({ "id": id }))),
        Ok(false) => Err(ApiError::not_found("Díl nenalezen.")),
        Err(e) => Err(ApiError::from_service("Nepodařilo se uložit díl.", e)),
    }
}

/// DELETE /api/parts/:id
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let uuid = parse_uuid(&id)?;
    match a003_part::service::delete(uuid).await {
        Ok(true) => Ok(Json(json!({ "success": true }))),
        Ok(false) => Err(ApiError::not_found("Díl nenalezen.")),
        Err(e) => Err(ApiError::dependency("Nepodařilo se smazat díl.", e)),
    }
}

/// POST /api/parts/import (multipart, field `file`)
pub async fn import_stock(mut multipart: Multipart) -> Result<Json<StockImportResult>, ApiError> {
    let mut content: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Neplatný upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Neplatný upload: {}", e)))?;
            content = Some(bytes.to_vec());
            break;
        }
    }

    let Some(content) = content else {
        return Err(ApiError::validation("Chybí soubor."));
    };
    let text = String::from_utf8_lossy(&content);
    tracing::info!("Stock import upload: {} bytes", content.len());

    stock_import::import_stock_csv(&text)
        .await
        .map(Json)
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// GET /api/parts/export
pub async fn export_stock() -> Result<impl IntoResponse, ApiError> {
    let parts = a003_part::service::list_for_export()
        .await
        .map_err(|e| ApiError::dependency("Chyba při exportu skladu.", e))?;
    let body = stock_export::write_parts_csv(&parts)
        .map_err(|e| ApiError::dependency("Chyba při exportu skladu.", e))?;

    let file_name = stock_export::export_file_name(chrono::Local::now().date_naive());
    tracing::info!("Stock export: {} parts into {}", parts.len(), file_name);

    Ok((
        [
            (header::CONTENT_TYPE, stock_export::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}
