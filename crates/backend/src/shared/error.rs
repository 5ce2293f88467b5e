use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rejected input, raised by services and mapped to 400 at the HTTP boundary
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Errors surfaced by HTTP handlers, rendered as `{ "error": message }`
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The database or an upstream service failed
    #[error("{message}")]
    Dependency {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Wraps a store failure; the client sees `message`, the log sees the cause
    pub fn dependency(message: impl Into<String>, source: anyhow::Error) -> Self {
        ApiError::Dependency {
            message: message.into(),
            source,
        }
    }

    /// Maps a service failure: a [`ValidationError`] anywhere in the chain
    /// becomes 400, anything else is a dependency failure reported as `message`
    pub fn from_service(message: impl Into<String>, err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(validation) => ApiError::Validation(validation.0),
            Err(err) => ApiError::dependency(message, err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Dependency { message, source } = &self {
            tracing::error!("{}: {:#}", message, source);
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Parses a path id, mapping garbage to 400
pub fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|_| ApiError::validation("Neplatné ID."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::dependency("x", anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dependency_hides_cause_from_message() {
        let err = ApiError::dependency("Nepodařilo se načíst díly.", anyhow::anyhow!("disk I/O"));
        assert_eq!(err.to_string(), "Nepodařilo se načíst díly.");
    }

    #[test]
    fn test_from_service_detects_validation() {
        let err: anyhow::Error = ValidationError("Jméno je povinné.".into()).into();
        let api = ApiError::from_service("Chyba při ukládání.", err);
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert_eq!(api.to_string(), "Jméno je povinné.");

        let api = ApiError::from_service("Chyba při ukládání.", anyhow::anyhow!("locked"));
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.to_string(), "Chyba při ukládání.");
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
    }
}
