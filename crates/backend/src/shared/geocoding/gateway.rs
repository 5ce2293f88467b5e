use async_trait::async_trait;

use super::GeoPoint;

/// External postal code lookup
#[async_trait]
pub trait GeocodingGateway: Send + Sync {
    /// `Ok(None)` when the service knows no place for the key.
    /// The returned point carries `postal_code` as its key.
    async fn lookup_postal_code(&self, postal_code: &str) -> anyhow::Result<Option<GeoPoint>>;
}
