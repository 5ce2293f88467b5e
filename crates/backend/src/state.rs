use std::sync::Arc;

use crate::shared::config::Config;
use crate::shared::geocoding::{GeoCache, MapPointResolver, NominatimGateway};

/// Shared across handlers through axum `State`
pub struct AppState {
    pub resolver: MapPointResolver,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Arc<Self>> {
        let geocoding = &config.geocoding;
        let gateway = NominatimGateway::new(geocoding)?;
        let resolver = MapPointResolver::new(
            Arc::new(GeoCache::new()),
            Arc::new(gateway),
            geocoding.fallback_lat,
            geocoding.fallback_lng,
        );

        Ok(Arc::new(Self { resolver }))
    }
}
