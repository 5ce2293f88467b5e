use std::collections::HashSet;
use std::sync::Arc;

use super::{normalize_postal_code, GeoCache, GeoPoint, GeocodingGateway};

/// Anything that can be placed on the map by its postal code
pub trait Geolocated {
    fn postal_code(&self) -> Option<&str>;
}

/// An entity with the point it is drawn at
#[derive(Debug, Clone)]
pub struct Located<T> {
    pub item: T,
    pub point: GeoPoint,
    /// `false` when `point` is the fallback coordinate
    pub resolved: bool,
}

/// Resolves postal codes to coordinates with at most one external request per
/// distinct normalized key for the lifetime of the injected cache.
///
/// Lookups run one at a time, in first-seen order, which keeps outbound
/// concurrency to the geocoding service at 1. Failed lookups are logged and not
/// cached; the item gets the fallback point.
pub struct MapPointResolver {
    cache: Arc<GeoCache>,
    gateway: Arc<dyn GeocodingGateway>,
    fallback_lat: f64,
    fallback_lng: f64,
}

impl MapPointResolver {
    pub fn new(
        cache: Arc<GeoCache>,
        gateway: Arc<dyn GeocodingGateway>,
        fallback_lat: f64,
        fallback_lng: f64,
    ) -> Self {
        Self {
            cache,
            gateway,
            fallback_lat,
            fallback_lng,
        }
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    pub async fn resolve<T: Geolocated>(&self, items: Vec<T>) -> Vec<Located<T>> {
        let keys = distinct_keys(&items);
        let mut requested = 0usize;

        for key in &keys {
            if self.cache.get(key).is_some() {
                continue;
            }
            requested += 1;
            self.lookup(key).await;
        }

        tracing::debug!(
            "Resolved {} items: {} distinct postal codes, {} external lookups",
            items.len(),
            keys.len(),
            requested
        );

        items.into_iter().map(|item| self.attach(item)).collect()
    }

    async fn lookup(&self, key: &str) {
        match self.gateway.lookup_postal_code(key).await {
            Ok(Some(point)) => {
                self.cache.insert(GeoPoint {
                    key: key.to_string(),
                    ..point
                });
            }
            Ok(None) => {
                tracing::warn!("Geocoding found no place for postal code {}", key);
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for postal code {}: {:#}", key, e);
            }
        }
    }

    fn attach<T: Geolocated>(&self, item: T) -> Located<T> {
        let key = item.postal_code().and_then(normalize_postal_code);

        match key.as_deref().and_then(|k| self.cache.get(k)) {
            Some(point) => Located {
                item,
                point,
                resolved: true,
            },
            None => Located {
                point: GeoPoint {
                    key: key.unwrap_or_default(),
                    lat: self.fallback_lat,
                    lng: self.fallback_lng,
                },
                item,
                resolved: false,
            },
        }
    }
}

/// Normalized postal codes in order of first occurrence, without repeats
pub fn distinct_keys<T: Geolocated>(items: &[T]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| item.postal_code().and_then(normalize_postal_code))
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct Site(Option<&'static str>);

    impl Geolocated for Site {
        fn postal_code(&self) -> Option<&str> {
            self.0
        }
    }

    /// Gateway answering from a fixed table and recording every request
    #[derive(Default)]
    struct FakeGateway {
        places: HashMap<&'static str, (f64, f64)>,
        failing: HashSet<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        fn with_place(mut self, key: &'static str, lat: f64, lng: f64) -> Self {
            self.places.insert(key, (lat, lng));
            self
        }

        fn failing_on(mut self, key: &'static str) -> Self {
            self.failing.insert(key);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeocodingGateway for FakeGateway {
        async fn lookup_postal_code(&self, postal_code: &str) -> anyhow::Result<Option<GeoPoint>> {
            self.calls.lock().unwrap().push(postal_code.to_string());
            if self.failing.contains(postal_code) {
                anyhow::bail!("service unavailable");
            }
            Ok(self.places.get(postal_code).map(|&(lat, lng)| GeoPoint {
                key: postal_code.to_string(),
                lat,
                lng,
            }))
        }
    }

    const FALLBACK: (f64, f64) = (49.8175, 15.4730);

    fn resolver(gateway: Arc<FakeGateway>) -> MapPointResolver {
        MapPointResolver::new(Arc::new(GeoCache::new()), gateway, FALLBACK.0, FALLBACK.1)
    }

    #[tokio::test]
    async fn test_same_normalized_code_is_looked_up_once() {
        let gateway = Arc::new(FakeGateway::default().with_place("11000", 50.08, 14.42));
        let resolver = resolver(gateway.clone());

        let located = resolver
            .resolve(vec![Site(Some("110 00")), Site(Some("11000"))])
            .await;

        assert_eq!(gateway.calls(), vec!["11000".to_string()]);
        assert!(located.iter().all(|l| l.resolved));
        assert_eq!(located[0].point, located[1].point);
        assert_eq!(located[0].point.key, "11000");
    }

    #[tokio::test]
    async fn test_missing_or_failed_code_gets_fallback() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with_place("41108", 50.452, 14.374)
                .failing_on("53401"),
        );
        let resolver = resolver(gateway.clone());

        let located = resolver
            .resolve(vec![
                Site(None),
                Site(Some("534 01")),
                Site(Some("99999")),
                Site(Some("411 08")),
            ])
            .await;

        assert_eq!(located.len(), 4);
        for unresolved in &located[..3] {
            assert!(!unresolved.resolved);
            assert_eq!((unresolved.point.lat, unresolved.point.lng), FALLBACK);
        }
        assert!(located[3].resolved);
        assert_eq!(located[3].point.lat, 50.452);
        assert_eq!(located[1].point.key, "53401");
    }

    #[tokio::test]
    async fn test_lookups_follow_first_seen_order() {
        let gateway = Arc::new(FakeGateway::default());
        let resolver = resolver(gateway.clone());

        resolver
            .resolve(vec![
                Site(Some("400 01")),
                Site(Some("110 00")),
                Site(Some("40001")),
                Site(Some("386 01")),
            ])
            .await;

        assert_eq!(gateway.calls(), vec!["40001", "11000", "38601"]);
    }

    #[tokio::test]
    async fn test_cache_survives_across_batches() {
        let gateway = Arc::new(FakeGateway::default().with_place("11000", 50.08, 14.42));
        let resolver = resolver(gateway.clone());

        resolver.resolve(vec![Site(Some("11000"))]).await;
        let second = resolver.resolve(vec![Site(Some("110 00"))]).await;

        assert_eq!(gateway.calls().len(), 1);
        assert!(second[0].resolved);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let gateway = Arc::new(FakeGateway::default().failing_on("11000"));
        let resolver = resolver(gateway.clone());

        resolver.resolve(vec![Site(Some("11000"))]).await;
        resolver.resolve(vec![Site(Some("11000"))]).await;

        assert_eq!(gateway.calls().len(), 2);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_distinct_keys_skips_blank() {
        let keys = distinct_keys(&[Site(Some("  ")), Site(None), Site(Some("1 2 3"))]);
        assert_eq!(keys, vec!["123".to_string()]);
    }
}
