use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

/// Resolved coordinates of a normalized postal code
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub key: String,
    pub lat: f64,
    pub lng: f64,
}

/// Strips all whitespace: "110 00" and "11000" share one key.
/// Returns `None` for blank input.
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    let key: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Process-lifetime memo of postal code lookups.
///
/// Append-only: no TTL and no invalidation. The key space (postal codes of one
/// country) is small and finite, so unbounded growth is accepted.
#[derive(Debug, Default)]
pub struct GeoCache {
    points: RwLock<HashMap<String, GeoPoint>>,
}

impl GeoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<GeoPoint> {
        let points = self.points.read().unwrap_or_else(|e| e.into_inner());
        points.get(key).cloned()
    }

    pub fn insert(&self, point: GeoPoint) {
        let mut points = self.points.write().unwrap_or_else(|e| e.into_inner());
        points.insert(point.key.clone(), point);
    }

    pub fn len(&self) -> usize {
        self.points.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_postal_code() {
        assert_eq!(normalize_postal_code("110 00"), Some("11000".into()));
        assert_eq!(normalize_postal_code(" 11000\t"), Some("11000".into()));
        assert_eq!(normalize_postal_code("   "), None);
        assert_eq!(normalize_postal_code(""), None);
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = GeoCache::new();
        assert!(cache.is_empty());

        cache.insert(GeoPoint {
            key: "11000".into(),
            lat: 50.08,
            lng: 14.42,
        });

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("11000").map(|p| p.lat), Some(50.08));
        assert!(cache.get("41108").is_none());
    }
}
