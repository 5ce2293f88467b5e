//! Postal code geocoding for the dashboard map.
//!
//! [`MapPointResolver`] turns entities carrying a postal code into map points.
//! Lookups go through a [`GeocodingGateway`] and are memoized in a [`GeoCache`]
//! that lives as long as the process.

pub mod cache;
pub mod gateway;
pub mod nominatim;
pub mod resolver;

pub use cache::{normalize_postal_code, GeoCache, GeoPoint};
pub use gateway::GeocodingGateway;
pub use nominatim::NominatimGateway;
pub use resolver::{Geolocated, Located, MapPointResolver};
