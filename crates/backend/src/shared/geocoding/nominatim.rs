use async_trait::async_trait;
use serde::Deserialize;

use super::{GeoPoint, GeocodingGateway};
use crate::shared::config::GeocodingConfig;

/// HTTP client for a Nominatim-compatible `/search` endpoint
pub struct NominatimGateway {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGateway {
    pub fn new(config: &GeocodingConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
        })
    }
}

#[async_trait]
impl GeocodingGateway for NominatimGateway {
    async fn lookup_postal_code(&self, postal_code: &str) -> anyhow::Result<Option<GeoPoint>> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!("Geocoding postal code {} via {}", postal_code, url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("postalcode", postal_code),
                ("countrycodes", self.country_code.as_str()),
                ("format", "json"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Geocoding request failed with status {}: {}", status, body);
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat: f64 = place
            .lat
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid latitude '{}': {}", place.lat, e))?;
        let lng: f64 = place
            .lon
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid longitude '{}': {}", place.lon, e))?;

        Ok(Some(GeoPoint {
            key: postal_code.to_string(),
            lat,
            lng,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway_for(server: &mockito::ServerGuard) -> NominatimGateway {
        NominatimGateway::new(&GeocodingConfig {
            endpoint: format!("{}/", server.url()),
            user_agent: "cechlo-test".into(),
            ..GeocodingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_lookup_parses_first_place() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("postalcode".into(), "11000".into()),
                Matcher::UrlEncoded("countrycodes".into(), "cz".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
            ]))
            .match_header("user-agent", "cechlo-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat":"50.0875","lon":"14.4213","display_name":"Praha"}]"#)
            .create_async()
            .await;

        let point = gateway_for(&server)
            .lookup_postal_code("11000")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(point.key, "11000");
        assert!((point.lat - 50.0875).abs() < 1e-9);
        assert!((point.lng - 14.4213).abs() < 1e-9);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_result_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let result = gateway_for(&server).lookup_postal_code("99999").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_err() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let result = gateway_for(&server).lookup_postal_code("11000").await;
        assert!(result.is_err());
    }
}
