use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible service
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    /// ISO 3166-1 alpha-2 code lookups are restricted to
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Nominatim's usage policy requires an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Marker position for units whose postal code is missing or unresolved
    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,
    #[serde(default = "default_fallback_lng")]
    pub fallback_lng: f64,
    /// No timeout beyond the HTTP client default when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            country_code: default_country_code(),
            user_agent: default_user_agent(),
            fallback_lat: default_fallback_lat(),
            fallback_lng: default_fallback_lng(),
            timeout_secs: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    3000
}

fn default_geocoding_endpoint() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_country_code() -> String {
    "cz".into()
}

fn default_user_agent() -> String {
    concat!("cechlo-inventory/", env!("CARGO_PKG_VERSION")).into()
}

// Geographic centre of the Czech Republic
fn default_fallback_lat() -> f64 {
    49.8175
}

fn default_fallback_lng() -> f64 {
    15.4730
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/cechlo.db"

[server]
host = "0.0.0.0"
port = 3000

[geocoding]
endpoint = "https://nominatim.openstreetmap.org"
country_code = "cz"
"#;

const CONFIG_ENV_VAR: &str = "CECHLO_CONFIG";

/// Load configuration from config.toml
///
/// Search order:
/// 1. Path in the `CECHLO_CONFIG` environment variable
/// 2. Next to the executable (for production)
/// 3. Current directory (for development)
/// 4. Embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        tracing::info!("Loading config from {}: {}", CONFIG_ENV_VAR, path);
        return read_config(Path::new(&path));
    }

    for candidate in candidate_paths() {
        if candidate.exists() {
            tracing::info!("Loading config from: {}", candidate.display());
            return read_config(&candidate);
        }
        tracing::debug!("config.toml not found at: {}", candidate.display());
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("config.toml"));
        }
    }
    paths.push(PathBuf::from("config.toml"));
    paths
}

fn read_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
    parse_config(&contents)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    Ok(toml::from_str(contents)?)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    PathBuf::from(&config.database.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/cechlo.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.geocoding.country_code, "cz");
        assert_eq!(config.geocoding.timeout_secs, None);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[database]\npath = \"/tmp/x.db\"\n").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.geocoding.endpoint,
            "https://nominatim.openstreetmap.org"
        );
        assert!((config.geocoding.fallback_lat - 49.8175).abs() < f64::EPSILON);
        assert!(config.geocoding.user_agent.starts_with("cechlo-inventory/"));
    }

    #[test]
    fn test_absolute_database_path_is_kept() {
        let config = parse_config("[database]\npath = \"/var/lib/cechlo.db\"\n").unwrap();
        assert_eq!(get_database_path(&config), PathBuf::from("/var/lib/cechlo.db"));
    }

    #[test]
    fn test_missing_database_section_fails() {
        assert!(parse_config("[server]\nport = 8080\n").is_err());
    }
}
