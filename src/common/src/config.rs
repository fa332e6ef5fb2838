//! Configuration loading from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Public FPL API root.
pub const DEFAULT_API_URL: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// FPL API base URL (no trailing slash)
    pub api_base_url: String,

    /// How long a cached response stays fresh, in seconds
    pub cache_ttl_secs: u64,

    /// Minimum spacing between two network requests, in milliseconds
    pub min_request_interval_ms: u64,

    /// Per-request socket timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            cache_ttl_secs: 300,
            min_request_interval_ms: 1000,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional variables (with defaults):
    /// - FPL_API_URL: API base URL
    /// - FPL_CACHE_TTL_SECS: Cache time-to-live (default: 300)
    /// - FPL_MIN_REQUEST_INTERVAL_MS: Request spacing (default: 1000)
    /// - FPL_REQUEST_TIMEOUT_SECS: Socket timeout (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Load configuration from environment variables only (no .env file).
    /// Useful for testing.
    pub fn from_env_only() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = match env::var("FPL_API_URL") {
            Ok(raw) => normalize_base_url(&raw)?,
            Err(_) => defaults.api_base_url,
        };

        Ok(Self {
            api_base_url,
            cache_ttl_secs: parse_var("FPL_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            min_request_interval_ms: parse_var(
                "FPL_MIN_REQUEST_INTERVAL_MS",
                defaults.min_request_interval_ms,
            )?,
            request_timeout_secs: parse_var(
                "FPL_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var(var: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Endpoints are joined as `{base}{endpoint}` with endpoints starting at `/`.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "FPL_API_URL",
        "FPL_CACHE_TTL_SECS",
        "FPL_MIN_REQUEST_INTERVAL_MS",
        "FPL_REQUEST_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_with_defaults() {
        clear_env();

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.api_base_url, "https://fantasy.premierleague.com/api");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.min_request_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_config_overrides_from_env() {
        clear_env();
        env::set_var("FPL_API_URL", "http://localhost:8080/api/");
        env::set_var("FPL_CACHE_TTL_SECS", "60");
        env::set_var("FPL_MIN_REQUEST_INTERVAL_MS", "250");

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.min_request_interval_ms, 250);
        assert_eq!(config.request_timeout_secs, 10);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_rejects_non_numeric_ttl() {
        clear_env();
        env::set_var("FPL_CACHE_TTL_SECS", "five minutes");

        let result = Config::from_env_only();
        if let Err(ConfigError::InvalidValue { var, value }) = result {
            assert_eq!(var, "FPL_CACHE_TTL_SECS");
            assert_eq!(value, "five minutes");
        } else {
            panic!("Expected InvalidValue error");
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_rejects_bad_url() {
        clear_env();
        env::set_var("FPL_API_URL", "not a url");
        assert!(matches!(
            Config::from_env_only(),
            Err(ConfigError::InvalidUrl(_))
        ));

        env::set_var("FPL_API_URL", "ftp://fantasy.premierleague.com/api");
        assert!(matches!(
            Config::from_env_only(),
            Err(ConfigError::InvalidUrl(_))
        ));

        clear_env();
    }
}
