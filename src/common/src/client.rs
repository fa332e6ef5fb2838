//! FPL API client.
//!
//! Wraps the public, unauthenticated JSON endpoints at
//! `https://fantasy.premierleague.com/api`. Responses are cached per endpoint
//! for the configured TTL and real network calls are spaced by a minimum
//! interval. Failed requests are not retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::models::{BootstrapStatic, LiveGameweek, PlayerSummary, RawFixture, RawPlayer, RawTeam};
use crate::Config;

const USER_AGENT: &str = "fpl-analysis/0.1";

pub const BOOTSTRAP_ENDPOINT: &str = "/bootstrap-static/";
pub const FIXTURES_ENDPOINT: &str = "/fixtures/";

pub fn player_summary_endpoint(player_id: u32) -> String {
    format!("/element-summary/{}/", player_id)
}

pub fn live_gameweek_endpoint(gameweek: u32) -> String {
    format!("/event/{}/live/", gameweek)
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned status: {0}")]
    StatusError(u16),
}

#[derive(Debug, Error)]
pub enum FplError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuildError(#[source] TransportError),

    #[error("FPL API request failed for {endpoint}: {source}")]
    FetchError {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to parse response from {endpoint}: {source}")]
    ParseError {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fixture {0} not found")]
    FixtureNotFound(u32),
}

/// Raw HTTP GET returning the response body.
/// Mockable for testing via mockall.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`; non-2xx responses are errors.
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// reqwest-backed transport with a fixed User-Agent and socket timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::StatusError(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Enforces a minimum spacing between network requests.
struct RateLimiter {
    last_request: Option<Instant>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: None,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Snapshot of the cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub cached_endpoints: usize,
    pub endpoints: Vec<String>,
    pub cache_duration: Duration,
}

/// FPL API client with per-instance cache and rate limiter.
pub struct FplClient {
    transport: Box<dyn Transport>,
    base_url: String,
    cache: Mutex<ResponseCache>,
    rate_limiter: Mutex<RateLimiter>,
}

impl FplClient {
    /// Create a client talking HTTP to `config.api_base_url`.
    pub fn new(config: &Config) -> Result<Self, FplError> {
        let transport =
            HttpTransport::new(config.request_timeout()).map_err(FplError::ClientBuildError)?;
        Ok(Self::with_transport(Box::new(transport), config))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            base_url: config.api_base_url.clone(),
            cache: Mutex::new(ResponseCache::new(config.cache_ttl())),
            rate_limiter: Mutex::new(RateLimiter::new(config.min_request_interval())),
        }
    }

    /// Fetch and decode `endpoint`, serving from cache when allowed.
    async fn request<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        use_cache: bool,
    ) -> Result<D, FplError> {
        if use_cache {
            let cached = self.cache.lock().await.get(endpoint);
            if let Some(body) = cached {
                debug!("Cache hit for {}", endpoint);
                return decode(endpoint, &body);
            }
        }

        self.rate_limiter.lock().await.wait().await;

        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let body: Arc<str> = self
            .transport
            .get(&url)
            .await
            .map_err(|source| FplError::FetchError {
                endpoint: endpoint.to_string(),
                source,
            })?
            .into();

        let decoded = decode(endpoint, &body)?;
        if use_cache {
            self.cache.lock().await.insert(endpoint, body);
        }
        Ok(decoded)
    }

    /// Season-wide static data: players, teams, gameweeks.
    pub async fn get_bootstrap_static(&self) -> Result<BootstrapStatic, FplError> {
        self.request(BOOTSTRAP_ENDPOINT, true).await
    }

    /// All fixtures of the season.
    pub async fn get_fixtures(&self) -> Result<Vec<RawFixture>, FplError> {
        self.request(FIXTURES_ENDPOINT, true).await
    }

    /// A single fixture by id.
    pub async fn get_fixture(&self, fixture_id: u32) -> Result<RawFixture, FplError> {
        self.get_fixtures()
            .await?
            .into_iter()
            .find(|f| f.id == fixture_id)
            .ok_or(FplError::FixtureNotFound(fixture_id))
    }

    /// Per-player history and upcoming fixtures.
    pub async fn get_player_summary(&self, player_id: u32) -> Result<PlayerSummary, FplError> {
        self.request(&player_summary_endpoint(player_id), true)
            .await
    }

    /// Live scores for one gameweek. Never cached.
    pub async fn get_live_gameweek(&self, gameweek: u32) -> Result<LiveGameweek, FplError> {
        self.request(&live_gameweek_endpoint(gameweek), false)
            .await
    }

    /// Gameweek flagged as current, `None` before the season starts.
    pub async fn get_current_gameweek(&self) -> Result<Option<u32>, FplError> {
        Ok(self.get_bootstrap_static().await?.current_gameweek())
    }

    /// Gameweek flagged as next, `None` after the last one.
    pub async fn get_next_gameweek(&self) -> Result<Option<u32>, FplError> {
        Ok(self.get_bootstrap_static().await?.next_gameweek())
    }

    pub async fn get_player_by_id(&self, player_id: u32) -> Result<Option<RawPlayer>, FplError> {
        Ok(self
            .get_bootstrap_static()
            .await?
            .elements
            .into_iter()
            .find(|p| p.id == player_id))
    }

    pub async fn get_team_by_id(&self, team_id: u32) -> Result<Option<RawTeam>, FplError> {
        Ok(self
            .get_bootstrap_static()
            .await?
            .teams
            .into_iter()
            .find(|t| t.id == team_id))
    }

    /// Drop every cached response; the next call of each endpoint hits the network.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        info!("Response cache cleared");
    }

    pub async fn cache_info(&self) -> CacheInfo {
        let cache = self.cache.lock().await;
        CacheInfo {
            cached_endpoints: cache.len(),
            endpoints: cache.endpoints(),
            cache_duration: cache.ttl(),
        }
    }
}

fn decode<D: DeserializeOwned>(endpoint: &str, body: &str) -> Result<D, FplError> {
    serde_json::from_str(body).map_err(|source| FplError::ParseError {
        endpoint: endpoint.to_string(),
        source,
    })
}
