use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    sync::Arc,
    time::{Duration, Instant},
};

use bon::bon;
use tracing::debug;

use crate::{error::ClientError, paths};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub last_successful_request: Option<Instant>,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub last_error: Option<(Instant, String)>,
}

/// CoinMarketCap API client.
///
/// Holds the API key and a reusable HTTP client. Every call performs one live
/// request; nothing is cached between calls.
#[derive(Clone)]
pub struct CoinMarketCap {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) http_client: reqwest::Client,
    total_requests: Arc<AtomicU64>,
    failed_requests: Arc<AtomicU64>,
    last_successful_request: Arc<parking_lot::RwLock<Option<Instant>>>,
    last_error: Arc<parking_lot::RwLock<Option<(Instant, String)>>>,
}

#[bon]
impl CoinMarketCap {
    #[builder]
    pub fn new(
        #[builder(into)] api_key: String,
        #[builder(into, default = paths::BASE_URL.to_string())] base_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(ClientError::MissingCredentials(
                "API key must not be empty".to_string(),
            ));
        }

        let http_client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            api_key,
            base_url,
            http_client,
            total_requests: Arc::new(AtomicU64::new(0)),
            failed_requests: Arc::new(AtomicU64::new(0)),
            last_successful_request: Arc::new(parking_lot::RwLock::new(None)),
            last_error: Arc::new(parking_lot::RwLock::new(None)),
        })
    }
}

impl CoinMarketCap {
    /// Client against the production API with default settings.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().api_key(api_key).build()
    }

    /// Reads the key from `COINMARKETCAP_API_KEY`, loading `.env` first if present.
    ///
    /// This is the only place `.env` is loaded.
    pub fn load_from_env() -> Result<Self, ClientError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }
        let api_key = std::env::var(paths::API_KEY_ENV).map_err(|_| {
            ClientError::MissingCredentials(format!(
                "{} environment variable not set",
                paths::API_KEY_ENV
            ))
        })?;
        Self::with_api_key(api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Record a successful request
    pub(crate) fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_successful_request.write() = Some(Instant::now());
    }

    /// Record a failed request
    pub(crate) fn record_failure(&self, error: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write() = Some((Instant::now(), error.to_string()));
    }

    /// Count a finished call. Only calls that produced a usable value are successes.
    pub(crate) fn record_outcome<T>(&self, outcome: &Result<T, ClientError>) {
        match outcome {
            Ok(_) => self.record_success(),
            Err(e) => self.record_failure(&e.to_string()),
        }
    }

    /// Get current health status
    pub fn health_status(&self) -> HealthStatus {
        HealthStatus {
            last_successful_request: *self.last_successful_request.read(),
            total_requests: self.total_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            last_error: self.last_error.read().clone(),
        }
    }

    /// Reset health metrics
    pub fn reset_health_metrics(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        *self.last_successful_request.write() = None;
        *self.last_error.write() = None;
    }
}

impl fmt::Debug for CoinMarketCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinMarketCap")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
