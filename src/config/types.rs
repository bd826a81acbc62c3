use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the harvesting engine
///
/// Every section has working defaults, so the engine runs without a config
/// file; a TOML file may override any subset of the knobs.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub fetch: FetchConfig,
    pub pacing: PacingConfig,
    pub collector: CollectorConfig,
    pub listing: ListingConfig,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// User agent sent with every request
    pub user_agent: String,

    /// Total attempt budget per fetch (first try included)
    pub max_attempts: u32,

    /// Backoff base; the delay before attempt n+1 is base * n (milliseconds)
    pub backoff_base_ms: u64,

    /// Whole-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
            max_attempts: 3,
            backoff_base_ms: 1000,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Delays inserted between successive outbound requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PacingConfig {
    /// Delay before each listing page after the first (milliseconds)
    pub page_delay_ms: u64,

    /// Delay before each detail-fetch batch (milliseconds)
    pub batch_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: 500,
            batch_delay_ms: 500,
        }
    }
}

impl PacingConfig {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

/// Detail-collection concurrency
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CollectorConfig {
    /// Number of detail fetches run concurrently per batch
    pub batch_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self { batch_size: 5 }
    }
}

/// Listing-site addressing
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListingConfig {
    /// Base URL of the auction site
    pub base_url: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://auctions.yahoo.co.jp".to_string(),
        }
    }
}
