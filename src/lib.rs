//! Rakusatsu: a closed-auction sale harvester
//!
//! This crate implements an engine that collects every closed-auction sale
//! record for a given seller from a paginated listing site, extracts item
//! data embedded in the detail pages' inline script payloads, and reports
//! price statistics over an ordered progress-event stream.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod events;
pub mod extract;
pub mod output;
pub mod query;

use thiserror::Error;

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid seller URL: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors surfaced by a single page fetch
///
/// `NotFound` is terminal and never retried. Everything else is treated as
/// transient and retried up to the configured attempt budget; the last error
/// propagates once the budget is exhausted.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not found (HTTP 404): {url}")]
    NotFound { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether the retry loop may attempt this fetch again
    pub fn is_transient(&self) -> bool {
        !matches!(self, FetchError::NotFound { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use events::{EventSink, ProgressEvent, SearchOutcome};
pub use extract::AuctionRecord;
pub use output::stats::PriceStatistics;
pub use query::{SearchQuery, SellerId};
