//! HTTP fetcher with retry and backoff
//!
//! All page fetches go through here: a single GET per attempt with a fixed
//! user agent, a 404 short-circuit, and an explicit retry state machine for
//! transient failures. There is no caching; every call hits the network.

use crate::config::FetchConfig;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Retry budget and backoff shape for transient fetch failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    pub max_attempts: u32,

    /// Backoff base; the wait after attempt n is `base * n`
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Backoff before the attempt following attempt `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Decides what the retry loop does after a failed attempt
    pub fn next_step(&self, attempt: u32, error: &FetchError) -> RetryStep {
        if !error.is_transient() || attempt >= self.max_attempts {
            RetryStep::Fail
        } else {
            RetryStep::Backoff(self.backoff_delay(attempt))
        }
    }
}

/// Outcome of classifying a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Wait this long, then try again
    Backoff(Duration),

    /// Budget exhausted or error not retryable; propagate
    Fail,
}

/// Issues page fetches through one shared HTTP client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Fetches a page body as text, retrying transient failures
    ///
    /// A 404 response propagates immediately and is never retried. Any other
    /// non-success status or transport error is retried with linear-base
    /// exponential backoff (`base * attempt`) until the attempt budget is
    /// spent, after which the last error propagates.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;

        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(error) => match self.policy.next_step(attempt, &error) {
                    RetryStep::Backoff(delay) => {
                        tracing::debug!(
                            %url,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "fetch failed, backing off"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryStep::Fail => return Err(error),
                },
            }
        }
    }

    /// One GET attempt, with errors classified for the retry loop
    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

/// Builds the HTTP client shared by all fetches
fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}
