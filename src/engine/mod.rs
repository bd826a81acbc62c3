//! Search orchestration
//!
//! Drives one search end to end: validate the seller URL, harvest candidate
//! URLs, filter and cap them, collect detail records in paced batches, and
//! close the event stream with exactly one terminal event.

use crate::config::Config;
use crate::crawler::{collect_details, harvest_candidates, Fetcher};
use crate::events::{EventSink, ProgressEvent, SearchOutcome};
use crate::extract::AuctionRecord;
use crate::output::compute_statistics;
use crate::query::{extract_seller_id, SearchQuery};
use crate::{EngineError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::cmp::Reverse;
use tokio_util::sync::CancellationToken;

/// Runs a search, emitting progress events through the sink
///
/// Validation failures (bad seller URL) return an error before any network
/// activity and before any event is emitted, so the transport layer can
/// distinguish an invalid request from a seller with zero items. Everything
/// past validation reports through the event stream: operational failures
/// become a single terminal `Error` event and the function still returns
/// `Ok`. A cancelled run stops promptly and ends without a terminal event.
pub async fn run_search(
    query: &SearchQuery,
    config: &Config,
    sink: &EventSink,
    cancel: &CancellationToken,
) -> Result<()> {
    let seller_id = extract_seller_id(&query.seller_url)?;
    let fetcher = Fetcher::new(&config.fetch)?;

    tracing::info!(seller = %seller_id, keyword = %query.keyword, "starting search");
    sink.emit(ProgressEvent::Status {
        message: "collecting candidate item URLs".to_string(),
    });

    let candidates =
        match harvest_candidates(&fetcher, config, &seller_id, &query.keyword, cancel).await {
            Ok(urls) => urls,
            Err(error) => {
                tracing::error!(error = %error, "listing harvest failed");
                sink.emit(ProgressEvent::Error {
                    error: "failed to collect the seller's listing".to_string(),
                    details: error.to_string(),
                });
                return Ok(());
            }
        };

    if cancel.is_cancelled() {
        return Ok(());
    }

    if candidates.is_empty() {
        sink.emit(ProgressEvent::Complete {
            data: SearchOutcome {
                items: Vec::new(),
                total_count: 0,
                statistics: None,
            },
        });
        return Ok(());
    }

    let mut urls = candidates;
    if let Some(limit) = query.effective_limit() {
        urls.truncate(limit);
    }

    sink.emit(ProgressEvent::Total {
        total: urls.len(),
        message: format!("fetching {} item details", urls.len()),
    });

    let mut records = collect_details(&fetcher, &urls, config, sink, cancel).await;

    if cancel.is_cancelled() {
        tracing::info!("search cancelled before completion");
        return Ok(());
    }

    let prices: Vec<u64> = records.iter().map(|record| record.price).collect();
    let statistics = compute_statistics(&prices);

    sort_by_end_time_desc(&mut records);

    let total_count = records.len();
    tracing::info!(total_count, "search complete");
    sink.emit(ProgressEvent::Complete {
        data: SearchOutcome {
            items: records,
            total_count,
            statistics,
        },
    });

    Ok(())
}

/// Convenience wrapper that converts every failure into a terminal event
///
/// Used by transports that want the stream itself to carry validation
/// errors too, rather than handling a returned error separately.
pub async fn run_search_with_error_events(
    query: &SearchQuery,
    config: &Config,
    sink: &EventSink,
    cancel: &CancellationToken,
) {
    if let Err(error) = run_search(query, config, sink, cancel).await {
        let (message, details) = match &error {
            EngineError::Validation(detail) => {
                ("invalid seller URL".to_string(), detail.clone())
            }
            other => ("search failed unexpectedly".to_string(), other.to_string()),
        };
        sink.emit(ProgressEvent::Error {
            error: message,
            details,
        });
    }
}

/// Sorts newest-ending first; unparseable end times sort last in discovery
/// order
fn sort_by_end_time_desc(records: &mut [AuctionRecord]) {
    records.sort_by_cached_key(|record| Reverse(parse_end_time(&record.end_time)));
}

/// Parses the payload's end-time string, tolerating the formats the site
/// has used
fn parse_end_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
