//! Bounded-parallel detail collection
//!
//! Candidate URLs are split into fixed-size batches. Batches run strictly
//! sequentially with a pacing delay in front of each one; within a batch all
//! detail fetches run concurrently with an explicit join barrier. Completion
//! updates flow back through the controller task, so the completed counter
//! and the accumulator need no locking.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::events::{EventSink, ProgressEvent};
use crate::extract::{extract_record, AuctionRecord};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Collects detail records for the given URLs
///
/// Progress is reported per item as each extraction finishes, regardless of
/// batch boundaries; first-to-finish reports first. A fetch failure on one
/// URL drops that item and never aborts the batch or the run.
pub async fn collect_details(
    fetcher: &Fetcher,
    urls: &[String],
    config: &Config,
    sink: &EventSink,
    cancel: &CancellationToken,
) -> Vec<AuctionRecord> {
    let total = urls.len();
    let mut records = Vec::new();
    let mut completed = 0usize;

    for batch in urls.chunks(config.collector.batch_size) {
        if cancel.is_cancelled() {
            tracing::info!(completed, total, "collection cancelled, no new batches");
            break;
        }

        tokio::time::sleep(config.pacing.batch_delay()).await;

        let mut tasks = JoinSet::new();
        for url in batch {
            let fetcher = fetcher.clone();
            let url = url.clone();
            tasks.spawn(async move {
                let outcome = extract_record(&fetcher, &url).await;
                (url, outcome)
            });
        }

        // Join barrier: drain every task in the batch, counting each URL as
        // completed whether it produced a record, a skip, or an error.
        while let Some(joined) = tasks.join_next().await {
            completed += 1;

            match joined {
                Ok((_, Ok(Some(record)))) => records.push(record),
                Ok((url, Ok(None))) => {
                    tracing::debug!(%url, "no closed-sale record on detail page");
                }
                Ok((url, Err(error))) => {
                    tracing::warn!(%url, error = %error, "detail fetch failed, item dropped");
                }
                Err(join_error) => {
                    tracing::warn!(error = %join_error, "detail task aborted");
                }
            }

            sink.emit(ProgressEvent::progress(completed, total));
            tracing::debug!(completed, total, "detail progress");
        }
    }

    records
}
