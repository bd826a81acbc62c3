//! Detail-page extraction
//!
//! A detail page embeds its item data in one of several inline-script
//! shapes. Extraction runs a prioritized list of strategies, each a pure
//! function from document to optional payload; the first hit wins, and a
//! page where nothing matches yields no record rather than an error.

mod payload;
mod strategies;

pub use payload::{normalize_item, ItemPayload};
pub use strategies::find_item_payload;

use crate::crawler::fetcher::Fetcher;
use crate::FetchError;
use serde::Serialize;

/// A normalized, verified closed-sale record
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRecord {
    /// Derived from the last path segment of the detail URL
    pub id: String,

    pub title: String,

    /// Final sale price; 0 when the payload's price did not parse
    pub price: u64,

    /// Raw end-time string as found in the payload
    pub end_time: String,

    /// Detail page URL
    pub url: String,
}

/// Fetches a detail page and extracts its closed-sale record
///
/// Fetch failures propagate (the caller decides whether they are fatal);
/// extraction failures and non-closed items yield `Ok(None)`.
pub async fn extract_record(
    fetcher: &Fetcher,
    url: &str,
) -> Result<Option<AuctionRecord>, FetchError> {
    let html = fetcher.fetch_page(url).await?;
    Ok(extract_from_html(&html, url))
}

/// Runs the extraction strategies over already-fetched HTML
pub fn extract_from_html(html: &str, url: &str) -> Option<AuctionRecord> {
    let payload = match find_item_payload(html) {
        Some(p) => p,
        None => {
            tracing::debug!(%url, "no item payload found in page");
            return None;
        }
    };

    let item = normalize_item(&payload);
    if !item.is_closed() {
        tracing::debug!(%url, status = ?item.status, "item is not closed, skipping");
        return None;
    }

    Some(AuctionRecord {
        id: item_id_from_url(url),
        title: item.title,
        price: item.price,
        end_time: item.end_time,
        url: url.to_string(),
    })
}

/// The last path segment of a detail URL identifies the auction
fn item_id_from_url(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}
