//! Listing harvester
//!
//! Walks a seller's paginated closed-item listing in strict page order,
//! harvesting candidate detail URLs with best-effort titles. Page count is
//! discovered from page 1; pages 2..N are fetched sequentially, each gated
//! by the pacing delay, trading throughput for politeness toward the site.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::query::{matches_keyword, SellerId};
use crate::FetchError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;

/// Items per listing page, used by the total-count fallback
///
/// Best-effort heuristic; the page does not state its own size.
const LISTING_PAGE_SIZE: u64 = 25;

/// Path fragment identifying an item detail link
const ITEM_PATH_FRAGMENT: &str = "/jp/auction/";

/// A harvested (URL, provisional title) pair prior to detail verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    /// Absolute detail URL with the query string stripped
    pub url: String,

    /// Title text from the listing page; may be empty
    pub title: String,
}

fn total_pages_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)ページ中").unwrap())
}

fn total_items_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"合計[：:]\s*(\d+)\s*件").unwrap())
}

/// Builds the listing page URL for a seller and 1-based page number
pub fn listing_page_url(base_url: &str, seller_id: &SellerId, page: u32) -> String {
    format!(
        "{}/jp/show/rating?auc_user_id={}&role=seller&apg={}",
        base_url.trim_end_matches('/'),
        seller_id,
        page
    )
}

/// Harvests candidate detail URLs across the seller's whole listing
///
/// Fetch failures here are fatal to the operation and propagate. The result
/// is keyword-filtered and deduplicated by URL, first occurrence winning.
pub async fn harvest_candidates(
    fetcher: &Fetcher,
    config: &Config,
    seller_id: &SellerId,
    keyword: &str,
    cancel: &CancellationToken,
) -> Result<Vec<String>, FetchError> {
    let base_url = &config.listing.base_url;

    let first_page = fetcher
        .fetch_page(&listing_page_url(base_url, seller_id, 1))
        .await?;

    let total_pages = parse_total_pages(&first_page);
    tracing::info!(total_pages, seller = %seller_id, "discovered listing size");

    let mut all_items = extract_candidates(&first_page, base_url);

    for page in 2..=total_pages {
        if cancel.is_cancelled() {
            tracing::info!(page, "harvest cancelled, stopping page walk");
            break;
        }

        tokio::time::sleep(config.pacing.page_delay()).await;

        let html = fetcher
            .fetch_page(&listing_page_url(base_url, seller_id, page))
            .await?;
        let items = extract_candidates(&html, base_url);
        tracing::info!(page, total_pages, count = items.len(), "fetched listing page");
        all_items.extend(items);
    }

    Ok(filter_and_dedup(all_items, keyword))
}

/// Applies the keyword filter to titles, then deduplicates URLs in order
pub fn filter_and_dedup(items: Vec<CandidateItem>, keyword: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| matches_keyword(&item.title, keyword))
        .filter(|item| seen.insert(item.url.clone()))
        .map(|item| item.url)
        .collect()
}

/// Parses the total page count from listing page text
///
/// Primary pattern is the "<N>ページ中" pager text; the fallback derives the
/// count from the "合計：<N>件" total, assuming the fixed page size. Neither
/// pattern present means a single page.
pub fn parse_total_pages(html: &str) -> u32 {
    let text = body_text(html);

    if let Some(captures) = total_pages_regex().captures(&text) {
        if let Ok(pages) = captures[1].parse() {
            return pages;
        }
    }

    if let Some(captures) = total_items_regex().captures(&text) {
        if let Ok(total_items) = captures[1].parse::<u64>() {
            return total_items.div_ceil(LISTING_PAGE_SIZE) as u32;
        }
    }

    tracing::debug!("no page count found on listing page, assuming 1");
    1
}

fn body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default()
}

/// Extracts candidate items from one listing page
///
/// Scans anchors whose href matches the item-URL shape; hrefs are made
/// absolute against the base URL and query-stripped. The title comes from
/// the anchor's own text, falling back to a title-bearing element in the
/// nearest row/item container when the anchor text is empty.
pub fn extract_candidates(html: &str, base_url: &str) -> Vec<CandidateItem> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(&format!(r#"a[href*="{}"]"#, ITEM_PATH_FRAGMENT)) else {
        return Vec::new();
    };

    let mut items = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let absolute = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), href)
        };

        // Query strings carry per-view tracking state, not identity
        let clean_url = absolute
            .split(['?', '#'])
            .next()
            .unwrap_or(&absolute)
            .to_string();

        let mut title = anchor.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            title = container_title(anchor).unwrap_or_default();
        }

        items.push(CandidateItem {
            url: clean_url,
            title,
        });
    }

    items
}

/// Looks for a recognizable title element in the anchor's closest container
fn container_title(anchor: ElementRef) -> Option<String> {
    let title_selector =
        Selector::parse(r#".ProductName, .product-name, [class*="title"]"#).ok()?;

    for node in anchor.ancestors() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        let name = element.value().name();
        if name == "tr" || name == "li" || name == "div" {
            return element
                .select(&title_selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty());
        }
    }

    None
}
