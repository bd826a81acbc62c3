//! Inline-script payload extraction strategies
//!
//! Detail pages have shipped at least three different embeddings of the item
//! data over time. Each strategy is a pure function over the parsed document
//! returning the item payload as untyped JSON; a parse failure in one
//! strategy falls through to the next.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

/// JSON pointer to the item payload inside a hydration document
const HYDRATION_ITEM_PATH: &str = "/props/pageProps/initialState/item/detail/item";

fn page_data_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Non-greedy up to the first top-level statement boundary; a greedy
    // match would swallow any trailing statements in the same script.
    RE.get_or_init(|| Regex::new(r"(?s)var pageData\s*=\s*(\{.*?\});").unwrap())
}

fn hydration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)__NEXT_DATA__\s*=\s*(\{.+?\});?\s*$").unwrap())
}

/// Runs the strategies in priority order and returns the first item payload
pub fn find_item_payload(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);

    assigned_object_payload(&document)
        .or_else(|| hydration_payload(&document))
        .or_else(|| json_element_payload(&document))
}

/// Strategy 1: `var pageData = {...};` with the item under `items`
fn assigned_object_payload(document: &Html) -> Option<Value> {
    for content in inline_scripts(document) {
        if !content.contains("var pageData") {
            continue;
        }

        let Some(captures) = page_data_regex().captures(&content) else {
            continue;
        };

        match serde_json::from_str::<Value>(&captures[1]) {
            Ok(page_data) => {
                if let Some(item) = page_data.get("items") {
                    return Some(item.clone());
                }
            }
            Err(e) => tracing::debug!(error = %e, "pageData did not parse as JSON"),
        }
    }
    None
}

/// Strategy 2: `__NEXT_DATA__ = {...}` assignment in an inline script
fn hydration_payload(document: &Html) -> Option<Value> {
    for content in inline_scripts(document) {
        if !content.contains("__NEXT_DATA__") {
            continue;
        }

        let Some(captures) = hydration_regex().captures(content.trim_end()) else {
            continue;
        };

        if let Ok(data) = serde_json::from_str::<Value>(&captures[1]) {
            if let Some(item) = data.pointer(HYDRATION_ITEM_PATH) {
                return Some(item.clone());
            }
        }
    }
    None
}

/// Strategy 3: a `<script id="__NEXT_DATA__">` element whose body is JSON
fn json_element_payload(document: &Html) -> Option<Value> {
    let selector = Selector::parse(r#"script[id="__NEXT_DATA__"]"#).ok()?;

    for element in document.select(&selector) {
        let content = element.text().collect::<String>();
        if let Ok(data) = serde_json::from_str::<Value>(&content) {
            if let Some(item) = data.pointer(HYDRATION_ITEM_PATH) {
                return Some(item.clone());
            }
        }
    }
    None
}

/// Collects the text of every inline (src-less) script in document order
fn inline_scripts(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("script") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|el| el.value().attr("src").is_none())
        .map(|el: ElementRef| el.text().collect::<String>())
        .collect()
}
