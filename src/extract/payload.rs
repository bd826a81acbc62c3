//! Normalization of the untyped item payload
//!
//! The embedded payloads are loosely typed: field names vary in casing,
//! prices arrive as numbers or strings, and the status field may be absent
//! entirely. Normalization flattens all of that into one struct before any
//! acceptance decision is made.

use serde_json::Value;

/// Status value denoting a finished sale
const CLOSED_STATUS: &str = "closed";

/// An item payload after field normalization
#[derive(Debug, Clone, PartialEq)]
pub struct ItemPayload {
    pub title: String,
    pub price: u64,
    pub end_time: String,

    /// Raw status field; `None` when the payload carries no status signal
    pub status: Option<String>,
}

impl ItemPayload {
    /// A payload with no status signal is implicitly closed; any explicit
    /// status other than "closed" disqualifies the item.
    pub fn is_closed(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| status == CLOSED_STATUS)
    }
}

/// Normalizes an extracted item payload
///
/// Title prefers `productName` over `title`; end time prefers `endTime`
/// over `endtime`; price parses leading digits and defaults to 0.
pub fn normalize_item(item: &Value) -> ItemPayload {
    ItemPayload {
        title: first_non_empty(item, &["productName", "title"]),
        price: item.get("price").map(parse_price).unwrap_or(0),
        end_time: first_non_empty(item, &["endTime", "endtime"]),
        status: item
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

fn first_non_empty(item: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

/// Integer-parses a price that may be a JSON number or a numeric string
///
/// String parsing takes the leading digit run, so "1500円" still yields
/// 1500. Anything unparseable (or negative) is 0.
fn parse_price(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}
