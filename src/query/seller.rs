use crate::EngineError;
use std::fmt;
use url::Url;

/// Host the seller page URL must belong to
pub const EXPECTED_HOST: &str = "auctions.yahoo.co.jp";

/// Query parameter carrying the seller identifier
const SELLER_ID_PARAM: &str = "auc_user_id";

/// Opaque seller identifier extracted from a seller page URL
///
/// Can only be constructed through [`extract_seller_id`], so holding one
/// implies the URL passed host and parameter validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerId(String);

impl SellerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the seller identifier from a seller page URL
///
/// The URL must parse, its host must contain the expected auction host, and
/// it must carry a non-empty `auc_user_id` query parameter. Anything else is
/// a validation error, surfaced before any network activity.
pub fn extract_seller_id(seller_url: &str) -> Result<SellerId, EngineError> {
    let url = Url::parse(seller_url)
        .map_err(|e| EngineError::Validation(format!("unparseable URL: {}", e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| EngineError::Validation("URL has no host".to_string()))?;

    if !host.contains(EXPECTED_HOST) {
        return Err(EngineError::Validation(format!(
            "unrecognized host: {}",
            host
        )));
    }

    let seller_id = url
        .query_pairs()
        .find(|(key, _)| key == SELLER_ID_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            EngineError::Validation(format!("missing {} parameter", SELLER_ID_PARAM))
        })?;

    Ok(SellerId(seller_id))
}

/// Whether a URL is a valid seller page URL
pub fn is_valid_seller_url(seller_url: &str) -> bool {
    extract_seller_id(seller_url).is_ok()
}
