//! Inbound search query handling
//!
//! Seller-identifier extraction from the seller page URL and the keyword
//! predicate applied to harvested listing titles.

pub mod keyword;
pub mod seller;

pub use keyword::matches_keyword;
pub use seller::{extract_seller_id, is_valid_seller_url, SellerId};

/// A search request as received from the transport layer
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Seller page URL; must carry the expected host and query parameter
    pub seller_url: String,

    /// Keyword filter over listing titles; empty means match-all
    pub keyword: String,

    /// Cap on the number of detail fetches after filtering
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// The effective detail-fetch cap; a non-positive limit means no cap
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|n| *n > 0)
    }
}
