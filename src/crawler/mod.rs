//! Harvesting pipeline
//!
//! This module contains the network-facing half of the engine:
//! - Fetching pages with retry and backoff
//! - Walking a seller's paginated listing and harvesting candidate URLs
//! - Collecting detail records in paced, bounded-parallel batches

pub mod collector;
pub mod fetcher;
pub mod listing;

pub use collector::collect_details;
pub use fetcher::{Fetcher, RetryPolicy};
pub use listing::{harvest_candidates, CandidateItem};
