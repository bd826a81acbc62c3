//! Price statistics over collected records

use serde::Serialize;

/// Aggregate price statistics for a result set
///
/// Defined only when at least one price exists; an empty result set has no
/// statistics rather than zeroed ones.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PriceStatistics {
    /// Mean price, rounded half-up to the nearest integer
    pub average: u64,

    pub max: u64,
    pub min: u64,
}

/// Computes average/max/min over the given prices
pub fn compute_statistics(prices: &[u64]) -> Option<PriceStatistics> {
    if prices.is_empty() {
        return None;
    }

    let sum: u64 = prices.iter().sum();
    let count = prices.len() as u64;
    // Integer round-half-up keeps this exact for large sums
    let average = (sum + count / 2) / count;

    Some(PriceStatistics {
        average,
        max: *prices.iter().max().expect("non-empty"),
        min: *prices.iter().min().expect("non-empty"),
    })
}
