//! Auction engine metrics
//!
//! Counters and histograms emitted through the `metrics` facade. Without
//! an installed recorder (see `observability::init_metrics`) these are
//! no-ops, so the engine records unconditionally.

use metrics::{counter, histogram, Counter, Histogram};
use std::time::Duration;

/// Metric set for the auction engine
///
/// # Metrics
///
/// * `auction_bids_total` (labels: `outcome` = accepted/rejected/conflict)
/// * `auction_bid_duration_seconds` - bid placement latency
/// * `auction_closures_total` - successful closures
/// * `auction_cache_hits_total` / `auction_cache_misses_total` (label:
///   `view` = full_projection/recent_bids)
#[derive(Clone)]
pub struct AuctionMetrics {
    bids_accepted: Counter,
    bids_rejected: Counter,
    bids_conflicted: Counter,
    closures: Counter,
    bid_duration: Histogram,
    cache_hits: fn(&'static str) -> Counter,
    cache_misses: fn(&'static str) -> Counter,
}

impl AuctionMetrics {
    /// Create the metric set
    pub fn new() -> Self {
        Self {
            bids_accepted: counter!("auction_bids_total", "outcome" => "accepted"),
            bids_rejected: counter!("auction_bids_total", "outcome" => "rejected"),
            bids_conflicted: counter!("auction_bids_total", "outcome" => "conflict"),
            closures: counter!("auction_closures_total"),
            bid_duration: histogram!("auction_bid_duration_seconds"),
            cache_hits: |view| counter!("auction_cache_hits_total", "view" => view),
            cache_misses: |view| counter!("auction_cache_misses_total", "view" => view),
        }
    }

    /// Record an accepted bid and its placement latency
    pub fn record_bid_accepted(&self, duration: Duration) {
        self.bids_accepted.increment(1);
        self.bid_duration.record(duration.as_secs_f64());
    }

    /// Record a bid rejected by validation
    pub fn record_bid_rejected(&self) {
        self.bids_rejected.increment(1);
    }

    /// Record a bid that lost an optimistic-write race
    pub fn record_bid_conflict(&self) {
        self.bids_conflicted.increment(1);
    }

    /// Record a successful closure
    pub fn record_closure(&self) {
        self.closures.increment(1);
    }

    /// Record a cache hit for a view
    pub fn record_cache_hit(&self, view: &'static str) {
        (self.cache_hits)(view).increment(1);
    }

    /// Record a cache miss for a view
    pub fn record_cache_miss(&self, view: &'static str) {
        (self.cache_misses)(view).increment(1);
    }
}

impl Default for AuctionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        // Recording without an installed recorder must not panic
        let metrics = AuctionMetrics::new();
        metrics.record_bid_accepted(Duration::from_millis(3));
        metrics.record_bid_rejected();
        metrics.record_bid_conflict();
        metrics.record_closure();
        metrics.record_cache_hit("full_projection");
        metrics.record_cache_miss("recent_bids");
    }
}
