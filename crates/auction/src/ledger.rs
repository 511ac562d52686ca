//! Append-only bid ledger
//!
//! Every accepted bid becomes an immutable ledger entry. Entries are
//! appended only after the winning conditional write, so the append itself
//! is unconditional. Ledger history outlives the auction record: deleting
//! an auction leaves its bid history readable.

use crate::error::Result;
use crate::types::Bid;
use async_trait::async_trait;
use common::AuctionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Append-only record of accepted bids
#[async_trait]
pub trait BidLedger: Send + Sync {
    /// Record an accepted bid
    async fn append(&self, bid: Bid) -> Result<()>;

    /// The most recent bids for one auction, newest first
    ///
    /// Returns at most `limit` entries ordered by descending
    /// version-at-bid-time. A finite, re-callable snapshot, not a stream.
    async fn recent(&self, auction_id: AuctionId, limit: usize) -> Result<Vec<Bid>>;
}

/// In-memory bid ledger
#[derive(Debug, Default)]
pub struct InMemoryBidLedger {
    bids: Arc<RwLock<HashMap<AuctionId, Vec<Bid>>>>,
}

impl InMemoryBidLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            bids: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Total number of entries across all auctions
    pub fn len(&self) -> usize {
        self.bids.read().values().map(Vec::len).sum()
    }

    /// Check if the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.bids.read().values().all(Vec::is_empty)
    }
}

impl Clone for InMemoryBidLedger {
    fn clone(&self) -> Self {
        Self {
            bids: Arc::clone(&self.bids),
        }
    }
}

#[async_trait]
impl BidLedger for InMemoryBidLedger {
    async fn append(&self, bid: Bid) -> Result<()> {
        self.bids
            .write()
            .entry(bid.auction_id)
            .or_default()
            .push(bid);
        Ok(())
    }

    async fn recent(&self, auction_id: AuctionId, limit: usize) -> Result<Vec<Bid>> {
        let bids = self.bids.read();
        let mut entries: Vec<Bid> = bids.get(&auction_id).cloned().unwrap_or_default();

        // appends happen outside the store lock, so arrival order is not
        // guaranteed to match version order
        entries.sort_by(|a, b| {
            b.version_at_bid_time
                .cmp(&a.version_at_bid_time)
                .then_with(|| b.placed_at.cmp(&a.placed_at))
        });
        entries.truncate(limit);

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;

    fn create_test_bid(auction_id: AuctionId, amount: f64, version: u64) -> Bid {
        Bid::new(auction_id, UserId::new(), "bidder", amount, version)
    }

    #[tokio::test]
    async fn test_append_and_recent() {
        let ledger = InMemoryBidLedger::new();
        let auction_id = AuctionId::new();

        ledger
            .append(create_test_bid(auction_id, 150.0, 1))
            .await
            .unwrap();
        ledger
            .append(create_test_bid(auction_id, 200.0, 2))
            .await
            .unwrap();

        let recent = ledger.recent(auction_id, 20).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].amount, 200.0);
        assert_eq!(recent[1].amount, 150.0);
    }

    #[tokio::test]
    async fn test_recent_orders_by_version_not_arrival() {
        let ledger = InMemoryBidLedger::new();
        let auction_id = AuctionId::new();

        // later version appended first
        ledger
            .append(create_test_bid(auction_id, 200.0, 2))
            .await
            .unwrap();
        ledger
            .append(create_test_bid(auction_id, 150.0, 1))
            .await
            .unwrap();

        let recent = ledger.recent(auction_id, 20).await.unwrap();
        assert_eq!(recent[0].version_at_bid_time, 2);
        assert_eq!(recent[1].version_at_bid_time, 1);
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let ledger = InMemoryBidLedger::new();
        let auction_id = AuctionId::new();

        for version in 1..=30u64 {
            ledger
                .append(create_test_bid(auction_id, 100.0 + version as f64, version))
                .await
                .unwrap();
        }

        let recent = ledger.recent(auction_id, 20).await.unwrap();
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0].version_at_bid_time, 30);
        assert_eq!(recent[19].version_at_bid_time, 11);
    }

    #[tokio::test]
    async fn test_recent_unknown_auction_is_empty() {
        let ledger = InMemoryBidLedger::new();
        let recent = ledger.recent(AuctionId::new(), 20).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_auctions_do_not_share_history() {
        let ledger = InMemoryBidLedger::new();
        let a = AuctionId::new();
        let b = AuctionId::new();

        ledger.append(create_test_bid(a, 150.0, 1)).await.unwrap();
        ledger.append(create_test_bid(b, 999.0, 1)).await.unwrap();

        let recent = ledger.recent(a, 20).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].amount, 150.0);
    }
}
