//! Auction manager - bid placement, closure, and cached reads
//!
//! The manager is the write orchestrator described by the engine's
//! contract: validate against the freshly read record, attempt the
//! conditional write, and only then perform side effects (ledger append,
//! cache invalidation). Losing an optimistic race is surfaced to the
//! caller as `StaleVersion` rather than retried: a stale bid's intent may
//! no longer hold at the new price point.

use crate::cache::TtlCache;
use crate::clients::ProfileDirectory;
use crate::error::{AuctionError, Result};
use crate::ledger::BidLedger;
use crate::metrics::AuctionMetrics;
use crate::store::{AuctionStore, ItemStore};
use crate::types::{Auction, AuctionView, Bid, BidReceipt, Item, NewAuction};
use chrono::Utc;
use common::{AuctionId, UserId};
use config::AuctionHouseConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};

const FULL_PROJECTION_VIEW: &str = "full_projection";
const RECENT_BIDS_VIEW: &str = "recent_bids";

/// Auction manager - handles the auction lifecycle
pub struct AuctionManager {
    store: Arc<dyn AuctionStore>,
    items: Arc<dyn ItemStore>,
    ledger: Arc<dyn BidLedger>,
    profiles: Arc<dyn ProfileDirectory>,
    full_view_cache: TtlCache<AuctionId, AuctionView>,
    recent_bids_cache: TtlCache<AuctionId, Vec<Bid>>,
    cache_enabled: bool,
    recent_bids_limit: usize,
    metrics: AuctionMetrics,
}

impl AuctionManager {
    /// Create a new AuctionManager
    pub fn new(
        store: Arc<dyn AuctionStore>,
        items: Arc<dyn ItemStore>,
        ledger: Arc<dyn BidLedger>,
        profiles: Arc<dyn ProfileDirectory>,
        config: &AuctionHouseConfig,
    ) -> Self {
        let max_entries = config.cache.max_entries as usize;
        Self {
            store,
            items,
            ledger,
            profiles,
            full_view_cache: TtlCache::new(
                Duration::from_secs(config.cache.full_projection_ttl_seconds),
                max_entries,
            ),
            recent_bids_cache: TtlCache::new(
                Duration::from_secs(config.cache.recent_bids_ttl_seconds),
                max_entries,
            ),
            cache_enabled: config.cache.enabled,
            recent_bids_limit: config.bids.recent_limit,
            metrics: AuctionMetrics::new(),
        }
    }

    /// Create an auction together with its immutable item record
    pub async fn create_auction(&self, command: NewAuction) -> Result<Auction> {
        if command.starting_price <= 0.0 {
            return Err(AuctionError::Validation(
                "starting price must be greater than 0".to_string(),
            ));
        }
        if command.title.trim().is_empty() {
            return Err(AuctionError::Validation("item title is required".to_string()));
        }
        if command.expires_at <= Utc::now() {
            return Err(AuctionError::Validation(
                "expiry must be in the future".to_string(),
            ));
        }

        let item = Item::new(command.title, command.description, command.image_url);
        let item_id = item.id;
        self.items.insert(item).await?;

        let auction = Auction::new(item_id, command.owner, command.starting_price, command.expires_at);
        self.store.insert(auction.clone()).await?;

        tracing::info!(
            "Auction {} created by {} at starting price {}",
            auction.id,
            auction.owner,
            auction.price
        );

        Ok(auction)
    }

    /// Place a bid on an auction
    ///
    /// Validation order (first failing check wins): existence, open state,
    /// amount, caller-supplied expected version. The write itself is pinned
    /// to the version observed during validation, so a second bidder
    /// committing in between turns this call into `StaleVersion`.
    pub async fn place_bid(
        &self,
        auction_id: AuctionId,
        amount: f64,
        bidder_id: UserId,
        display_name: &str,
        expected_version: Option<u64>,
    ) -> Result<BidReceipt> {
        let start = Instant::now();

        let auction = self
            .store
            .get(auction_id)
            .await?
            .ok_or(AuctionError::NotFound(auction_id))?;

        if !auction.is_open_at(Utc::now()) {
            self.metrics.record_bid_rejected();
            return Err(AuctionError::AuctionClosed);
        }

        if amount <= auction.price {
            self.metrics.record_bid_rejected();
            return Err(AuctionError::BidTooLow {
                current_price: auction.price,
            });
        }

        if let Some(expected) = expected_version {
            if expected != auction.version {
                self.metrics.record_bid_conflict();
                return Err(AuctionError::StaleVersion {
                    current_price: auction.price,
                    current_version: auction.version,
                });
            }
        }

        let observed_version = auction.version;
        let bidder_name = display_name.to_string();
        let write = self
            .store
            .conditional_update(
                auction_id,
                Some(observed_version),
                Box::new(move |current| {
                    // re-checked at write time; version pinning makes these
                    // unreachable on a matched record
                    if !current.is_open_at(Utc::now()) {
                        return Err(AuctionError::AuctionClosed);
                    }
                    if amount <= current.price {
                        return Err(AuctionError::BidTooLow {
                            current_price: current.price,
                        });
                    }
                    let mut next = current.clone();
                    next.price = amount;
                    next.highest_bidder = Some(bidder_name.clone());
                    Ok(next)
                }),
            )
            .await;

        let updated = match write {
            Ok(auction) => auction,
            Err(AuctionError::VersionConflict { .. }) => {
                // another bidder won the race between validation and write;
                // report the state that beat us and let the caller decide
                self.metrics.record_bid_conflict();
                let current = self
                    .store
                    .get(auction_id)
                    .await?
                    .ok_or(AuctionError::NotFound(auction_id))?;
                tracing::debug!(
                    "Bid on {} lost the write race (now at version {})",
                    auction_id,
                    current.version
                );
                return Err(AuctionError::StaleVersion {
                    current_price: current.price,
                    current_version: current.version,
                });
            }
            Err(e) => return Err(e),
        };

        let bid = Bid::new(auction_id, bidder_id, display_name, amount, updated.version);
        self.ledger.append(bid).await?;
        self.recent_bids_cache.invalidate(&auction_id);

        self.metrics.record_bid_accepted(start.elapsed());
        tracing::info!(
            "Bid of {} by {} accepted on {} (version {})",
            amount,
            display_name,
            auction_id,
            updated.version
        );

        Ok(BidReceipt {
            price: updated.price,
            bidder: display_name.to_string(),
            version: updated.version,
        })
    }

    /// Close an auction
    ///
    /// Only the owner may close; closing twice is an error, not a no-op.
    /// The closed flag is re-checked inside the store's atomic update, so
    /// two racing closers cannot both succeed.
    pub async fn close_auction(&self, auction_id: AuctionId, requester: UserId) -> Result<Auction> {
        let auction = self
            .store
            .get(auction_id)
            .await?
            .ok_or(AuctionError::NotFound(auction_id))?;

        if auction.owner != requester {
            return Err(AuctionError::Forbidden);
        }
        if auction.is_closed {
            return Err(AuctionError::AlreadyClosed);
        }

        let updated = self
            .store
            .conditional_update(
                auction_id,
                None,
                Box::new(|current| {
                    if current.is_closed {
                        return Err(AuctionError::AlreadyClosed);
                    }
                    let mut next = current.clone();
                    next.is_closed = true;
                    Ok(next)
                }),
            )
            .await?;

        self.full_view_cache.invalidate(&auction_id);
        self.metrics.record_closure();
        tracing::info!("Auction {} closed at version {}", auction_id, updated.version);

        Ok(updated)
    }

    /// Delete an auction
    ///
    /// Owner-gated. Ledger history is deliberately retained; only the
    /// auction record and its cached views go away.
    pub async fn remove_auction(&self, auction_id: AuctionId, requester: UserId) -> Result<Auction> {
        let auction = self
            .store
            .get(auction_id)
            .await?
            .ok_or(AuctionError::NotFound(auction_id))?;

        if auction.owner != requester {
            return Err(AuctionError::Forbidden);
        }

        let removed = self.store.remove(auction_id).await?;
        self.full_view_cache.invalidate(&auction_id);
        self.recent_bids_cache.invalidate(&auction_id);

        tracing::info!("Auction {} removed by owner", auction_id);
        Ok(removed)
    }

    /// The cache-backed full auction projection
    pub async fn get_full_projection(&self, auction_id: AuctionId) -> Result<AuctionView> {
        if self.cache_enabled {
            if let Some(view) = self.full_view_cache.get(&auction_id) {
                self.metrics.record_cache_hit(FULL_PROJECTION_VIEW);
                return Ok(view);
            }
            self.metrics.record_cache_miss(FULL_PROJECTION_VIEW);
        }

        let auction = self
            .store
            .get(auction_id)
            .await?
            .ok_or(AuctionError::NotFound(auction_id))?;
        let item = self
            .items
            .get(auction.item)
            .await?
            .ok_or(AuctionError::ItemNotFound(auction.item))?;
        let owner_display_name = self.profiles.display_name(auction.owner).await;

        let view = AuctionView {
            auction,
            item,
            owner_display_name,
        };

        if self.cache_enabled {
            self.full_view_cache.set(auction_id, view.clone());
        }

        Ok(view)
    }

    /// The cache-backed recent-bids view, newest first
    ///
    /// Serves history even when the auction record has been deleted.
    pub async fn get_recent_bids(&self, auction_id: AuctionId) -> Result<Vec<Bid>> {
        if self.cache_enabled {
            if let Some(bids) = self.recent_bids_cache.get(&auction_id) {
                self.metrics.record_cache_hit(RECENT_BIDS_VIEW);
                return Ok(bids);
            }
            self.metrics.record_cache_miss(RECENT_BIDS_VIEW);
        }

        let bids = self.ledger.recent(auction_id, self.recent_bids_limit).await?;

        if self.cache_enabled {
            self.recent_bids_cache.set(auction_id, bids.clone());
        }

        Ok(bids)
    }

    /// The light state projection used by bid forms to refresh before a
    /// retry; deliberately uncached
    pub async fn get_state(&self, auction_id: AuctionId) -> Result<Auction> {
        self.store
            .get(auction_id)
            .await?
            .ok_or(AuctionError::NotFound(auction_id))
    }

    /// All auctions, newest first; uncached
    pub async fn list_auctions(&self) -> Result<Vec<Auction>> {
        self.store.list().await
    }
}

/// Create an AuctionManager backed entirely by in-memory components
pub fn create_in_memory(
    profiles: Arc<dyn ProfileDirectory>,
    config: &AuctionHouseConfig,
) -> AuctionManager {
    AuctionManager::new(
        Arc::new(crate::store::InMemoryAuctionStore::new()),
        Arc::new(crate::store::InMemoryItemStore::new()),
        Arc::new(crate::ledger::InMemoryBidLedger::new()),
        profiles,
        config,
    )
}
