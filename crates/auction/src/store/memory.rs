//! In-memory store implementations
//!
//! The default backend for tests, the simulator, and embedded use. The
//! auction map's write lock is held across the whole
//! read-check-mutate-write sequence of `conditional_update`, which gives
//! the atomic compare-and-increment the trait demands.

use crate::error::{AuctionError, Result};
use crate::store::traits::{AuctionStore, ItemStore, Mutation};
use crate::types::{Auction, Item};
use async_trait::async_trait;
use chrono::Utc;
use common::{AuctionId, ItemId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory auction store
#[derive(Debug, Default)]
pub struct InMemoryAuctionStore {
    auctions: Arc<RwLock<HashMap<AuctionId, Auction>>>,
}

impl InMemoryAuctionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            auctions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of auctions in the store
    pub fn len(&self) -> usize {
        self.auctions.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.auctions.read().is_empty()
    }
}

impl Clone for InMemoryAuctionStore {
    fn clone(&self) -> Self {
        Self {
            auctions: Arc::clone(&self.auctions),
        }
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn insert(&self, auction: Auction) -> Result<()> {
        let mut auctions = self.auctions.write();
        if auctions.contains_key(&auction.id) {
            return Err(AuctionError::AlreadyExists(auction.id.to_string()));
        }
        auctions.insert(auction.id, auction);
        Ok(())
    }

    async fn get(&self, id: AuctionId) -> Result<Option<Auction>> {
        Ok(self.auctions.read().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Auction>> {
        let auctions = self.auctions.read();
        let mut result: Vec<Auction> = auctions.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn conditional_update(
        &self,
        id: AuctionId,
        expected_version: Option<u64>,
        mutation: Mutation,
    ) -> Result<Auction> {
        let mut auctions = self.auctions.write();

        let current = auctions.get(&id).ok_or(AuctionError::NotFound(id))?;

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(AuctionError::VersionConflict {
                    current: current.version,
                });
            }
        }

        let mut updated = mutation(current)?;
        // the store owns the version counter and write timestamp
        updated.version = current.version + 1;
        updated.updated_at = Utc::now();

        auctions.insert(id, updated.clone());
        Ok(updated)
    }

    async fn remove(&self, id: AuctionId) -> Result<Auction> {
        self.auctions
            .write()
            .remove(&id)
            .ok_or(AuctionError::NotFound(id))
    }
}

/// In-memory item store
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryItemStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Clone for InMemoryItemStore {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn insert(&self, item: Item) -> Result<()> {
        let mut items = self.items.write();
        if items.contains_key(&item.id) {
            return Err(AuctionError::AlreadyExists(item.id.to_string()));
        }
        items.insert(item.id, item);
        Ok(())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.items.read().get(&id).cloned())
    }
}
