//! Store trait definitions

use crate::error::Result;
use crate::types::{Auction, Item};
use async_trait::async_trait;
use common::{AuctionId, ItemId};

/// A fallible state transition applied inside the store's atomic update.
///
/// The mutation receives the current record and returns the desired next
/// state; the store owns `version` and `updated_at` and overwrites both
/// after the mutation runs. Returning an error aborts the update with no
/// state change.
pub type Mutation = Box<dyn FnOnce(&Auction) -> Result<Auction> + Send>;

/// Authoritative store for auction records
///
/// `conditional_update` is the single serialization point for writes: no
/// component mutates an auction any other way.
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Insert a newly created auction
    ///
    /// Fails with `AlreadyExists` on an id collision.
    async fn insert(&self, auction: Auction) -> Result<()>;

    /// Fetch an auction by id
    async fn get(&self, id: AuctionId) -> Result<Option<Auction>>;

    /// All auctions, newest first
    async fn list(&self) -> Result<Vec<Auction>>;

    /// Atomically update one auction record
    ///
    /// Reads the current record; if `expected_version` is supplied and does
    /// not match the stored version, fails with `VersionConflict` without
    /// running the mutation. Otherwise applies the mutation, increments the
    /// version by exactly 1, refreshes `updated_at`, and persists the new
    /// record as one atomic operation. Two racing calls with the same
    /// expected version never both succeed.
    async fn conditional_update(
        &self,
        id: AuctionId,
        expected_version: Option<u64>,
        mutation: Mutation,
    ) -> Result<Auction>;

    /// Delete an auction record, returning it
    ///
    /// Ledger history is owned elsewhere and is not touched.
    async fn remove(&self, id: AuctionId) -> Result<Auction>;
}

/// Store for the immutable item records
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a newly created item; items are never updated afterward
    async fn insert(&self, item: Item) -> Result<()>;

    /// Fetch an item by id
    async fn get(&self, id: ItemId) -> Result<Option<Item>>;
}
