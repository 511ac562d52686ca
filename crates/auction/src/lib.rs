//! Auction consistency engine for OpenAuction
//!
//! This crate is the core of the auction backend: bid placement under
//! concurrent writers, one-shot auction closure, an append-only bid
//! ledger, and a read-through TTL cache over the authoritative store.
//!
//! # Design
//!
//! - Every mutating write goes through
//!   [`AuctionStore::conditional_update`](store::AuctionStore), the single
//!   serialization point. Two racing writes against the same version never
//!   both succeed.
//! - Losing a race is an ordinary outcome, not an exception: the engine
//!   returns [`AuctionError::StaleVersion`](error::AuctionError) with the
//!   winning price/version and never retries on the caller's behalf.
//! - The cached views (full projection, recent bids) are advisory.
//!   Writers invalidate them synchronously; readers repopulate on miss.
//!
//! # Feature Flags
//!
//! - `postgres` - PostgreSQL-backed store, item catalog, and ledger

pub mod cache;
pub mod clients;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod metrics;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{AuctionError, Result};
pub use manager::{create_in_memory, AuctionManager};
pub use types::{Auction, AuctionView, Bid, BidReceipt, Item, NewAuction};

// Store exports
pub use ledger::{BidLedger, InMemoryBidLedger};
pub use store::{AuctionStore, InMemoryAuctionStore, InMemoryItemStore, ItemStore};

#[cfg(feature = "postgres")]
pub use store::{PostgresAuctionStore, PostgresBidLedger, PostgresItemStore};

// Client exports
pub use clients::{ProfileDirectory, StaticProfileDirectory};
