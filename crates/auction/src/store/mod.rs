//! Auction state storage
//!
//! The store is the authoritative record of auction state and the only
//! place where concurrent writes are serialized.

pub mod memory;
pub mod traits;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{InMemoryAuctionStore, InMemoryItemStore};
pub use traits::{AuctionStore, ItemStore, Mutation};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresAuctionStore, PostgresBidLedger, PostgresItemStore};
