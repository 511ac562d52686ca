//! Auction engine error types

use common::{AuctionId, ItemId};
use thiserror::Error;

/// Errors that can occur in the auction engine
///
/// The conflict variants (`BidTooLow`, `StaleVersion`) are expected
/// outcomes on a contended auction, not failures: they carry the current
/// price/version so the caller can refresh and resubmit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuctionError {
    /// Auction not found
    #[error("Auction not found: {0}")]
    NotFound(AuctionId),

    /// Referenced item record is absent
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    /// Bid on a closed or expired auction
    #[error("Auction is closed")]
    AuctionClosed,

    /// Bid amount does not beat the current price
    #[error("Bid must be greater than the current price of {current_price}")]
    BidTooLow { current_price: f64 },

    /// The caller's view of the auction was superseded by another writer
    #[error("Auction state changed (price {current_price}, version {current_version}); refresh and retry")]
    StaleVersion {
        current_price: f64,
        current_version: u64,
    },

    /// Store-level optimistic write failure; the record is at `current`
    #[error("Version conflict: record is at version {current}")]
    VersionConflict { current: u64 },

    /// Caller is not the auction owner
    #[error("Not permitted to modify this auction")]
    Forbidden,

    /// Closure of an auction that is already closed
    #[error("Auction is already closed")]
    AlreadyClosed,

    /// Duplicate id on insert
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Malformed command
    #[error("Invalid command: {0}")]
    Validation(String),

    /// Unexpected storage failure; the current command committed nothing
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for auction engine operations
pub type Result<T> = std::result::Result<T, AuctionError>;
