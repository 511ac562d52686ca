//! Auction domain types
//!
//! This module defines the core domain types of the auction engine.

use chrono::{DateTime, Utc};
use common::{AuctionId, BidId, ItemId, UserId};
use serde::{Deserialize, Serialize};

/// Mutable, versioned state of one listing
///
/// The record exclusively owns its `version` counter: it is incremented by
/// the store, exactly once per successful mutating write, and is the sole
/// arbiter of write ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    /// Unique auction identifier
    pub id: AuctionId,
    /// Reference to the immutable item record
    pub item: ItemId,
    /// User who created the auction
    pub owner: UserId,
    /// Current highest accepted amount; non-decreasing while open
    pub price: f64,
    /// Display name of the current leader; None until the first bid
    pub highest_bidder: Option<String>,
    /// Fixed bidding deadline, set at creation
    pub expires_at: DateTime<Utc>,
    /// One-way closed flag (false -> true only)
    pub is_closed: bool,
    /// Write version; incremented by the store on every successful write
    pub version: u64,
    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful write timestamp
    pub updated_at: DateTime<Utc>,
}

impl Auction {
    /// Create a new open auction at version 0 with the given starting price
    pub fn new(item: ItemId, owner: UserId, starting_price: f64, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: AuctionId::new(),
            item,
            owner,
            price: starting_price,
            highest_bidder: None,
            expires_at,
            is_closed: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the bidding deadline has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the auction accepts bids at `now`
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_closed && !self.is_expired_at(now)
    }
}

/// Immutable descriptive record for an auctioned item
///
/// Created once alongside the auction, read-only afterward. The auction
/// holds the id, not a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            title: title.into(),
            description: description.into(),
            image_url: image_url.into(),
            created_at: Utc::now(),
        }
    }
}

/// Immutable ledger entry for one accepted bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    /// Display name of the bidder at the time of the bid
    pub bidder: String,
    pub bidder_id: UserId,
    pub amount: f64,
    /// The auction's version immediately after this bid was accepted
    pub version_at_bid_time: u64,
    pub placed_at: DateTime<Utc>,
}

impl Bid {
    pub fn new(
        auction_id: AuctionId,
        bidder_id: UserId,
        bidder: impl Into<String>,
        amount: f64,
        version_at_bid_time: u64,
    ) -> Self {
        Self {
            id: BidId::new(),
            auction_id,
            bidder: bidder.into(),
            bidder_id,
            amount,
            version_at_bid_time,
            placed_at: Utc::now(),
        }
    }
}

/// Outcome of a successful bid placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidReceipt {
    pub price: f64,
    pub bidder: String,
    pub version: u64,
}

/// The cached "full auction" projection: auction + item + owner display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionView {
    pub auction: Auction,
    pub item: Item,
    /// Resolved through the profile directory; None if the owner has no
    /// profile entry
    pub owner_display_name: Option<String>,
}

/// Command to create a new auction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuction {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub starting_price: f64,
    pub expires_at: DateTime<Utc>,
    pub owner: UserId,
}
