//! Shared types for OpenAuction
//!
//! This crate holds the identifier newtypes used by every other crate in
//! the workspace.

pub mod types;

pub use types::{AuctionId, BidId, ItemId, UserId};
