//! PostgreSQL store implementations
//!
//! The auction row carries a `version` column; `conditional_update` writes
//! with `WHERE auction_id = $1 AND version = $2`, so a racing writer that
//! already bumped the version turns this write into zero affected rows and
//! a `VersionConflict`.

use crate::error::{AuctionError, Result};
use crate::ledger::BidLedger;
use crate::store::traits::{AuctionStore, ItemStore, Mutation};
use crate::types::{Auction, Bid, Item};
use async_trait::async_trait;
use chrono::Utc;
use common::{AuctionId, BidId, ItemId, UserId};
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::sync::Arc;

/// DDL for the three tables; applied by `ensure_schema`
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    item_id     UUID PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    image_url   TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS auctions (
    auction_id     UUID PRIMARY KEY,
    item_id        UUID NOT NULL,
    owner_id       UUID NOT NULL,
    price          DOUBLE PRECISION NOT NULL,
    highest_bidder TEXT,
    expires_at     TIMESTAMPTZ NOT NULL,
    is_closed      BOOLEAN NOT NULL,
    version        BIGINT NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL,
    updated_at     TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS bids (
    bid_id              UUID PRIMARY KEY,
    auction_id          UUID NOT NULL,
    bidder              TEXT NOT NULL,
    bidder_id           UUID NOT NULL,
    amount              DOUBLE PRECISION NOT NULL,
    version_at_bid_time BIGINT NOT NULL,
    placed_at           TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS bids_auction_idx ON bids (auction_id, version_at_bid_time DESC);
"#;

fn storage(e: sqlx::Error) -> AuctionError {
    AuctionError::Storage(e.to_string())
}

fn row_to_auction(row: &sqlx::postgres::PgRow) -> Result<Auction> {
    Ok(Auction {
        id: AuctionId::from_uuid(row.try_get("auction_id").map_err(storage)?),
        item: ItemId(row.try_get("item_id").map_err(storage)?),
        owner: UserId::from_uuid(row.try_get("owner_id").map_err(storage)?),
        price: row.try_get("price").map_err(storage)?,
        highest_bidder: row.try_get("highest_bidder").map_err(storage)?,
        expires_at: row.try_get("expires_at").map_err(storage)?,
        is_closed: row.try_get("is_closed").map_err(storage)?,
        version: row.try_get::<i64, _>("version").map_err(storage)? as u64,
        created_at: row.try_get("created_at").map_err(storage)?,
        updated_at: row.try_get("updated_at").map_err(storage)?,
    })
}

const SELECT_AUCTION: &str = r#"
SELECT auction_id, item_id, owner_id, price, highest_bidder, expires_at,
       is_closed, version, created_at, updated_at
FROM auctions
"#;

/// PostgreSQL auction store
pub struct PostgresAuctionStore {
    pool: Arc<PgPool>,
}

impl PostgresAuctionStore {
    /// Create a new PostgreSQL auction store
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the tables if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    /// Share the underlying pool, for wiring the item store and ledger
    pub fn pool(&self) -> Arc<PgPool> {
        Arc::clone(&self.pool)
    }

    async fn fetch(&self, id: AuctionId) -> Result<Option<Auction>> {
        let row = sqlx::query(&format!("{} WHERE auction_id = $1", SELECT_AUCTION))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(row_to_auction).transpose()
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn insert(&self, auction: Auction) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO auctions (
                auction_id, item_id, owner_id, price, highest_bidder,
                expires_at, is_closed, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(auction.id.0)
        .bind(auction.item.0)
        .bind(auction.owner.0)
        .bind(auction.price)
        .bind(&auction.highest_bidder)
        .bind(auction.expires_at)
        .bind(auction.is_closed)
        .bind(auction.version as i64)
        .bind(auction.created_at)
        .bind(auction.updated_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuctionError::AlreadyExists(auction.id.to_string()))
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get(&self, id: AuctionId) -> Result<Option<Auction>> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<Auction>> {
        let rows = sqlx::query(&format!("{} ORDER BY created_at DESC", SELECT_AUCTION))
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;

        rows.iter().map(row_to_auction).collect()
    }

    async fn conditional_update(
        &self,
        id: AuctionId,
        expected_version: Option<u64>,
        mutation: Mutation,
    ) -> Result<Auction> {
        let current = self.fetch(id).await?.ok_or(AuctionError::NotFound(id))?;

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(AuctionError::VersionConflict {
                    current: current.version,
                });
            }
        }

        let mut updated = mutation(&current)?;
        updated.version = current.version + 1;
        updated.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE auctions
            SET price = $1, highest_bidder = $2, is_closed = $3,
                version = $4, updated_at = $5
            WHERE auction_id = $6 AND version = $7
            "#,
        )
        .bind(updated.price)
        .bind(&updated.highest_bidder)
        .bind(updated.is_closed)
        .bind(updated.version as i64)
        .bind(updated.updated_at)
        .bind(id.0)
        .bind(current.version as i64)
        .execute(&*self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 0 {
            // someone committed between our read and write, or the row is
            // gone
            return match self.fetch(id).await? {
                Some(now) => Err(AuctionError::VersionConflict {
                    current: now.version,
                }),
                None => Err(AuctionError::NotFound(id)),
            };
        }

        Ok(updated)
    }

    async fn remove(&self, id: AuctionId) -> Result<Auction> {
        let row = sqlx::query(
            r#"
            DELETE FROM auctions
            WHERE auction_id = $1
            RETURNING auction_id, item_id, owner_id, price, highest_bidder,
                      expires_at, is_closed, version, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => row_to_auction(&row),
            None => Err(AuctionError::NotFound(id)),
        }
    }
}

/// PostgreSQL item store
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    /// Create a new PostgreSQL item store
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    async fn insert(&self, item: Item) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO items (item_id, title, description, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.id.0)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.image_url)
        .bind(item.created_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuctionError::AlreadyExists(item.id.to_string()))
            }
            Err(e) => Err(storage(e)),
        }
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT item_id, title, description, image_url, created_at
            FROM items
            WHERE item_id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;

        row.map(|row| {
            Ok(Item {
                id: ItemId(row.try_get("item_id").map_err(storage)?),
                title: row.try_get("title").map_err(storage)?,
                description: row.try_get("description").map_err(storage)?,
                image_url: row.try_get("image_url").map_err(storage)?,
                created_at: row.try_get("created_at").map_err(storage)?,
            })
        })
        .transpose()
    }
}

/// PostgreSQL bid ledger
pub struct PostgresBidLedger {
    pool: Arc<PgPool>,
}

impl PostgresBidLedger {
    /// Create a new PostgreSQL bid ledger
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BidLedger for PostgresBidLedger {
    async fn append(&self, bid: Bid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bids (
                bid_id, auction_id, bidder, bidder_id, amount,
                version_at_bid_time, placed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(bid.id.0)
        .bind(bid.auction_id.0)
        .bind(&bid.bidder)
        .bind(bid.bidder_id.0)
        .bind(bid.amount)
        .bind(bid.version_at_bid_time as i64)
        .bind(bid.placed_at)
        .execute(&*self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn recent(&self, auction_id: AuctionId, limit: usize) -> Result<Vec<Bid>> {
        let rows = sqlx::query(
            r#"
            SELECT bid_id, auction_id, bidder, bidder_id, amount,
                   version_at_bid_time, placed_at
            FROM bids
            WHERE auction_id = $1
            ORDER BY version_at_bid_time DESC, placed_at DESC
            LIMIT $2
            "#,
        )
        .bind(auction_id.0)
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(storage)?;

        rows.iter()
            .map(|row| {
                Ok(Bid {
                    id: BidId(row.try_get("bid_id").map_err(storage)?),
                    auction_id: AuctionId::from_uuid(
                        row.try_get("auction_id").map_err(storage)?,
                    ),
                    bidder: row.try_get("bidder").map_err(storage)?,
                    bidder_id: UserId::from_uuid(row.try_get("bidder_id").map_err(storage)?),
                    amount: row.try_get("amount").map_err(storage)?,
                    version_at_bid_time: row
                        .try_get::<i64, _>("version_at_bid_time")
                        .map_err(storage)? as u64,
                    placed_at: row.try_get("placed_at").map_err(storage)?,
                })
            })
            .collect()
    }
}
