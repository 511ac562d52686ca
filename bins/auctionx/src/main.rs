//! OpenAuction CLI Binary
//!
//! Entry point for config tooling and the bidding simulator. The
//! simulator drives the real engine with many concurrent bidder tasks,
//! which makes it a convenient smoke test for the optimistic write path:
//! run it with a high bidder count and watch the conflict counters.

use anyhow::{Context, Result};
use auction::{AuctionError, AuctionManager, NewAuction, StaticProfileDirectory};
use chrono::{Duration as ChronoDuration, Utc};
use cli::{Cli, Commands};
use common::{AuctionId, UserId};
use config::{
    generate_default_config, load_config, save_config, validate_config, AuctionHouseConfig,
    StorageBackend,
};
use futures::future::join_all;
use observability::{init_logging, LogFormat};
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Simulate {
            config,
            auctions,
            bidders,
            bids,
        } => simulate(config, auctions, bidders, bids).await,
        Commands::Validate { config } => validate_command(config),
        Commands::Init { output } => init_command(output),
    }
}

fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AuctionHouseConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        println!("No config at {:?}, using defaults", path);
        Ok(generate_default_config())
    }
}

fn check_config(config: &AuctionHouseConfig) -> Result<()> {
    let report = validate_config(config);

    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot continue due to configuration errors");
    }

    Ok(())
}

fn validate_command(path: PathBuf) -> Result<()> {
    observability::init_default_logging("auctionx")?;

    let config = load_config(&path)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        println!("warning: {} - {}", warning.field, warning.message);
    }

    if report.is_valid() {
        println!("Configuration {:?} is valid", path);
        Ok(())
    } else {
        for err in &report.errors {
            println!("error: {}", err);
        }
        anyhow::bail!("{} validation error(s)", report.errors.len())
    }
}

fn init_command(output: PathBuf) -> Result<()> {
    observability::init_default_logging("auctionx")?;

    let config = generate_default_config();
    save_config(&config, &output)?;
    println!("Wrote default configuration to {:?}", output);
    Ok(())
}

async fn simulate(
    config_path: PathBuf,
    auction_count: usize,
    bidder_count: usize,
    bids_per_bidder: usize,
) -> Result<()> {
    let config = load_or_default(&config_path)?;

    let format = LogFormat::parse(&config.observability.log_format).unwrap_or_default();
    init_logging("auctionx", format)?;
    check_config(&config)?;

    if let Some(port) = config.observability.metrics_port {
        observability::init_metrics(port)?;
    }

    info!(
        auctions = auction_count,
        bidders = bidder_count,
        bids = bids_per_bidder,
        backend = %config.storage.backend,
        "Starting bidding simulation"
    );

    let profiles = StaticProfileDirectory::new();
    let owner = UserId::new();
    profiles.insert(owner, "The House");

    let manager = Arc::new(build_manager(&config, profiles.clone()).await?);

    let mut auction_ids = Vec::with_capacity(auction_count);
    for i in 0..auction_count {
        let auction = manager
            .create_auction(NewAuction {
                title: format!("Lot #{}", i + 1),
                description: "Simulated lot".to_string(),
                image_url: format!("https://img.example/lot-{}.png", i + 1),
                starting_price: 100.0,
                expires_at: Utc::now() + ChronoDuration::hours(1),
                owner,
            })
            .await
            .context("failed to create simulated auction")?;
        auction_ids.push(auction.id);
    }

    let mut tasks = Vec::new();
    for &auction_id in &auction_ids {
        for slot in 0..bidder_count {
            let manager = Arc::clone(&manager);
            let profiles = profiles.clone();
            tasks.push(tokio::spawn(async move {
                let bidder = UserId::new();
                let name = format!("bidder-{}", slot + 1);
                profiles.insert(bidder, name.clone());
                run_bidder(&manager, auction_id, bidder, &name, bids_per_bidder).await
            }));
        }
    }

    let mut totals = BidderStats::default();
    for outcome in join_all(tasks).await {
        totals.merge(&outcome.context("bidder task panicked")?);
    }

    for &auction_id in &auction_ids {
        manager.close_auction(auction_id, owner).await?;
    }

    println!();
    println!("Simulation complete:");
    println!("  accepted bids:     {}", totals.accepted);
    println!("  stale conflicts:   {}", totals.stale);
    println!("  too-low rejects:   {}", totals.too_low);
    for &auction_id in &auction_ids {
        let view = manager.get_full_projection(auction_id).await?;
        println!(
            "  {} closed at {} (version {}, leader {})",
            view.item.title,
            view.auction.price,
            view.auction.version,
            view.auction.highest_bidder.as_deref().unwrap_or("nobody"),
        );
    }

    Ok(())
}

#[derive(Debug, Default)]
struct BidderStats {
    accepted: u64,
    stale: u64,
    too_low: u64,
}

impl BidderStats {
    fn merge(&mut self, other: &BidderStats) {
        self.accepted += other.accepted;
        self.stale += other.stale;
        self.too_low += other.too_low;
    }
}

/// One simulated client: read fresh state, bid a little above the current
/// price, and on a stale conflict refresh and try again next round.
async fn run_bidder(
    manager: &AuctionManager,
    auction_id: AuctionId,
    bidder: UserId,
    name: &str,
    rounds: usize,
) -> BidderStats {
    let mut stats = BidderStats::default();

    for _ in 0..rounds {
        let state = match manager.get_state(auction_id).await {
            Ok(state) => state,
            Err(_) => break,
        };
        if state.is_closed {
            break;
        }

        let increment = f64::from(rand::thread_rng().gen_range(1..=25u32));
        let outcome = manager
            .place_bid(
                auction_id,
                state.price + increment,
                bidder,
                name,
                Some(state.version),
            )
            .await;

        match outcome {
            Ok(_) => stats.accepted += 1,
            Err(AuctionError::StaleVersion { .. }) => stats.stale += 1,
            Err(AuctionError::BidTooLow { .. }) => stats.too_low += 1,
            Err(AuctionError::AuctionClosed) => break,
            Err(e) => {
                warn!("bidder {} giving up: {}", name, e);
                break;
            }
        }

        let pause = rand::thread_rng().gen_range(0..5u64);
        tokio::time::sleep(std::time::Duration::from_millis(pause)).await;
    }

    stats
}

async fn build_manager(
    config: &AuctionHouseConfig,
    profiles: StaticProfileDirectory,
) -> Result<AuctionManager> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(auction::create_in_memory(Arc::new(profiles), config)),
        StorageBackend::Postgres => build_postgres_manager(config, profiles).await,
    }
}

#[cfg(feature = "postgres")]
async fn build_postgres_manager(
    config: &AuctionHouseConfig,
    profiles: StaticProfileDirectory,
) -> Result<AuctionManager> {
    use auction::{PostgresAuctionStore, PostgresBidLedger, PostgresItemStore};

    let url = config
        .storage
        .postgres_url
        .as_deref()
        .context("postgres backend requires storage.postgres_url")?;

    let pool = sqlx::postgres::PgPool::connect(url)
        .await
        .context("failed to connect to Postgres")?;

    let store = PostgresAuctionStore::new(pool);
    store.ensure_schema().await?;
    let pool = store.pool();

    Ok(AuctionManager::new(
        Arc::new(store),
        Arc::new(PostgresItemStore::new(Arc::clone(&pool))),
        Arc::new(PostgresBidLedger::new(pool)),
        Arc::new(profiles),
        config,
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_postgres_manager(
    _config: &AuctionHouseConfig,
    _profiles: StaticProfileDirectory,
) -> Result<AuctionManager> {
    anyhow::bail!("postgres backend requires a build with the `postgres` feature")
}
