//! End-to-end tests for bid placement under concurrent writers

use auction::{create_in_memory, AuctionError, AuctionManager, NewAuction, StaticProfileDirectory};
use chrono::{Duration, Utc};
use common::{AuctionId, UserId};
use config::AuctionHouseConfig;
use futures::future::join_all;
use std::sync::Arc;

fn test_config() -> AuctionHouseConfig {
    AuctionHouseConfig::default()
}

async fn setup(config: &AuctionHouseConfig, starting_price: f64) -> (Arc<AuctionManager>, AuctionId, UserId) {
    let owner = UserId::new();
    let profiles = StaticProfileDirectory::new().with_profile(owner, "Seller");
    let manager = Arc::new(create_in_memory(Arc::new(profiles), config));

    let auction = manager
        .create_auction(NewAuction {
            title: "Vintage radio".to_string(),
            description: "Valve radio, working condition".to_string(),
            image_url: "https://img.example/radio.png".to_string(),
            starting_price,
            expires_at: Utc::now() + Duration::hours(1),
            owner,
        })
        .await
        .unwrap();

    (manager, auction.id, owner)
}

#[tokio::test]
async fn one_winner_per_version_level() {
    let (manager, auction_id, _) = setup(&test_config(), 100.0).await;

    // sixteen bidders race the same observed version with distinct amounts
    let tasks = (0..16u32).map(|i| {
        let manager = Arc::clone(&manager);
        let bidder = UserId::new();
        tokio::spawn(async move {
            manager
                .place_bid(
                    auction_id,
                    110.0 + f64::from(i),
                    bidder,
                    &format!("bidder-{}", i),
                    Some(0),
                )
                .await
        })
    });

    let outcomes: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    let winners: Vec<_> = outcomes.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one bid may win version 0");

    for outcome in &outcomes {
        match outcome {
            Ok(receipt) => assert_eq!(receipt.version, 1),
            Err(AuctionError::StaleVersion { current_version, .. }) => {
                assert_eq!(*current_version, 1)
            }
            Err(AuctionError::BidTooLow { .. }) => {}
            Err(other) => panic!("unexpected outcome: {:?}", other),
        }
    }

    let state = manager.get_state(auction_id).await.unwrap();
    assert_eq!(state.version, 1);

    let bids = manager.get_recent_bids(auction_id).await.unwrap();
    assert_eq!(bids.len(), 1);
}

#[tokio::test]
async fn contended_ladder_is_totally_ordered_by_version() {
    let (manager, auction_id, _) = setup(&test_config(), 100.0).await;

    // each bidder pushes toward a unique target, retrying on conflicts the
    // way a real client would: refresh, re-check, resubmit
    let targets: Vec<f64> = (1..=10).map(|i| 100.0 + f64::from(i) * 10.0).collect();

    let tasks = targets.iter().map(|&target| {
        let manager = Arc::clone(&manager);
        let bidder = UserId::new();
        tokio::spawn(async move {
            loop {
                let state = manager.get_state(auction_id).await.unwrap();
                if state.price >= target {
                    return None;
                }
                match manager
                    .place_bid(auction_id, target, bidder, "ladder", Some(state.version))
                    .await
                {
                    Ok(receipt) => return Some(receipt),
                    Err(AuctionError::StaleVersion { .. }) => continue,
                    Err(AuctionError::BidTooLow { .. }) => return None,
                    Err(other) => panic!("unexpected outcome: {:?}", other),
                }
            }
        })
    });

    let receipts: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .filter_map(|r| r.unwrap())
        .collect();

    let state = manager.get_state(auction_id).await.unwrap();
    assert_eq!(state.price, 200.0, "the highest target always lands");
    assert_eq!(state.version as usize, receipts.len());

    // the ledger replays the accepted sequence: strictly increasing price
    // as versions increase, no version reused
    let mut bids = manager.get_recent_bids(auction_id).await.unwrap();
    assert_eq!(bids.len(), receipts.len());
    bids.reverse(); // oldest first
    for (earlier, later) in bids.iter().zip(bids.iter().skip(1)) {
        assert!(later.amount > earlier.amount);
        assert_eq!(later.version_at_bid_time, earlier.version_at_bid_time + 1);
    }
}

#[tokio::test]
async fn three_bidders_walk_the_price_up() {
    let (manager, auction_id, _) = setup(&test_config(), 100.0).await;
    let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());

    // A beats the starting price against version 0
    let receipt = manager
        .place_bid(auction_id, 150.0, a, "A", Some(0))
        .await
        .unwrap();
    assert_eq!(receipt.price, 150.0);
    assert_eq!(receipt.version, 1);

    // B read version 0 before A committed
    let outcome = manager.place_bid(auction_id, 120.0, b, "B", Some(0)).await;
    assert_eq!(
        outcome,
        Err(AuctionError::StaleVersion {
            current_price: 150.0,
            current_version: 1,
        })
    );

    // B after refreshing: the amount no longer clears the price
    let outcome = manager.place_bid(auction_id, 120.0, b, "B", Some(1)).await;
    assert_eq!(
        outcome,
        Err(AuctionError::BidTooLow {
            current_price: 150.0
        })
    );

    // C bids against the fresh version
    let receipt = manager
        .place_bid(auction_id, 200.0, c, "C", Some(1))
        .await
        .unwrap();
    assert_eq!(receipt.price, 200.0);
    assert_eq!(receipt.version, 2);

    let bids = manager.get_recent_bids(auction_id).await.unwrap();
    let amounts: Vec<f64> = bids.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![200.0, 150.0]);
}

#[tokio::test]
async fn losing_bids_leave_no_side_effects() {
    let (manager, auction_id, _) = setup(&test_config(), 100.0).await;

    for _ in 0..5 {
        let outcome = manager
            .place_bid(auction_id, 100.0, UserId::new(), "lowballer", None)
            .await;
        assert!(matches!(outcome, Err(AuctionError::BidTooLow { .. })));
    }

    let state = manager.get_state(auction_id).await.unwrap();
    assert_eq!(state.price, 100.0);
    assert_eq!(state.version, 0);
    assert!(manager.get_recent_bids(auction_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn racing_closers_produce_one_transition() {
    let (manager, auction_id, owner) = setup(&test_config(), 100.0).await;

    let tasks = (0..8).map(|_| {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.close_auction(auction_id, owner).await })
    });

    let outcomes: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    let closed: Vec<_> = outcomes.iter().filter(|r| r.is_ok()).collect();
    assert_eq!(closed.len(), 1, "closure is a one-time transition");
    for outcome in &outcomes {
        if outcome.is_err() {
            assert_eq!(outcome, &Err(AuctionError::AlreadyClosed));
        }
    }

    let state = manager.get_state(auction_id).await.unwrap();
    assert!(state.is_closed);
    assert_eq!(state.version, 1, "failed closures must not bump the version");
}

#[tokio::test]
async fn bids_race_against_closure_but_never_land_after_it() {
    let (manager, auction_id, owner) = setup(&test_config(), 100.0).await;

    let bid_tasks: Vec<_> = (0..8u32)
        .map(|i| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .place_bid(auction_id, 200.0 + f64::from(i), UserId::new(), "racer", None)
                    .await
            })
        })
        .collect();

    let close_task = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.close_auction(auction_id, owner).await })
    };

    let bid_outcomes: Vec<_> = join_all(bid_tasks).await.into_iter().map(|r| r.unwrap()).collect();
    close_task.await.unwrap().unwrap();

    let state = manager.get_state(auction_id).await.unwrap();
    assert!(state.is_closed);

    // every accepted bid is in the ledger at a version below the closure's
    let accepted = bid_outcomes.iter().filter(|r| r.is_ok()).count();
    let bids = manager.get_recent_bids(auction_id).await.unwrap();
    assert_eq!(bids.len(), accepted);
    for bid in &bids {
        assert!(bid.version_at_bid_time < state.version);
    }
}

#[tokio::test]
async fn projection_staleness_is_bounded_by_ttl() {
    let mut config = test_config();
    config.cache.full_projection_ttl_seconds = 1;
    let (manager, auction_id, _) = setup(&config, 100.0).await;

    // populate the cache, then move the price
    let before = manager.get_full_projection(auction_id).await.unwrap();
    assert_eq!(before.auction.price, 100.0);

    manager
        .place_bid(auction_id, 150.0, UserId::new(), "Alice", None)
        .await
        .unwrap();

    // the projection may serve the pre-bid price for at most one TTL
    tokio::time::sleep(std::time::Duration::from_millis(1200)).await;

    let after = manager.get_full_projection(auction_id).await.unwrap();
    assert_eq!(after.auction.price, 150.0);
    assert_eq!(after.auction.version, 1);
}

#[tokio::test]
async fn recent_bids_never_show_a_regressed_price() {
    let (manager, auction_id, _) = setup(&test_config(), 100.0).await;

    for amount in [110.0, 120.0, 130.0] {
        manager
            .place_bid(auction_id, amount, UserId::new(), "bidder", None)
            .await
            .unwrap();
        // every read between writes sees a newest-first, non-increasing
        // sequence
        let bids = manager.get_recent_bids(auction_id).await.unwrap();
        for pair in bids.windows(2) {
            assert!(pair[0].amount >= pair[1].amount);
            assert!(pair[0].version_at_bid_time > pair[1].version_at_bid_time);
        }
        assert_eq!(bids[0].amount, amount);
    }
}
