//! # Integration Test Flows
//!
//! Full auction lifecycles against the in-memory registry and ledger:
//!
//! 1. **Sale**: opening price, decay, settlement of asset and funds
//! 2. **Rejections**: every refused bid returns its value
//! 3. **Expiry**: deadline handling and the one-time expiry event
//! 4. **Rollback**: collaborator failures leave the auction open and funds intact

#[cfg(test)]
mod tests {
    use crate::integration::harness::*;
    use dutch_auction::{
        AuctionConfig, AuctionError, AuctionEvent, AuctionEventSink, AuctionStatus,
        BroadcastEventSink, Clock, CustodyError, DutchAuctionApi, ExcessPolicy, InMemoryEventLog,
        TransferError, ValueTransfer,
    };
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // =============================================================================
    // SALE
    // =============================================================================

    #[test]
    fn test_opening_price_and_sale_at_start() {
        let (market, service, asset) = deploy_reference(AuctionConfig::default());
        let start = market.clock.now();

        assert_eq!(service.initial_price(), 110);
        assert_eq!(service.current_price(start), Ok(110));

        let receipt = market.bid(&service, ALICE, 1_000).unwrap();
        assert_eq!(receipt.sale_price, 110);
        assert_eq!(service.status(), AuctionStatus::Sold);
        assert_eq!(service.buyer(), Some(addr(ALICE)));
        assert_eq!(market.registry.owner_of(&asset), Some(addr(ALICE)));
        assert_eq!(market.registry.balance_of(&addr(SELLER)), 0);
        assert_eq!(market.ledger.balance_of(&addr(SELLER)), 1_000);
    }

    #[test]
    fn test_price_decays_per_block() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        let start = market.clock.now();
        for elapsed in 0..=10u64 {
            assert_eq!(
                service.current_price(start + elapsed),
                Ok(110 - 10 * elapsed as u128)
            );
        }
        // Floor holds past the window.
        assert_eq!(service.current_price(start + 50), Ok(10));
    }

    #[test]
    fn test_late_sale_at_reserve() {
        let (market, service, asset) = deploy_reference(AuctionConfig::default());
        market.clock.mine(10);
        let receipt = market.bid(&service, BOB, 10).unwrap();
        assert_eq!(receipt.sale_price, 10);
        assert_eq!(market.registry.owner_of(&asset), Some(addr(BOB)));
    }

    #[test]
    fn test_refund_to_bidder_policy() {
        let (market, service, _) = deploy_reference(AuctionConfig {
            excess_policy: ExcessPolicy::RefundToBidder,
            ..AuctionConfig::default()
        });
        market.clock.mine(5);
        let receipt = market.bid(&service, ALICE, 1_000).unwrap();
        assert_eq!(receipt.sale_price, 60);
        assert_eq!(receipt.refunded_excess, 940);
        assert_eq!(market.ledger.balance_of(&addr(SELLER)), 60);
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS - 60);
    }

    // =============================================================================
    // REJECTIONS
    // =============================================================================

    #[test]
    fn test_insufficient_value_at_start() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        assert_eq!(
            market.bid(&service, ALICE, 10),
            Err(AuctionError::InsufficientValue {
                offered: 10,
                required: 110
            })
        );
        assert_eq!(service.status(), AuctionStatus::Open);
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);
    }

    #[test]
    fn test_closed_after_sale() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        market.bid(&service, ALICE, 1_000).unwrap();

        assert_eq!(market.bid(&service, BOB, 5_000), Err(AuctionError::AuctionClosed));
        assert_eq!(market.bid(&service, CAROL, 1), Err(AuctionError::AuctionClosed));
        assert_eq!(
            market.bid(&service, ALICE, 1_000),
            Err(AuctionError::AlreadyPurchased)
        );
        assert_eq!(market.ledger.balance_of(&addr(BOB)), STARTING_FUNDS);
        assert_eq!(market.ledger.balance_of(&addr(CAROL)), STARTING_FUNDS);
        assert_eq!(market.log.count("bid_accepted"), 1);
    }

    #[test]
    fn test_seller_excluded() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        market.ledger.deposit(&addr(SELLER), 5_000).unwrap();
        assert_eq!(
            market.bid(&service, SELLER, 5_000),
            Err(AuctionError::SellerCannotBid)
        );
        assert_eq!(market.ledger.balance_of(&addr(SELLER)), 5_000);
    }

    #[test]
    fn test_bid_must_be_backed_by_own_escrow() {
        let (market, service, asset) = deploy_reference(AuctionConfig::default());
        market.ledger.attach(&addr(ALICE), 1_000).unwrap();

        let result = service.submit_bid_now(addr(BOB), 1_000);
        assert_eq!(
            result,
            Err(AuctionError::UnattachedValue {
                offered: 1_000,
                attached: 0
            })
        );
        assert_eq!(service.buyer(), None);
        assert_eq!(market.registry.owner_of(&asset), Some(addr(SELLER)));
        assert_eq!(market.ledger.escrow_of(&addr(ALICE)), 1_000);
        assert_eq!(market.ledger.balance_of(&addr(SELLER)), 0);
        assert_eq!(market.ledger.balance_of(&addr(BOB)), STARTING_FUNDS);

        market.ledger.refund(&addr(ALICE), 1_000).unwrap();
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);
    }

    // =============================================================================
    // EXPIRY
    // =============================================================================

    #[test]
    fn test_expired_without_bids() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        market.clock.mine(11);

        let result = market.bid(&service, ALICE, 1_000);
        assert!(matches!(result, Err(AuctionError::AuctionExpired { .. })));
        assert_eq!(service.status(), AuctionStatus::Expired);
        assert!(!service.is_open(market.clock.now()));
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);

        let expired: Vec<_> = market
            .log
            .events()
            .into_iter()
            .filter(|e| matches!(e, AuctionEvent::Expired { .. }))
            .collect();
        assert_eq!(expired.len(), 1);
    }

    #[test]
    fn test_unpersisted_expiry_is_still_final() {
        let (market, service, asset) = deploy_reference(AuctionConfig {
            persist_expiry: false,
            ..AuctionConfig::default()
        });
        let start = market.clock.now();
        market.clock.mine(11);
        assert!(market.bid(&service, ALICE, 1_000).is_err());

        market.ledger.attach(&addr(BOB), 1_000).unwrap();
        assert!(matches!(
            service.submit_bid(addr(BOB), 1_000, start + 5),
            Err(AuctionError::AuctionExpired { .. })
        ));
        assert_eq!(service.buyer(), None);
        assert_eq!(market.registry.owner_of(&asset), Some(addr(SELLER)));
        assert_eq!(market.log.count("bid_accepted"), 0);
        assert_eq!(market.log.count("expired"), 1);
        assert_eq!(market.ledger.balance_of(&addr(BOB)), STARTING_FUNDS);
    }

    #[test]
    fn test_last_block_still_biddable() {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        market.clock.mine(10);
        assert_eq!(service.remaining_steps(market.clock.now()), 0);
        assert!(market.bid(&service, ALICE, 10).is_ok());
    }

    // =============================================================================
    // ROLLBACK
    // =============================================================================

    #[test]
    fn test_unapproved_auction_rejects_and_refunds() {
        let market = Market::new();
        let asset = market.mint_to_seller();
        let service = market
            .deploy(asset, 10, 10, 10, AuctionConfig::default())
            .unwrap();
        assert!(!service.custody_ready());

        assert!(matches!(
            market.bid(&service, ALICE, 1_000),
            Err(AuctionError::AssetTransferFailed(CustodyError::NotApproved { .. }))
        ));
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);

        market.approve(&asset);
        assert!(service.custody_ready());
        assert!(market.bid(&service, ALICE, 1_000).is_ok());
    }

    #[test]
    fn test_seller_moved_asset_away() {
        let (market, service, asset) = deploy_reference(AuctionConfig::default());
        market
            .registry
            .transfer_ownership(&addr(SELLER), &addr(CAROL), &asset)
            .unwrap();

        assert!(matches!(
            market.bid(&service, ALICE, 1_000),
            Err(AuctionError::AssetTransferFailed(CustodyError::NotOwner { .. }))
        ));
        assert_eq!(service.status(), AuctionStatus::Open);
        assert_eq!(market.registry.owner_of(&asset), Some(addr(CAROL)));
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);
    }

    #[test]
    fn test_frozen_seller_keeps_asset() {
        let (market, service, asset) = deploy_reference(AuctionConfig::default());
        market.ledger.freeze(&addr(SELLER));

        assert!(matches!(
            market.bid(&service, ALICE, 1_000),
            Err(AuctionError::PaymentTransferFailed(
                TransferError::AccountFrozen(_)
            ))
        ));
        assert_eq!(market.registry.owner_of(&asset), Some(addr(SELLER)));
        assert_eq!(market.registry.get_approved(&asset), Some(addr(AUCTION_ADDR)));
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);

        market.ledger.unfreeze(&addr(SELLER));
        assert!(market.bid(&service, ALICE, 1_000).is_ok());
    }

    #[test]
    fn test_two_auctions_share_registry() {
        let market = Market::new();
        let first = market.mint_to_seller();
        let second = market.mint_to_seller();
        let a = market
            .deploy(first, 10, 10, 10, AuctionConfig::default())
            .unwrap();
        let b = market
            .deploy(second, 50, 5, 1, AuctionConfig::default())
            .unwrap();
        market.approve(&first);
        market.approve(&second);
        assert_ne!(a.id(), b.id());

        market.bid(&a, ALICE, 110).unwrap();
        market.bid(&b, BOB, 55).unwrap();
        assert_eq!(market.registry.owner_of(&first), Some(addr(ALICE)));
        assert_eq!(market.registry.owner_of(&second), Some(addr(BOB)));
        assert_eq!(market.ledger.balance_of(&addr(SELLER)), 165);
    }

    // =============================================================================
    // EVENTS
    // =============================================================================

    #[tokio::test]
    async fn test_broadcast_subscriber_sees_sale() {
        let log = Arc::new(InMemoryEventLog::new());
        let broadcast = Arc::new(BroadcastEventSink::new());
        let mut rx = broadcast.subscribe();
        let sinks = vec![
            log.clone() as Arc<dyn AuctionEventSink>,
            broadcast.clone() as Arc<dyn AuctionEventSink>,
        ];
        let market = Market::with_events(log, Arc::new(FanOut(sinks)));

        let asset = market.mint_to_seller();
        let service = market
            .deploy(asset, 10, 10, 10, AuctionConfig::default())
            .unwrap();
        market.approve(&asset);
        market.bid(&service, ALICE, 500).unwrap();

        let opened = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .expect("closed");
        assert!(matches!(opened, AuctionEvent::Opened { initial_price: 110, .. }));

        let accepted = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .expect("closed");
        match accepted {
            AuctionEvent::BidAccepted { buyer, price, paid, .. } => {
                assert_eq!(buyer, addr(ALICE));
                assert_eq!(price, 110);
                assert_eq!(paid, 500);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(market.log.len(), 2);
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #[test]
        fn prop_value_is_conserved(
            bids in prop::collection::vec((ALICE..=CAROL, 0u128..200, 0u64..14), 1..12)
        ) {
            let (market, service, asset) = deploy_reference(AuctionConfig::default());
            let total = market.ledger.total_value();
            let start = market.clock.now();

            for (who, value, offset) in bids {
                market.ledger.attach(&addr(who), value).unwrap();
                let before = market.ledger.balance_of(&addr(who));
                if service.submit_bid(addr(who), value, start + offset).is_err() {
                    prop_assert_eq!(market.ledger.balance_of(&addr(who)), before + value);
                }
                prop_assert_eq!(market.ledger.escrow_balance(), 0);
                prop_assert_eq!(market.ledger.total_value(), total);
            }

            let owner = market.registry.owner_of(&asset);
            match service.buyer() {
                Some(buyer) => prop_assert_eq!(owner, Some(buyer)),
                None => prop_assert_eq!(owner, Some(addr(SELLER))),
            }
        }

        #[test]
        fn prop_seller_never_wins(value in 0u128..10_000, offset in 0u64..20) {
            let (market, service, _) = deploy_reference(AuctionConfig::default());
            market.ledger.deposit(&addr(SELLER), value).unwrap();
            market.ledger.attach(&addr(SELLER), value).unwrap();
            let step = market.clock.now() + offset;
            prop_assert_eq!(
                service.submit_bid(addr(SELLER), value, step),
                Err(AuctionError::SellerCannotBid)
            );
        }
    }
}
