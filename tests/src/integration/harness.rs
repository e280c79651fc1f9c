//! Shared wiring for integration tests.
//!
//! Mirrors a dev-chain deployment: mint the token to the seller, open the
//! auction, then approve the auction as operator.

use dutch_auction::{
    Amount, AssetRef, AuctionConfig, AuctionError, AuctionEvent, AuctionEventSink, AuctionParams,
    AuctionPorts, DutchAuctionService, InMemoryAssetRegistry, InMemoryEventLog, InMemoryLedger,
    ManualClock, Principal, SaleReceipt,
};
use std::sync::Arc;

pub const SELLER: u64 = 1;
pub const ALICE: u64 = 2;
pub const BOB: u64 = 3;
pub const CAROL: u64 = 4;
pub const AUCTION_ADDR: u64 = 0xA0;
pub const REGISTRY_ADDR: u64 = 0xC0;
pub const MAX_SUPPLY: u64 = 100;
pub const STARTING_FUNDS: Amount = 10_000;

pub fn addr(n: u64) -> Principal {
    Principal::from_low_u64(n)
}

/// Sends every event to several sinks.
pub struct FanOut(pub Vec<Arc<dyn AuctionEventSink>>);

impl AuctionEventSink for FanOut {
    fn emit(&self, event: AuctionEvent) {
        for sink in &self.0 {
            sink.emit(event.clone());
        }
    }
}

/// Registry, ledger and clock shared by the auctions of one test.
pub struct Market {
    pub registry: InMemoryAssetRegistry,
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<ManualClock>,
    pub log: Arc<InMemoryEventLog>,
    pub events: Arc<dyn AuctionEventSink>,
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

impl Market {
    pub fn new() -> Self {
        let log = Arc::new(InMemoryEventLog::new());
        Self::with_events(log.clone(), log)
    }

    pub fn with_events(log: Arc<InMemoryEventLog>, events: Arc<dyn AuctionEventSink>) -> Self {
        let ledger = Arc::new(InMemoryLedger::new(addr(AUCTION_ADDR)));
        for who in [ALICE, BOB, CAROL] {
            ledger.deposit(&addr(who), STARTING_FUNDS).unwrap();
        }
        Self {
            registry: InMemoryAssetRegistry::new(addr(REGISTRY_ADDR), MAX_SUPPLY),
            ledger,
            clock: Arc::new(ManualClock::new(1)),
            log,
            events,
        }
    }

    pub fn mint_to_seller(&self) -> AssetRef {
        let token_id = self.registry.mint(&addr(SELLER)).unwrap();
        self.registry.asset(token_id)
    }

    pub fn approve(&self, asset: &AssetRef) {
        self.registry
            .approve(&addr(SELLER), &addr(AUCTION_ADDR), asset)
            .unwrap();
    }

    pub fn ports(&self) -> AuctionPorts {
        AuctionPorts {
            clock: self.clock.clone(),
            custodian: Arc::new(self.registry.custodian_for(addr(AUCTION_ADDR))),
            ledger: self.ledger.clone(),
            events: self.events.clone(),
        }
    }

    pub fn deploy(
        &self,
        asset: AssetRef,
        reserve_price: Amount,
        duration_steps: u64,
        price_decrement: Amount,
        config: AuctionConfig,
    ) -> Result<DutchAuctionService, AuctionError> {
        let params = AuctionParams {
            seller: addr(SELLER),
            asset,
            reserve_price,
            duration_steps,
            price_decrement,
            start_step: 0,
        };
        DutchAuctionService::open_now(params, self.ports(), config)
    }

    /// Send `value` with a bid at the current step.
    pub fn bid(
        &self,
        service: &DutchAuctionService,
        who: u64,
        value: Amount,
    ) -> Result<SaleReceipt, AuctionError> {
        self.ledger.attach(&addr(who), value).unwrap();
        service.submit_bid_now(addr(who), value)
    }
}

/// The reference auction: reserve 10, 10 steps, decrement 10, approved.
pub fn deploy_reference(config: AuctionConfig) -> (Market, DutchAuctionService, AssetRef) {
    let market = Market::new();
    let asset = market.mint_to_seller();
    let service = market.deploy(asset, 10, 10, 10, config).unwrap();
    market.approve(&asset);
    (market, service, asset)
}
