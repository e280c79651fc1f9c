//! # Dutch Auction
//!
//! Single-asset descending-price auction with atomic settlement.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Sell one indivisible asset at a price that falls linearly per clock step:
//! - Price starts at `reserve + duration * decrement` and floors at `reserve`
//! - The first bid that covers the current price wins
//! - Asset transfer and payment settle together or not at all
//! - Every rejected bid gets its attached value back
//!
//! ## Rejection Order
//!
//! | Check | Error |
//! |-------|-------|
//! | Value not in the bidder's escrow | `UnattachedValue` |
//! | Bidder is the seller | `SellerCannotBid` |
//! | Sold to this bidder | `AlreadyPurchased` |
//! | Sold to someone else | `AuctionClosed` |
//! | Past the deadline, or expiry already announced | `AuctionExpired` |
//! | Clock before start | `BeforeStart` |
//! | Value below price | `InsufficientValue` |
//!
//! ## Module Structure
//!
//! ```text
//! dutch-auction/
//! ├── domain/          # Auction, Principal, AssetRef, errors, invariants
//! ├── algorithms/      # Price decay, bid admission, two-phase settlement
//! ├── ports/           # DutchAuctionApi, Clock, AssetCustodian, ValueTransfer
//! ├── adapters/        # In-memory registry, ledger, clock, event sinks
//! ├── application/     # DutchAuctionService
//! └── ipc/             # JSON request handler
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod events;
pub mod ipc;
pub mod ports;
pub mod telemetry;

// Re-exports
pub use adapters::{
    BroadcastEventSink, InMemoryAssetRegistry, InMemoryEventLog, InMemoryLedger, ManualClock,
    RegistryCustodian, TracingEventSink,
};
pub use algorithms::{admit_bid, current_price, initial_price, Admission, SettlementCoordinator};
pub use application::{AuctionPorts, DutchAuctionService};
pub use config::{AuctionConfig, ExcessPolicy, LoggingConfig};
pub use domain::{
    Amount, AssetRef, Auction, AuctionError, AuctionId, AuctionParams, AuctionSnapshot,
    AuctionStatus, ConfigError, CustodyError, Principal, SaleReceipt, Step, TransferError,
};
pub use events::AuctionEvent;
pub use ipc::{AuctionRequest, AuctionResponse, AuctionRpcHandler, AuctionRpcRequest};
pub use ports::{AssetCustodian, AuctionEventSink, Clock, DutchAuctionApi, ValueTransfer};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
