//! # Algorithms Module
//!
//! Price decay, bid admission and two-phase settlement.

pub mod admission;
pub mod price_decay;
pub mod settlement;

pub use admission::{admit_bid, split_value, Admission};
pub use price_decay::{current_price, initial_price, price_after};
pub use settlement::{SettlementCoordinator, SettlementPhase};
