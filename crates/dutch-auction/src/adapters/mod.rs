//! # Adapters Module
//!
//! In-memory implementations of the outbound ports.

pub mod asset_registry;
pub mod clock;
pub mod event_sinks;
pub mod ledger;

pub use asset_registry::{InMemoryAssetRegistry, RegistryCustodian};
pub use clock::ManualClock;
pub use event_sinks::{BroadcastEventSink, InMemoryEventLog, TracingEventSink};
pub use ledger::InMemoryLedger;
