//! # Integration Tests
//!
//! Auction service wired to the in-memory registry, ledger, clock and event
//! sinks, exercised the way a host would.

#[cfg(test)]
mod harness;

mod flows;
mod rpc;
