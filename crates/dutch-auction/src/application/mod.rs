//! # Application Module
//!
//! Application service orchestrating the domain and outbound ports.

pub mod service;

pub use service::{AuctionPorts, DutchAuctionService};
