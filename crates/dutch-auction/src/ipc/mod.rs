//! IPC Module for the Dutch auction
//!
//! JSON request/response surface over [`DutchAuctionService`](crate::application::DutchAuctionService).

pub mod handler;
pub mod payloads;

pub use handler::AuctionRpcHandler;
pub use payloads::*;
