//! # Auction Events
//!
//! Observable outcomes of auction calls, published through an
//! [`AuctionEventSink`](crate::ports::AuctionEventSink).

use crate::domain::{Amount, AssetRef, AuctionId, Principal, Step};
use serde::{Deserialize, Serialize};

/// Auction event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// Auction created and open for bids.
    Opened {
        /// Auction.
        auction_id: AuctionId,
        /// Seller.
        seller: Principal,
        /// Item under auction.
        asset: AssetRef,
        /// Price at the start step.
        initial_price: Amount,
        /// Price floor.
        reserve_price: Amount,
        /// First biddable step.
        start_step: Step,
        /// Last biddable step.
        end_step: Step,
    },
    /// A bid cleared and settled.
    BidAccepted {
        /// Auction.
        auction_id: AuctionId,
        /// Seller.
        seller: Principal,
        /// Winner.
        buyer: Principal,
        /// Clearing price.
        price: Amount,
        /// Amount credited to the seller.
        paid: Amount,
        /// Step of the bid.
        step: Step,
    },
    /// A bid was refused; its value was returned.
    BidRejected {
        /// Auction.
        auction_id: AuctionId,
        /// Bidder.
        bidder: Principal,
        /// Attached value.
        offered: Amount,
        /// Step of the bid.
        step: Step,
        /// Error kind.
        reason: String,
    },
    /// The deadline passed unsold.
    Expired {
        /// Auction.
        auction_id: AuctionId,
        /// Seller.
        seller: Principal,
        /// Step at which expiry was recorded.
        step: Step,
    },
}

impl AuctionEvent {
    /// Auction the event belongs to.
    pub fn auction_id(&self) -> AuctionId {
        match self {
            Self::Opened { auction_id, .. }
            | Self::BidAccepted { auction_id, .. }
            | Self::BidRejected { auction_id, .. }
            | Self::Expired { auction_id, .. } => *auction_id,
        }
    }

    /// Short event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Opened { .. } => "opened",
            Self::BidAccepted { .. } => "bid_accepted",
            Self::BidRejected { .. } => "bid_rejected",
            Self::Expired { .. } => "expired",
        }
    }
}
