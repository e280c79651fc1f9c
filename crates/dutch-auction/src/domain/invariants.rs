//! # Domain Invariants
//!
//! Business rules that hold for every observable auction record.

use super::entities::Auction;
use super::value_objects::{AuctionStatus, Step};

/// Invariant: `status == Open` iff `buyer` is unset iff `sale_price` is unset.
///
/// An expired auction also carries neither buyer nor price.
pub fn invariant_status_consistency(auction: &Auction) -> bool {
    match auction.status() {
        AuctionStatus::Open | AuctionStatus::Expired => {
            auction.buyer().is_none() && auction.sale_price().is_none()
        }
        AuctionStatus::Sold => auction.buyer().is_some() && auction.sale_price().is_some(),
    }
}

/// Invariant: the opening price never undercuts the reserve.
pub fn invariant_initial_price_floor(auction: &Auction) -> bool {
    auction.initial_price() >= auction.reserve_price()
}

/// Invariant: status never returns to `Open`.
pub fn invariant_monotonic_transition(from: AuctionStatus, to: AuctionStatus) -> bool {
    from == to || (from == AuctionStatus::Open && to.is_terminal())
}

/// Invariant: price stays within `[reserve_price, initial_price]`.
pub fn invariant_price_within_bounds(auction: &Auction, now_step: Step) -> bool {
    match auction.current_price(now_step) {
        Ok(price) => price >= auction.reserve_price() && price <= auction.initial_price(),
        // Before start there is no price to check.
        Err(_) => now_step < auction.start_step(),
    }
}

/// Invariant: a recorded sale price is a price the schedule actually offered.
pub fn invariant_sale_price_floor(auction: &Auction) -> bool {
    auction
        .sale_price()
        .map_or(true, |price| price >= auction.reserve_price())
}
