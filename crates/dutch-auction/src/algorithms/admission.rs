//! # Bid Admission
//!
//! Pure validation of a bid against the auction record. Decides whether the
//! bid clears and how the attached value is split, without touching state.

use crate::config::ExcessPolicy;
use crate::domain::{Amount, Auction, AuctionError, AuctionStatus, Principal, Step};

/// An admitted bid and the split of its attached value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    /// Price at the step of the bid.
    pub price: Amount,
    /// Amount owed to the seller.
    pub seller_payout: Amount,
    /// Amount returned to the bidder.
    pub excess_refund: Amount,
}

/// Validate a bid.
///
/// Checks run in a fixed order: seller, settled, deadline, price. The first
/// failing check decides the error.
pub fn admit_bid(
    auction: &Auction,
    bidder: Principal,
    offered_value: Amount,
    now_step: Step,
    policy: ExcessPolicy,
) -> Result<Admission, AuctionError> {
    if bidder == auction.seller() {
        return Err(AuctionError::SellerCannotBid);
    }

    match auction.status() {
        AuctionStatus::Open => {}
        AuctionStatus::Sold if auction.buyer() == Some(bidder) => {
            return Err(AuctionError::AlreadyPurchased)
        }
        AuctionStatus::Sold => return Err(AuctionError::AuctionClosed),
        AuctionStatus::Expired => {
            return Err(AuctionError::AuctionExpired {
                now: now_step,
                end: auction.end_step(),
            })
        }
    }

    if auction.is_past_deadline(now_step) {
        return Err(AuctionError::AuctionExpired {
            now: now_step,
            end: auction.end_step(),
        });
    }

    let price = auction.current_price(now_step)?;
    if offered_value < price {
        return Err(AuctionError::InsufficientValue {
            offered: offered_value,
            required: price,
        });
    }

    Ok(split_value(price, offered_value, policy))
}

/// Split the attached value between seller and bidder.
pub fn split_value(price: Amount, offered_value: Amount, policy: ExcessPolicy) -> Admission {
    match policy {
        ExcessPolicy::PayToSeller => Admission {
            price,
            seller_payout: offered_value,
            excess_refund: 0,
        },
        ExcessPolicy::RefundToBidder => Admission {
            price,
            seller_payout: price,
            excess_refund: offered_value.saturating_sub(price),
        },
    }
}
