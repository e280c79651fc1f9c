//! # Inbound Ports
//!
//! API trait defining what the auction can do.

use crate::domain::{
    Amount, AuctionError, AuctionSnapshot, AuctionStatus, Principal, SaleReceipt, Step,
};

/// Dutch auction API - inbound port.
///
/// `submit_bid` is the only mutating call; it is all-or-nothing. Every other
/// method is a side-effect-free query.
pub trait DutchAuctionApi: Send + Sync {
    /// Submit a bid carrying `offered_value` at `now_step`.
    ///
    /// The attached value is already in escrow. On rejection it is returned
    /// to `bidder` in full before the error is reported.
    fn submit_bid(
        &self,
        bidder: Principal,
        offered_value: Amount,
        now_step: Step,
    ) -> Result<SaleReceipt, AuctionError>;

    /// Price at `now_step`.
    fn current_price(&self, now_step: Step) -> Result<Amount, AuctionError>;

    /// Stored status.
    fn status(&self) -> AuctionStatus;

    /// Status as seen at `now_step`.
    fn observed_status(&self, now_step: Step) -> AuctionStatus;

    /// Winner, once sold.
    fn buyer(&self) -> Option<Principal>;

    /// Seller.
    fn seller(&self) -> Principal;

    /// Clearing price, once sold.
    fn sale_price(&self) -> Option<Amount>;

    /// Full record.
    fn snapshot(&self) -> AuctionSnapshot;
}
