//! # Domain Entities
//!
//! The auction record and its construction parameters.

use super::errors::AuctionError;
use super::value_objects::{Amount, AssetRef, AuctionId, AuctionStatus, Principal, Step};
use crate::algorithms::price_decay;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Parameters for opening an auction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Seller; owns the asset and receives payment.
    pub seller: Principal,
    /// Item under auction.
    pub asset: AssetRef,
    /// Minimum acceptable payment.
    pub reserve_price: Amount,
    /// Number of steps the auction stays open.
    pub duration_steps: Step,
    /// Price reduction per elapsed step.
    pub price_decrement: Amount,
    /// Clock value at creation.
    pub start_step: Step,
}

/// A single-asset Dutch auction.
///
/// Fields other than `status`, `buyer` and `sale_price` are fixed at
/// construction. Those three only ever change together, through
/// [`Auction::settle`] or [`Auction::expire`].
///
/// Serializes but does not deserialize: a stored record is rebuilt from its
/// [`AuctionParams`] through [`Auction::new`] so the checks there apply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Auction {
    id: AuctionId,
    seller: Principal,
    asset: AssetRef,
    reserve_price: Amount,
    duration_steps: Step,
    price_decrement: Amount,
    initial_price: Amount,
    start_step: Step,
    status: AuctionStatus,
    buyer: Option<Principal>,
    sale_price: Option<Amount>,
}

/// Serializable view of an auction at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    /// Auction identifier.
    pub id: AuctionId,
    /// Seller.
    pub seller: Principal,
    /// Item under auction.
    pub asset: AssetRef,
    /// Minimum acceptable payment.
    pub reserve_price: Amount,
    /// Number of steps the auction stays open.
    pub duration_steps: Step,
    /// Price reduction per step.
    pub price_decrement: Amount,
    /// Opening price.
    pub initial_price: Amount,
    /// Creation step.
    pub start_step: Step,
    /// Last biddable step.
    pub end_step: Step,
    /// Stored status.
    pub status: AuctionStatus,
    /// Winner, once sold.
    pub buyer: Option<Principal>,
    /// Clearing price, once sold.
    pub sale_price: Option<Amount>,
}

impl Auction {
    /// Create a new open auction.
    ///
    /// Rejects a zero duration, a duration above `max_duration_steps`, a zero
    /// seller and parameters whose opening price or deadline overflow.
    pub fn new(params: AuctionParams, max_duration_steps: Step) -> Result<Self, AuctionError> {
        if params.seller.is_zero() {
            return Err(AuctionError::InvalidParameters(
                "seller must not be the zero address".to_string(),
            ));
        }
        if params.duration_steps == 0 {
            return Err(AuctionError::InvalidParameters(
                "duration_steps must be positive".to_string(),
            ));
        }
        if params.duration_steps > max_duration_steps {
            return Err(AuctionError::InvalidParameters(format!(
                "duration_steps {} exceeds max {}",
                params.duration_steps, max_duration_steps
            )));
        }
        if params.start_step.checked_add(params.duration_steps).is_none() {
            return Err(AuctionError::InvalidParameters(
                "auction window overflows the clock".to_string(),
            ));
        }

        let initial_price = price_decay::initial_price(
            params.reserve_price,
            params.duration_steps,
            params.price_decrement,
        )?;

        Ok(Self {
            id: derive_auction_id(&params),
            seller: params.seller,
            asset: params.asset,
            reserve_price: params.reserve_price,
            duration_steps: params.duration_steps,
            price_decrement: params.price_decrement,
            initial_price,
            start_step: params.start_step,
            status: AuctionStatus::Open,
            buyer: None,
            sale_price: None,
        })
    }

    /// Auction identifier.
    pub fn id(&self) -> AuctionId {
        self.id
    }

    /// Seller.
    pub fn seller(&self) -> Principal {
        self.seller
    }

    /// Item under auction.
    pub fn asset(&self) -> AssetRef {
        self.asset
    }

    /// Minimum acceptable payment.
    pub fn reserve_price(&self) -> Amount {
        self.reserve_price
    }

    /// Number of steps the auction stays open.
    pub fn duration_steps(&self) -> Step {
        self.duration_steps
    }

    /// Price reduction per step.
    pub fn price_decrement(&self) -> Amount {
        self.price_decrement
    }

    /// Opening price: `reserve_price + duration_steps * price_decrement`.
    pub fn initial_price(&self) -> Amount {
        self.initial_price
    }

    /// Creation step.
    pub fn start_step(&self) -> Step {
        self.start_step
    }

    /// Last step at which a bid is accepted.
    pub fn end_step(&self) -> Step {
        // Checked in `new`.
        self.start_step.saturating_add(self.duration_steps)
    }

    /// Stored status.
    pub fn status(&self) -> AuctionStatus {
        self.status
    }

    /// Winner, once sold.
    pub fn buyer(&self) -> Option<Principal> {
        self.buyer
    }

    /// Clearing price, once sold.
    pub fn sale_price(&self) -> Option<Amount> {
        self.sale_price
    }

    /// Price at `now_step`.
    pub fn current_price(&self, now_step: Step) -> Result<Amount, AuctionError> {
        price_decay::current_price(self, now_step)
    }

    /// True once the clock is beyond the bidding window.
    pub fn is_past_deadline(&self, now_step: Step) -> bool {
        now_step > self.end_step()
    }

    /// Status as seen at `now_step`; an open auction past its deadline
    /// reads as `Expired` even when not yet promoted.
    pub fn observed_status(&self, now_step: Step) -> AuctionStatus {
        match self.status {
            AuctionStatus::Open if self.is_past_deadline(now_step) => AuctionStatus::Expired,
            status => status,
        }
    }

    /// Whether a bid at `now_step` could still clear.
    pub fn is_open(&self, now_step: Step) -> bool {
        now_step >= self.start_step && self.observed_status(now_step) == AuctionStatus::Open
    }

    /// Steps left before the deadline (zero once closed).
    pub fn remaining_steps(&self, now_step: Step) -> Step {
        if !self.is_open(now_step) {
            return 0;
        }
        self.end_step() - now_step
    }

    /// Record the winning bid. `Open -> Sold`.
    pub fn settle(&mut self, buyer: Principal, price: Amount) -> Result<(), AuctionError> {
        self.transition_to(AuctionStatus::Sold)?;
        self.buyer = Some(buyer);
        self.sale_price = Some(price);
        Ok(())
    }

    /// Promote to `Expired`. Returns `false` when already terminal.
    pub fn expire(&mut self) -> bool {
        self.transition_to(AuctionStatus::Expired).is_ok()
    }

    fn transition_to(&mut self, next: AuctionStatus) -> Result<(), AuctionError> {
        if !self.status.can_transition_to(next) {
            return Err(AuctionError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Serializable view.
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            id: self.id,
            seller: self.seller,
            asset: self.asset,
            reserve_price: self.reserve_price,
            duration_steps: self.duration_steps,
            price_decrement: self.price_decrement,
            initial_price: self.initial_price,
            start_step: self.start_step,
            end_step: self.end_step(),
            status: self.status,
            buyer: self.buyer,
            sale_price: self.sale_price,
        }
    }
}

/// Derive the auction ID from its creation parameters.
fn derive_auction_id(params: &AuctionParams) -> AuctionId {
    let mut hasher = Sha256::new();
    hasher.update(params.seller.as_bytes());
    hasher.update(params.asset.registry.as_bytes());
    hasher.update(params.asset.token_id.to_le_bytes());
    hasher.update(params.reserve_price.to_le_bytes());
    hasher.update(params.duration_steps.to_le_bytes());
    hasher.update(params.price_decrement.to_le_bytes());
    hasher.update(params.start_step.to_le_bytes());
    AuctionId(hasher.finalize().into())
}
