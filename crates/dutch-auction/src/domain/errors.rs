//! # Domain Errors
//!
//! Error types for the Dutch auction.
//!
//! Every variant of [`AuctionError`] is the rejection of a single call. None of
//! them leave the auction record partially updated.

use super::value_objects::{Amount, AssetRef, Principal, Step};
use thiserror::Error;

/// Auction error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    /// The seller tried to bid on their own auction.
    #[error("Seller cannot bid on own auction")]
    SellerCannotBid,

    /// The item has already been sold to someone else.
    #[error("Auction closed: item already sold")]
    AuctionClosed,

    /// The bidding window is over.
    #[error("Auction expired at step {end}, current step {now}")]
    AuctionExpired {
        /// Step of the call.
        now: Step,
        /// Last biddable step.
        end: Step,
    },

    /// The recorded winner submitted another bid.
    #[error("Bidder already purchased this item")]
    AlreadyPurchased,

    /// The bid claims more value than the bidder attached to escrow.
    #[error("Unattached value: offered {offered}, attached {attached}")]
    UnattachedValue {
        /// Value claimed by the bid.
        offered: Amount,
        /// Value the bidder actually holds in escrow.
        attached: Amount,
    },

    /// The offered value does not cover the current price.
    #[error("Insufficient value: offered {offered}, required {required}")]
    InsufficientValue {
        /// Value attached to the bid.
        offered: Amount,
        /// Price at the step of the bid.
        required: Amount,
    },

    /// The asset registry refused the ownership transfer.
    #[error("Asset transfer failed: {0}")]
    AssetTransferFailed(#[source] CustodyError),

    /// The value ledger refused the payment.
    #[error("Payment transfer failed: {0}")]
    PaymentTransferFailed(#[source] TransferError),

    /// The attached value could not be returned to the bidder.
    #[error("Refund failed: {0}")]
    RefundFailed(#[source] TransferError),

    /// The clock reads earlier than the auction start.
    #[error("Auction not started: current step {now}, start step {start}")]
    BeforeStart {
        /// Step of the call.
        now: Step,
        /// Step recorded at creation.
        start: Step,
    },

    /// Construction parameters were rejected.
    #[error("Invalid auction parameters: {0}")]
    InvalidParameters(String),

    /// `reserve_price + duration_steps * price_decrement` does not fit.
    #[error("Initial price overflows")]
    PriceOverflow,

    /// A state transition that the state machine forbids.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted status.
        to: String,
    },
}

impl AuctionError {
    /// Short machine-friendly tag, used in events and RPC responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SellerCannotBid => "seller_cannot_bid",
            Self::AuctionClosed => "auction_closed",
            Self::AuctionExpired { .. } => "auction_expired",
            Self::AlreadyPurchased => "already_purchased",
            Self::UnattachedValue { .. } => "unattached_value",
            Self::InsufficientValue { .. } => "insufficient_value",
            Self::AssetTransferFailed(_) => "asset_transfer_failed",
            Self::PaymentTransferFailed(_) => "payment_transfer_failed",
            Self::RefundFailed(_) => "refund_failed",
            Self::BeforeStart { .. } => "before_start",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::PriceOverflow => "price_overflow",
            Self::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

/// Asset registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// No such token in the registry.
    #[error("Unknown asset: {0}")]
    UnknownAsset(AssetRef),

    /// `from` is not the current holder.
    #[error("{claimed} is not the owner of {asset}")]
    NotOwner {
        /// Asset in question.
        asset: AssetRef,
        /// Principal that claimed ownership.
        claimed: Principal,
    },

    /// The operator holds no transfer authority over the asset.
    #[error("{operator} is not approved for {asset}")]
    NotApproved {
        /// Asset in question.
        asset: AssetRef,
        /// Principal attempting the transfer.
        operator: Principal,
    },

    /// The asset is reserved by a pending settlement.
    #[error("Asset locked by pending transfer: {0}")]
    AssetLocked(AssetRef),

    /// Minting cap reached.
    #[error("Supply exhausted: max {max}")]
    SupplyExhausted {
        /// Registry supply cap.
        max: u64,
    },

    /// Transfers to the zero address are burns and not allowed here.
    #[error("Zero address not allowed")]
    ZeroAddress,
}

/// Value ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The payer's escrow share holds less than requested.
    #[error("Insufficient escrow for {owner}: available {available}, requested {requested}")]
    InsufficientEscrow {
        /// Bidder whose attached value is drawn.
        owner: Principal,
        /// Unreserved escrow held for `owner`.
        available: Amount,
        /// Requested amount.
        requested: Amount,
    },

    /// Account holds less than requested.
    #[error("Insufficient balance for {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Debited account.
        account: Principal,
        /// Balance.
        available: Amount,
        /// Requested amount.
        requested: Amount,
    },

    /// The receiving account rejects incoming value.
    #[error("Account frozen: {0}")]
    AccountFrozen(Principal),

    /// Balance arithmetic overflow.
    #[error("Balance overflow")]
    Overflow,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value was present but could not be used.
    #[error("Invalid config value for {key}: {value}")]
    InvalidValue {
        /// Config key.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// Tracing subscriber could not be installed.
    #[error("Tracing init failed: {0}")]
    TracingInit(String),
}
