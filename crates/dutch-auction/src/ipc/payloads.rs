//! IPC Payloads for the Dutch auction
//!
//! Requests carry a correlation id that is echoed in the response.

use crate::domain::{
    Amount, AuctionError, AuctionSnapshot, AuctionStatus, Principal, SaleReceipt, Step,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================
// INCOMING REQUESTS
// ============================================================

/// Auction call.
///
/// Bids are always priced at the handler's clock. For queries a missing
/// `now_step` means the clock's current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionRequest {
    /// Bid with value already attached to escrow.
    SubmitBid {
        /// Bidder.
        bidder: Principal,
        /// Attached value.
        offered_value: Amount,
    },
    /// Price query.
    CurrentPrice {
        /// Step to price at.
        #[serde(default)]
        now_step: Option<Step>,
    },
    /// Status query.
    Status {
        /// Step to observe at.
        #[serde(default)]
        now_step: Option<Step>,
    },
    /// Full record.
    Snapshot,
}

impl AuctionRequest {
    /// Method name for logs.
    pub fn method(&self) -> &'static str {
        match self {
            Self::SubmitBid { .. } => "submit_bid",
            Self::CurrentPrice { .. } => "current_price",
            Self::Status { .. } => "status",
            Self::Snapshot => "snapshot",
        }
    }
}

/// Request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionRpcRequest {
    /// Correlation ID for response tracking
    pub correlation_id: Uuid,
    /// Call
    pub request: AuctionRequest,
}

impl AuctionRpcRequest {
    /// Wrap `request` with a fresh correlation id.
    pub fn new(request: AuctionRequest) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            request,
        }
    }
}

// ============================================================
// OUTGOING RESPONSES
// ============================================================

/// Successful call result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuctionResult {
    /// Bid settled.
    Receipt(SaleReceipt),
    /// Price at the requested step.
    Price {
        /// Step priced.
        step: Step,
        /// Price.
        price: Amount,
    },
    /// Status at the requested step.
    Status {
        /// Step observed.
        step: Step,
        /// Stored status.
        status: AuctionStatus,
        /// Status as seen at `step`.
        observed: AuctionStatus,
        /// Winner, once sold.
        buyer: Option<Principal>,
        /// Clearing price, once sold.
        sale_price: Option<Amount>,
    },
    /// Full record.
    Snapshot(AuctionSnapshot),
}

/// Error description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// Machine-readable kind, e.g. `insufficient_value`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&AuctionError> for RpcError {
    fn from(e: &AuctionError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionResponse {
    /// Correlation ID from request
    pub correlation_id: Uuid,
    /// Whether the call succeeded
    pub success: bool,
    /// Result (if succeeded)
    pub result: Option<AuctionResult>,
    /// Error (if failed)
    pub error: Option<RpcError>,
}

impl AuctionResponse {
    /// Successful response.
    pub fn ok(correlation_id: Uuid, result: AuctionResult) -> Self {
        Self {
            correlation_id,
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Failed response.
    pub fn err(correlation_id: Uuid, error: RpcError) -> Self {
        Self {
            correlation_id,
            success: false,
            result: None,
            error: Some(error),
        }
    }
}
