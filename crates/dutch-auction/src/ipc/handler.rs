//! IPC Handler for the Dutch auction
//!
//! Decodes requests, delegates to the service and encodes responses. Never
//! panics on malformed input.

use crate::application::DutchAuctionService;
use crate::ipc::payloads::{
    AuctionRequest, AuctionResponse, AuctionResult, AuctionRpcRequest, RpcError,
};
use crate::ports::inbound::DutchAuctionApi;
use crate::ports::outbound::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// IPC Handler for one auction.
pub struct AuctionRpcHandler {
    service: Arc<DutchAuctionService>,
    clock: Arc<dyn Clock>,
}

impl AuctionRpcHandler {
    /// Create a handler. Bids are priced at `clock`, which also fills in
    /// omitted query steps.
    pub fn new(service: Arc<DutchAuctionService>, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Handle a decoded request.
    pub fn handle(&self, envelope: AuctionRpcRequest) -> AuctionResponse {
        let correlation_id = envelope.correlation_id;
        debug!(
            correlation_id = %correlation_id,
            method = envelope.request.method(),
            "[auction] RPC request"
        );

        let outcome = match envelope.request {
            AuctionRequest::SubmitBid {
                bidder,
                offered_value,
            } => self
                .service
                .submit_bid(bidder, offered_value, self.clock.now())
                .map(AuctionResult::Receipt),
            AuctionRequest::CurrentPrice { now_step } => {
                let step = now_step.unwrap_or_else(|| self.clock.now());
                self.service
                    .current_price(step)
                    .map(|price| AuctionResult::Price { step, price })
            }
            AuctionRequest::Status { now_step } => {
                let step = now_step.unwrap_or_else(|| self.clock.now());
                let snapshot = self.service.snapshot();
                Ok(AuctionResult::Status {
                    step,
                    status: snapshot.status,
                    observed: self.service.observed_status(step),
                    buyer: snapshot.buyer,
                    sale_price: snapshot.sale_price,
                })
            }
            AuctionRequest::Snapshot => Ok(AuctionResult::Snapshot(self.service.snapshot())),
        };

        match outcome {
            Ok(result) => AuctionResponse::ok(correlation_id, result),
            Err(e) => {
                info!(
                    correlation_id = %correlation_id,
                    kind = e.kind(),
                    "[auction] RPC call failed: {}", e
                );
                AuctionResponse::err(correlation_id, RpcError::from(&e))
            }
        }
    }

    /// Handle a JSON-encoded request and return a JSON-encoded response.
    pub fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<AuctionRpcRequest>(raw) {
            Ok(envelope) => self.handle(envelope),
            Err(e) => {
                warn!("[auction] Malformed RPC request: {}", e);
                AuctionResponse::err(
                    Uuid::nil(),
                    RpcError {
                        kind: "bad_request".to_string(),
                        message: e.to_string(),
                    },
                )
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            warn!("[auction] Failed to encode RPC response: {}", e);
            r#"{"correlation_id":null,"success":false,"result":null,"error":{"kind":"internal","message":"encoding failed"}}"#
                .to_string()
        })
    }
}
