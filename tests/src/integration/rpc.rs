//! # RPC Surface Tests
//!
//! Drives an auction purely through JSON requests, as a wallet or UI would.

#[cfg(test)]
mod tests {
    use crate::integration::harness::*;
    use dutch_auction::{
        AuctionConfig, AuctionRequest, AuctionResponse, AuctionRpcHandler, AuctionRpcRequest,
        AuctionStatus,
    };
    use dutch_auction::ipc::AuctionResult;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    fn create_handler() -> (Market, AuctionRpcHandler) {
        let (market, service, _) = deploy_reference(AuctionConfig::default());
        let handler = AuctionRpcHandler::new(Arc::new(service), market.clock.clone());
        (market, handler)
    }

    fn call(handler: &AuctionRpcHandler, request: serde_json::Value) -> AuctionResponse {
        let raw = handler.handle_json(&request.to_string());
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_json_bid_flow() {
        let (market, handler) = create_handler();
        let id = Uuid::new_v4();

        market.ledger.attach(&addr(ALICE), 50).unwrap();
        let low = call(
            &handler,
            json!({
                "correlation_id": id,
                "request": { "submit_bid": { "bidder": addr(ALICE).to_string(), "offered_value": 50 } }
            }),
        );
        assert!(!low.success);
        assert_eq!(low.correlation_id, id);
        assert_eq!(low.error.unwrap().kind, "insufficient_value");
        assert_eq!(market.ledger.balance_of(&addr(ALICE)), STARTING_FUNDS);

        market.clock.mine(6);
        market.ledger.attach(&addr(ALICE), 50).unwrap();
        let ok = call(
            &handler,
            json!({
                "correlation_id": Uuid::new_v4(),
                "request": { "submit_bid": { "bidder": addr(ALICE).to_string(), "offered_value": 50 } }
            }),
        );
        assert!(ok.success, "{:?}", ok.error);
        match ok.result {
            Some(AuctionResult::Receipt(receipt)) => assert_eq!(receipt.sale_price, 50),
            other => panic!("unexpected result: {:?}", other),
        }

        let status = call(
            &handler,
            json!({ "correlation_id": Uuid::new_v4(), "request": { "status": {} } }),
        );
        match status.result {
            Some(AuctionResult::Status { status, buyer, .. }) => {
                assert_eq!(status, AuctionStatus::Sold);
                assert_eq!(buyer, Some(addr(ALICE)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_typed_requests() {
        let (_market, handler) = create_handler();
        let response = handler.handle(AuctionRpcRequest::new(AuctionRequest::CurrentPrice {
            now_step: Some(0),
        }));
        assert!(!response.success);
        assert_eq!(response.error.unwrap().kind, "before_start");

        let response = handler.handle(AuctionRpcRequest::new(AuctionRequest::Snapshot));
        match response.result {
            Some(AuctionResult::Snapshot(snapshot)) => {
                assert_eq!(snapshot.seller, addr(SELLER));
                assert_eq!(snapshot.end_step, snapshot.start_step + 10);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_bad_bidder_address() {
        let (_market, handler) = create_handler();
        let response = call(
            &handler,
            json!({
                "correlation_id": Uuid::new_v4(),
                "request": { "submit_bid": { "bidder": "0x1234", "offered_value": 1 } }
            }),
        );
        assert!(!response.success);
        assert_eq!(response.error.unwrap().kind, "bad_request");
    }
}
