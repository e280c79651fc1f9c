//! Dutch Auction Service
//!
//! Main service implementing `DutchAuctionApi`.
//!
//! A bid runs as one critical section under the record lock:
//! 1. Check the claimed value against the bidder's escrow share, then admit
//!    the bid against the stored record
//! 2. Reserve the asset transfer and the payouts
//! 3. Stage the `Sold` record on a copy
//! 4. Commit the reservations
//! 5. Swap the staged record in and announce the sale
//!
//! Any failure before step 4 leaves the record untouched and returns the
//! attached value to the bidder.
//!
//! Once expiry has been announced no later call can sell the asset, whatever
//! step it carries, even when the `Expired` status is not persisted.

use crate::algorithms::{admit_bid, SettlementCoordinator};
use crate::config::AuctionConfig;
use crate::domain::{
    invariant_monotonic_transition, invariant_sale_price_floor, invariant_status_consistency,
    Amount, Auction, AuctionError, AuctionId, AuctionParams, AuctionSnapshot, AuctionStatus,
    Principal, SaleReceipt, Step,
};
use crate::events::AuctionEvent;
use crate::ports::inbound::DutchAuctionApi;
use crate::ports::outbound::{AssetCustodian, AuctionEventSink, Clock, ValueTransfer};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Collaborators the service drives.
#[derive(Clone)]
pub struct AuctionPorts {
    /// Step source.
    pub clock: Arc<dyn Clock>,
    /// Asset registry, acting as the auction.
    pub custodian: Arc<dyn AssetCustodian>,
    /// Escrow and balances.
    pub ledger: Arc<dyn ValueTransfer>,
    /// Event output.
    pub events: Arc<dyn AuctionEventSink>,
}

#[derive(Debug)]
struct AuctionCell {
    auction: Auction,
    expiry_announced: bool,
}

/// Dutch Auction Service
///
/// Owns one auction record. Calls on one instance are serialized by an
/// internal lock, so the service can be shared across threads.
pub struct DutchAuctionService {
    cell: Mutex<AuctionCell>,
    ports: AuctionPorts,
    config: AuctionConfig,
}

impl DutchAuctionService {
    /// Open an auction with the given parameters.
    pub fn open(
        params: AuctionParams,
        ports: AuctionPorts,
        config: AuctionConfig,
    ) -> Result<Self, AuctionError> {
        config
            .validate()
            .map_err(|e| AuctionError::InvalidParameters(e.to_string()))?;
        let auction = Auction::new(params, config.max_duration_steps)?;

        if let Err(e) = ports
            .custodian
            .check_authority(&auction.asset(), &auction.seller())
        {
            // Approval may legitimately follow creation.
            warn!(
                auction = %auction.id().short(),
                "[auction] Opened without transfer authority: {}", e
            );
        }

        info!(
            auction = %auction.id().short(),
            seller = %auction.seller(),
            asset = %auction.asset(),
            initial_price = auction.initial_price(),
            reserve_price = auction.reserve_price(),
            end_step = auction.end_step(),
            "[auction] Auction opened"
        );

        ports.events.emit(AuctionEvent::Opened {
            auction_id: auction.id(),
            seller: auction.seller(),
            asset: auction.asset(),
            initial_price: auction.initial_price(),
            reserve_price: auction.reserve_price(),
            start_step: auction.start_step(),
            end_step: auction.end_step(),
        });

        Ok(Self {
            cell: Mutex::new(AuctionCell {
                auction,
                expiry_announced: false,
            }),
            ports,
            config,
        })
    }

    /// Open an auction starting at the clock's current step.
    ///
    /// `params.start_step` is replaced.
    pub fn open_now(
        mut params: AuctionParams,
        ports: AuctionPorts,
        config: AuctionConfig,
    ) -> Result<Self, AuctionError> {
        params.start_step = ports.clock.now();
        Self::open(params, ports, config)
    }

    /// Submit a bid at the clock's current step.
    pub fn submit_bid_now(
        &self,
        bidder: Principal,
        offered_value: Amount,
    ) -> Result<SaleReceipt, AuctionError> {
        let now_step = self.ports.clock.now();
        self.submit_bid(bidder, offered_value, now_step)
    }

    /// Record expiry if the deadline has passed with no sale.
    ///
    /// Returns `true` if this call announced the expiry.
    pub fn observe_expiry(&self, now_step: Step) -> bool {
        let mut cell = self.cell.lock();
        self.promote_expiry(&mut cell, now_step)
    }

    /// Auction identifier.
    pub fn id(&self) -> AuctionId {
        self.cell.lock().auction.id()
    }

    /// Active configuration.
    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    /// Opening price.
    pub fn initial_price(&self) -> Amount {
        self.cell.lock().auction.initial_price()
    }

    /// Last biddable step.
    pub fn end_step(&self) -> Step {
        self.cell.lock().auction.end_step()
    }

    /// Whether a bid at `now_step` could still clear.
    pub fn is_open(&self, now_step: Step) -> bool {
        let cell = self.cell.lock();
        !cell.expiry_announced && cell.auction.is_open(now_step)
    }

    /// Steps left before the deadline.
    pub fn remaining_steps(&self, now_step: Step) -> Step {
        self.cell.lock().auction.remaining_steps(now_step)
    }

    /// Whether the seller still holds the asset and the auction may move it.
    pub fn custody_ready(&self) -> bool {
        let cell = self.cell.lock();
        cell.auction.status() == AuctionStatus::Open
            && !cell.expiry_announced
            && self
                .ports
                .custodian
                .check_authority(&cell.auction.asset(), &cell.auction.seller())
                .is_ok()
    }

    fn settle(
        &self,
        cell: &mut AuctionCell,
        bidder: Principal,
        offered_value: Amount,
        attached: Amount,
        now_step: Step,
    ) -> Result<SaleReceipt, AuctionError> {
        if offered_value > attached {
            return Err(AuctionError::UnattachedValue {
                offered: offered_value,
                attached,
            });
        }
        if cell.expiry_announced && bidder != cell.auction.seller() {
            return Err(AuctionError::AuctionExpired {
                now: now_step,
                end: cell.auction.end_step(),
            });
        }

        let admission = admit_bid(
            &cell.auction,
            bidder,
            offered_value,
            now_step,
            self.config.excess_policy,
        )?;
        debug!(
            auction = %cell.auction.id().short(),
            bidder = %bidder,
            price = admission.price,
            "[auction] Bid admitted"
        );

        let custodian = self.ports.custodian.as_ref();
        let ledger = self.ports.ledger.as_ref();

        let mut coordinator = SettlementCoordinator::new(&cell.auction, bidder, admission, now_step);
        coordinator.prepare(custodian, ledger)?;

        let mut staged = cell.auction.clone();
        if let Err(e) = staged.settle(bidder, admission.price) {
            coordinator.abort(custodian, ledger);
            return Err(e);
        }

        let receipt = match coordinator.commit(custodian, ledger) {
            Ok(receipt) => receipt,
            Err(e) => {
                coordinator.abort(custodian, ledger);
                return Err(e);
            }
        };

        debug_assert!(invariant_monotonic_transition(
            cell.auction.status(),
            staged.status()
        ));
        cell.auction = staged;
        debug_assert!(invariant_status_consistency(&cell.auction));
        debug_assert!(invariant_sale_price_floor(&cell.auction));

        info!(
            auction = %cell.auction.id().short(),
            buyer = %bidder,
            price = receipt.sale_price,
            paid = receipt.paid_to_seller,
            step = now_step,
            "[auction] Sold"
        );

        self.ports.events.emit(AuctionEvent::BidAccepted {
            auction_id: receipt.auction_id,
            seller: cell.auction.seller(),
            buyer: bidder,
            price: receipt.sale_price,
            paid: receipt.paid_to_seller,
            step: now_step,
        });

        Ok(receipt)
    }

    fn reject(
        &self,
        cell: &mut AuctionCell,
        bidder: Principal,
        offered_value: Amount,
        refund: Amount,
        now_step: Step,
        reason: AuctionError,
    ) -> AuctionError {
        if matches!(reason, AuctionError::AuctionExpired { .. }) {
            self.promote_expiry(cell, now_step);
        }

        if refund > 0 {
            if let Err(e) = self.ports.ledger.refund(&bidder, refund) {
                error!(
                    auction = %cell.auction.id().short(),
                    bidder = %bidder,
                    offered = offered_value,
                    refund,
                    reason = %reason,
                    "[auction] Refund failed: {}", e
                );
                return AuctionError::RefundFailed(e);
            }
        }

        warn!(
            auction = %cell.auction.id().short(),
            bidder = %bidder,
            offered = offered_value,
            step = now_step,
            "[auction] Bid rejected: {}", reason
        );

        self.ports.events.emit(AuctionEvent::BidRejected {
            auction_id: cell.auction.id(),
            bidder,
            offered: offered_value,
            step: now_step,
            reason: reason.kind().to_string(),
        });

        reason
    }

    fn promote_expiry(&self, cell: &mut AuctionCell, now_step: Step) -> bool {
        if cell.expiry_announced || cell.auction.observed_status(now_step) != AuctionStatus::Expired
        {
            return false;
        }
        if self.config.persist_expiry {
            cell.auction.expire();
        }
        cell.expiry_announced = true;

        info!(
            auction = %cell.auction.id().short(),
            step = now_step,
            persisted = self.config.persist_expiry,
            "[auction] Expired unsold"
        );
        self.ports.events.emit(AuctionEvent::Expired {
            auction_id: cell.auction.id(),
            seller: cell.auction.seller(),
            step: now_step,
        });
        true
    }
}

impl DutchAuctionApi for DutchAuctionService {
    fn submit_bid(
        &self,
        bidder: Principal,
        offered_value: Amount,
        now_step: Step,
    ) -> Result<SaleReceipt, AuctionError> {
        let mut cell = self.cell.lock();
        let attached = self.ports.ledger.attached(&bidder);
        match self.settle(&mut cell, bidder, offered_value, attached, now_step) {
            Ok(receipt) => Ok(receipt),
            Err(reason) => {
                // Only what the bidder actually sent goes back.
                let refund = offered_value.min(attached);
                Err(self.reject(&mut cell, bidder, offered_value, refund, now_step, reason))
            }
        }
    }

    fn current_price(&self, now_step: Step) -> Result<Amount, AuctionError> {
        self.cell.lock().auction.current_price(now_step)
    }

    fn status(&self) -> AuctionStatus {
        self.cell.lock().auction.status()
    }

    fn observed_status(&self, now_step: Step) -> AuctionStatus {
        self.cell.lock().auction.observed_status(now_step)
    }

    fn buyer(&self) -> Option<Principal> {
        self.cell.lock().auction.buyer()
    }

    fn seller(&self) -> Principal {
        self.cell.lock().auction.seller()
    }

    fn sale_price(&self) -> Option<Amount> {
        self.cell.lock().auction.sale_price()
    }

    fn snapshot(&self) -> AuctionSnapshot {
        self.cell.lock().auction.snapshot()
    }
}
