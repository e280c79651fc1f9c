//! # Two-Phase Settlement
//!
//! Coordinates the asset transfer and the payouts of a clearing bid so that
//! either all of them happen or none do.
//!
//! Phase one reserves the ownership transfer and every payout. Any failure
//! releases what was already reserved. Phase two commits the reservations,
//! which the ports guarantee cannot fail.

use super::admission::Admission;
use crate::domain::{
    Amount, AssetRef, Auction, AuctionError, AuctionId, Principal, SaleReceipt, Step,
};
use crate::ports::outbound::{
    AssetCustodian, CustodyReservation, PaymentReservation, ValueTransfer,
};
use tracing::{debug, warn};

/// Settlement coordinator state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementPhase {
    /// Nothing reserved yet.
    Pending,
    /// Transfer and payouts reserved.
    Prepared,
    /// Reservations applied.
    Committed,
    /// Reservations released.
    Aborted,
}

impl SettlementPhase {
    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }
}

/// Coordinator for one clearing bid.
#[derive(Debug)]
pub struct SettlementCoordinator {
    auction_id: AuctionId,
    asset: AssetRef,
    seller: Principal,
    buyer: Principal,
    admission: Admission,
    step: Step,
    phase: SettlementPhase,
    custody: Option<CustodyReservation>,
    payments: Vec<PaymentReservation>,
}

impl SettlementCoordinator {
    /// Create a coordinator for `buyer` winning `auction` at `step`.
    pub fn new(auction: &Auction, buyer: Principal, admission: Admission, step: Step) -> Self {
        Self {
            auction_id: auction.id(),
            asset: auction.asset(),
            seller: auction.seller(),
            buyer,
            admission,
            step,
            phase: SettlementPhase::Pending,
            custody: None,
            payments: Vec::with_capacity(2),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SettlementPhase {
        self.phase
    }

    /// Total value reserved for payouts.
    pub fn reserved_value(&self) -> Amount {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Reserve the ownership transfer and the payouts.
    ///
    /// On error every reservation made so far is released and the phase
    /// becomes `Aborted`.
    pub fn prepare(
        &mut self,
        custodian: &dyn AssetCustodian,
        ledger: &dyn ValueTransfer,
    ) -> Result<(), AuctionError> {
        if self.phase != SettlementPhase::Pending {
            return Err(AuctionError::InvalidTransition {
                from: format!("{:?}", self.phase),
                to: "Prepared".to_string(),
            });
        }

        match custodian.prepare_transfer(&self.asset, &self.seller, &self.buyer) {
            Ok(reservation) => self.custody = Some(reservation),
            Err(e) => {
                warn!("[auction] Custody reservation failed for {}: {}", self.asset, e);
                self.abort(custodian, ledger);
                return Err(AuctionError::AssetTransferFailed(e));
            }
        }

        let mut payouts = vec![(self.seller, self.admission.seller_payout)];
        if self.admission.excess_refund > 0 {
            payouts.push((self.buyer, self.admission.excess_refund));
        }

        for (to, amount) in payouts {
            match ledger.prepare_payment(&self.buyer, &to, amount) {
                Ok(reservation) => self.payments.push(reservation),
                Err(e) => {
                    warn!("[auction] Payment reservation to {} failed: {}", to, e);
                    self.abort(custodian, ledger);
                    return Err(AuctionError::PaymentTransferFailed(e));
                }
            }
        }

        self.phase = SettlementPhase::Prepared;
        debug!(
            auction = %self.auction_id.short(),
            reserved = self.reserved_value(),
            "[auction] Settlement prepared"
        );
        Ok(())
    }

    /// Apply all reservations.
    pub fn commit(
        &mut self,
        custodian: &dyn AssetCustodian,
        ledger: &dyn ValueTransfer,
    ) -> Result<SaleReceipt, AuctionError> {
        if self.phase != SettlementPhase::Prepared {
            return Err(AuctionError::InvalidTransition {
                from: format!("{:?}", self.phase),
                to: "Committed".to_string(),
            });
        }

        if let Some(reservation) = self.custody.take() {
            custodian.commit_transfer(reservation);
        }
        for reservation in self.payments.drain(..) {
            ledger.commit_payment(reservation);
        }

        self.phase = SettlementPhase::Committed;
        Ok(SaleReceipt {
            auction_id: self.auction_id,
            buyer: self.buyer,
            sale_price: self.admission.price,
            paid_to_seller: self.admission.seller_payout,
            refunded_excess: self.admission.excess_refund,
            step: self.step,
        })
    }

    /// Release every reservation held. No-op once terminal.
    pub fn abort(&mut self, custodian: &dyn AssetCustodian, ledger: &dyn ValueTransfer) {
        if self.phase.is_terminal() {
            return;
        }
        if let Some(reservation) = self.custody.take() {
            custodian.abort_transfer(reservation);
        }
        for reservation in self.payments.drain(..) {
            ledger.abort_payment(reservation);
        }
        self.phase = SettlementPhase::Aborted;
    }
}
