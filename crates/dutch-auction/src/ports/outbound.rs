//! # Outbound Ports
//!
//! Traits for the collaborators the auction drives: the clock, the asset
//! registry, the value ledger and the event sink.
//!
//! Custody and payment follow a prepare/commit protocol. `prepare_*` is the
//! only fallible step and reserves the effect so nothing else can invalidate
//! it; `commit_*` and `abort_*` cannot fail.

use crate::domain::{Amount, AssetRef, CustodyError, Principal, Step, TransferError};
use crate::events::AuctionEvent;

/// Monotonic step counter (block height or equivalent).
pub trait Clock: Send + Sync {
    /// Current step.
    fn now(&self) -> Step;
}

/// A reserved ownership transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use = "a reservation must be committed or aborted"]
pub struct CustodyReservation {
    /// Asset being moved.
    pub asset: AssetRef,
    /// Current holder.
    pub from: Principal,
    /// New holder.
    pub to: Principal,
}

/// Asset registry - outbound port.
///
/// The custodian acts on behalf of the auction, which must hold transfer
/// authority (an approval) over the asset.
pub trait AssetCustodian: Send + Sync {
    /// Identity transfers are made under.
    fn operator(&self) -> Principal;

    /// Check that `owner` holds `asset` and the operator may move it.
    fn check_authority(&self, asset: &AssetRef, owner: &Principal) -> Result<(), CustodyError>;

    /// Reserve a transfer of `asset` from `from` to `to`.
    fn prepare_transfer(
        &self,
        asset: &AssetRef,
        from: &Principal,
        to: &Principal,
    ) -> Result<CustodyReservation, CustodyError>;

    /// Apply a reserved transfer.
    fn commit_transfer(&self, reservation: CustodyReservation);

    /// Release a reserved transfer without applying it.
    fn abort_transfer(&self, reservation: CustodyReservation);

    /// One-shot transfer.
    fn transfer(
        &self,
        asset: &AssetRef,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), CustodyError> {
        let reservation = self.prepare_transfer(asset, from, to)?;
        self.commit_transfer(reservation);
        Ok(())
    }
}

/// A reserved payout from one bidder's escrow share.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use = "a reservation must be committed or aborted"]
pub struct PaymentReservation {
    /// Bidder whose attached value is drawn.
    pub from: Principal,
    /// Receiver.
    pub to: Principal,
    /// Amount.
    pub amount: Amount,
}

/// Value ledger - outbound port.
///
/// Value attached to a bid sits in the auction escrow, credited to the
/// bidder that sent it, for the duration of the call. Every payout draws
/// from exactly one bidder's share.
pub trait ValueTransfer: Send + Sync {
    /// Unreserved value `bidder` holds in escrow.
    fn attached(&self, bidder: &Principal) -> Amount;

    /// Reserve `amount` of `from`'s escrow share for `to`.
    fn prepare_payment(
        &self,
        from: &Principal,
        to: &Principal,
        amount: Amount,
    ) -> Result<PaymentReservation, TransferError>;

    /// Credit a reserved payout.
    fn commit_payment(&self, reservation: PaymentReservation);

    /// Release a reserved payout back to the payer's share.
    fn abort_payment(&self, reservation: PaymentReservation);

    /// Return `amount` of a bidder's attached value to them.
    fn refund(&self, to: &Principal, amount: Amount) -> Result<(), TransferError>;

    /// One-shot payout.
    fn pay(&self, from: &Principal, to: &Principal, amount: Amount) -> Result<(), TransferError> {
        let reservation = self.prepare_payment(from, to, amount)?;
        self.commit_payment(reservation);
        Ok(())
    }
}

/// Observable auction events - outbound port.
pub trait AuctionEventSink: Send + Sync {
    /// Emit an event. Must not fail the calling operation.
    fn emit(&self, event: AuctionEvent);
}
