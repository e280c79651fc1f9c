//! Value Ledger Adapter
//!
//! In-memory account balances plus the escrow that holds value attached to
//! bids, kept per bidder so a payout can only spend its payer's share.
//! Implements the `ValueTransfer` port.

use crate::domain::{Amount, Principal, TransferError};
use crate::ports::outbound::{PaymentReservation, ValueTransfer};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Principal, Amount>,
    /// Attached value, by the bidder that sent it.
    escrow: HashMap<Principal, Amount>,
    /// Portion of each share claimed by a pending payout.
    reserved: HashMap<Principal, Amount>,
    frozen: HashSet<Principal>,
}

impl LedgerState {
    fn held(&self, owner: &Principal) -> Amount {
        self.escrow.get(owner).copied().unwrap_or(0)
    }

    fn reserved_for(&self, owner: &Principal) -> Amount {
        self.reserved.get(owner).copied().unwrap_or(0)
    }

    fn available(&self, owner: &Principal) -> Amount {
        self.held(owner).saturating_sub(self.reserved_for(owner))
    }

    fn check_credit(
        &self,
        from: &Principal,
        to: &Principal,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if self.frozen.contains(to) {
            return Err(TransferError::AccountFrozen(*to));
        }
        let available = self.available(from);
        if available < amount {
            return Err(TransferError::InsufficientEscrow {
                owner: *from,
                available,
                requested: amount,
            });
        }
        let balance = self.balances.get(to).copied().unwrap_or(0);
        balance.checked_add(amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    fn release(&mut self, owner: &Principal, amount: Amount) {
        if let Some(reserved) = self.reserved.get_mut(owner) {
            *reserved = reserved.saturating_sub(amount);
            if *reserved == 0 {
                self.reserved.remove(owner);
            }
        }
    }

    fn credit_from_escrow(&mut self, from: &Principal, to: Principal, amount: Amount) {
        if let Some(held) = self.escrow.get_mut(from) {
            *held = held.saturating_sub(amount);
            if *held == 0 {
                self.escrow.remove(from);
            }
        }
        let balance = self.balances.entry(to).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

/// In-memory value ledger.
#[derive(Debug)]
pub struct InMemoryLedger {
    escrow_account: Principal,
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Create a ledger whose escrow belongs to `escrow_account`.
    pub fn new(escrow_account: Principal) -> Self {
        Self {
            escrow_account,
            state: RwLock::new(LedgerState::default()),
        }
    }

    /// Account that owns the escrow.
    pub fn escrow_account(&self) -> Principal {
        self.escrow_account
    }

    /// Credit `amount` to `account` from outside the ledger.
    pub fn deposit(&self, account: &Principal, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.write();
        let balance = state.balances.entry(*account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TransferError::Overflow)?;
        Ok(())
    }

    /// Move `amount` from `bidder` into escrow, as sending value with a call does.
    pub fn attach(&self, bidder: &Principal, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.write();
        if state.frozen.contains(bidder) {
            return Err(TransferError::AccountFrozen(*bidder));
        }
        let available = state.balances.get(bidder).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                account: *bidder,
                available,
                requested: amount,
            });
        }
        let held = state
            .held(bidder)
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;
        state.balances.insert(*bidder, available - amount);
        state.escrow.insert(*bidder, held);
        debug!("[auction] Attached {} from {} to escrow", amount, bidder);
        Ok(())
    }

    /// Spendable balance.
    pub fn balance_of(&self, account: &Principal) -> Amount {
        self.state
            .read()
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Value held in escrow across all bidders, reserved or not.
    pub fn escrow_balance(&self) -> Amount {
        self.state
            .read()
            .escrow
            .values()
            .fold(0, |acc, v| acc.saturating_add(*v))
    }

    /// Value held in escrow for `bidder`, reserved or not.
    pub fn escrow_of(&self, bidder: &Principal) -> Amount {
        self.state.read().held(bidder)
    }

    /// Escrow not claimed by a pending payout, across all bidders.
    pub fn escrow_available(&self) -> Amount {
        let state = self.state.read();
        state
            .escrow
            .keys()
            .fold(0, |acc: Amount, owner| acc.saturating_add(state.available(owner)))
    }

    /// Sum of every balance plus escrow.
    pub fn total_value(&self) -> Amount {
        let state = self.state.read();
        state
            .balances
            .values()
            .chain(state.escrow.values())
            .fold(0, |acc: Amount, v| acc.saturating_add(*v))
    }

    /// Refuse all credits to `account`.
    pub fn freeze(&self, account: &Principal) {
        self.state.write().frozen.insert(*account);
    }

    /// Lift a freeze.
    pub fn unfreeze(&self, account: &Principal) {
        self.state.write().frozen.remove(account);
    }
}

impl ValueTransfer for InMemoryLedger {
    fn attached(&self, bidder: &Principal) -> Amount {
        self.state.read().available(bidder)
    }

    fn prepare_payment(
        &self,
        from: &Principal,
        to: &Principal,
        amount: Amount,
    ) -> Result<PaymentReservation, TransferError> {
        let mut state = self.state.write();
        state.check_credit(from, to, amount)?;
        let reserved = state.reserved_for(from) + amount;
        state.reserved.insert(*from, reserved);
        Ok(PaymentReservation {
            from: *from,
            to: *to,
            amount,
        })
    }

    fn commit_payment(&self, reservation: PaymentReservation) {
        let mut state = self.state.write();
        state.release(&reservation.from, reservation.amount);
        state.credit_from_escrow(&reservation.from, reservation.to, reservation.amount);
        debug!(
            "[auction] Paid {} from escrow of {} to {}",
            reservation.amount, reservation.from, reservation.to
        );
    }

    fn abort_payment(&self, reservation: PaymentReservation) {
        self.state
            .write()
            .release(&reservation.from, reservation.amount);
    }

    fn refund(&self, to: &Principal, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.state.write();
        if let Err(e) = state.check_credit(to, to, amount) {
            warn!("[auction] Refund of {} to {} failed: {}", amount, to, e);
            return Err(e);
        }
        state.credit_from_escrow(to, *to, amount);
        Ok(())
    }
}
