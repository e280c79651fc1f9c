//! Asset Registry Adapter
//!
//! In-memory non-fungible token registry with a capped supply, single-token
//! approvals and an `AssetCustodian` view bound to an operator.

use crate::domain::{AssetRef, CustodyError, Principal};
use crate::ports::outbound::{AssetCustodian, CustodyReservation};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryState {
    owners: HashMap<u64, Principal>,
    approvals: HashMap<u64, Principal>,
    balances: HashMap<Principal, u64>,
    locked: HashSet<u64>,
    next_token_id: u64,
}

impl RegistryState {
    fn transfer(&mut self, token_id: u64, from: Principal, to: Principal) {
        self.owners.insert(token_id, to);
        self.approvals.remove(&token_id);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance = balance.saturating_sub(1);
        }
        *self.balances.entry(to).or_insert(0) += 1;
    }
}

/// In-memory token registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Debug)]
pub struct InMemoryAssetRegistry {
    address: Principal,
    max_supply: u64,
    state: Arc<RwLock<RegistryState>>,
}

impl InMemoryAssetRegistry {
    /// Create a registry at `address` that mints at most `max_supply` tokens.
    pub fn new(address: Principal, max_supply: u64) -> Self {
        Self {
            address,
            max_supply,
            state: Arc::new(RwLock::new(RegistryState::default())),
        }
    }

    /// Registry address.
    pub fn address(&self) -> Principal {
        self.address
    }

    /// Reference to `token_id` in this registry.
    pub fn asset(&self, token_id: u64) -> AssetRef {
        AssetRef::new(self.address, token_id)
    }

    /// Mint the next token to `to`, returning its id.
    pub fn mint(&self, to: &Principal) -> Result<u64, CustodyError> {
        if to.is_zero() {
            return Err(CustodyError::ZeroAddress);
        }
        let mut state = self.state.write();
        if state.next_token_id >= self.max_supply {
            return Err(CustodyError::SupplyExhausted {
                max: self.max_supply,
            });
        }
        let token_id = state.next_token_id;
        state.next_token_id += 1;
        state.owners.insert(token_id, *to);
        *state.balances.entry(*to).or_insert(0) += 1;

        info!("[auction] Minted token #{} to {}", token_id, to);
        Ok(token_id)
    }

    /// Tokens minted so far.
    pub fn total_supply(&self) -> u64 {
        self.state.read().next_token_id
    }

    /// Current holder.
    pub fn owner_of(&self, asset: &AssetRef) -> Option<Principal> {
        if asset.registry != self.address {
            return None;
        }
        self.state.read().owners.get(&asset.token_id).copied()
    }

    /// Number of tokens held by `owner`.
    pub fn balance_of(&self, owner: &Principal) -> u64 {
        self.state
            .read()
            .balances
            .get(owner)
            .copied()
            .unwrap_or(0)
    }

    /// Grant `operator` transfer authority over `asset`.
    ///
    /// Approving the zero address revokes the current approval.
    pub fn approve(
        &self,
        owner: &Principal,
        operator: &Principal,
        asset: &AssetRef,
    ) -> Result<(), CustodyError> {
        let mut state = self.state.write();
        let holder = self.holder(&state, asset)?;
        if holder != *owner {
            return Err(CustodyError::NotOwner {
                asset: *asset,
                claimed: *owner,
            });
        }
        if operator.is_zero() {
            state.approvals.remove(&asset.token_id);
        } else {
            state.approvals.insert(asset.token_id, *operator);
        }
        debug!("[auction] Approval for {} set to {}", asset, operator);
        Ok(())
    }

    /// Approved operator, if any.
    pub fn get_approved(&self, asset: &AssetRef) -> Option<Principal> {
        if asset.registry != self.address {
            return None;
        }
        self.state.read().approvals.get(&asset.token_id).copied()
    }

    /// Whether a pending settlement holds the asset.
    pub fn is_locked(&self, asset: &AssetRef) -> bool {
        asset.registry == self.address && self.state.read().locked.contains(&asset.token_id)
    }

    /// Direct transfer by the holder. Clears any approval.
    pub fn transfer_ownership(
        &self,
        from: &Principal,
        to: &Principal,
        asset: &AssetRef,
    ) -> Result<(), CustodyError> {
        if to.is_zero() {
            return Err(CustodyError::ZeroAddress);
        }
        let mut state = self.state.write();
        let holder = self.holder(&state, asset)?;
        if holder != *from {
            return Err(CustodyError::NotOwner {
                asset: *asset,
                claimed: *from,
            });
        }
        if state.locked.contains(&asset.token_id) {
            return Err(CustodyError::AssetLocked(*asset));
        }
        state.transfer(asset.token_id, *from, *to);
        Ok(())
    }

    /// Custodian acting as `operator`.
    pub fn custodian_for(&self, operator: Principal) -> RegistryCustodian {
        RegistryCustodian {
            registry: self.clone(),
            operator,
        }
    }

    fn holder(&self, state: &RegistryState, asset: &AssetRef) -> Result<Principal, CustodyError> {
        if asset.registry != self.address {
            return Err(CustodyError::UnknownAsset(*asset));
        }
        state
            .owners
            .get(&asset.token_id)
            .copied()
            .ok_or(CustodyError::UnknownAsset(*asset))
    }

    fn check(
        &self,
        state: &RegistryState,
        operator: &Principal,
        asset: &AssetRef,
        owner: &Principal,
    ) -> Result<(), CustodyError> {
        let holder = self.holder(state, asset)?;
        if holder != *owner {
            return Err(CustodyError::NotOwner {
                asset: *asset,
                claimed: *owner,
            });
        }
        let approved = state.approvals.get(&asset.token_id) == Some(operator);
        if !approved && holder != *operator {
            return Err(CustodyError::NotApproved {
                asset: *asset,
                operator: *operator,
            });
        }
        Ok(())
    }
}

/// `AssetCustodian` over an [`InMemoryAssetRegistry`].
#[derive(Clone, Debug)]
pub struct RegistryCustodian {
    registry: InMemoryAssetRegistry,
    operator: Principal,
}

impl AssetCustodian for RegistryCustodian {
    fn operator(&self) -> Principal {
        self.operator
    }

    fn check_authority(&self, asset: &AssetRef, owner: &Principal) -> Result<(), CustodyError> {
        let state = self.registry.state.read();
        self.registry.check(&state, &self.operator, asset, owner)
    }

    fn prepare_transfer(
        &self,
        asset: &AssetRef,
        from: &Principal,
        to: &Principal,
    ) -> Result<CustodyReservation, CustodyError> {
        if to.is_zero() {
            return Err(CustodyError::ZeroAddress);
        }
        let mut state = self.registry.state.write();
        self.registry.check(&state, &self.operator, asset, from)?;
        if !state.locked.insert(asset.token_id) {
            return Err(CustodyError::AssetLocked(*asset));
        }
        Ok(CustodyReservation {
            asset: *asset,
            from: *from,
            to: *to,
        })
    }

    fn commit_transfer(&self, reservation: CustodyReservation) {
        let mut state = self.registry.state.write();
        state.locked.remove(&reservation.asset.token_id);
        state.transfer(reservation.asset.token_id, reservation.from, reservation.to);
        info!(
            "[auction] Transferred {} from {} to {}",
            reservation.asset, reservation.from, reservation.to
        );
    }

    fn abort_transfer(&self, reservation: CustodyReservation) {
        self.registry
            .state
            .write()
            .locked
            .remove(&reservation.asset.token_id);
        debug!("[auction] Released reservation on {}", reservation.asset);
    }
}
