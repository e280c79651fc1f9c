//! # Domain Value Objects
//!
//! Immutable value types for the Dutch auction.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Amount in the smallest currency unit.
pub type Amount = u128;

/// Discrete clock step (e.g. block height).
pub type Step = u64;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Account identity (20-byte address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Principal(pub [u8; 20]);

impl Principal {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Build an address whose low 8 bytes hold `value` (big-endian).
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Check for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self)
    }
}

impl FromStr for Principal {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Reference to the item under auction in an external asset registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// Registry (collection) address.
    pub registry: Principal,
    /// Token identifier inside the registry.
    pub token_id: u64,
}

impl AssetRef {
    /// Create a new asset reference.
    pub fn new(registry: Principal, token_id: u64) -> Self {
        Self { registry, token_id }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.registry, self.token_id)
    }
}

/// Deterministic auction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuctionId(pub Hash);

impl AuctionId {
    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuctionId({}..)", self.short())
    }
}

/// Auction state machine.
///
/// `Open -> Sold` on a clearing bid, `Open -> Expired` once the clock passes
/// the deadline. Both targets are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionStatus {
    /// Accepting bids.
    #[default]
    Open,
    /// A bid cleared; asset and funds moved.
    Sold,
    /// Deadline passed without a sale.
    Expired,
}

impl AuctionStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: AuctionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Sold) | (Self::Open, Self::Expired)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sold | Self::Expired)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::Sold => "Sold",
            Self::Expired => "Expired",
        };
        f.write_str(name)
    }
}

/// Result of a clearing bid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// Auction that settled.
    pub auction_id: AuctionId,
    /// Winning bidder.
    pub buyer: Principal,
    /// Price at the step of the winning bid.
    pub sale_price: Amount,
    /// Amount credited to the seller.
    pub paid_to_seller: Amount,
    /// Amount returned to the buyer above the sale price.
    pub refunded_excess: Amount,
    /// Step of the winning bid.
    pub step: Step,
}
