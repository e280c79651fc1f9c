//! Auction and logging configuration from environment variables.

use crate::domain::{ConfigError, Step};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default upper bound on `duration_steps`.
pub const DEFAULT_MAX_DURATION_STEPS: Step = 1_000_000;

/// What happens to value attached above the clearing price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcessPolicy {
    /// The seller receives everything attached.
    #[default]
    PayToSeller,
    /// The seller receives the price; the rest goes back to the buyer.
    RefundToBidder,
}

impl fmt::Display for ExcessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayToSeller => f.write_str("pay-to-seller"),
            Self::RefundToBidder => f.write_str("refund-to-bidder"),
        }
    }
}

impl FromStr for ExcessPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pay-to-seller" | "seller" => Ok(Self::PayToSeller),
            "refund-to-bidder" | "refund" => Ok(Self::RefundToBidder),
            _ => Err(ConfigError::InvalidValue {
                key: "DA_EXCESS_POLICY",
                value: s.to_string(),
            }),
        }
    }
}

/// Auction behaviour knobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Handling of overpayment.
    pub excess_policy: ExcessPolicy,
    /// Record `Expired` on the first call past the deadline.
    pub persist_expiry: bool,
    /// Longest auction that may be opened.
    pub max_duration_steps: Step,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            excess_policy: ExcessPolicy::PayToSeller,
            persist_expiry: true,
            max_duration_steps: DEFAULT_MAX_DURATION_STEPS,
        }
    }
}

impl AuctionConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DA_EXCESS_POLICY`: `pay-to-seller` or `refund-to-bidder` (default: pay-to-seller)
    /// - `DA_PERSIST_EXPIRY`: Persist expiry on first late call (default: true)
    /// - `DA_MAX_DURATION_STEPS`: Longest allowed auction (default: 1000000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let excess_policy = match lookup("DA_EXCESS_POLICY") {
            Some(v) => v.parse()?,
            None => defaults.excess_policy,
        };

        let persist_expiry = match lookup("DA_PERSIST_EXPIRY") {
            Some(v) => parse_bool("DA_PERSIST_EXPIRY", &v)?,
            None => defaults.persist_expiry,
        };

        let max_duration_steps = match lookup("DA_MAX_DURATION_STEPS") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "DA_MAX_DURATION_STEPS",
                value: v.clone(),
            })?,
            None => defaults.max_duration_steps,
        };

        let config = Self {
            excess_policy,
            persist_expiry,
            max_duration_steps,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_duration_steps == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DA_MAX_DURATION_STEPS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error).
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl LoggingConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DA_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `DA_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("DA_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("DA_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
