//! Spend intent, limits, and the validation error/warning taxonomy.

pub mod validate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named fee-rate tier. Regular confirms next-block-ish; economy trades
/// confirmation time for a lower rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    #[default]
    Regular,
    Economy,
}

/// What the user asked to do. Immutable once constructed; consumed once per
/// send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendIntent {
    pub address: String,
    pub amount_sat: u64,
    pub memo: Option<String>,
    pub fee_tier: FeeTier,
}

impl SpendIntent {
    pub fn new(address: impl Into<String>, amount_sat: u64) -> Self {
        Self {
            address: address.into(),
            amount_sat,
            memo: None,
            fee_tier: FeeTier::default(),
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_fee_tier(mut self, tier: FeeTier) -> Self {
        self.fee_tier = tier;
        self
    }
}

/// A spend that passed every check, with its implied fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSpend {
    pub intent: SpendIntent,
    pub fee_sat: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpendError {
    #[error("destination address is not valid for this network")]
    InvalidAddress,
    #[error("no amount entered")]
    NoAmount,
    #[error("amount is below the {min_sat} satoshi minimum output")]
    BelowMinimum { min_sat: u64 },
    #[error("destination address belongs to this wallet")]
    SelfPayment,
    #[error("amount exceeds the {max_spendable_sat} satoshis spendable")]
    InsufficientFunds { max_spendable_sat: u64 },
    #[error("request total is below the {min_sat} satoshi minimum output")]
    RequestTooSmall { min_sat: u64 },
    #[error("an individual output is below the {min_sat} satoshi minimum")]
    OutputTooSmall { min_sat: u64 },
    #[error("payment request has expired")]
    Expired,
}

/// Non-fatal conditions the user may explicitly override, once each, for the
/// lifetime of an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendWarning {
    /// Destination address has received coins before.
    UsedAddress,
    /// Request is signed but the signature did not verify.
    IdentityNotCertified { message: String },
}

/// Ignore-once state carried on the in-flight attempt, never on a long-lived
/// controller. The two flags are independent: overriding one warning does
/// not silence the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttemptOverrides {
    pub ignore_used_address: bool,
    pub ignore_uncertified_identity: bool,
}

impl AttemptOverrides {
    /// Record the user's decision to proceed past `warning`.
    pub fn allow(&mut self, warning: &SpendWarning) {
        match warning {
            SpendWarning::UsedAddress => self.ignore_used_address = true,
            SpendWarning::IdentityNotCertified { .. } => self.ignore_uncertified_identity = true,
        }
    }
}

/// Outcome of protocol-request validation: either a spend ready to prepare,
/// or a resumable confirmation the caller must put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolVerdict {
    Approved(ValidatedSpend),
    NeedsConfirmation(SpendWarning),
}
