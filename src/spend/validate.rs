//! SpendValidator - permissibility checks and fee computation.
//!
//! Single-destination checks run in a fixed order, each short-circuiting:
//! address syntax, amount present, dust minimum, self-payment, spendable
//! ceiling. Multi-output protocol requests add expiry, per-output dust, and
//! the two resumable warnings (address reuse, uncertified identity).
//!
//! Amounts are never clamped: an out-of-range spend is rejected with the
//! specific reason so the caller can surface it.

use chrono::Utc;

use crate::config::FeePolicy;
use crate::request::protocol::ProtocolRequest;
use crate::wallet::{self, Network, WalletBackend, WalletLimits};

use super::{
    AttemptOverrides, FeeTier, ProtocolVerdict, SpendError, SpendIntent, SpendWarning,
    ValidatedSpend,
};

pub struct SpendValidator {
    network: Network,
}

impl SpendValidator {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn validate(
        &self,
        intent: &SpendIntent,
        limits: &WalletLimits,
        wallet: &dyn WalletBackend,
        policy: &FeePolicy,
    ) -> Result<ValidatedSpend, SpendError> {
        if !wallet::address_is_valid(&intent.address, self.network) {
            return Err(SpendError::InvalidAddress);
        }
        if intent.amount_sat == 0 {
            return Err(SpendError::NoAmount);
        }
        if intent.amount_sat < limits.min_output_sat {
            return Err(SpendError::BelowMinimum { min_sat: limits.min_output_sat });
        }
        if wallet.contains_address(&intent.address) {
            return Err(SpendError::SelfPayment);
        }
        if intent.amount_sat > limits.max_spendable_sat {
            return Err(SpendError::InsufficientFunds {
                max_spendable_sat: limits.max_spendable_sat,
            });
        }

        let rate = policy.rate_for(intent.fee_tier);
        wallet.set_fee_per_kb(rate);
        let fee_sat = wallet.estimate_fee(intent.amount_sat, rate);
        tracing::debug!(amount_sat = intent.amount_sat, fee_sat, rate, "spend validated");

        Ok(ValidatedSpend { intent: intent.clone(), fee_sat })
    }

    /// Validate a multi-output protocol request.
    ///
    /// `fallback_amount_sat` is the user-entered amount, applied when the
    /// request carries no amounts of its own (a zero-total request lets the
    /// payer choose). Warnings already allowed in `overrides` are not
    /// re-raised; an attempt remembers each decision independently.
    pub fn validate_protocol(
        &self,
        request: &ProtocolRequest,
        fallback_amount_sat: Option<u64>,
        fee_tier: FeeTier,
        limits: &WalletLimits,
        wallet: &dyn WalletBackend,
        policy: &FeePolicy,
        overrides: &AttemptOverrides,
    ) -> Result<ProtocolVerdict, SpendError> {
        if request.is_expired_at(Utc::now()) {
            return Err(SpendError::Expired);
        }

        let address = request.primary_address().ok_or(SpendError::InvalidAddress)?;
        if !wallet::address_is_valid(address, self.network) {
            return Err(SpendError::InvalidAddress);
        }
        if wallet.contains_address(address) {
            return Err(SpendError::SelfPayment);
        }
        if wallet.address_is_used(address) && !overrides.ignore_used_address {
            return Ok(ProtocolVerdict::NeedsConfirmation(SpendWarning::UsedAddress));
        }
        if request.identity_unverified() && !overrides.ignore_uncertified_identity {
            let message = request.error_message.clone().unwrap_or_default();
            return Ok(ProtocolVerdict::NeedsConfirmation(
                SpendWarning::IdentityNotCertified { message },
            ));
        }

        let total_sat = request.total_sat();
        let amount_sat = match (total_sat, fallback_amount_sat) {
            // Zero-amount request: the payer chooses; run the regular checks.
            (0, Some(amount)) => {
                let intent = SpendIntent {
                    address: address.to_string(),
                    amount_sat: amount,
                    memo: request.memo.clone(),
                    fee_tier,
                };
                return self.validate(&intent, limits, wallet, policy).map(ProtocolVerdict::Approved);
            }
            (0, None) => return Err(SpendError::RequestTooSmall { min_sat: limits.min_output_sat }),
            (total, _) => total,
        };

        if amount_sat < limits.min_output_sat {
            return Err(SpendError::RequestTooSmall { min_sat: limits.min_output_sat });
        }
        if request
            .outputs
            .iter()
            .any(|o| o.amount_sat > 0 && o.amount_sat < limits.min_output_sat)
        {
            return Err(SpendError::OutputTooSmall { min_sat: limits.min_output_sat });
        }
        if amount_sat > limits.max_spendable_sat {
            return Err(SpendError::InsufficientFunds {
                max_spendable_sat: limits.max_spendable_sat,
            });
        }

        let rate = policy.rate_for(fee_tier);
        wallet.set_fee_per_kb(rate);
        let fee_sat = wallet.estimate_fee(amount_sat, rate);
        tracing::debug!(
            outputs = request.outputs.len(),
            amount_sat,
            fee_sat,
            "protocol request validated"
        );

        Ok(ProtocolVerdict::Approved(ValidatedSpend {
            intent: SpendIntent {
                address: address.to_string(),
                amount_sat,
                memo: request.memo.clone(),
                fee_tier,
            },
            fee_sat,
        }))
    }
}
