//! Sender - the facade a host wires its send screen to.
//!
//! Owns the resolver/validator/preparer/coordinator and the active
//! [`FeePolicy`]; tracks one [`SendAttempt`] at a time. Per-attempt state
//! (the prepared transaction, the ignore-once override flags) lives on the
//! attempt object, not here.

use std::sync::{Arc, RwLock};

use crate::config::{FeePolicy, SendConfig};
use crate::coordinator::{
    Broadcaster, CoordinatorError, PinVerifier, SendCoordinator, SendState, SendTermination,
};
use crate::prepare::{CreationError, TransactionPreparer, UnsignedTransaction};
use crate::request::{PaymentRequestResolver, RequestError, RequestFetcher, ResolvedRequest};
use crate::request::protocol::ProtocolRequest;
use crate::runtime::CancelToken;
use crate::spend::validate::SpendValidator;
use crate::spend::{
    AttemptOverrides, FeeTier, ProtocolVerdict, SpendError, SpendIntent, ValidatedSpend,
};
use crate::wallet::WalletBackend;

/// One send attempt: the intent, the user's override decisions, and the
/// artifacts produced so far. Discarded wholesale on cancel.
#[derive(Debug, Clone)]
pub struct SendAttempt {
    pub intent: SpendIntent,
    pub overrides: AttemptOverrides,
    validated: Option<ValidatedSpend>,
    unsigned: Option<UnsignedTransaction>,
}

impl SendAttempt {
    pub fn new(intent: SpendIntent) -> Self {
        Self { intent, overrides: AttemptOverrides::default(), validated: None, unsigned: None }
    }

    pub fn validated(&self) -> Option<&ValidatedSpend> {
        self.validated.as_ref()
    }

    pub fn transaction(&self) -> Option<&UnsignedTransaction> {
        self.unsigned.as_ref()
    }
}

pub struct Sender {
    config: SendConfig,
    wallet: Arc<dyn WalletBackend>,
    resolver: PaymentRequestResolver,
    validator: SpendValidator,
    preparer: TransactionPreparer,
    coordinator: SendCoordinator,
    fees: RwLock<FeePolicy>,
}

impl Sender {
    pub fn new(config: SendConfig, wallet: Arc<dyn WalletBackend>) -> Self {
        let resolver = PaymentRequestResolver::new(config.network);
        let validator = SpendValidator::new(config.network);
        let coordinator =
            SendCoordinator::new(config.pin_prompt.clone(), config.broadcast_timeout);
        let fees = RwLock::new(config.fees);
        Self {
            config,
            wallet,
            resolver,
            validator,
            preparer: TransactionPreparer::new(),
            coordinator,
            fees,
        }
    }

    /// Replace the fee policy from a rate-source event.
    pub fn apply_fee_update(&self, fees: FeePolicy) {
        tracing::debug!(
            regular = fees.regular_sat_per_kb,
            economy = fees.economy_sat_per_kb,
            "fee policy updated"
        );
        *self.fees.write().unwrap_or_else(|p| p.into_inner()) = fees;
    }

    pub fn fee_policy(&self) -> FeePolicy {
        *self.fees.read().unwrap_or_else(|p| p.into_inner())
    }

    /// Fee the wallet would pay for a candidate amount, for display before
    /// validation.
    pub fn fee_for_amount(&self, amount_sat: u64, tier: FeeTier) -> u64 {
        let rate = self.fee_policy().rate_for(tier);
        self.wallet.set_fee_per_kb(rate);
        self.wallet.estimate_fee(amount_sat, rate)
    }

    pub async fn resolve(
        &self,
        input: &str,
        fetcher: &dyn RequestFetcher,
    ) -> Result<ResolvedRequest, RequestError> {
        self.resolver.resolve(input, fetcher).await
    }

    pub fn resolve_local(&self, input: &str) -> Result<ResolvedRequest, RequestError> {
        self.resolver.resolve_local(input)
    }

    pub fn begin(&self, intent: SpendIntent) -> SendAttempt {
        SendAttempt::new(intent)
    }

    pub fn validate(&self, attempt: &mut SendAttempt) -> Result<ValidatedSpend, SpendError> {
        let limits = self.wallet.limits();
        let validated = self.validator.validate(
            &attempt.intent,
            &limits,
            self.wallet.as_ref(),
            &self.fee_policy(),
        )?;
        attempt.validated = Some(validated.clone());
        attempt.unsigned = None;
        Ok(validated)
    }

    /// Validate a protocol request against this attempt. On
    /// `NeedsConfirmation`, record the user's decision with
    /// `attempt.overrides.allow(..)` and call again; the warning is not
    /// re-raised for this attempt.
    pub fn validate_protocol(
        &self,
        request: &ProtocolRequest,
        attempt: &mut SendAttempt,
    ) -> Result<ProtocolVerdict, SpendError> {
        let limits = self.wallet.limits();
        let fallback = (attempt.intent.amount_sat > 0).then_some(attempt.intent.amount_sat);
        let verdict = self.validator.validate_protocol(
            request,
            fallback,
            attempt.intent.fee_tier,
            &limits,
            self.wallet.as_ref(),
            &self.fee_policy(),
            &attempt.overrides,
        )?;
        if let ProtocolVerdict::Approved(validated) = &verdict {
            attempt.validated = Some(validated.clone());
            attempt.unsigned = None;
        }
        Ok(verdict)
    }

    pub fn prepare(&self, attempt: &mut SendAttempt) -> Result<UnsignedTransaction, CreationError> {
        let spend = attempt
            .validated
            .as_ref()
            .ok_or_else(|| CreationError("spend has not been validated".to_string()))?;
        let tx = self.preparer.prepare(spend, &self.fee_policy(), self.wallet.as_ref())?;
        attempt.unsigned = Some(tx.clone());
        Ok(tx)
    }

    pub fn prepare_protocol(
        &self,
        request: &ProtocolRequest,
        attempt: &mut SendAttempt,
    ) -> Result<UnsignedTransaction, CreationError> {
        let spend = attempt
            .validated
            .as_ref()
            .ok_or_else(|| CreationError("spend has not been validated".to_string()))?;
        let tx =
            self.preparer.prepare_protocol(request, spend, &self.fee_policy(), self.wallet.as_ref())?;
        attempt.unsigned = Some(tx.clone());
        Ok(tx)
    }

    /// Drive the prepared attempt through PIN verification and broadcast.
    pub async fn send(
        &self,
        attempt: &SendAttempt,
        pin: &dyn PinVerifier,
        broadcaster: &dyn Broadcaster,
        cancel: &CancelToken,
    ) -> Result<SendTermination, CoordinatorError> {
        let tx = attempt.transaction().ok_or(CoordinatorError::NotPrepared)?;
        self.coordinator.send(tx, pin, broadcaster, cancel).await
    }

    pub fn state(&self) -> SendState {
        self.coordinator.state()
    }

    pub fn coordinator(&self) -> &SendCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &SendConfig {
        &self.config
    }
}
