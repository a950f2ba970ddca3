//! TransactionPreparer - fee-tier selection and build handoff.
//!
//! The wallet subsystem owns UTXO selection and signing-input assembly. This
//! stage's job is to pick the fee-per-kb for the requested tier and hand the
//! backend a normalized build request. Backend failures (insufficient
//! confirmed inputs, ...) are surfaced verbatim in [`CreationError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FeePolicy;
use crate::request::protocol::ProtocolRequest;
use crate::spend::ValidatedSpend;
use crate::wallet::WalletBackend;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount_sat: u64,
}

/// Normalized input to `WalletBackend::build_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub recipients: Vec<Recipient>,
    pub fee_per_kb: u64,
    pub memo: Option<String>,
}

/// Unsigned transaction artifact returned by the wallet subsystem. Opaque to
/// the coordinator; the same artifact is retried across PIN rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub recipients: Vec<Recipient>,
    pub fee_sat: u64,
    pub fee_per_kb: u64,
    pub memo: Option<String>,
}

/// Wallet-subsystem message, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{0}")]
pub struct CreationError(pub String);

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionPreparer;

impl TransactionPreparer {
    pub fn new() -> Self {
        Self
    }

    pub fn prepare(
        &self,
        spend: &ValidatedSpend,
        policy: &FeePolicy,
        wallet: &dyn WalletBackend,
    ) -> Result<UnsignedTransaction, CreationError> {
        let request = BuildRequest {
            recipients: vec![Recipient {
                address: spend.intent.address.clone(),
                amount_sat: spend.intent.amount_sat,
            }],
            fee_per_kb: policy.rate_for(spend.intent.fee_tier),
            memo: spend.intent.memo.clone(),
        };
        self.build(&request, wallet)
    }

    /// Protocol requests keep every output, not just the primary one.
    pub fn prepare_protocol(
        &self,
        request: &ProtocolRequest,
        spend: &ValidatedSpend,
        policy: &FeePolicy,
        wallet: &dyn WalletBackend,
    ) -> Result<UnsignedTransaction, CreationError> {
        let recipients: Vec<Recipient> = request
            .outputs
            .iter()
            .filter(|o| o.amount_sat > 0)
            .map(|o| Recipient { address: o.address.clone(), amount_sat: o.amount_sat })
            .collect();
        let request = BuildRequest {
            // zero-amount request: single recipient at the validated amount
            recipients: if recipients.is_empty() {
                vec![Recipient {
                    address: spend.intent.address.clone(),
                    amount_sat: spend.intent.amount_sat,
                }]
            } else {
                recipients
            },
            fee_per_kb: policy.rate_for(spend.intent.fee_tier),
            memo: spend.intent.memo.clone(),
        };
        self.build(&request, wallet)
    }

    fn build(
        &self,
        request: &BuildRequest,
        wallet: &dyn WalletBackend,
    ) -> Result<UnsignedTransaction, CreationError> {
        wallet.set_fee_per_kb(request.fee_per_kb);
        tracing::debug!(
            recipients = request.recipients.len(),
            fee_per_kb = request.fee_per_kb,
            "handing off build request"
        );
        wallet
            .build_transaction(request)
            .map_err(|e| CreationError(e.to_string()))
    }
}
