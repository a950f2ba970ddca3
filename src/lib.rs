//! Sendflow: payment-request validation and transaction-preparation core.
//!
//! A UI-free send pipeline for a Bitcoin wallet. The host owns rendering,
//! key management, and network transport; this crate owns the rules: what a
//! pasted string means, whether a spend is permissible, what fee it implies,
//! and how a PIN-gated broadcast attempt moves through its states.
//!
//! # Pipeline
//!
//! ```text
//! raw input (paste / scan / URI)
//!     │
//!     ▼
//! PaymentRequestResolver ──→ ResolvedRequest::Local | Remote(ProtocolRequest)
//!     │                                  │
//!     ▼                                  ▼
//! SpendValidator ◄───────────── validate_protocol (multi-output,
//!     │                          expiry, ignore-once warnings)
//!     ▼
//! TransactionPreparer ──→ UnsignedTransaction (built by WalletBackend)
//!     │
//!     ▼
//! SendCoordinator: Idle → AwaitingPinVerification → AwaitingBroadcast → Terminal
//! ```
//!
//! Every stage returns a typed result; nothing here logs user-facing text or
//! mutates wallet state directly. Side effects (UTXO selection, signing,
//! broadcast, remote fetch, PIN entry) go through injected capability traits:
//! [`WalletBackend`], [`RequestFetcher`], [`PinVerifier`], [`Broadcaster`].
//!
//! # Usage
//!
//! ```ignore
//! use sendflow::{SendConfig, Sender, Network, SpendIntent};
//!
//! let sender = Sender::new(SendConfig::new(Network::Bitcoin), wallet);
//! let resolved = sender.resolve("bitcoin:bc1q...?amount=0.0005", &fetcher).await?;
//! let mut attempt = sender.begin(SpendIntent::new("bc1q...", 50_000));
//! sender.validate(&mut attempt)?;
//! sender.prepare(&mut attempt)?;
//! let outcome = sender.send(&attempt, &pin, &broadcaster, &cancel).await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod logging;
pub mod prepare;
pub mod request;
pub mod runtime;
pub mod session;
pub mod spend;
pub mod wallet;

pub use config::{FeePolicy, SendConfig};
pub use coordinator::{
    Broadcaster, CoordinatorError, PinDecision, PinVerifier, PublishFailure, SendCoordinator,
    SendOutcome, SendState, SendTermination,
};
pub use prepare::{BuildRequest, CreationError, Recipient, TransactionPreparer, UnsignedTransaction};
pub use request::{
    protocol::{ProtocolOutput, ProtocolRequest},
    PaymentRequestResolver, RequestError, RequestFetcher, ResolvedRequest,
};
pub use runtime::CancelToken;
pub use session::{SendAttempt, Sender};
pub use spend::{
    validate::SpendValidator, AttemptOverrides, FeeTier, ProtocolVerdict, SpendError, SpendIntent,
    SpendWarning, ValidatedSpend,
};
pub use wallet::{Network, WalletBackend, WalletLimits};
