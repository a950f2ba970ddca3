//! SendCoordinator - PIN-gated signing and broadcast state machine.
//!
//! ```text
//! Idle ──send()──► AwaitingPinVerification ──verified──► AwaitingBroadcast
//!  ▲                    │        │                            │
//!  │                rejected  cancelled                       ▼
//!  │                (stay)       │                        Terminal
//!  └────────────────────────────┴────────────────────────────┘
//! ```
//!
//! One attempt in flight per coordinator: `send()` while not Idle is
//! rejected with [`CoordinatorError::Busy`]. A rejected PIN keeps the
//! coordinator in `AwaitingPinVerification` and retries the same
//! [`UnsignedTransaction`]; it is never re-prepared. Terminal outcomes are
//! reported exactly once, then the coordinator returns to Idle so the host
//! can start a fresh attempt. There is no automatic retry of publish
//! failures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::prepare::{CreationError, UnsignedTransaction};
use crate::runtime::CancelToken;

/// posix ETIMEDOUT, matching the publish-failure surface hosts already map.
const TIMEOUT_CODE: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendState {
    Idle,
    AwaitingPinVerification,
    AwaitingBroadcast,
    Terminal,
}

/// Remote rejection of a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{description} ({code})")]
pub struct PublishFailure {
    pub code: i32,
    pub description: String,
}

/// Terminal result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendOutcome {
    Success,
    CreationError(CreationError),
    PublishFailure(PublishFailure),
}

/// How an attempt ended: with a terminal outcome, or discarded by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendTermination {
    Completed(SendOutcome),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("a send attempt is already in flight")]
    Busy,
    #[error("no prepared transaction for this attempt")]
    NotPrepared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDecision {
    Verified,
    Rejected,
    Cancelled,
}

/// Host PIN prompt. Called once per entry attempt; resolves exactly once.
#[async_trait]
pub trait PinVerifier: Send + Sync {
    async fn verify_pin(&self, prompt: &str) -> PinDecision;
}

/// Host broadcast capability: signs (keys stay on the host side) and submits.
/// Resolves exactly once with the terminal outcome.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, tx: &UnsignedTransaction) -> SendOutcome;
}

pub struct SendCoordinator {
    state: watch::Sender<SendState>,
    pin_prompt: String,
    broadcast_timeout: Duration,
}

impl SendCoordinator {
    pub fn new(pin_prompt: impl Into<String>, broadcast_timeout: Duration) -> Self {
        let (state, _) = watch::channel(SendState::Idle);
        Self { state, pin_prompt: pin_prompt.into(), broadcast_timeout }
    }

    pub fn state(&self) -> SendState {
        *self.state.borrow()
    }

    /// Observe state transitions (hosts drive spinners/prompts off this).
    pub fn watch_state(&self) -> watch::Receiver<SendState> {
        self.state.subscribe()
    }

    /// Drive one prepared transaction through PIN verification and broadcast.
    ///
    /// Suspends at the PIN prompt and again at broadcast. `cancel` is
    /// honored while awaiting the PIN and discards the attempt without
    /// wallet side effects; a broadcast in flight always runs to a terminal
    /// outcome.
    pub async fn send(
        &self,
        tx: &UnsignedTransaction,
        pin: &dyn PinVerifier,
        broadcaster: &dyn Broadcaster,
        cancel: &CancelToken,
    ) -> Result<SendTermination, CoordinatorError> {
        let entered = self.state.send_if_modified(|state| {
            if *state == SendState::Idle {
                *state = SendState::AwaitingPinVerification;
                true
            } else {
                false
            }
        });
        if !entered {
            return Err(CoordinatorError::Busy);
        }

        loop {
            let decision = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("attempt cancelled while awaiting pin");
                    self.finish_idle();
                    return Ok(SendTermination::Cancelled);
                }
                decision = pin.verify_pin(&self.pin_prompt) => decision,
            };
            match decision {
                PinDecision::Verified => break,
                PinDecision::Rejected => {
                    // Same transaction, same state; only the prompt repeats.
                    tracing::debug!("pin rejected, staying in AwaitingPinVerification");
                }
                PinDecision::Cancelled => {
                    self.finish_idle();
                    return Ok(SendTermination::Cancelled);
                }
            }
        }

        self.state.send_replace(SendState::AwaitingBroadcast);
        tracing::info!(fee_sat = tx.fee_sat, "pin verified, broadcasting");

        // Cancellation is only honored before broadcast; once submitted the
        // attempt runs to a terminal outcome.
        let outcome = tokio::time::timeout(self.broadcast_timeout, broadcaster.broadcast(tx))
            .await
            .unwrap_or_else(|_| {
                SendOutcome::PublishFailure(PublishFailure {
                    code: TIMEOUT_CODE,
                    description: "broadcast timed out".to_string(),
                })
            });

        match &outcome {
            SendOutcome::Success => tracing::info!("broadcast succeeded"),
            SendOutcome::CreationError(e) => tracing::warn!(error = %e, "transaction creation failed"),
            SendOutcome::PublishFailure(e) => tracing::warn!(code = e.code, error = %e, "publish failed"),
        }

        self.state.send_replace(SendState::Terminal);
        self.finish_idle();
        Ok(SendTermination::Completed(outcome))
    }

    fn finish_idle(&self) {
        self.state.send_replace(SendState::Idle);
    }
}
