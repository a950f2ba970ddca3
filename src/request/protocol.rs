//! Payment-protocol request data (BIP70-style), as parsed by the host's
//! protocol layer. Immutable once constructed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolOutput {
    pub address: String,
    pub amount_sat: u64,
}

/// A merchant payment request: ordered outputs plus signing metadata.
///
/// Expiry is a structured flag set by the parser, not a message-string to
/// match against. `error_message` is informational (e.g. a certificate
/// problem) and only ever drives the identity-not-certified warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRequest {
    pub outputs: Vec<ProtocolOutput>,
    pub memo: Option<String>,
    /// Subject common name from the request's signing certificate.
    pub common_name: Option<String>,
    /// PKI scheme ("x509+sha256", "none", ...).
    pub pki_type: String,
    pub error_message: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Set by the parser when the request was already expired at parse time.
    pub expired: bool,
}

impl ProtocolRequest {
    pub fn total_sat(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount_sat).sum()
    }

    /// First output's address: the destination shown to the user and checked
    /// for reuse/self-payment.
    pub fn primary_address(&self) -> Option<&str> {
        self.outputs.first().map(|o| o.address.as_str())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expired || self.expires_at.is_some_and(|t| t <= now)
    }

    /// A signed-looking request whose signature did not verify: non-empty
    /// error message alongside a common name, with a real PKI type.
    pub fn identity_unverified(&self) -> bool {
        let has_error = self.error_message.as_deref().is_some_and(|m| !m.is_empty());
        let has_name = self.common_name.as_deref().is_some_and(|n| !n.is_empty());
        has_error && has_name && self.pki_type != "none"
    }
}
