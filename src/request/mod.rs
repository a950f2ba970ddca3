//! PaymentRequestResolver - normalize raw user input into a spend intent.
//!
//! Input arrives as free text (clipboard, scan) or a `bitcoin:` URI. The
//! resolver classifies it as a local address form or a remote protocol
//! request, fetching the latter through an injected [`RequestFetcher`].
//! Resolution is pure apart from the fetch: the same input always yields the
//! same result.

pub mod protocol;
pub mod uri;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wallet::{self, Network};
use self::protocol::ProtocolRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("empty input")]
    EmptyInput,
    #[error("not a valid address or payment request")]
    InvalidAddress,
    #[error("payment request fetch failed: {0}")]
    FetchFailed(String),
}

/// Canonical form of a resolved destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedRequest {
    /// A bare address, optionally with a URI-supplied amount and label.
    Local {
        address: String,
        amount_sat: Option<u64>,
        label: Option<String>,
    },
    /// A fetched payment-protocol request.
    Remote(ProtocolRequest),
}

/// Fetches a remote payment-protocol request. One call per resolution;
/// the future resolves exactly once.
#[async_trait]
pub trait RequestFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<ProtocolRequest>;
}

pub struct PaymentRequestResolver {
    network: Network,
}

impl PaymentRequestResolver {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// Classify input without touching the network. `Err(InvalidAddress)` is
    /// also returned for remote forms; use [`resolve`](Self::resolve) when a
    /// fetcher is available.
    pub fn resolve_local(&self, input: &str) -> Result<ResolvedRequest, RequestError> {
        match self.classify(input)? {
            Classified::Local(resolved) => Ok(resolved),
            Classified::Remote(_) => Err(RequestError::InvalidAddress),
        }
    }

    pub async fn resolve(
        &self,
        input: &str,
        fetcher: &dyn RequestFetcher,
    ) -> Result<ResolvedRequest, RequestError> {
        match self.classify(input)? {
            Classified::Local(resolved) => Ok(resolved),
            Classified::Remote(url) => {
                tracing::debug!(url = %url, "fetching remote payment request");
                let request = fetcher
                    .fetch(&url)
                    .await
                    .map_err(|e| RequestError::FetchFailed(e.to_string()))?;
                Ok(ResolvedRequest::Remote(request))
            }
        }
    }

    fn classify(&self, input: &str) -> Result<Classified, RequestError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RequestError::EmptyInput);
        }

        if let Some(parsed) = uri::parse(input) {
            if let Some(url) = parsed.request_url {
                return Ok(Classified::Remote(url));
            }
            if !wallet::address_is_valid(&parsed.address, self.network) {
                return Err(RequestError::InvalidAddress);
            }
            return Ok(Classified::Local(ResolvedRequest::Local {
                address: parsed.address,
                amount_sat: parsed.amount_sat,
                label: parsed.label.or(parsed.message),
            }));
        }

        if wallet::address_is_valid(input, self.network) {
            return Ok(Classified::Local(ResolvedRequest::Local {
                address: input.to_string(),
                amount_sat: None,
                label: None,
            }));
        }

        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(Classified::Remote(input.to_string()));
        }

        Err(RequestError::InvalidAddress)
    }
}

enum Classified {
    Local(ResolvedRequest),
    Remote(String),
}
