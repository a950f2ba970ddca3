//! Wallet capability boundary.
//!
//! The core never touches keys, UTXOs, or chain state directly. Everything it
//! needs from the wallet subsystem comes through [`WalletBackend`], and the
//! balance/limit figures it validates against are a read-only [`WalletLimits`]
//! snapshot taken per attempt.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::prepare::{BuildRequest, UnsignedTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bitcoin",
            Network::Testnet => "testnet",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" => Some(Network::Bitcoin),
            "testnet" => Some(Network::Testnet),
            "signet" => Some(Network::Signet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }

    pub fn to_bitcoin(&self) -> bitcoin::Network {
        match self {
            Network::Bitcoin => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
            Network::Signet => bitcoin::Network::Signet,
            Network::Regtest => bitcoin::Network::Regtest,
        }
    }
}

/// Read-only balance/limit snapshot supplied by the wallet subsystem.
/// Refreshed per attempt; the core never caches it across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletLimits {
    /// Dust threshold: smallest output the network will relay.
    pub min_output_sat: u64,
    /// Balance minus the fee the wallet would pay to sweep it.
    pub max_spendable_sat: u64,
    pub balance_sat: u64,
}

/// Capabilities the wallet subsystem provides to the send pipeline.
///
/// Implementations own their internal locking; the core calls these from a
/// single logical flow per attempt.
pub trait WalletBackend: Send + Sync {
    /// Balance/limit snapshot for the current validation pass.
    fn limits(&self) -> WalletLimits;

    /// True if the address belongs to this wallet (self-payment check).
    fn contains_address(&self, address: &str) -> bool;

    /// True if the address has been used on-chain before (reuse warning).
    fn address_is_used(&self, address: &str) -> bool;

    /// Apply the active fee rate before estimation or build.
    fn set_fee_per_kb(&self, rate_sat_per_kb: u64);

    /// Fee in satoshis for a spend of `amount_sat` at the given rate.
    fn estimate_fee(&self, amount_sat: u64, rate_sat_per_kb: u64) -> u64;

    /// Select UTXOs and assemble an unsigned transaction. The error message
    /// is surfaced to the caller verbatim.
    fn build_transaction(&self, request: &BuildRequest) -> anyhow::Result<UnsignedTransaction>;
}

/// Syntactic address check against the configured network.
pub fn address_is_valid(address: &str, network: Network) -> bool {
    bitcoin::Address::from_str(address)
        .map(|a| a.require_network(network.to_bitcoin()).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_validation_respects_network() {
        let mainnet = "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu";
        let testnet = "tb1q6rz28mcfaxtmd6v789l9rrlrusdprr9pqcpvkl";

        assert!(address_is_valid(mainnet, Network::Bitcoin));
        assert!(!address_is_valid(mainnet, Network::Testnet));
        assert!(address_is_valid(testnet, Network::Testnet));
        assert!(address_is_valid(testnet, Network::Signet));
        assert!(!address_is_valid("not-an-address", Network::Bitcoin));
    }

    #[test]
    fn legacy_base58_accepted() {
        assert!(address_is_valid(
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            Network::Bitcoin
        ));
    }

    #[test]
    fn network_round_trips_through_names() {
        for net in [Network::Bitcoin, Network::Testnet, Network::Signet, Network::Regtest] {
            assert_eq!(Network::from_str(net.as_str()), Some(net));
        }
        assert_eq!(Network::from_str("mainnet"), Some(Network::Bitcoin));
        assert_eq!(Network::from_str("lightning"), None);
    }
}
