//! Shared test fixtures: a scriptable wallet backend and known-good
//! addresses (BIP84 test vectors).

#![allow(dead_code)]

use sendflow::{BuildRequest, UnsignedTransaction, WalletBackend, WalletLimits};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub const ADDR_A: &str = "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu";
pub const ADDR_B: &str = "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g";
pub const ADDR_LEGACY: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

pub fn limits() -> WalletLimits {
    WalletLimits { min_output_sat: 546, max_spendable_sat: 99_000, balance_sat: 100_000 }
}

/// Wallet backend with scriptable ownership/usage sets and a flat
/// ~250-vbyte fee model. Records the applied fee rate and build calls.
pub struct MockWallet {
    pub limits: WalletLimits,
    pub own_addresses: Vec<String>,
    pub used_addresses: Vec<String>,
    pub build_error: Option<String>,
    pub applied_fee_per_kb: AtomicU64,
    pub build_calls: AtomicUsize,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            limits: limits(),
            own_addresses: Vec::new(),
            used_addresses: Vec::new(),
            build_error: None,
            applied_fee_per_kb: AtomicU64::new(0),
            build_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_limits(mut self, limits: WalletLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn owning(mut self, address: &str) -> Self {
        self.own_addresses.push(address.to_string());
        self
    }

    pub fn with_used(mut self, address: &str) -> Self {
        self.used_addresses.push(address.to_string());
        self
    }

    pub fn failing_build(mut self, message: &str) -> Self {
        self.build_error = Some(message.to_string());
        self
    }

    pub fn applied_rate(&self) -> u64 {
        self.applied_fee_per_kb.load(Ordering::SeqCst)
    }

    pub fn builds(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }
}

impl WalletBackend for MockWallet {
    fn limits(&self) -> WalletLimits {
        self.limits
    }

    fn contains_address(&self, address: &str) -> bool {
        self.own_addresses.iter().any(|a| a == address)
    }

    fn address_is_used(&self, address: &str) -> bool {
        self.used_addresses.iter().any(|a| a == address)
    }

    fn set_fee_per_kb(&self, rate_sat_per_kb: u64) {
        self.applied_fee_per_kb.store(rate_sat_per_kb, Ordering::SeqCst);
    }

    fn estimate_fee(&self, _amount_sat: u64, rate_sat_per_kb: u64) -> u64 {
        // one-input two-output segwit tx is ~250 vbytes
        rate_sat_per_kb * 250 / 1_000
    }

    fn build_transaction(&self, request: &BuildRequest) -> anyhow::Result<UnsignedTransaction> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.build_error {
            anyhow::bail!("{}", message);
        }
        let amount: u64 = request.recipients.iter().map(|r| r.amount_sat).sum();
        Ok(UnsignedTransaction {
            recipients: request.recipients.clone(),
            fee_sat: self.estimate_fee(amount, request.fee_per_kb),
            fee_per_kb: request.fee_per_kb,
            memo: request.memo.clone(),
        })
    }
}
