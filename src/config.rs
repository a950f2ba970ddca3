//! Send pipeline configuration - passed from the host.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::spend::FeeTier;
use crate::wallet::Network;

/// Process-wide fee rates, replaced wholesale by rate-source events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    pub regular_sat_per_kb: u64,
    pub economy_sat_per_kb: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self { regular_sat_per_kb: 10_000, economy_sat_per_kb: 2_500 }
    }
}

impl FeePolicy {
    pub fn rate_for(&self, tier: FeeTier) -> u64 {
        match tier {
            FeeTier::Regular => self.regular_sat_per_kb,
            FeeTier::Economy => self.economy_sat_per_kb,
        }
    }
}

/// Pipeline configuration. Host constructs this once per wallet session.
#[derive(Debug, Clone)]
pub struct SendConfig {
    pub network: Network,
    pub fees: FeePolicy,
    /// Ceiling on how long a broadcast may hang before it is reported as a
    /// publish failure.
    pub broadcast_timeout: Duration,
    pub pin_prompt: String,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            fees: FeePolicy::default(),
            broadcast_timeout: Duration::from_secs(30),
            pin_prompt: "Authorize this send".to_string(),
        }
    }
}

impl SendConfig {
    pub fn new(network: Network) -> Self {
        Self { network, ..Default::default() }
    }

    pub fn with_fees(mut self, fees: FeePolicy) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.broadcast_timeout = timeout;
        self
    }

    pub fn with_pin_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.pin_prompt = prompt.into();
        self
    }
}
