//! Core data types for the Station Pulse service

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const DEFAULT_CHAIN_ID: u64 = 1234;
pub const DEFAULT_GAS_LIMIT: u64 = 22_000;
pub const DEFAULT_TRIGGER_MARKER: &str = "Generating New unverified pods";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub chain_id: u64,
    pub gas_limit: u64,
    pub initial_batch_size: usize,
    pub triggered_batch_size: usize,
    pub amount: AmountRange,
    /// Upper bound (exclusive) of the pause between two sends of a batch
    pub max_send_delay_ms: u64,
    pub watcher: WatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
            initial_batch_size: 25,
            triggered_batch_size: 107,
            amount: AmountRange::default(),
            max_send_delay_ms: 1_000,
            watcher: WatcherConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config found at {}, using defaults.", path.display());
            return Ok(Self::default());
        }

        info!("Loading configuration from {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;

        tokio::fs::write(path, json)
            .await
            .context("Failed to write configuration file")
    }
}

/// Inclusive range of wei sent per self-transfer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmountRange {
    pub min_wei: u64,
    pub max_wei: u64,
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min_wei: 1,
            max_wei: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatcherConfig {
    pub marker: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_TRIGGER_MARKER.to_string(),
            program: "sudo".to_string(),
            args: ["journalctl", "-u", "stationd", "-f", "--no-hostname", "-o", "cat"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A fully specified self-transfer, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: u64,
}

impl TransferRequest {
    pub fn format_log(&self) -> String {
        format!(
            "nonce={} value={} gas_price={} from={} to={}",
            self.nonce,
            self.value,
            self.gas_price,
            truncate_address(&self.from.to_string()),
            truncate_address(&self.to.to_string())
        )
    }
}

/// Outcome counters of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub requested: usize,
    pub sent: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

pub fn truncate_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
