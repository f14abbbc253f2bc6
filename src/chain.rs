//! Chain client
//!
//! The emitter only needs four JSON-RPC calls; everything behind them is
//! delegated to alloy's provider.

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn balance(&self, address: Address) -> Result<U256>;

    /// Transaction count including the node's pending pool.
    async fn pending_nonce(&self, address: Address) -> Result<u64>;

    async fn gas_price(&self) -> Result<u128>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash>;
}

/// JSON-RPC client over an alloy HTTP provider.
#[derive(Clone)]
pub struct RpcChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    rpc_url: String,
}

impl RpcChainClient {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC URL '{}'", rpc_url))?;

        let provider = ProviderBuilder::new().connect_http(url);
        info!(rpc_url = %rpc_url, "Connected to RPC endpoint");

        Ok(Self {
            provider: Arc::new(provider),
            rpc_url: rpc_url.to_string(),
        })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .context("Failed to fetch balance")
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .context("Failed to fetch pending nonce")
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .context("Failed to fetch gas price")
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .context("Failed to broadcast transaction")?;

        Ok(*pending.tx_hash())
    }
}

impl std::fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_invalid_url() {
        let result = RpcChainClient::connect("not a url");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_connect_is_lazy() {
        // No request is made until the first call.
        assert!(RpcChainClient::connect("http://127.0.0.1:1").is_ok());
    }
}
