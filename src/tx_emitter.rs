//! Transaction Emitter
//!
//! Builds, signs and broadcasts one self-transfer per reserved nonce.

use crate::chain::ChainClient;
use crate::errors::{SendError, SendResult};
use crate::types::TransferRequest;
use crate::wallet::Wallet;
use alloy::primitives::{TxHash, U256};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct TxEmitter {
    client: Arc<dyn ChainClient>,
    wallet: Arc<Wallet>,
    chain_id: u64,
    gas_limit: u64,
}

impl TxEmitter {
    pub fn new(client: Arc<dyn ChainClient>, wallet: Arc<Wallet>, chain_id: u64, gas_limit: u64) -> Self {
        Self {
            client,
            wallet,
            chain_id,
            gas_limit,
        }
    }

    /// Send `amount` wei from the wallet to itself with the given nonce.
    ///
    /// Failures are logged and returned; the nonce is not handed back.
    pub async fn send(&self, amount: U256, nonce: u64) -> SendResult<TxHash> {
        let result = self.try_send(amount, nonce).await;
        if let Err(e) = &result {
            warn!(nonce, "{}", e);
        }
        result
    }

    async fn try_send(&self, amount: U256, nonce: u64) -> SendResult<TxHash> {
        let gas_price = self
            .client
            .gas_price()
            .await
            .map_err(|e| SendError::GasPrice(format!("{:#}", e)))?;

        let address = self.wallet.address();
        let request = TransferRequest {
            from: address,
            to: address,
            value: amount,
            chain_id: self.chain_id,
            gas_price,
            gas_limit: self.gas_limit,
            nonce,
        };
        debug!("GENERATING TX: {}", request.format_log());

        let signed = self
            .wallet
            .sign_transfer(&request)
            .map_err(|e| SendError::Signing(format!("{:#}", e)))?;

        let tx_hash = self
            .client
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(|e| SendError::Broadcast(format!("{:#}", e)))?;

        info!("Tx {}: {}", nonce, tx_hash);
        Ok(tx_hash)
    }
}
