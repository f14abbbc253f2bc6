//! Wallet: signing key and derived address.
//!
//! Keys are never logged.

use crate::types::TransferRequest;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use anyhow::{Context, Result};

/// A transaction signed under EIP-155, ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub hash: TxHash,
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Parse a hex private key, with or without `0x` prefix.
    pub fn from_private_key(private_key_hex: &str) -> Result<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .context("error parsing private key")?;

        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Build and sign a legacy transfer with the chain id bound into `v`.
    pub fn sign_transfer(&self, request: &TransferRequest) -> Result<SignedTransfer> {
        let tx = TxLegacy {
            chain_id: Some(request.chain_id),
            nonce: request.nonce,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            to: TxKind::Call(request.to),
            value: request.value,
            input: Bytes::new(),
        };

        let signature = self
            .signer
            .sign_hash_sync(&tx.signature_hash())
            .context("signing transfer hash")?;

        let signed = tx.into_signed(signature);
        let hash = *signed.hash();
        let envelope: TxEnvelope = signed.into();

        Ok(SignedTransfer {
            hash,
            raw: envelope.encoded_2718(),
        })
    }
}
