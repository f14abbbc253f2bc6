//! Per-transaction failure classes.
//!
//! None of these are retried: the nonce reserved for the attempt stays consumed.

use thiserror::Error;

/// Errors that abandon a single send attempt.
#[derive(Debug, Error)]
pub enum SendError {
    /// Gas price suggestion could not be fetched.
    #[error("Failed to suggest gas price: {0}")]
    GasPrice(String),

    /// Signing the transaction failed.
    #[error("Failed to sign transaction: {0}")]
    Signing(String),

    /// The node rejected or never received the raw transaction.
    #[error("Failed to send transaction: {0}")]
    Broadcast(String),
}

pub type SendResult<T> = Result<T, SendError>;
