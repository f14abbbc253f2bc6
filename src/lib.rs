//! Station Pulse
//!
//! Keeps an account active by sending small self-transfers: a burst at
//! startup and another burst whenever the watched service logs a new pod.
pub mod batch;
pub mod chain;
pub mod credentials;
pub mod errors;
pub mod log_source;
pub mod nonce;
pub mod tx_emitter;
pub mod types;
pub mod wallet;
pub mod watcher;
