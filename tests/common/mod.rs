#![allow(dead_code)]

use alloy::primitives::{keccak256, Address, TxHash, U256};
use anyhow::{bail, Result};
use async_trait::async_trait;
use station_pulse::batch::BatchSender;
use station_pulse::chain::ChainClient;
use station_pulse::log_source::{LineSource, LineStream};
use station_pulse::nonce::NonceAllocator;
use station_pulse::tx_emitter::TxEmitter;
use station_pulse::types::AmountRange;
use station_pulse::wallet::Wallet;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_CHAIN_ID: u64 = 1234;

/// In-memory chain that fails selected calls by their 1-based call number.
#[derive(Default)]
pub struct MockChain {
    gas_failures: HashSet<usize>,
    broadcast_failures: HashSet<usize>,
    gas_calls: AtomicUsize,
    broadcast_calls: AtomicUsize,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_gas_on(mut self, calls: &[usize]) -> Self {
        self.gas_failures.extend(calls);
        self
    }

    pub fn failing_broadcast_on(mut self, calls: &[usize]) -> Self {
        self.broadcast_failures.extend(calls);
        self
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().unwrap().len()
    }

    pub fn broadcast_attempts(&self) -> usize {
        self.broadcast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance(&self, _address: Address) -> Result<U256> {
        Ok(U256::from(1_000_000u64))
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64> {
        Ok(0)
    }

    async fn gas_price(&self) -> Result<u128> {
        let call = self.gas_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.gas_failures.contains(&call) {
            bail!("gas oracle unavailable");
        }
        Ok(1_000_000_000)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash> {
        let call = self.broadcast_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.broadcast_failures.contains(&call) {
            bail!("replacement transaction underpriced");
        }
        self.broadcasts.lock().unwrap().push(raw.to_vec());
        Ok(keccak256(raw))
    }
}

pub fn test_wallet() -> Arc<Wallet> {
    Arc::new(Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap())
}

pub fn create_test_emitter(chain: Arc<MockChain>) -> TxEmitter {
    TxEmitter::new(chain, test_wallet(), TEST_CHAIN_ID, 22_000)
}

/// Batch sender with no pauses between sends.
pub fn create_test_batch(chain: Arc<MockChain>, start_nonce: u64) -> (Arc<BatchSender>, Arc<NonceAllocator>) {
    let nonces = Arc::new(NonceAllocator::new(start_nonce));
    let batch = BatchSender::new(
        Arc::new(create_test_emitter(chain)),
        nonces.clone(),
        AmountRange::default(),
        0,
    );
    (Arc::new(batch), nonces)
}

/// Replays fixed lines; every `open` starts from the first line again.
pub struct ScriptedSource {
    lines: Vec<String>,
    fail_read_after: Option<usize>,
    pub opens: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            fail_read_after: None,
            opens: AtomicUsize::new(0),
        }
    }

    pub fn failing_after(mut self, lines: usize) -> Self {
        self.fail_read_after = Some(lines);
        self
    }
}

#[async_trait]
impl LineSource for ScriptedSource {
    async fn open(&self) -> Result<Box<dyn LineStream>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            lines: self.lines.iter().cloned().collect(),
            fail_read_after: self.fail_read_after,
            read: 0,
        }))
    }
}

struct ScriptedStream {
    lines: VecDeque<String>,
    fail_read_after: Option<usize>,
    read: usize,
}

#[async_trait]
impl LineStream for ScriptedStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.fail_read_after == Some(self.read) {
            bail!("stream reset");
        }
        self.read += 1;
        Ok(self.lines.pop_front())
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Never yields a line; the stream stays open until dropped.
pub struct SilentSource;

#[async_trait]
impl LineSource for SilentSource {
    async fn open(&self) -> Result<Box<dyn LineStream>> {
        Ok(Box::new(SilentStream))
    }
}

struct SilentStream;

#[async_trait]
impl LineStream for SilentStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        std::future::pending().await
    }

    async fn finish(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Always fails to start.
pub struct BrokenSource;

#[async_trait]
impl LineSource for BrokenSource {
    async fn open(&self) -> Result<Box<dyn LineStream>> {
        bail!("Failed to start command")
    }
}
