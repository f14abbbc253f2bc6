//! Batch Sender
//!
//! Sends transfers one at a time with a random pause between them, drawing
//! every nonce from the shared allocator.

use crate::nonce::NonceAllocator;
use crate::tx_emitter::TxEmitter;
use crate::types::{AmountRange, BatchReport};
use alloy::primitives::U256;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct BatchSender {
    emitter: Arc<TxEmitter>,
    nonces: Arc<NonceAllocator>,
    amount: AmountRange,
    max_delay_ms: u64,
}

impl BatchSender {
    pub fn new(
        emitter: Arc<TxEmitter>,
        nonces: Arc<NonceAllocator>,
        amount: AmountRange,
        max_delay_ms: u64,
    ) -> Self {
        Self {
            emitter,
            nonces,
            amount,
            max_delay_ms,
        }
    }

    /// Send `count` transfers sequentially. Stops before the next nonce is
    /// reserved once `cancel` fires.
    pub async fn send_batch(&self, count: usize, cancel: &CancellationToken) -> BatchReport {
        let mut report = BatchReport {
            requested: count,
            ..Default::default()
        };

        for _ in 0..count {
            if cancel.is_cancelled() {
                info!(
                    "Batch cancelled after {} of {} sends",
                    report.attempted(),
                    count
                );
                break;
            }

            let nonce = self.nonces.allocate();
            let (amount, delay) = self.draw();

            match self.emitter.send(U256::from(amount), nonce).await {
                Ok(_) => report.sent += 1,
                Err(_) => report.failed += 1,
            }

            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancel.cancelled() => {}
            }
        }

        info!(
            "Batch complete: {} sent, {} failed, next nonce {}",
            report.sent,
            report.failed,
            self.nonces.peek()
        );
        report
    }

    fn draw(&self) -> (u64, Duration) {
        let mut rng = rand::rng();
        let amount = rng.random_range(self.amount.min_wei..=self.amount.max_wei.max(self.amount.min_wei));
        let delay = if self.max_delay_ms == 0 {
            0
        } else {
            rng.random_range(0..self.max_delay_ms)
        };
        (amount, Duration::from_millis(delay))
    }
}
