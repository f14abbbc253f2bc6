//! Log Watcher
//!
//! Tails a line source and fires a transfer batch every time the trigger
//! marker shows up.

use crate::batch::BatchSender;
use crate::log_source::LineSource;
use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub lines_seen: usize,
    pub triggers: usize,
}

pub struct LogWatcher {
    source: Arc<dyn LineSource>,
    batch: Arc<BatchSender>,
    marker: String,
    batch_size: usize,
}

impl LogWatcher {
    pub fn new(
        source: Arc<dyn LineSource>,
        batch: Arc<BatchSender>,
        marker: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            source,
            batch,
            marker: marker.into(),
            batch_size,
        }
    }

    pub fn is_trigger(&self, line: &str) -> bool {
        line.contains(&self.marker)
    }

    /// Watch until the stream closes or `cancel` fires.
    ///
    /// Any failure to start, read or reap the source is returned to the caller,
    /// which treats it as fatal.
    pub async fn run(&self, cancel: CancellationToken) -> Result<WatchSummary> {
        let mut summary = WatchSummary::default();
        let mut stream = self.source.open().await?;

        loop {
            let line = tokio::select! {
                line = stream.next_line() => line?,
                _ = cancel.cancelled() => {
                    info!("Log watcher cancelled");
                    return Ok(summary);
                }
            };

            let Some(line) = line else {
                break;
            };
            summary.lines_seen += 1;

            if self.is_trigger(&line) {
                summary.triggers += 1;
                info!("New pod detected, sending {} transactions...", self.batch_size);
                self.batch.send_batch(self.batch_size, &cancel).await;
            }
        }

        stream.finish().await?;
        info!(
            "Log source closed after {} lines, {} triggers",
            summary.lines_seen, summary.triggers
        );
        Ok(summary)
    }
}
