//! Line sources for the log watcher.
//!
//! A `LineSource` can be opened any number of times; each `open` yields a
//! fresh stream. The production source tails a service journal through a
//! subprocess.

use crate::types::WatcherConfig;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info};

/// Longest line accepted from a source, newline excluded.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

#[async_trait]
pub trait LineSource: Send + Sync {
    async fn open(&self) -> Result<Box<dyn LineStream>>;
}

#[async_trait]
pub trait LineStream: Send {
    /// `Ok(None)` once the stream is closed.
    async fn next_line(&mut self) -> Result<Option<String>>;

    /// Called after the stream closed; reports how the producer ended.
    async fn finish(self: Box<Self>) -> Result<()>;
}

/// Runs a command and streams its standard output.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

#[async_trait]
impl LineSource for CommandSource {
    async fn open(&self) -> Result<Box<dyn LineStream>> {
        info!("Starting log source: {} {}", self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to start command")?;

        let stdout = child
            .stdout
            .take()
            .context("Failed to get stdout pipe")?;

        Ok(Box::new(CommandStream {
            child,
            reader: BufReader::new(stdout),
            buf: Vec::new(),
        }))
    }
}

struct CommandStream {
    child: Child,
    reader: BufReader<ChildStdout>,
    buf: Vec<u8>,
}

#[async_trait]
impl LineStream for CommandStream {
    async fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = (&mut self.reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut self.buf)
            .await
            .context("Error reading standard output")?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(decode_line(&self.buf)?))
    }

    async fn finish(mut self: Box<Self>) -> Result<()> {
        let status = self.child.wait().await.context("Failed to wait for command")?;
        debug!("Log source exited with {}", status);

        if !status.success() {
            bail!("Command finished with error: {}", status);
        }
        Ok(())
    }
}

/// Strip the line terminator and decode lossily; invalid UTF-8 never fails a read.
fn decode_line(raw: &[u8]) -> Result<String> {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.len() > MAX_LINE_BYTES {
        bail!("Error reading standard output: line exceeds {} bytes", MAX_LINE_BYTES);
    }
    Ok(String::from_utf8_lossy(line).into_owned())
}
