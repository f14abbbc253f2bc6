//! Credential sources
//!
//! Each source provides the hex signing key. Nothing here logs the key.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub const DEFAULT_KEY_ENV_VAR: &str = "STATION_PULSE_PRIVATE_KEY";

pub trait CredentialSource {
    fn signing_key(&self) -> Result<String>;
}

/// Plaintext interactive prompt on the terminal.
pub struct PromptCredentials;

impl CredentialSource for PromptCredentials {
    fn signing_key(&self) -> Result<String> {
        prompt_stdin("Enter EVM Private Key: ")
    }
}

pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredentials {
    fn signing_key(&self) -> Result<String> {
        let key = std::env::var(&self.var)
            .with_context(|| format!("Environment variable {} not set", self.var))?;
        non_empty(key.trim(), &self.var)
    }
}

/// Reads the key from the first non-blank line of a file.
pub struct FileCredentials {
    path: PathBuf,
}

impl FileCredentials {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredentials {
    fn signing_key(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read key file {}", self.path.display()))?;
        let line = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        non_empty(line, &self.path.display().to_string())
    }
}

fn non_empty(key: &str, origin: &str) -> Result<String> {
    if key.is_empty() {
        bail!("No private key found in {}", origin);
    }
    Ok(key.to_string())
}

pub fn prompt_stdin(prompt: &str) -> Result<String> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    read_prompted(&mut stdin.lock(), &mut stdout.lock(), prompt)
}

/// Print `prompt` and read one trimmed line.
pub fn read_prompted<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Result<String> {
    write!(writer, "{}", prompt)?;
    writer.flush()?;

    let mut input = String::new();
    reader.read_line(&mut input).context("Failed to read from terminal")?;
    Ok(input.trim().to_string())
}
