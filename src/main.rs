//! Station Pulse
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use station_pulse::batch::BatchSender;
use station_pulse::chain::{ChainClient, RpcChainClient};
use station_pulse::credentials::{
    prompt_stdin, CredentialSource, EnvCredentials, FileCredentials, PromptCredentials,
    DEFAULT_KEY_ENV_VAR,
};
use station_pulse::log_source::CommandSource;
use station_pulse::nonce::NonceAllocator;
use station_pulse::tx_emitter::TxEmitter;
use station_pulse::types::Config;
use station_pulse::wallet::Wallet;
use station_pulse::watcher::LogWatcher;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "station_pulse")]
struct Cli {
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Overrides `rpc_url` from the config; prompted for when neither is set
    #[arg(long)]
    rpc_url: Option<String>,

    #[arg(long, value_enum, default_value_t = KeySource::Prompt)]
    key_source: KeySource,

    #[arg(long, required_if_eq("key_source", "file"))]
    key_file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_KEY_ENV_VAR)]
    key_env: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KeySource {
    Prompt,
    Env,
    File,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Initial batch, then watch the service log for new pods
    Run,

    /// Send a single batch and exit
    Once {
        #[arg(long, default_value = "25")]
        count: usize,
    },

    /// Write the default configuration file
    InitConfig,
}

impl Cli {
    fn credential_source(&self) -> Result<Box<dyn CredentialSource>> {
        Ok(match self.key_source {
            KeySource::Prompt => Box::new(PromptCredentials),
            KeySource::Env => Box::new(EnvCredentials::new(self.key_env.clone())),
            KeySource::File => {
                let path = self.key_file.clone().context("--key-file is required")?;
                Box::new(FileCredentials::new(path))
            }
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "station_pulse=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Run);

    if let Commands::InitConfig = command {
        Config::default().write(&cli.config).await?;
        info!("✓ Created configuration file: {}", cli.config.display());
        return Ok(());
    }

    let config = Config::load(&cli.config).await?;

    let private_key = cli.credential_source()?.signing_key()?;
    let rpc_url = match cli.rpc_url.clone().or_else(|| config.rpc_url.clone()) {
        Some(url) => url,
        None => prompt_stdin("Enter RPC URL: ")?,
    };

    let wallet = match Wallet::from_private_key(&private_key) {
        Ok(wallet) => Arc::new(wallet),
        Err(e) => {
            error!("Error creating wallet: {:#}", e);
            return Ok(());
        }
    };
    let address = wallet.address();
    info!("Wallet: {}", address);

    let client: Arc<dyn ChainClient> = Arc::new(RpcChainClient::connect(&rpc_url)?);

    let balance = client.balance(address).await?;
    info!("balance: {}", balance);

    let start_nonce = client.pending_nonce(address).await?;
    info!("Pending nonce: {}", start_nonce);

    let nonces = Arc::new(NonceAllocator::new(start_nonce));
    let emitter = Arc::new(TxEmitter::new(
        client,
        wallet,
        config.chain_id,
        config.gas_limit,
    ));
    let batch = Arc::new(BatchSender::new(
        emitter,
        nonces,
        config.amount,
        config.max_send_delay_ms,
    ));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, shutting down gracefully...");
                cancel.cancel();
            }
        }
    });

    match command {
        Commands::Once { count } => {
            info!("Sending {} transactions...", count);
            batch.send_batch(count, &cancel).await;
        }
        Commands::Run => {
            info!("Sending initial {} transactions...", config.initial_batch_size);
            batch.send_batch(config.initial_batch_size, &cancel).await;

            if !cancel.is_cancelled() {
                let watcher = LogWatcher::new(
                    Arc::new(CommandSource::from_config(&config.watcher)),
                    batch.clone(),
                    config.watcher.marker.clone(),
                    config.triggered_batch_size,
                );
                let token = cancel.clone();
                let handle = tokio::spawn(async move { watcher.run(token).await });

                let summary = handle.await.context("Log watcher task failed")??;
                info!(
                    "Log watcher stopped: {} lines, {} triggers",
                    summary.lines_seen, summary.triggers
                );

                cancel.cancelled().await;
            }
        }
        Commands::InitConfig => unreachable!("InitConfig handled above"),
    }

    info!("Station Pulse shutdown complete");
    Ok(())
}
