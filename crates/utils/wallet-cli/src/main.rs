//! # Wallet Probe Utility
//!
//! Drives a wallet session from the command line against a JSON-RPC node
//! that holds unlocked accounts (anvil, hardhat, geth `--dev`), or against
//! the in-memory scripted wallet with `--mock`.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --package wallet-cli --bin wallet_cli -- status
//! cargo run --package wallet-cli --bin wallet_cli -- send --to 0x3c44... --value 0xde0b6b3a7640000
//! cargo run --package wallet-cli --bin wallet_cli -- wait 0x5c50...
//! cargo run --package wallet-cli --bin wallet_cli -- --mock switch 0xaa36a7
//! ```
//!
//! Settings come from `WALLET_*` environment variables (see
//! `lib_core::config`), a `.env` file is honoured. `LOG_LEVEL` controls
//! log verbosity.

mod commands;

use clap::Parser;
use lib_core::WalletConfig;
use lib_wallet::mock::MockProvider;
use lib_wallet::{Eip1193Provider, HttpTransport, SessionConfig, WalletSession};
use tracing::info;

use commands::Command;

#[derive(Parser)]
#[command(name = "wallet_cli", version, about = "Drive a wallet session from the terminal")]
struct Cli {
    /// Use the in-memory scripted wallet instead of a node
    #[arg(long, global = true)]
    mock: bool,

    /// JSON-RPC endpoint (overrides WALLET_RPC_URL)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let mut config = WalletConfig::from_env()?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }
    config.validate()?;

    let session_config = SessionConfig::from(&config);

    if cli.mock {
        info!("using scripted wallet");
        let session = WalletSession::new(Some(MockProvider::new()), session_config);
        commands::run(&session, &config, cli.command).await
    } else {
        info!(url = %config.rpc_url, "using json-rpc node");
        let transport = HttpTransport::new(config.rpc_url.clone())?;
        let provider = Eip1193Provider::new(transport, "json-rpc");
        let session = WalletSession::new(Some(provider), session_config);
        commands::run(&session, &config, cli.command).await
    }
}

fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "warn".to_string())
        .to_lowercase();

    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
