//! Subcommands and their output.

use anyhow::{anyhow, Context};
use clap::Subcommand;
use lib_core::{WalletConfig, WalletError};
use lib_wallet::{WalletProvider, WalletSession};
use shared::{format_units, truncate_address, ChainInfo, TransactionRequest, TxReceipt};
use std::time::{Duration, Instant};

#[derive(Subcommand)]
pub enum Command {
    /// Connect and print the session
    Status {
        /// Print the session descriptor as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a transaction from the active account
    Send {
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount in wei as a hex quantity (e.g. 0xde0b6b3a7640000)
        #[arg(long, default_value = "0x0")]
        value: String,
        /// Call data as 0x-prefixed hex
        #[arg(long)]
        data: Option<String>,
        /// Return after submission without waiting for a receipt
        #[arg(long)]
        no_wait: bool,
    },
    /// Wait for a transaction to be mined
    Wait {
        /// Transaction hash
        tx_hash: String,
    },
    /// Switch the wallet to a known chain
    Switch {
        /// Chain id, hex or decimal
        chain_id: String,
    },
    /// Register a chain with the wallet
    AddChain {
        #[arg(long)]
        chain_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        rpc_url: String,
        /// Native currency symbol (2-6 characters)
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        explorer: Option<String>,
    },
}

pub async fn run<P: WalletProvider>(
    session: &WalletSession<P>,
    config: &WalletConfig,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Status { json } => {
            connect(session, config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            } else {
                print_status(session);
            }
        }
        Command::Send {
            to,
            value,
            data,
            no_wait,
        } => {
            connect(session, config).await?;
            let mut tx = TransactionRequest::transfer(to, value);
            if let Some(data) = data {
                tx = tx.with_data(data);
            }

            let tx_hash = session.send_transaction(tx).await.map_err(explain)?;
            println!("submitted {}", tx_hash);

            if !no_wait {
                wait(session, &tx_hash).await?;
            }
        }
        Command::Wait { tx_hash } => wait(session, &tx_hash).await?,
        Command::Switch { chain_id } => {
            connect(session, config).await?;
            let chain = session
                .chain(&chain_id)
                .with_context(|| format!("chain {} is not known, register it with add-chain", chain_id))?;
            session.switch_chain(&chain).await.map_err(explain)?;
            println!("switched to {} ({})", chain.chain_name, chain.chain_id);
        }
        Command::AddChain {
            chain_id,
            name,
            rpc_url,
            symbol,
            explorer,
        } => {
            connect(session, config).await?;
            let mut chain = ChainInfo::new(chain_id, name, rpc_url, symbol);
            if let Some(explorer) = explorer {
                chain = chain.with_explorer(explorer);
            }
            session.add_chain(&chain).await.map_err(explain)?;
            println!("added {}", chain.chain_name);
        }
    }

    Ok(())
}

/// Connect, to the configured chain when one is set.
async fn connect<P: WalletProvider>(session: &WalletSession<P>, config: &WalletConfig) -> anyhow::Result<()> {
    let target = match &config.chain_id {
        Some(id) => Some(
            session
                .chain(id)
                .ok_or_else(|| anyhow!("WALLET_CHAIN_ID {} is not a known chain", id))?,
        ),
        None => None,
    };

    session.connect(target.as_ref()).await.map_err(explain)
}

async fn wait<P: WalletProvider>(session: &WalletSession<P>, tx_hash: &str) -> anyhow::Result<()> {
    let started = Instant::now();
    let receipt = session.wait_tx_confirmed(tx_hash).await.map_err(explain)?;
    print_receipt(&receipt, started.elapsed());
    Ok(())
}

fn explain(error: WalletError) -> anyhow::Error {
    match error.code() {
        Some(code) => anyhow!("{} (code {})", error, code),
        None => anyhow::Error::new(error),
    }
}

fn print_status<P: WalletProvider>(session: &WalletSession<P>) {
    let state = session.snapshot();
    let provider = session.provider().map(|p| p.name()).unwrap_or("none");

    println!("wallet     {}", provider);

    let chain_id = state.chain_id.unwrap_or_default();
    let chain_name = session
        .chain(&chain_id)
        .map(|c| c.chain_name)
        .unwrap_or_else(|| "unknown network".to_string());
    println!("chain      {} ({})", chain_id, chain_name);

    if let Some(connected_at) = state.connected_at {
        println!("connected  {}", lib_utils::format_time(connected_at));
    }

    let active = state.active_account.map(|a| a.address);
    for account in state.accounts.values() {
        let marker = if active.as_deref() == Some(account.address.as_str()) { "*" } else { " " };
        let balance = account
            .balance
            .as_deref()
            .and_then(|b| format_units(b, 18))
            .unwrap_or_else(|| "?".to_string());
        println!("{} {}  {} ({})", marker, account.address, balance, truncate_address(&account.address));
    }
}

fn outcome_line(receipt: &TxReceipt, waited: Duration) -> String {
    let outcome = if receipt.succeeded() { "confirmed" } else { "reverted" };
    format!(
        "{} in block {} after {}",
        outcome,
        receipt.block_number,
        lib_utils::format_duration(waited)
    )
}

fn print_receipt(receipt: &TxReceipt, waited: Duration) {
    println!("{}", outcome_line(receipt, waited));
    println!("  hash  {}", receipt.transaction_hash);
    println!("  from  {}", receipt.from);
    if let Some(to) = &receipt.to {
        println!("  to    {}", to);
    }
    if let Some(gas_used) = receipt.gas_used {
        println!("  gas   {}", gas_used);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TxStatus;

    fn receipt(status: TxStatus) -> TxReceipt {
        TxReceipt {
            transaction_hash: format!("0x{:064x}", 1),
            block_number: 42,
            block_hash: format!("0x{:064x}", 2),
            status,
            from: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            to: None,
            gas_used: Some(21000),
        }
    }

    #[test]
    fn test_outcome_line_reports_wait_time() {
        assert_eq!(
            outcome_line(&receipt(TxStatus::Success), Duration::from_secs(3)),
            "confirmed in block 42 after 3s"
        );
        assert_eq!(
            outcome_line(&receipt(TxStatus::Reverted), Duration::from_secs(75)),
            "reverted in block 42 after 1m 15s"
        );
    }
}
