//! # Scripted Wallet Provider
//!
//! [`MockProvider`] plays both the wallet and the chain in memory. Tests and
//! the CLI's `--mock` mode script it: which accounts it authorizes, which
//! chains it knows, whether the user "rejects" a prompt, and how many polls a
//! transaction stays pending.
//!
//! Clones share state, so a test can keep a handle after moving a clone into
//! a session.
//!
//! The simulated chain mines one block per receipt poll.

use async_trait::async_trait;
use lib_core::error::codes;
use lib_core::{Result, WalletError};
use shared::{ChainInfo, TransactionRequest, TxReceipt, TxStatus};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::provider::WalletProvider;

/// First two accounts of the default anvil/hardhat mnemonic.
pub const DEV_ACCOUNTS: [&str; 2] = [
    "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
    "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
];

struct QueuedReceipt {
    pending_polls: u32,
    status: TxStatus,
    mined_block: Option<u64>,
    from: String,
    to: Option<String>,
}

struct MockState {
    accounts: Vec<String>,
    chain_id: String,
    known_chains: BTreeSet<String>,
    balances: HashMap<String, String>,
    reject_accounts: bool,
    reject_switch: bool,
    reject_add_chain: bool,
    reject_signing: bool,
    fail_balances: bool,
    accounts_delay: Option<Duration>,
    switch_delay: Option<Duration>,
    signing_delay: Option<Duration>,
    sent: Vec<TransactionRequest>,
    added_chains: Vec<ChainInfo>,
    receipts: HashMap<String, QueuedReceipt>,
    receipt_polls: HashMap<String, u32>,
    failing_receipt_polls: u32,
    head: u64,
    tx_counter: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            accounts: DEV_ACCOUNTS.iter().map(|a| a.to_string()).collect(),
            chain_id: "0x7a69".to_string(),
            known_chains: ["0x1", "0xaa36a7", "0x7a69"].iter().map(|c| c.to_string()).collect(),
            balances: HashMap::new(),
            reject_accounts: false,
            reject_switch: false,
            reject_add_chain: false,
            reject_signing: false,
            fail_balances: false,
            accounts_delay: None,
            switch_delay: None,
            signing_delay: None,
            sent: Vec::new(),
            added_chains: Vec::new(),
            receipts: HashMap::new(),
            receipt_polls: HashMap::new(),
            failing_receipt_polls: 0,
            head: 0,
            tx_counter: 0,
        }
    }
}

/// In-memory wallet and chain.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Wallet holding [`DEV_ACCOUNTS`] on chain `0x7a69`.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // region:    --- Scripting

    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        self.set_accounts(accounts);
        self
    }

    pub fn set_accounts(&self, accounts: &[&str]) {
        self.state().accounts = accounts.iter().map(|a| a.to_string()).collect();
    }

    pub fn set_chain_id(&self, chain_id: &str) {
        let mut state = self.state();
        state.known_chains.insert(chain_id.to_string());
        state.chain_id = chain_id.to_string();
    }

    /// Make `chain_id` switchable without adding it first.
    pub fn know_chain(&self, chain_id: &str) {
        self.state().known_chains.insert(chain_id.to_string());
    }

    pub fn set_balance(&self, address: &str, wei_hex: &str) {
        self.state()
            .balances
            .insert(address.to_lowercase(), wei_hex.to_string());
    }

    pub fn reject_accounts(&self, reject: bool) {
        self.state().reject_accounts = reject;
    }

    pub fn reject_chain_switch(&self, reject: bool) {
        self.state().reject_switch = reject;
    }

    pub fn reject_add_chain(&self, reject: bool) {
        self.state().reject_add_chain = reject;
    }

    pub fn reject_signing(&self, reject: bool) {
        self.state().reject_signing = reject;
    }

    pub fn fail_balances(&self, fail: bool) {
        self.state().fail_balances = fail;
    }

    /// Hold `request_accounts` open for `delay`, like a wallet popup.
    pub fn delay_accounts(&self, delay: Duration) {
        self.state().accounts_delay = Some(delay);
    }

    /// Hold `wallet_switchEthereumChain` for `delay` before answering.
    pub fn delay_chain_switch(&self, delay: Duration) {
        self.state().switch_delay = Some(delay);
    }

    /// Hold `eth_sendTransaction` for `delay`, as a wallet waiting on the user would.
    pub fn delay_signing(&self, delay: Duration) {
        self.state().signing_delay = Some(delay);
    }

    /// Make `tx_hash` pending for `pending_polls` receipt polls, then mined with `status`.
    pub fn queue_receipt(&self, tx_hash: &str, pending_polls: u32, status: TxStatus) {
        let from = DEV_ACCOUNTS[0].to_string();
        self.state().receipts.insert(
            tx_hash.to_string(),
            QueuedReceipt {
                pending_polls,
                status,
                mined_block: None,
                from,
                to: None,
            },
        );
    }

    /// Fail the next `count` receipt polls with a transport error.
    pub fn fail_next_receipt_polls(&self, count: u32) {
        self.state().failing_receipt_polls = count;
    }

    pub fn set_block_number(&self, height: u64) {
        self.state().head = height;
    }

    // endregion: --- Scripting

    // region:    --- Inspection

    pub fn current_chain(&self) -> String {
        self.state().chain_id.clone()
    }

    pub fn block_number_now(&self) -> u64 {
        self.state().head
    }

    pub fn receipt_polls(&self, tx_hash: &str) -> u32 {
        self.state().receipt_polls.get(tx_hash).copied().unwrap_or(0)
    }

    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    pub fn added_chains(&self) -> Vec<ChainInfo> {
        self.state().added_chains.clone()
    }

    // endregion: --- Inspection
}

fn user_rejected() -> WalletError {
    WalletError::from_provider_code(codes::USER_REJECTED, "User rejected the request.")
}

#[async_trait(?Send)]
impl WalletProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn request_accounts(&self) -> Result<Vec<String>> {
        let delay = self.state().accounts_delay;
        if let Some(delay) = delay {
            crate::confirm::sleep(delay).await;
        }

        let state = self.state();
        if state.reject_accounts {
            return Err(user_rejected());
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<String> {
        Ok(self.state().chain_id.clone())
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<()> {
        let delay = self.state().switch_delay;
        if let Some(delay) = delay {
            crate::confirm::sleep(delay).await;
        }

        let mut state = self.state();
        if state.reject_switch {
            return Err(user_rejected());
        }
        if !state.known_chains.contains(chain_id) {
            return Err(WalletError::from_provider_code(
                codes::UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID \"{}\"", chain_id),
            ));
        }
        state.chain_id = chain_id.to_string();
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainInfo) -> Result<()> {
        let mut state = self.state();
        if state.reject_add_chain {
            return Err(user_rejected());
        }
        state.known_chains.insert(chain.chain_id.to_lowercase());
        state.added_chains.push(chain.clone());
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String> {
        let delay = self.state().signing_delay;
        if let Some(delay) = delay {
            crate::confirm::sleep(delay).await;
        }

        let mut state = self.state();
        if state.reject_signing {
            return Err(user_rejected());
        }

        state.tx_counter += 1;
        let tx_hash = format!("0x{:064x}", state.tx_counter);
        let from = tx
            .from
            .clone()
            .unwrap_or_else(|| DEV_ACCOUNTS[0].to_string());

        state.receipts.insert(
            tx_hash.clone(),
            QueuedReceipt {
                pending_polls: 1,
                status: TxStatus::Success,
                mined_block: None,
                from,
                to: tx.to.clone(),
            },
        );
        state.sent.push(tx.clone());
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>> {
        let mut state = self.state();
        *state.receipt_polls.entry(tx_hash.to_string()).or_insert(0) += 1;
        state.head += 1;
        let head = state.head;

        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(WalletError::Rpc("connection reset by peer".to_string()));
        }

        let Some(queued) = state.receipts.get_mut(tx_hash) else {
            return Ok(None);
        };
        if queued.pending_polls > 0 {
            queued.pending_polls -= 1;
            return Ok(None);
        }

        let block_number = *queued.mined_block.get_or_insert(head);
        Ok(Some(TxReceipt {
            transaction_hash: tx_hash.to_string(),
            block_number,
            block_hash: format!("0x{:064x}", block_number),
            status: queued.status,
            from: queued.from.clone(),
            to: queued.to.clone(),
            gas_used: Some(21_000),
        }))
    }

    async fn transaction_exists(&self, tx_hash: &str) -> Result<bool> {
        Ok(self.state().receipts.contains_key(tx_hash))
    }

    async fn block_number(&self) -> Result<u64> {
        Ok(self.state().head)
    }

    async fn balance(&self, address: &str) -> Result<String> {
        let state = self.state();
        if state.fail_balances {
            return Err(WalletError::Rpc("balance lookup failed".to_string()));
        }
        Ok(state
            .balances
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or_else(|| "0x0".to_string()))
    }
}
