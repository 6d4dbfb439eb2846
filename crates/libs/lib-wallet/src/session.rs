//! # Wallet Session
//!
//! [`WalletSession`] owns the connection between the dashboard and a wallet:
//! the detected provider handle, the session descriptor ([`SessionState`]),
//! the chains it has registered, and the transactions it has submitted.
//!
//! ## Lifecycle
//!
//! ```text
//!  new(provider?)          connect()            disconnect()
//! ───────────────→ idle ─────────────→ connected ─────────────→ idle
//!   has_provider         loading=true     │  ▲
//!   fixed here                            │  │ send_transaction / wait_tx_confirmed
//!                                         │  │ switch_chain / add_chain
//!                                         └──┘ select_account / wallet events
//! ```
//!
//! ## Guarantees
//!
//! - `active_account`, when set, is always an entry of `accounts`
//! - `is_connect` is true only between a successful `connect` and the next
//!   `disconnect` (or a wallet lock event)
//! - after a successful `switch_chain`, `chain_id` is the requested chain
//! - `disconnect` never fails and may be called any number of times
//!
//! ## Concurrency
//!
//! The descriptor sits behind a lock that is never held across an `.await`.
//! Operations that talk to the wallet and then change session state queue on
//! an operation lock, so overlapping `connect` calls run one after the other.
//! `disconnect` is synchronous and does not queue: it bumps a session epoch,
//! and an operation that sees the epoch change while it was waiting on the
//! wallet discards its result with [`WalletError::NotConnected`].
//!
//! ## Example
//!
//! ```rust
//! use lib_wallet::mock::MockProvider;
//! use lib_wallet::session::{SessionConfig, WalletSession};
//! use shared::TransactionRequest;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let session = WalletSession::new(Some(MockProvider::new()), SessionConfig::default());
//!
//! session.connect(None).await?;
//! let tx_hash = session
//!     .send_transaction(TransactionRequest::transfer(
//!         "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
//!         "0xde0b6b3a7640000",
//!     ))
//!     .await?;
//! let receipt = session.wait_tx_confirmed(&tx_hash).await?;
//! assert!(receipt.succeeded());
//!
//! session.disconnect();
//! assert!(!session.is_connected());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use lib_core::{Result, WalletConfig, WalletError};
use serde::Serialize;
use shared::{AccountData, ChainInfo, TransactionRequest, TxReceipt};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument, warn};

use crate::chains::{validate_chain, ChainRegistry};
use crate::confirm::{wait_for_confirmation, ConfirmationPolicy};
use crate::params::validate_transaction;
use crate::provider::WalletProvider;

/// Snapshot of the session descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// A connect attempt is in flight
    pub loading: bool,
    /// A wallet was detected when the session was created
    pub has_provider: bool,
    /// Chain the wallet is attached to, as normalized `0x` hex
    pub chain_id: Option<String>,
    /// Authorized accounts keyed by lower-cased address
    pub accounts: BTreeMap<String, AccountData>,
    /// Account used for signing
    pub active_account: Option<AccountData>,
    pub is_connect: bool,
    pub connected_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn idle(has_provider: bool) -> Self {
        Self {
            loading: false,
            has_provider,
            chain_id: None,
            accounts: BTreeMap::new(),
            active_account: None,
            is_connect: false,
            connected_at: None,
        }
    }

    fn reset(&mut self) {
        *self = Self {
            loading: self.loading,
            ..Self::idle(self.has_provider)
        };
    }
}

/// Session behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub confirmation: ConfirmationPolicy,
    /// On connect, register a target chain the wallet does not know yet
    pub auto_add_chain: bool,
    /// Look up balances of connected accounts
    pub fetch_balances: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            confirmation: ConfirmationPolicy::default(),
            auto_add_chain: true,
            fetch_balances: true,
        }
    }
}

impl From<&WalletConfig> for SessionConfig {
    fn from(config: &WalletConfig) -> Self {
        Self {
            confirmation: ConfirmationPolicy::from(config),
            auto_add_chain: config.auto_add_chain,
            ..Self::default()
        }
    }
}

struct Inner {
    state: SessionState,
    chains: ChainRegistry,
    pending: BTreeSet<String>,
}

/// Result of the wallet round-trips of a connect, applied only if the
/// session was not reset in the meantime.
struct Established {
    accounts: Vec<AccountData>,
    chain_id: String,
    target: Option<ChainInfo>,
}

/// Wallet session over provider `P`.
pub struct WalletSession<P> {
    provider: Option<P>,
    config: SessionConfig,
    inner: RwLock<Inner>,
    epoch: AtomicU64,
    ops: tokio::sync::Mutex<()>,
}

impl<P: WalletProvider> WalletSession<P> {
    /// Create a session from the result of wallet detection.
    pub fn new(provider: Option<P>, config: SessionConfig) -> Self {
        let has_provider = provider.is_some();
        match &provider {
            Some(p) => info!(wallet = p.name(), "wallet provider detected"),
            None => info!("no wallet provider detected"),
        }

        Self {
            provider,
            config,
            inner: RwLock::new(Inner {
                state: SessionState::idle(has_provider),
                chains: ChainRegistry::builtin(),
                pending: BTreeSet::new(),
            }),
            epoch: AtomicU64::new(0),
            ops: tokio::sync::Mutex::new(()),
        }
    }

    // region:    --- Accessors

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Clone of the current descriptor.
    pub fn snapshot(&self) -> SessionState {
        self.read().state.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.read().state.is_connect
    }

    pub fn is_loading(&self) -> bool {
        self.read().state.loading
    }

    pub fn active_account(&self) -> Option<AccountData> {
        self.read().state.active_account.clone()
    }

    pub fn chain_id(&self) -> Option<String> {
        self.read().state.chain_id.clone()
    }

    /// Hashes submitted through this session and not yet settled.
    pub fn pending_transactions(&self) -> Vec<String> {
        self.read().pending.iter().cloned().collect()
    }

    pub fn known_chains(&self) -> Vec<ChainInfo> {
        self.read().chains.iter().cloned().collect()
    }

    /// Descriptor of a known chain, by id in any accepted spelling.
    pub fn chain(&self, chain_id: &str) -> Option<ChainInfo> {
        self.read().chains.get(chain_id).cloned()
    }

    // endregion: --- Accessors

    // region:    --- Operations

    /// Authorize accounts and attach to `chain` (or the wallet's current chain).
    #[instrument(skip_all, fields(target_chain = chain.map(|c| c.chain_id.as_str())))]
    pub async fn connect(&self, chain: Option<&ChainInfo>) -> Result<()> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoProvider)?;
        let target = chain.map(validate_chain).transpose()?;

        let _op = self.ops.lock().await;
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.write().state.loading = true;

        let established = self.establish(provider, target).await;

        let mut inner = self.write();
        inner.state.loading = false;
        let established = established?;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            warn!("session was disconnected while connecting, discarding result");
            return Err(WalletError::NotConnected);
        }

        if let Some(chain) = established.target {
            inner.chains.insert(chain)?;
        }

        let active_address = established.accounts[0].address.clone();
        for account in established.accounts {
            inner
                .state
                .accounts
                .entry(account.address.clone())
                .and_modify(|existing| {
                    if account.balance.is_some() {
                        existing.balance = account.balance.clone();
                    }
                })
                .or_insert(account);
        }

        let state = &mut inner.state;
        state.active_account = state.accounts.get(&active_address).cloned();
        state.chain_id = Some(established.chain_id);
        state.is_connect = true;
        state.connected_at = Some(lib_utils::now_utc());

        info!(
            account = %active_address,
            chain_id = state.chain_id.as_deref().unwrap_or_default(),
            accounts = state.accounts.len(),
            "wallet connected"
        );
        Ok(())
    }

    /// Sign and submit `tx` from the active account; returns the transaction hash.
    #[instrument(skip_all)]
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<String> {
        let _op = self.ops.lock().await;
        let (provider, epoch) = self.require_session()?;
        let mut tx = validate_transaction(&tx)?;

        {
            let inner = self.read();
            let active = inner
                .state
                .active_account
                .as_ref()
                .ok_or(WalletError::NotConnected)?;

            match &tx.from {
                None => tx.from = Some(active.address.clone()),
                Some(from) if !inner.state.accounts.contains_key(from) => {
                    return Err(WalletError::InvalidParams(format!(
                        "{} is not a connected account",
                        from
                    )));
                }
                Some(_) => {}
            }
        }

        debug!(from = tx.from.as_deref(), to = tx.to.as_deref(), "submitting transaction");
        let tx_hash = provider.send_transaction(&tx).await?;
        lib_utils::validate_tx_hash(&tx_hash).map_err(WalletError::Internal)?;

        let mut inner = self.write();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            warn!(%tx_hash, "session ended while signing, transaction not tracked");
            return Ok(tx_hash);
        }
        inner.pending.insert(tx_hash.clone());
        info!(%tx_hash, "transaction submitted");
        Ok(tx_hash)
    }

    /// Wait for `tx_hash` to be mined under the session's confirmation policy.
    #[instrument(skip(self))]
    pub async fn wait_tx_confirmed(&self, tx_hash: &str) -> Result<TxReceipt> {
        lib_utils::validate_tx_hash(tx_hash).map_err(WalletError::InvalidParams)?;
        let provider = self.provider.as_ref().ok_or(WalletError::NoProvider)?;

        if !self.read().pending.contains(tx_hash) {
            debug!("transaction was not submitted through this session");
        }

        let result = wait_for_confirmation(provider, tx_hash, &self.config.confirmation).await;

        let settled = match &result {
            Ok(_) | Err(WalletError::TransactionFailed(_)) => true,
            Err(_) => false,
        };
        if settled {
            self.write().pending.remove(tx_hash);
        }
        result
    }

    /// Drop the session. Never fails; calling it again has no further effect.
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.write();
        let was_connected = inner.state.is_connect;
        inner.state.reset();
        inner.pending.clear();

        if was_connected {
            info!("wallet disconnected");
        }
    }

    /// Move the wallet to `chain`.
    #[instrument(skip_all, fields(chain_id = %chain.chain_id))]
    pub async fn switch_chain(&self, chain: &ChainInfo) -> Result<()> {
        let target = validate_chain(chain)?;

        let _op = self.ops.lock().await;
        let (provider, epoch) = self.require_session()?;

        provider.switch_chain(&target.chain_id).await?;

        let mut inner = self.write();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Err(WalletError::NotConnected);
        }
        inner.state.chain_id = Some(target.chain_id.clone());
        info!(chain_id = %target.chain_id, "switched chain");
        inner.chains.insert(target)?;
        Ok(())
    }

    /// Register `chain` with the wallet. The current chain does not change.
    #[instrument(skip_all, fields(chain_id = %chain.chain_id))]
    pub async fn add_chain(&self, chain: &ChainInfo) -> Result<()> {
        let target = validate_chain(chain)?;

        let _op = self.ops.lock().await;
        let (provider, _) = self.require_session()?;

        provider.add_chain(&target).await?;

        info!(chain_id = %target.chain_id, name = %target.chain_name, "chain added to wallet");
        self.write().chains.insert(target)?;
        Ok(())
    }

    /// Make another connected account the signing account.
    pub fn select_account(&self, address: &str) -> Result<()> {
        let address = lib_utils::validate_address(address, "address").map_err(WalletError::InvalidParams)?;

        let mut inner = self.write();
        if !inner.state.is_connect {
            return Err(WalletError::NotConnected);
        }
        let account = inner
            .state
            .accounts
            .get(&address)
            .cloned()
            .ok_or_else(|| WalletError::InvalidParams(format!("{} is not a connected account", address)))?;

        inner.state.active_account = Some(account);
        Ok(())
    }

    // endregion: --- Operations

    // region:    --- Wallet Events

    /// Apply an `accountsChanged` event. An empty list means the wallet was
    /// locked or access revoked, which ends the session.
    pub fn handle_accounts_changed(&self, accounts: Vec<String>) {
        if !self.is_connected() {
            debug!("accountsChanged ignored, no session");
            return;
        }

        let addresses: Vec<String> = accounts
            .iter()
            .filter_map(|a| match lib_utils::validate_address(a, "account") {
                Ok(address) => Some(address),
                Err(e) => {
                    warn!("ignoring account from wallet event: {}", e);
                    None
                }
            })
            .collect();

        if addresses.is_empty() {
            info!("wallet reported no accounts");
            self.disconnect();
            return;
        }

        let mut inner = self.write();
        let previous = std::mem::take(&mut inner.state.accounts);
        for address in &addresses {
            let account = previous
                .get(address)
                .cloned()
                .unwrap_or_else(|| AccountData::new(address.clone()));
            inner.state.accounts.insert(address.clone(), account);
        }
        inner.state.active_account = inner.state.accounts.get(&addresses[0]).cloned();
        info!(account = %addresses[0], "active account changed by wallet");
    }

    /// Apply a `chainChanged` event.
    pub fn handle_chain_changed(&self, chain_id: &str) {
        let chain_id = match lib_utils::normalize_chain_id(chain_id) {
            Ok(id) => id,
            Err(e) => {
                warn!("ignoring chainChanged event: {}", e);
                return;
            }
        };

        let mut inner = self.write();
        if inner.state.is_connect {
            info!(%chain_id, "chain changed by wallet");
            inner.state.chain_id = Some(chain_id);
        }
    }

    // endregion: --- Wallet Events

    // region:    --- Internals

    async fn establish(&self, provider: &P, target: Option<ChainInfo>) -> Result<Established> {
        let authorized = provider.request_accounts().await?;
        if authorized.is_empty() {
            return Err(WalletError::UserRejected("wallet returned no accounts".to_string()));
        }

        let addresses = authorized
            .iter()
            .map(|a| lib_utils::validate_address(a, "account").map_err(WalletError::Internal))
            .collect::<Result<Vec<_>>>()?;

        let chain_id = match &target {
            Some(chain) => {
                self.ensure_chain(provider, chain).await?;
                chain.chain_id.clone()
            }
            None => {
                let reported = provider.chain_id().await?;
                lib_utils::normalize_chain_id(&reported).map_err(WalletError::Internal)?
            }
        };

        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            let mut account = AccountData::new(address);
            if self.config.fetch_balances {
                match provider.balance(&account.address).await {
                    Ok(balance) => account.balance = Some(balance),
                    Err(e) => warn!(address = %account.address, "balance lookup failed: {}", e),
                }
            }
            accounts.push(account);
        }

        Ok(Established {
            accounts,
            chain_id,
            target,
        })
    }

    async fn ensure_chain(&self, provider: &P, chain: &ChainInfo) -> Result<()> {
        match provider.switch_chain(&chain.chain_id).await {
            Err(WalletError::UnsupportedChain(reason)) if self.config.auto_add_chain => {
                info!(chain_id = %chain.chain_id, %reason, "chain unknown to wallet, adding it");
                provider.add_chain(chain).await?;
                provider.switch_chain(&chain.chain_id).await
            }
            other => other,
        }
    }

    fn require_session(&self) -> Result<(&P, u64)> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        let provider = self.provider.as_ref().ok_or(WalletError::NotConnected)?;
        Ok((provider, epoch))
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // endregion: --- Internals
}
