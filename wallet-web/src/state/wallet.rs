//! Wallet state management
//!
//! The session itself lives in a thread-local (browser futures and JS
//! handles are not `Send`, so it cannot go into a Leptos context). Components
//! read a reactive copy of the session descriptor from [`WalletContext`],
//! which is refreshed after every operation and wallet event.

use leptos::prelude::*;
use leptos::task::spawn_local;
use lib_core::{Result, WalletConfig};
use lib_wallet::{SessionConfig, SessionState, WalletSession};
use shared::{ChainInfo, TransactionRequest, TxReceipt};
use std::cell::RefCell;
use std::rc::Rc;

use crate::services::wallet::{detect_provider, subscribe_wallet_events, BrowserProvider};

type Session = Rc<WalletSession<BrowserProvider>>;

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

fn session() -> Option<Session> {
    SESSION.with(|s| s.borrow().clone())
}

/// Global wallet context
#[derive(Clone, Copy)]
pub struct WalletContext {
    pub state: RwSignal<SessionState>,
    pub error: RwSignal<Option<String>>,
    /// Hash of the transaction currently being confirmed
    pub pending_tx: RwSignal<Option<String>>,
    pub last_receipt: RwSignal<Option<TxReceipt>>,
}

impl WalletContext {
    fn new(initial: SessionState) -> Self {
        Self {
            state: RwSignal::new(initial),
            error: RwSignal::new(None),
            pending_tx: RwSignal::new(None),
            last_receipt: RwSignal::new(None),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.state.with(|s| s.has_provider)
    }

    pub fn is_connected(&self) -> bool {
        self.state.with(|s| s.is_connect)
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn address(&self) -> Option<String> {
        self.state
            .with(|s| s.active_account.as_ref().map(|a| a.address.clone()))
    }

    pub fn chain_id(&self) -> Option<String> {
        self.state.with(|s| s.chain_id.clone())
    }

    pub fn known_chains(&self) -> Vec<ChainInfo> {
        session().map(|s| s.known_chains()).unwrap_or_default()
    }

    pub fn chain_name(&self) -> Option<String> {
        let chain_id = self.chain_id()?;
        session()?.chain(&chain_id).map(|c| c.chain_name)
    }

    /// Copy the session descriptor into the signal.
    pub fn refresh(&self) {
        if let Some(session) = session() {
            self.state.set(session.snapshot());
        }
    }

    fn settle<T>(&self, result: Result<T>) -> Option<T> {
        self.refresh();
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Wallet operation failed: {}", e);
                self.error.set(Some(e.user_message()));
                None
            }
        }
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }

    pub fn connect(&self, chain: Option<ChainInfo>) {
        let Some(session) = session() else {
            self.error.set(Some("No wallet found. Install MetaMask to continue.".to_string()));
            return;
        };
        let ctx = *self;
        ctx.error.set(None);
        ctx.state.update(|s| s.loading = true);

        spawn_local(async move {
            let result = session.connect(chain.as_ref()).await;
            ctx.settle(result);
        });
    }

    /// Submit `tx` and track it until it is mined.
    pub fn send_transaction(&self, tx: TransactionRequest) {
        let Some(session) = session() else { return };
        let ctx = *self;
        ctx.error.set(None);
        ctx.last_receipt.set(None);

        spawn_local(async move {
            let result = session.send_transaction(tx).await;
            let Some(tx_hash) = ctx.settle(result) else { return };
            log::info!("Transaction submitted: {}", tx_hash);
            ctx.pending_tx.set(Some(tx_hash.clone()));

            let result = session.wait_tx_confirmed(&tx_hash).await;
            ctx.pending_tx.set(None);
            if let Some(receipt) = ctx.settle(result) {
                ctx.last_receipt.set(Some(receipt));
            }
        });
    }

    pub fn switch_chain(&self, chain: ChainInfo) {
        let Some(session) = session() else { return };
        let ctx = *self;
        ctx.error.set(None);

        spawn_local(async move {
            let result = session.switch_chain(&chain).await;
            ctx.settle(result);
        });
    }

    pub fn add_chain(&self, chain: ChainInfo) {
        let Some(session) = session() else { return };
        let ctx = *self;
        ctx.error.set(None);

        spawn_local(async move {
            let result = session.add_chain(&chain).await;
            ctx.settle(result);
        });
    }

    pub fn select_account(&self, address: &str) {
        let Some(session) = session() else { return };
        let result = session.select_account(address);
        self.settle(result);
    }

    pub fn disconnect(&self) {
        if let Some(session) = session() {
            session.disconnect();
        }
        self.refresh();
        self.error.set(None);
        self.pending_tx.set(None);
        self.last_receipt.set(None);
    }
}

pub fn provide_wallet_context() -> WalletContext {
    let wallet_session = Rc::new(WalletSession::new(
        detect_provider(),
        SessionConfig::from(&WalletConfig::default()),
    ));
    let context = WalletContext::new(wallet_session.snapshot());
    let has_provider = wallet_session.has_provider();
    SESSION.with(|s| *s.borrow_mut() = Some(wallet_session));

    if has_provider {
        subscribe_wallet_events(
            move |accounts| {
                if let Some(session) = session() {
                    session.handle_accounts_changed(accounts);
                    context.refresh();
                }
            },
            move |chain_id| {
                if let Some(session) = session() {
                    session.handle_chain_changed(&chain_id);
                    context.refresh();
                }
            },
        );
    }

    provide_context(context);
    context
}

pub fn use_wallet_context() -> WalletContext {
    expect_context::<WalletContext>()
}
