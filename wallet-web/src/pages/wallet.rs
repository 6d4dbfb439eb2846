//! Wallet Page - connect, inspect, switch networks and send transactions

use leptos::prelude::*;
use shared::{format_units, truncate_address, ChainInfo, TransactionRequest};

use crate::state::wallet::{use_wallet_context, WalletContext};

#[component]
pub fn WalletPage() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <div class="app-container" style="display: flex; justify-content: center; padding-top: 48px;">
            <div class="card" style="width: 100%; max-width: 560px;">
                <h1 class="card-title" style="text-align: center; margin-bottom: var(--spacing-md);">
                    "Wallet"
                </h1>

                <ErrorBanner/>

                {move || {
                    if !wallet_ctx.has_provider() {
                        view! { <NoWallet/> }.into_any()
                    } else if wallet_ctx.is_connected() {
                        view! {
                            <div>
                                <SessionSummary/>
                                <NetworkPanel/>
                                <SendPanel/>
                                <button
                                    class="btn"
                                    style="width: 100%; background: var(--bg-error); margin-top: var(--spacing-lg);"
                                    on:click=move |_| wallet_ctx.disconnect()
                                >
                                    "Disconnect Wallet"
                                </button>
                            </div>
                        }.into_any()
                    } else {
                        view! { <ConnectPanel/> }.into_any()
                    }
                }}
            </div>
        </div>
    }
}

#[component]
fn ErrorBanner() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    move || {
        wallet_ctx.error.get().map(|message| {
            view! {
                <div class="error-banner" style="color: var(--price-down); margin-bottom: var(--spacing-md);">
                    <span>{message}</span>
                    <button class="btn-link" on:click=move |_| wallet_ctx.clear_error()>"Dismiss"</button>
                </div>
            }
        })
    }
}

#[component]
fn NoWallet() -> impl IntoView {
    view! {
        <div style="text-align: center;">
            <p style="color: var(--text-secondary); margin-bottom: var(--spacing-lg);">
                "No browser wallet detected."
            </p>
            <a href="https://metamask.io/download/" target="_blank" class="btn" style="display: block; text-decoration: none;">
                "Install MetaMask"
            </a>
        </div>
    }
}

#[component]
fn ConnectPanel() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <button
            class="btn"
            style="width: 100%;"
            disabled=move || wallet_ctx.is_loading()
            on:click=move |_| wallet_ctx.connect(None)
        >
            {move || if wallet_ctx.is_loading() { "Waiting for wallet..." } else { "Connect Wallet" }}
        </button>
    }
}

#[component]
fn SessionSummary() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    let accounts = move || {
        let active = wallet_ctx.address();
        wallet_ctx.state.with(|s| s.accounts.values().cloned().collect::<Vec<_>>())
            .into_iter()
            .map(|account| {
                let is_active = active.as_deref() == Some(account.address.as_str());
                let address = account.address.clone();
                let balance = account
                    .balance
                    .as_deref()
                    .and_then(|b| format_units(b, 18))
                    .unwrap_or_else(|| "-".to_string());
                view! {
                    <li style="display: flex; justify-content: space-between; font-family: monospace;">
                        <span title=account.address.clone()>
                            {if is_active { "● " } else { "○ " }}
                            {truncate_address(&account.address)}
                        </span>
                        <span>{balance}</span>
                        <button
                            class="btn-link"
                            disabled=is_active
                            on:click=move |_| wallet_ctx.select_account(&address)
                        >
                            "Use"
                        </button>
                    </li>
                }
            })
            .collect_view()
    };

    view! {
        <div style="background: var(--bg-card); padding: var(--spacing-lg); border-radius: var(--border-radius); border: 1px solid var(--border-color);">
            <p style="color: var(--text-secondary); margin-bottom: var(--spacing-sm);">"Network"</p>
            <p style="margin-bottom: var(--spacing-lg);">
                {move || wallet_ctx.chain_name().unwrap_or_else(|| "Unknown network".to_string())}
                " "
                <span style="color: var(--text-secondary);">{move || wallet_ctx.chain_id().unwrap_or_default()}</span>
            </p>
            <p style="color: var(--text-secondary); margin-bottom: var(--spacing-sm);">"Accounts"</p>
            <ul style="list-style: none; padding: 0;">{accounts}</ul>
        </div>
    }
}

#[component]
fn NetworkPanel() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let (chain_id, set_chain_id) = signal(String::new());
    let (name, set_name) = signal(String::new());
    let (rpc_url, set_rpc_url) = signal(String::new());
    let (symbol, set_symbol) = signal("ETH".to_string());

    let options = move || {
        let current = wallet_ctx.chain_id();
        wallet_ctx
            .known_chains()
            .into_iter()
            .map(|chain| {
                let selected = current.as_deref() == Some(chain.chain_id.as_str());
                view! {
                    <option value=chain.chain_id.clone() selected=selected>{chain.chain_name.clone()}</option>
                }
            })
            .collect_view()
    };

    let on_switch = move |ev: leptos::ev::Event| {
        let id = event_target_value(&ev);
        if let Some(chain) = wallet_ctx.known_chains().into_iter().find(|c| c.chain_id == id) {
            wallet_ctx.switch_chain(chain);
        }
    };

    let on_add = move |_| {
        let chain = ChainInfo::new(chain_id.get(), name.get(), rpc_url.get(), symbol.get());
        wallet_ctx.add_chain(chain);
    };

    view! {
        <div style="margin-top: var(--spacing-lg);">
            <label style="color: var(--text-secondary);">"Switch network"</label>
            <select style="width: 100%;" on:change=on_switch>{options}</select>

            <details style="margin-top: var(--spacing-md);">
                <summary>"Add a network"</summary>
                <input type="text" placeholder="Chain id (0x89 or 137)" prop:value=chain_id
                    on:input=move |ev| set_chain_id.set(event_target_value(&ev))/>
                <input type="text" placeholder="Name" prop:value=name
                    on:input=move |ev| set_name.set(event_target_value(&ev))/>
                <input type="text" placeholder="RPC URL" prop:value=rpc_url
                    on:input=move |ev| set_rpc_url.set(event_target_value(&ev))/>
                <input type="text" placeholder="Symbol" prop:value=symbol
                    on:input=move |ev| set_symbol.set(event_target_value(&ev))/>
                <button class="btn" on:click=on_add>"Add Network"</button>
            </details>
        </div>
    }
}

#[component]
fn SendPanel() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let (to, set_to) = signal(String::new());
    let (value, set_value) = signal("0x0".to_string());
    let (data, set_data) = signal(String::new());

    let on_send = move |_| {
        let mut tx = TransactionRequest::transfer(to.get(), value.get());
        let data = data.get();
        if !data.trim().is_empty() {
            tx = tx.with_data(data.trim());
        }
        wallet_ctx.send_transaction(tx);
    };

    view! {
        <div style="margin-top: var(--spacing-lg);">
            <label style="color: var(--text-secondary);">"Send transaction"</label>
            <input type="text" placeholder="Recipient 0x..." prop:value=to
                on:input=move |ev| set_to.set(event_target_value(&ev))/>
            <input type="text" placeholder="Value in wei (hex)" prop:value=value
                on:input=move |ev| set_value.set(event_target_value(&ev))/>
            <input type="text" placeholder="Data (optional hex)" prop:value=data
                on:input=move |ev| set_data.set(event_target_value(&ev))/>
            <button
                class="btn"
                style="width: 100%;"
                disabled=move || wallet_ctx.pending_tx.with(|p| p.is_some())
                on:click=on_send
            >
                "Send"
            </button>
            <TransactionStatus ctx=wallet_ctx/>
        </div>
    }
}

#[component]
fn TransactionStatus(ctx: WalletContext) -> impl IntoView {
    move || {
        if let Some(tx_hash) = ctx.pending_tx.get() {
            return view! {
                <p style="color: var(--text-secondary); font-family: monospace;">
                    "Waiting for confirmation: " {truncate_address(&tx_hash)}
                </p>
            }
            .into_any();
        }

        match ctx.last_receipt.get() {
            Some(receipt) => {
                let outcome = if receipt.succeeded() { "Confirmed" } else { "Reverted" };
                view! {
                    <p style="font-family: monospace;">
                        {outcome} " in block " {receipt.block_number} ": " {truncate_address(&receipt.transaction_hash)}
                    </p>
                }
                .into_any()
            }
            None => ().into_any(),
        }
    }
}
