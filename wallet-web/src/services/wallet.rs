//! Injected Wallet Integration via wasm-bindgen
//!
//! This module bridges the browser's EIP-1193 provider (`window.ethereum`,
//! injected by MetaMask and compatible extensions) into the wallet session.
//! Every call goes through one `request({ method, params })` binding; errors
//! keep their numeric EIP-1193 `code` so the session can tell a user
//! rejection from an unknown chain.

use async_trait::async_trait;
use js_sys::Reflect;
use lib_core::error::codes;
use lib_core::{Result, WalletError};
use lib_wallet::{Eip1193Provider, Transport};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

/// Session provider backed by the injected wallet.
pub type BrowserProvider = Eip1193Provider<InjectedTransport>;

// ============================================================================
// WALLET DETECTION AND REQUESTS (JavaScript Interop)
// ============================================================================

#[wasm_bindgen(inline_js = "
export function hasEthereum() {
    return typeof window !== 'undefined' && !!window.ethereum;
}

export function walletName() {
    const eth = window.ethereum;
    if (!eth) {
        return null;
    }
    if (eth.isBraveWallet) {
        return 'Brave Wallet';
    }
    if (eth.isCoinbaseWallet) {
        return 'Coinbase Wallet';
    }
    if (eth.isMetaMask) {
        return 'MetaMask';
    }
    return 'Injected Wallet';
}

export async function ethRequest(method, params) {
    if (!window.ethereum) {
        throw { code: 4900, message: 'No wallet provider available' };
    }
    try {
        return await window.ethereum.request({ method, params });
    } catch (error) {
        // Flatten to a plain object so code survives the trip into wasm
        const code = error && typeof error.code === 'number' ? error.code : -32603;
        const message = error && error.message ? String(error.message) : String(error);
        throw { code, message };
    }
}

export function onEthereumEvent(event, callback) {
    const eth = window.ethereum;
    if (eth && typeof eth.on === 'function') {
        eth.on(event, callback);
        return true;
    }
    return false;
}
")]
extern "C" {
    fn hasEthereum() -> bool;

    fn walletName() -> Option<String>;

    #[wasm_bindgen(catch)]
    async fn ethRequest(method: &str, params: JsValue) -> std::result::Result<JsValue, JsValue>;

    fn onEthereumEvent(event: &str, callback: &Closure<dyn Fn(JsValue)>) -> bool;
}

// ============================================================================
// TRANSPORT
// ============================================================================

/// EIP-1193 transport over `window.ethereum.request`.
pub struct InjectedTransport;

#[async_trait(?Send)]
impl Transport for InjectedTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let js_params = params
            .serialize(&serializer)
            .map_err(|e| WalletError::InvalidParams(format!("Cannot pass params to {}: {}", method, e)))?;

        let result = ethRequest(method, js_params).await.map_err(provider_error)?;
        if result.is_null() || result.is_undefined() {
            return Ok(Value::Null);
        }

        serde_wasm_bindgen::from_value(result)
            .map_err(|e| WalletError::Internal(format!("Unexpected {} response: {}", method, e)))
    }
}

fn provider_error(error: JsValue) -> WalletError {
    let code = Reflect::get(&error, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(codes::INTERNAL);

    let message = Reflect::get(&error, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", error));

    WalletError::from_provider_code(code, message)
}

// ============================================================================
// WALLET SERVICE
// ============================================================================

/// Provider for the injected wallet, if the page has one.
pub fn detect_provider() -> Option<BrowserProvider> {
    if !hasEthereum() {
        log::info!("No injected wallet found");
        return None;
    }

    let name = walletName().unwrap_or_else(|| "Injected Wallet".to_string());
    log::info!("Detected wallet: {}", name);
    Some(Eip1193Provider::new(InjectedTransport, name))
}

/// Forward `accountsChanged` and `chainChanged` events for the lifetime of the page.
pub fn subscribe_wallet_events<A, C>(on_accounts: A, on_chain: C)
where
    A: Fn(Vec<String>) + 'static,
    C: Fn(String) + 'static,
{
    let accounts_cb = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
        let accounts: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap_or_default();
        on_accounts(accounts);
    });
    let chain_cb = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
        if let Some(chain_id) = value.as_string() {
            on_chain(chain_id);
        }
    });

    if onEthereumEvent("accountsChanged", &accounts_cb) {
        accounts_cb.forget();
    }
    if onEthereumEvent("chainChanged", &chain_cb) {
        chain_cb.forget();
    }
}
