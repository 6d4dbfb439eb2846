//! # JSON-RPC HTTP Transport
//!
//! [`HttpTransport`] carries EIP-1193 requests to a node over JSON-RPC 2.0.
//! Wrapped in [`Eip1193Provider`](crate::provider::Eip1193Provider) it gives a
//! headless wallet for nodes that hold unlocked accounts (anvil, hardhat,
//! geth `--dev`).
//!
//! ## Wire Format
//!
//! ```text
//! → {"jsonrpc":"2.0","id":7,"method":"eth_chainId","params":[]}
//! ← {"jsonrpc":"2.0","id":7,"result":"0x7a69"}
//! ← {"jsonrpc":"2.0","id":8,"error":{"code":-32601,"message":"Method not found"}}
//! ```
//!
//! JSON-RPC error objects go through
//! [`WalletError::from_provider_code`]; failures below the protocol (connect
//! errors, HTTP status, undecodable bodies) become [`WalletError::Rpc`] so
//! that confirmation polling can retry them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_wallet::provider::{Eip1193Provider, WalletProvider};
//! use lib_wallet::rpc::HttpTransport;
//!
//! # async fn example() -> lib_core::Result<()> {
//! let transport = HttpTransport::new("http://127.0.0.1:8545")?;
//! let provider = Eip1193Provider::new(transport, "anvil");
//! let height = provider.block_number().await?;
//! println!("block {}", height);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use lib_core::{Result, WalletError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::provider::Transport;

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 client for a single endpoint.
pub struct HttpTransport {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Create a transport for `url`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        lib_utils::validate_http_url(&url, "RPC URL").map_err(WalletError::Config)?;

        #[cfg(not(target_arch = "wasm32"))]
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| WalletError::Config(format!("Failed to build HTTP client: {}", e)))?;
        #[cfg(target_arch = "wasm32")]
        let http = Client::new();

        Ok(Self {
            http,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(id, method, url = %self.url, "json-rpc request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Rpc(format!("{} failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(method, %status, "json-rpc endpoint returned HTTP error");
            return Err(WalletError::Rpc(format!("{} returned HTTP {}", method, status)));
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::Rpc(format!("{} returned an unreadable body: {}", method, e)))?;

        if let Some(error) = envelope.error {
            debug!(method, code = error.code, message = %error.message, "json-rpc error");
            return Err(WalletError::from_provider_code(error.code, error.message));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Eip1193Provider, WalletProvider};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::net::TcpListener;

    fn localhost_binding_permitted() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            HttpTransport::new("ws://127.0.0.1:8546"),
            Err(WalletError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_chain_id_round_trip() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "eth_chainId",
                "params": []
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x7a69"}"#)
            .create_async()
            .await;

        let provider = Eip1193Provider::new(HttpTransport::new(server.url()).unwrap(), "anvil");
        assert_eq!(provider.chain_id().await.unwrap(), "0x7a69");
    }

    #[tokio::test]
    async fn test_json_rpc_error_maps_to_wallet_error() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":4902,"message":"Unrecognized chain ID \"0x89\""}}"#,
            )
            .create_async()
            .await;

        let provider = Eip1193Provider::new(HttpTransport::new(server.url()).unwrap(), "node");
        let err = provider.switch_chain("0x89").await.unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedChain(_)));
    }

    #[tokio::test]
    async fn test_http_failure_is_transient() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).unwrap();
        let err = transport.request("eth_blockNumber", json!([])).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_request_ids_increase() {
        if !localhost_binding_permitted() {
            return;
        }
        let mut server = Server::new_async().await;
        let first = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "id": 1 })))
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "id": 2 })))
            .with_body(r#"{"jsonrpc":"2.0","id":2,"result":"0x2"}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(server.url()).unwrap();
        assert_eq!(transport.request("eth_blockNumber", json!([])).await.unwrap(), "0x1");
        assert_eq!(transport.request("eth_blockNumber", json!([])).await.unwrap(), "0x2");

        first.assert_async().await;
        second.assert_async().await;
    }
}
