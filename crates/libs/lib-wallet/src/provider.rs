//! # Wallet Provider Abstraction
//!
//! The session talks to the outside world through [`WalletProvider`]: the
//! signing wallet (account authorization, network switching, transaction
//! signing) and the network it is attached to (receipts, block height,
//! balances).
//!
//! ## Implementations
//!
//! - [`Eip1193Provider`]: any EIP-1193 request/response [`Transport`]
//!   - [`HttpTransport`](crate::rpc::HttpTransport) - JSON-RPC node over HTTP
//!   - `MetaMaskTransport` in wallet-web - the injected `window.ethereum`
//! - [`MockProvider`](crate::mock::MockProvider): scripted in-memory wallet
//!
//! ## Threading
//!
//! Browser wallet futures hold JavaScript values and are not `Send`, so the
//! traits use `#[async_trait(?Send)]`. Native callers run them on a
//! current-thread runtime or a `LocalSet`.
//!
//! ## Method Mapping
//!
//! ```text
//! request_accounts     → eth_requestAccounts (eth_accounts on plain nodes)
//! chain_id             → eth_chainId
//! switch_chain         → wallet_switchEthereumChain
//! add_chain            → wallet_addEthereumChain
//! send_transaction     → eth_sendTransaction
//! transaction_receipt  → eth_getTransactionReceipt
//! transaction_exists   → eth_getTransactionByHash
//! block_number         → eth_blockNumber
//! balance              → eth_getBalance
//! ```

use async_trait::async_trait;
use lib_core::error::codes;
use lib_core::{Result, WalletError};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{ChainInfo, TransactionRequest, TxReceipt, TxStatus};
use tracing::debug;

/// Wallet extension plus network access, as seen by a session.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Display name of the wallet ("MetaMask", "json-rpc", ...).
    fn name(&self) -> &str;

    /// Ask the wallet to authorize accounts. The first entry is the selected one.
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Chain the wallet is currently attached to, as `0x` hex.
    async fn chain_id(&self) -> Result<String>;

    /// Ask the wallet to move to `chain_id`.
    async fn switch_chain(&self, chain_id: &str) -> Result<()>;

    /// Register a network with the wallet.
    async fn add_chain(&self, chain: &ChainInfo) -> Result<()>;

    /// Sign and submit; returns the transaction hash.
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String>;

    /// Receipt of a mined transaction, `None` while pending.
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>>;

    /// Whether the network still knows the transaction (pending or mined).
    async fn transaction_exists(&self, tx_hash: &str) -> Result<bool>;

    /// Current block height.
    async fn block_number(&self) -> Result<u64>;

    /// Balance of `address` in wei, as a hex quantity.
    async fn balance(&self, address: &str) -> Result<String>;
}

/// EIP-1193 `request({ method, params })`.
#[async_trait(?Send)]
pub trait Transport {
    async fn request(&self, method: &str, params: Value) -> Result<Value>;
}

/// [`WalletProvider`] over an EIP-1193 transport.
pub struct Eip1193Provider<T> {
    transport: T,
    name: String,
}

impl<T: Transport> Eip1193Provider<T> {
    pub fn new(transport: T, name: impl Into<String>) -> Self {
        Self {
            transport,
            name: name.into(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: for<'de> Deserialize<'de>>(&self, method: &str, params: Value) -> Result<R> {
        debug!(method, "provider request");
        let value = self.transport.request(method, params).await?;
        serde_json::from_value(value)
            .map_err(|e| WalletError::Internal(format!("Unexpected {} response: {}", method, e)))
    }
}

#[async_trait(?Send)]
impl<T: Transport> WalletProvider for Eip1193Provider<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_accounts(&self) -> Result<Vec<String>> {
        match self.call("eth_requestAccounts", json!([])).await {
            // Plain nodes only know eth_accounts
            Err(WalletError::Provider { code, .. })
                if code == codes::METHOD_NOT_FOUND || code == codes::UNSUPPORTED_METHOD =>
            {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.call("eth_accounts", json!([])).await
            }
            other => other,
        }
    }

    async fn chain_id(&self) -> Result<String> {
        self.call("eth_chainId", json!([])).await
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<()> {
        let _: Value = self
            .call("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainInfo) -> Result<()> {
        let _: Value = self.call("wallet_addEthereumChain", json!([chain])).await?;
        Ok(())
    }

    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String> {
        self.call("eth_sendTransaction", json!([tx])).await
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>> {
        let raw: Option<RawReceipt> = self
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        raw.map(RawReceipt::into_receipt).transpose()
    }

    async fn transaction_exists(&self, tx_hash: &str) -> Result<bool> {
        let tx: Value = self
            .call("eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        Ok(!tx.is_null())
    }

    async fn block_number(&self) -> Result<u64> {
        let height: String = self.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&height, "blockNumber")
    }

    async fn balance(&self, address: &str) -> Result<String> {
        self.call("eth_getBalance", json!([address, "latest"])).await
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    block_hash: Option<String>,
    status: Option<String>,
    from: String,
    to: Option<String>,
    gas_used: Option<String>,
}

impl RawReceipt {
    fn into_receipt(self) -> Result<TxReceipt> {
        let block_number = self
            .block_number
            .as_deref()
            .ok_or_else(|| WalletError::Internal("receipt without blockNumber".to_string()))
            .and_then(|n| parse_quantity(n, "blockNumber"))?;

        // Pre-Byzantium receipts carry no status; treat inclusion as success
        let status = match self
            .status
            .as_deref()
            .map(|s| parse_quantity(s, "status"))
            .transpose()?
        {
            Some(0) => TxStatus::Reverted,
            _ => TxStatus::Success,
        };

        let gas_used = self
            .gas_used
            .as_deref()
            .map(|g| parse_quantity(g, "gasUsed"))
            .transpose()?;

        Ok(TxReceipt {
            transaction_hash: self.transaction_hash,
            block_number,
            block_hash: self.block_hash.unwrap_or_default(),
            status,
            from: self.from.to_lowercase(),
            to: self.to.map(|t| t.to_lowercase()),
            gas_used,
        })
    }
}

/// Parse a `0x` hex quantity into a `u64`.
pub fn parse_quantity(value: &str, field: &str) -> Result<u64> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::Internal(format!("{} is not hex: {}", field, value)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| WalletError::Internal(format!("{} out of range ({}): {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Transport answering from a fixed table and recording calls.
    #[derive(Default)]
    struct TableTransport {
        responses: HashMap<&'static str, Result<Value>>,
        calls: RefCell<Vec<(String, Value)>>,
    }

    impl TableTransport {
        fn with(mut self, method: &'static str, response: Result<Value>) -> Self {
            self.responses.insert(method, response);
            self
        }
    }

    #[async_trait(?Send)]
    impl Transport for TableTransport {
        async fn request(&self, method: &str, params: Value) -> Result<Value> {
            self.calls.borrow_mut().push((method.to_string(), params));
            match self.responses.get(method) {
                Some(Ok(v)) => Ok(v.clone()),
                Some(Err(e)) => Err(WalletError::from_provider_code(
                    e.code().unwrap_or(codes::INTERNAL),
                    e.to_string(),
                )),
                None => Err(WalletError::from_provider_code(codes::METHOD_NOT_FOUND, method)),
            }
        }
    }

    #[tokio::test]
    async fn test_request_accounts_falls_back_to_eth_accounts() {
        let transport = TableTransport::default()
            .with("eth_accounts", Ok(json!(["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"])));
        let provider = Eip1193Provider::new(transport, "node");

        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts, vec!["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"]);

        let calls = provider.transport().calls.borrow();
        assert_eq!(calls[0].0, "eth_requestAccounts");
        assert_eq!(calls[1].0, "eth_accounts");
    }

    #[tokio::test]
    async fn test_user_rejection_is_not_retried() {
        let transport = TableTransport::default()
            .with("eth_requestAccounts", Err(WalletError::UserRejected("no".into())));
        let provider = Eip1193Provider::new(transport, "MetaMask");

        let err = provider.request_accounts().await.unwrap_err();
        assert!(matches!(err, WalletError::UserRejected(_)));
        assert_eq!(provider.transport().calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_switch_chain_sends_chain_id_object() {
        let transport = TableTransport::default().with("wallet_switchEthereumChain", Ok(Value::Null));
        let provider = Eip1193Provider::new(transport, "MetaMask");

        provider.switch_chain("0xaa36a7").await.unwrap();

        let calls = provider.transport().calls.borrow();
        assert_eq!(calls[0].1, json!([{ "chainId": "0xaa36a7" }]));
    }

    #[tokio::test]
    async fn test_receipt_parsing() {
        let receipt = json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x10",
            "blockHash": format!("0x{}", "22".repeat(32)),
            "status": "0x0",
            "from": "0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "to": null,
            "gasUsed": "0x5208"
        });
        let transport = TableTransport::default().with("eth_getTransactionReceipt", Ok(receipt));
        let provider = Eip1193Provider::new(transport, "node");

        let receipt = provider
            .transaction_receipt(&format!("0x{}", "11".repeat(32)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(receipt.block_number, 16);
        assert_eq!(receipt.status, TxStatus::Reverted);
        assert_eq!(receipt.gas_used, Some(21_000));
        assert_eq!(receipt.from, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert!(receipt.to.is_none());
    }

    #[tokio::test]
    async fn test_pending_receipt_is_none() {
        let transport = TableTransport::default().with("eth_getTransactionReceipt", Ok(Value::Null));
        let provider = Eip1193Provider::new(transport, "node");

        let receipt = provider.transaction_receipt("0xabc").await.unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0", "n").unwrap(), 0);
        assert_eq!(parse_quantity("0xff", "n").unwrap(), 255);
        assert!(parse_quantity("255", "n").is_err());
        assert!(parse_quantity("0x1ffffffffffffffff", "n").is_err());
    }
}
