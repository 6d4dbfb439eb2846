//! # Centralized Error Handling
//!
//! This module defines [`WalletError`], the error type returned by every
//! fallible wallet session operation. It follows the `thiserror` pattern for
//! ergonomic error handling.
//!
//! ## Error Categories
//!
//! 1. **Session Errors** - the session cannot serve the request
//!    - [`NoProvider`](WalletError::NoProvider) - no wallet extension detected
//!    - [`NotConnected`](WalletError::NotConnected) - no live session
//!
//! 2. **Wallet Errors** - the wallet or its user refused
//!    - [`UserRejected`](WalletError::UserRejected) - EIP-1193 code 4001
//!    - [`UnsupportedChain`](WalletError::UnsupportedChain) - code 4902 or a bad descriptor
//!    - [`Provider`](WalletError::Provider) - any other provider error code
//!
//! 3. **Transaction Errors**
//!    - [`InvalidParams`](WalletError::InvalidParams) - malformed parameters
//!    - [`TransactionFailed`](WalletError::TransactionFailed) - reverted or dropped
//!    - [`ConfirmationTimeout`](WalletError::ConfirmationTimeout) - not mined in time
//!
//! 4. **Infrastructure Errors**
//!    - [`Rpc`](WalletError::Rpc) - transport failure reaching the node
//!    - [`Config`](WalletError::Config) / [`Internal`](WalletError::Internal)
//!
//! ## Provider Error Codes
//!
//! Wallets report failures as `{ code, message }` objects (EIP-1193, EIP-1474).
//! [`WalletError::from_provider_code`] maps them onto the variants above and
//! [`WalletError::code`] maps back.
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{WalletError, Result};
//!
//! fn require_session(connected: bool) -> Result<()> {
//!     if !connected {
//!         return Err(WalletError::NotConnected);
//!     }
//!     Ok(())
//! }
//!
//! let err = WalletError::from_provider_code(4001, "User rejected the request.");
//! assert!(matches!(err, WalletError::UserRejected(_)));
//! assert!(require_session(false).is_err());
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, WalletError>`.
pub type Result<T> = std::result::Result<T, WalletError>;

/// EIP-1193 / EIP-1474 provider error codes.
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL: i64 = -32603;
}

/// Wallet session error.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No compatible wallet extension was detected.
    #[error("No wallet provider detected")]
    NoProvider,

    /// The user declined authorization or signing.
    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    /// The network is unknown to the wallet or its descriptor is malformed.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// The operation needs a live session.
    #[error("Wallet is not connected")]
    NotConnected,

    /// Transaction or request parameters failed validation.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The transaction was not confirmed before the policy timeout.
    #[error("Transaction {tx_hash} not confirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: String, waited_secs: u64 },

    /// The network reports the transaction as reverted or dropped.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Provider error code without a dedicated variant.
    #[error("Provider error {code}: {message}")]
    Provider { code: i64, message: String },

    /// Transport failure reaching the wallet or node.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure (malformed provider response and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Map an EIP-1193 / JSON-RPC error object onto a variant.
    pub fn from_provider_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            codes::USER_REJECTED => WalletError::UserRejected(message),
            codes::UNAUTHORIZED | codes::DISCONNECTED | codes::CHAIN_DISCONNECTED => {
                WalletError::NotConnected
            }
            codes::UNRECOGNIZED_CHAIN => WalletError::UnsupportedChain(message),
            codes::INVALID_PARAMS => WalletError::InvalidParams(message),
            _ => WalletError::Provider { code, message },
        }
    }

    /// Provider error code for this error, where one applies.
    pub fn code(&self) -> Option<i64> {
        match self {
            WalletError::UserRejected(_) => Some(codes::USER_REJECTED),
            WalletError::NotConnected => Some(codes::DISCONNECTED),
            WalletError::UnsupportedChain(_) => Some(codes::UNRECOGNIZED_CHAIN),
            WalletError::InvalidParams(_) => Some(codes::INVALID_PARAMS),
            WalletError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the error came from the transport rather than the wallet.
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Rpc(_))
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            WalletError::NoProvider => "Install a browser wallet to continue".to_string(),
            WalletError::UserRejected(_) => "Request was rejected in the wallet".to_string(),
            WalletError::UnsupportedChain(msg) => format!("Network not supported: {}", msg),
            WalletError::NotConnected => "Connect your wallet first".to_string(),
            WalletError::InvalidParams(msg) => msg.clone(),
            WalletError::ConfirmationTimeout { .. } => {
                "Transaction is taking longer than expected".to_string()
            }
            WalletError::TransactionFailed(msg) => msg.clone(),
            WalletError::Provider { message, .. } => message.clone(),
            WalletError::Rpc(_) => "Network temporarily unavailable".to_string(),
            WalletError::Config(_) | WalletError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Convert `serde_json::Error` to `WalletError`.
impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_variants() {
        assert!(matches!(
            WalletError::from_provider_code(4001, "denied"),
            WalletError::UserRejected(m) if m == "denied"
        ));
        assert!(matches!(
            WalletError::from_provider_code(4902, "Unrecognized chain ID"),
            WalletError::UnsupportedChain(_)
        ));
        assert!(matches!(
            WalletError::from_provider_code(4100, "unauthorized"),
            WalletError::NotConnected
        ));
        assert!(matches!(
            WalletError::from_provider_code(-32000, "nonce too low"),
            WalletError::Provider { code: -32000, .. }
        ));
    }

    #[test]
    fn test_code_round_trip_for_wallet_errors() {
        for code in [codes::USER_REJECTED, codes::UNRECOGNIZED_CHAIN, codes::INVALID_PARAMS, -32000] {
            assert_eq!(WalletError::from_provider_code(code, "x").code(), Some(code));
        }
        assert_eq!(WalletError::Rpc("down".into()).code(), None);
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = WalletError::Internal("receipt missing blockNumber".to_string());
        assert_eq!(err.user_message(), "An internal error occurred");
        assert!(err.to_string().contains("blockNumber"));
    }

    #[test]
    fn test_only_rpc_errors_are_transient() {
        assert!(WalletError::Rpc("timeout".into()).is_transient());
        assert!(!WalletError::NotConnected.is_transient());
    }
}
