//! # Wallet Configuration
//!
//! Session settings loaded from environment variables (a `.env` file is
//! honoured by the binaries through `dotenvy`). All values are validated on
//! startup to fail fast if misconfigured.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `WALLET_RPC_URL` | `http://127.0.0.1:8545` | JSON-RPC endpoint of the node |
//! | `WALLET_CHAIN_ID` | unset | Chain to request on connect |
//! | `WALLET_CONFIRM_POLL_MS` | `1000` | First receipt poll interval |
//! | `WALLET_CONFIRM_MAX_POLL_MS` | `8000` | Backoff ceiling |
//! | `WALLET_CONFIRM_TIMEOUT_SECS` | `120` | Give up waiting after this long |
//! | `WALLET_CONFIRMATIONS` | `1` | Blocks required, counting the inclusion block |
//! | `WALLET_AUTO_ADD_CHAIN` | `true` | Register unknown chains on connect |
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance after
//! calling [`init_config()`] once at startup. Libraries take a
//! [`WalletConfig`] by value instead; the browser build uses
//! [`WalletConfig::default()`] since it has no environment.

use lib_utils::envs::{get_env_opt, get_env_parse_or};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::{Result, WalletError};

/// Wallet session configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConfig {
    /// JSON-RPC endpoint used by native providers
    pub rpc_url: String,

    /// Chain requested on connect, if any
    pub chain_id: Option<String>,

    /// First interval between receipt polls
    pub confirm_poll_interval: Duration,

    /// Upper bound the poll interval backs off to
    pub confirm_max_poll_interval: Duration,

    /// Total time to wait for a receipt
    pub confirm_timeout: Duration,

    /// Number of blocks (including the inclusion block) before a transaction counts as confirmed
    pub confirmations: u64,

    /// Register an unknown target chain with the wallet during connect
    pub auto_add_chain: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: None,
            confirm_poll_interval: Duration::from_millis(1000),
            confirm_max_poll_interval: Duration::from_millis(8000),
            confirm_timeout: Duration::from_secs(120),
            confirmations: 1,
            auto_add_chain: true,
        }
    }
}

impl WalletConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config_err = |e: lib_utils::envs::Error| WalletError::Config(e.to_string());

        let rpc_url = get_env_opt("WALLET_RPC_URL").unwrap_or(defaults.rpc_url);
        let chain_id = get_env_opt("WALLET_CHAIN_ID");

        let poll_ms: u64 = get_env_parse_or("WALLET_CONFIRM_POLL_MS", 1000).map_err(config_err)?;
        let max_poll_ms: u64 =
            get_env_parse_or("WALLET_CONFIRM_MAX_POLL_MS", 8000).map_err(config_err)?;
        let timeout_secs: u64 =
            get_env_parse_or("WALLET_CONFIRM_TIMEOUT_SECS", 120).map_err(config_err)?;
        let confirmations: u64 = get_env_parse_or("WALLET_CONFIRMATIONS", 1).map_err(config_err)?;
        let auto_add_chain: bool =
            get_env_parse_or("WALLET_AUTO_ADD_CHAIN", true).map_err(config_err)?;

        Ok(Self {
            rpc_url,
            chain_id,
            confirm_poll_interval: Duration::from_millis(poll_ms),
            confirm_max_poll_interval: Duration::from_millis(max_poll_ms),
            confirm_timeout: Duration::from_secs(timeout_secs),
            confirmations,
            auto_add_chain,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        lib_utils::validate_http_url(&self.rpc_url, "WALLET_RPC_URL").map_err(WalletError::Config)?;

        if let Some(chain_id) = &self.chain_id {
            lib_utils::normalize_chain_id(chain_id)
                .map_err(|e| WalletError::Config(format!("WALLET_CHAIN_ID: {}", e)))?;
        }

        if self.confirm_poll_interval.is_zero() {
            return Err(WalletError::Config(
                "WALLET_CONFIRM_POLL_MS must be greater than 0".to_string(),
            ));
        }

        if self.confirm_max_poll_interval < self.confirm_poll_interval {
            return Err(WalletError::Config(
                "WALLET_CONFIRM_MAX_POLL_MS must not be below WALLET_CONFIRM_POLL_MS".to_string(),
            ));
        }

        if self.confirm_timeout < self.confirm_poll_interval {
            return Err(WalletError::Config(
                "WALLET_CONFIRM_TIMEOUT_SECS must cover at least one poll".to_string(),
            ));
        }

        if self.confirmations == 0 || self.confirmations > 64 {
            return Err(WalletError::Config(
                "WALLET_CONFIRMATIONS must be between 1 and 64".to_string(),
            ));
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<WalletConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Environment variables are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<&'static WalletConfig> {
    let config = WalletConfig::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| WalletError::Config("Config has already been initialized".to_string()))?;

    core_config()
}

/// Get a reference to the global configuration.
///
/// Errors if [`init_config()`] has not been called yet.
pub fn core_config() -> Result<&'static WalletConfig> {
    CONFIG
        .get()
        .ok_or_else(|| WalletError::Config("Config must be initialized with init_config() before use".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WalletConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_backoff_below_interval() {
        let config = WalletConfig {
            confirm_poll_interval: Duration::from_secs(5),
            confirm_max_poll_interval: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_chain_id() {
        let config = WalletConfig {
            chain_id: Some("sepolia".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_http_rpc_url() {
        let config = WalletConfig {
            rpc_url: "ws://127.0.0.1:8546".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_confirmations() {
        let config = WalletConfig {
            confirmations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
