//! # Chain Registry
//!
//! Networks a session knows how to describe to the wallet. The registry starts
//! with a few well-known networks and grows as chains are added through the
//! session.
//!
//! ## Built-in Networks
//!
//! | Chain id | Name |
//! |---|---|
//! | `0x1` | Ethereum Mainnet |
//! | `0xaa36a7` | Sepolia |
//! | `0x4268` | Holesky |
//! | `0x7a69` | Localhost 8545 (anvil / hardhat) |

use lib_core::{Result, WalletError};
use shared::ChainInfo;
use std::collections::BTreeMap;

/// Known networks keyed by normalized chain id.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainInfo>,
}

impl ChainRegistry {
    /// Registry pre-populated with the built-in networks.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for chain in builtin_chains() {
            registry.chains.insert(chain.chain_id.clone(), chain);
        }
        registry
    }

    /// Look up a chain by id in any accepted spelling (`0x01`, `1`, ...).
    pub fn get(&self, chain_id: &str) -> Option<&ChainInfo> {
        let id = lib_utils::normalize_chain_id(chain_id).ok()?;
        self.chains.get(&id)
    }

    pub fn contains(&self, chain_id: &str) -> bool {
        self.get(chain_id).is_some()
    }

    /// Validate and store a descriptor, replacing any previous entry.
    pub fn insert(&mut self, chain: ChainInfo) -> Result<&ChainInfo> {
        let chain = validate_chain(&chain)?;
        let id = chain.chain_id.clone();
        self.chains.insert(id.clone(), chain);
        self.chains
            .get(&id)
            .ok_or_else(|| WalletError::Internal(format!("chain {} vanished after insert", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainInfo> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Check a descriptor against what `wallet_addEthereumChain` accepts and
/// return a copy with the chain id normalized.
pub fn validate_chain(chain: &ChainInfo) -> Result<ChainInfo> {
    let unsupported = |msg: String| WalletError::UnsupportedChain(msg);

    let chain_id = lib_utils::normalize_chain_id(&chain.chain_id).map_err(unsupported)?;
    lib_utils::validate_not_empty(&chain.chain_name, "chainName").map_err(unsupported)?;

    if chain.rpc_urls.is_empty() {
        return Err(unsupported(format!("{} has no rpcUrls", chain_id)));
    }
    for url in chain.rpc_urls.iter().chain(chain.block_explorer_urls.iter()) {
        lib_utils::validate_http_url(url, "chain URL").map_err(unsupported)?;
    }

    let symbol_len = chain.native_currency.symbol.chars().count();
    if !(2..=6).contains(&symbol_len) {
        return Err(unsupported(format!(
            "currency symbol '{}' must be 2-6 characters",
            chain.native_currency.symbol
        )));
    }
    if chain.native_currency.decimals != 18 {
        return Err(unsupported(format!(
            "native currency of {} must use 18 decimals",
            chain_id
        )));
    }

    Ok(ChainInfo {
        chain_id,
        ..chain.clone()
    })
}

fn builtin_chains() -> Vec<ChainInfo> {
    vec![
        ChainInfo::new("0x1", "Ethereum Mainnet", "https://eth.llamarpc.com", "ETH")
            .with_explorer("https://etherscan.io"),
        ChainInfo::new("0xaa36a7", "Sepolia", "https://rpc.sepolia.org", "ETH")
            .with_explorer("https://sepolia.etherscan.io"),
        ChainInfo::new("0x4268", "Holesky", "https://ethereum-holesky-rpc.publicnode.com", "ETH")
            .with_explorer("https://holesky.etherscan.io"),
        ChainInfo::new("0x7a69", "Localhost 8545", "http://127.0.0.1:8545", "ETH"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_accepts_any_spelling() {
        let registry = ChainRegistry::builtin();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("0x01").unwrap().chain_name, "Ethereum Mainnet");
        assert_eq!(registry.get("11155111").unwrap().chain_name, "Sepolia");
        assert!(registry.get("0x89").is_none());
    }

    #[test]
    fn test_builtin_chains_pass_validation() {
        for chain in builtin_chains() {
            assert!(validate_chain(&chain).is_ok(), "{} failed", chain.chain_name);
        }
    }

    #[test]
    fn test_insert_normalizes_id() {
        let mut registry = ChainRegistry::default();
        let chain = ChainInfo::new("137", "Polygon", "https://polygon-rpc.com", "POL");

        let stored = registry.insert(chain).unwrap();
        assert_eq!(stored.chain_id, "0x89");
        assert!(registry.contains("0x89"));
    }

    #[test]
    fn test_validate_chain_rejects_malformed() {
        let no_rpc = ChainInfo {
            rpc_urls: vec![],
            ..ChainInfo::new("0x89", "Polygon", "https://polygon-rpc.com", "POL")
        };
        assert!(matches!(validate_chain(&no_rpc), Err(WalletError::UnsupportedChain(_))));

        let bad_symbol = ChainInfo::new("0x89", "Polygon", "https://polygon-rpc.com", "P");
        assert!(validate_chain(&bad_symbol).is_err());

        let bad_id = ChainInfo::new("polygon", "Polygon", "https://polygon-rpc.com", "POL");
        assert!(validate_chain(&bad_id).is_err());

        let ws_rpc = ChainInfo::new("0x89", "Polygon", "wss://polygon-rpc.com", "POL");
        assert!(validate_chain(&ws_rpc).is_err());
    }
}
