use serde::{Deserialize, Serialize};

/// Native currency of a network, as carried by `wallet_addEthereumChain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Network descriptor (EIP-3085 layout).
///
/// Serializes in camelCase so it can be handed to the wallet unchanged:
///
/// ```text
/// {
///   "chainId": "0xaa36a7",
///   "chainName": "Sepolia",
///   "rpcUrls": ["https://rpc.sepolia.org"],
///   "nativeCurrency": { "name": "Sepolia Ether", "symbol": "ETH", "decimals": 18 },
///   "blockExplorerUrls": ["https://sepolia.etherscan.io"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icon_urls: Vec<String>,
}

impl ChainInfo {
    /// Descriptor with an 18-decimal native currency and no explorer.
    pub fn new(
        chain_id: impl Into<String>,
        chain_name: impl Into<String>,
        rpc_url: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        let chain_name = chain_name.into();
        Self {
            chain_id: chain_id.into(),
            native_currency: NativeCurrency {
                name: chain_name.clone(),
                symbol: symbol.into(),
                decimals: 18,
            },
            chain_name,
            rpc_urls: vec![rpc_url.into()],
            block_explorer_urls: Vec::new(),
            icon_urls: Vec::new(),
        }
    }

    pub fn with_explorer(mut self, url: impl Into<String>) -> Self {
        self.block_explorer_urls.push(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_info_wire_format() {
        let chain = ChainInfo::new("0xaa36a7", "Sepolia", "https://rpc.sepolia.org", "ETH");
        let json = serde_json::to_value(&chain).unwrap();

        assert_eq!(json["chainId"], "0xaa36a7");
        assert_eq!(json["chainName"], "Sepolia");
        assert_eq!(json["rpcUrls"][0], "https://rpc.sepolia.org");
        assert_eq!(json["nativeCurrency"]["decimals"], 18);
        // Empty optional lists are left out for wallets that reject them
        assert!(json.get("blockExplorerUrls").is_none());
        assert!(json.get("iconUrls").is_none());
    }

    #[test]
    fn test_chain_info_accepts_missing_optional_lists() {
        let json = r#"{
            "chainId": "0x1",
            "chainName": "Ethereum",
            "rpcUrls": ["https://eth.llamarpc.com"],
            "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 }
        }"#;
        let chain: ChainInfo = serde_json::from_str(json).unwrap();
        assert_eq!(chain.chain_id, "0x1");
        assert!(chain.block_explorer_urls.is_empty());
    }
}
