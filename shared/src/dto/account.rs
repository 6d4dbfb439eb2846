use serde::{Deserialize, Serialize};

/// Account metadata kept by a wallet session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountData {
    /// Lower-cased `0x` address
    pub address: String,
    /// Balance in wei as the node reports it (hex quantity)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AccountData {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into().to_lowercase(),
            balance: None,
            label: None,
        }
    }

    pub fn with_balance(mut self, balance: impl Into<String>) -> Self {
        self.balance = Some(balance.into());
        self
    }
}
