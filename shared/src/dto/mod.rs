//! # Data Transfer Objects (DTOs)
//!
//! Data structures exchanged between the wallet session, the browser wallet
//! and the network node.
//!
//! ## Module Organization
//!
//! - [`chain`] - Network descriptors (`wallet_addEthereumChain` format)
//! - [`account`] - Account metadata held by a session
//! - [`transaction`] - Transaction parameters and receipts
//!
//! ## Serialization Format
//!
//! - **Wallet-facing types** (`ChainInfo`, `TransactionRequest`): camelCase,
//!   matching the JSON the injected provider expects
//! - **Session-facing types** (`AccountData`, `TxReceipt`): snake_case
//! - **Optional fields**: Omitted when `None`
//! - **Enums**: Lowercase strings
//!
//! ## Example JSON Communication
//!
//! ```text
//! eth_sendTransaction
//!
//! [{
//!   "from": "0x9f1c...41aa",
//!   "to": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
//!   "value": "0xde0b6b3a7640000"
//! }]
//! ```

pub mod account;
pub mod chain;
pub mod transaction;

pub use account::*;
pub use chain::*;
pub use transaction::*;
