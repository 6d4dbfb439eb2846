//! # Shared Data Transfer Objects Library
//!
//! This library defines the types exchanged between the wallet session
//! (native and browser builds), the injected wallet, and the network node.
//! All DTOs use JSON serialization via `serde`.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::chain`]**: Network descriptors
//!   - **[`dto::account`]**: Account metadata
//!   - **[`dto::transaction`]**: Transaction parameters and receipts
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Format wallet addresses for display
//!   - **[`utils::format_units`]**: Format wei quantities for display
//!
//! ## Usage
//!
//! ```rust
//! use shared::dto::{ChainInfo, TransactionRequest};
//! use shared::utils::truncate_address;
//!
//! let chain = ChainInfo::new("0x7a69", "Localhost", "http://127.0.0.1:8545", "ETH");
//! let tx = TransactionRequest::transfer("0x70997970c51812dc3a010c7d01b50e0d17dc79c8", "0x1");
//!
//! let params = serde_json::json!([tx]);
//! assert_eq!(params[0]["value"], "0x1");
//! assert_eq!(chain.native_currency.decimals, 18);
//! assert_eq!(truncate_address(tx.to.as_deref().unwrap()), "0x7099...79c8");
//! ```

pub mod dto;
pub mod utils;

// Note: Wildcard re-exports are used here since shared is a DTO library
// where all exports are meant to be public API
pub use dto::*;
pub use utils::*;
