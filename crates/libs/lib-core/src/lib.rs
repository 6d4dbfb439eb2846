//! # Core Library
//!
//! Error type and configuration shared by the wallet crates.

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::WalletConfig;
pub use error::{Result, WalletError};
