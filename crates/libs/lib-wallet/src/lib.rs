//! # Wallet Library
//!
//! Browser-wallet session management: provider abstraction, JSON-RPC
//! transport, chain registry, transaction validation and confirmation polling.

pub mod chains;
pub mod confirm;
pub mod mock;
pub mod params;
pub mod provider;
pub mod rpc;
pub mod session;

// Re-export commonly used types from root for convenience
pub use chains::{validate_chain, ChainRegistry};
pub use confirm::{wait_for_confirmation, ConfirmationPolicy};
pub use mock::MockProvider;
pub use provider::{Eip1193Provider, Transport, WalletProvider};
pub use rpc::HttpTransport;
pub use session::{SessionConfig, SessionState, WalletSession};
