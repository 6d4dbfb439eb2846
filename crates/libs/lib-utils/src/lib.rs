//! # Utilities Library
//!
//! Shared utility functions for environment variables, time, and wallet input validation.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env_opt, get_env_parse_or};
pub use time::{format_duration, format_time, now_utc};
pub use validation::{
    normalize_chain_id, validate_address, validate_hex_data, validate_hex_quantity,
    validate_http_url, validate_not_empty, validate_tx_hash,
};
