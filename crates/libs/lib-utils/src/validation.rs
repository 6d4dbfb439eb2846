//! # Validation Utilities
//!
//! Input validation for values that cross into the wallet: addresses,
//! transaction hashes, hex quantities and chain identifiers.
//!
//! Validators return `Result<_, String>` with a message naming the field so
//! callers can wrap it in their own error type.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

fn is_hex_digits(digits: &str) -> bool {
    digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate a 20-byte `0x` address and return it lower-cased.
pub fn validate_address(value: &str, field_name: &str) -> Result<String, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| format!("{} must start with 0x", field_name))?;

    if digits.len() != 40 || !is_hex_digits(digits) {
        return Err(format!("{} must be 20 bytes of hex", field_name));
    }

    Ok(format!("0x{}", digits.to_lowercase()))
}

/// Validate a 32-byte `0x` transaction hash.
pub fn validate_tx_hash(value: &str) -> Result<(), String> {
    match value.strip_prefix("0x") {
        Some(digits) if digits.len() == 64 && is_hex_digits(digits) => Ok(()),
        _ => Err(format!("'{}' is not a transaction hash", value)),
    }
}

/// Validate a hex quantity such as `0x0` or `0xde0b6b3a7640000`.
pub fn validate_hex_quantity(value: &str, field_name: &str) -> Result<(), String> {
    match value.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() && digits.len() <= 64 && is_hex_digits(digits) => {
            Ok(())
        }
        _ => Err(format!("{} must be a 0x-prefixed hex quantity", field_name)),
    }
}

/// Validate hex-encoded bytes (`0x` followed by an even number of digits).
pub fn validate_hex_data(value: &str, field_name: &str) -> Result<(), String> {
    match value.strip_prefix("0x") {
        Some(digits) if digits.len() % 2 == 0 && is_hex_digits(digits) => Ok(()),
        _ => Err(format!("{} must be 0x-prefixed hex bytes", field_name)),
    }
}

/// Normalize a chain id to the canonical `0x` form the wallet reports.
///
/// Accepts hex (`0x01`, `0xAA36A7`) and decimal (`11155111`). Zero is rejected.
pub fn normalize_chain_id(value: &str) -> Result<String, String> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) if is_hex_digits(digits) => u64::from_str_radix(digits, 16).ok(),
        Some(_) => None,
        None if value.bytes().all(|b| b.is_ascii_digit()) => value.parse::<u64>().ok(),
        None => None,
    };

    match parsed {
        Some(0) => Err("chain id cannot be zero".to_string()),
        Some(id) => Ok(format!("0x{:x}", id)),
        None => Err(format!("'{}' is not a chain id", value)),
    }
}

/// Validate an RPC/explorer URL (http or https).
pub fn validate_http_url(value: &str, field_name: &str) -> Result<(), String> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));

    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(format!("{} must be an http(s) URL", field_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_lowercases() {
        let addr = validate_address("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "to").unwrap();
        assert_eq!(addr, "0x70997970c51812dc3a010c7d01b50e0d17dc79c8");
    }

    #[test]
    fn test_validate_address_rejects_bad_input() {
        assert!(validate_address("70997970c51812dc3a010c7d01b50e0d17dc79c8", "to").is_err());
        assert!(validate_address("0x1234", "to").is_err());
        assert!(validate_address("0xg0997970c51812dc3a010c7d01b50e0d17dc79c8", "to").is_err());
    }

    #[test]
    fn test_validate_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(validate_tx_hash(&hash).is_ok());
        assert!(validate_tx_hash("0xabc").is_err());
        assert!(validate_tx_hash(&"ab".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_hex_quantity() {
        assert!(validate_hex_quantity("0x0", "value").is_ok());
        assert!(validate_hex_quantity("0xde0b6b3a7640000", "value").is_ok());
        assert!(validate_hex_quantity("0x", "value").is_err());
        assert!(validate_hex_quantity("100", "value").is_err());
    }

    #[test]
    fn test_validate_hex_data() {
        assert!(validate_hex_data("0x", "data").is_ok());
        assert!(validate_hex_data("0xa9059cbb", "data").is_ok());
        assert!(validate_hex_data("0xabc", "data").is_err());
    }

    #[test]
    fn test_normalize_chain_id() {
        assert_eq!(normalize_chain_id("0x01").unwrap(), "0x1");
        assert_eq!(normalize_chain_id("0xAA36A7").unwrap(), "0xaa36a7");
        assert_eq!(normalize_chain_id("11155111").unwrap(), "0xaa36a7");
        assert!(normalize_chain_id("0x0").is_err());
        assert!(normalize_chain_id("mainnet").is_err());
    }

    #[test]
    fn test_normalize_chain_id_rejects_signs() {
        assert!(normalize_chain_id("+1").is_err());
        assert!(normalize_chain_id("0x+1").is_err());
        assert!(normalize_chain_id("-1").is_err());
        assert!(normalize_chain_id("0x").is_err());
        assert!(normalize_chain_id("").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://rpc.sepolia.org", "rpc").is_ok());
        assert!(validate_http_url("http://127.0.0.1:8545", "rpc").is_ok());
        assert!(validate_http_url("ws://127.0.0.1:8545", "rpc").is_err());
        assert!(validate_http_url("https://", "rpc").is_err());
    }
}
