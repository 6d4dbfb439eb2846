//! # Shared Utility Functions
//!
//! Display helpers used by the session library, the CLI and wallet-web.
//!
//! ## Address Formatting
//!
//! - [`format_address`] - Keep the first N and last M characters of an address
//! - [`truncate_address`] - `0x` prefix plus 4 + 4 characters
//!
//! ## Amount Formatting
//!
//! - [`format_units`] - Render a hex wei quantity with a decimal point
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::{format_address, format_units};
//!
//! let address = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
//! assert_eq!(format_address(address, 6, 4), "0x7099...79c8");
//! assert_eq!(format_units("0xde0b6b3a7640000", 18).as_deref(), Some("1"));
//! ```

/// Format a wallet address by showing the first `prefix_len` and last `suffix_len` characters.
///
/// If the address is shorter than `prefix_len + suffix_len`, it is returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_address;
///
/// let addr = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
/// assert_eq!(format_address(addr, 6, 4), "0x7099...79c8");
/// assert_eq!(format_address("short", 4, 4), "short");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    if address_len <= prefix_len + suffix_len || !address.is_ascii() {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format an address as `0x` plus 4 leading and 4 trailing hex digits.
///
/// # Examples
///
/// ```rust
/// use shared::utils::truncate_address;
///
/// let addr = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
/// assert_eq!(truncate_address(addr), "0x7099...79c8");
/// ```
pub fn truncate_address(address: &str) -> String {
    format_address(address, 6, 4)
}

/// Render a hex quantity (`0x...`) as a decimal amount with `decimals` places.
///
/// Trailing zeros in the fraction are dropped. Returns `None` when the value
/// is not valid hex or does not fit in 128 bits.
pub fn format_units(hex_quantity: &str, decimals: u32) -> Option<String> {
    let digits = hex_quantity.strip_prefix("0x")?;
    let raw = if digits.is_empty() {
        0
    } else {
        u128::from_str_radix(digits, 16).ok()?
    };

    let base = 10u128.checked_pow(decimals)?;
    let whole = raw / base;
    let fraction = raw % base;

    if fraction == 0 {
        return Some(whole.to_string());
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    Some(format!("{}.{}", whole, fraction.trim_end_matches('0')))
}
