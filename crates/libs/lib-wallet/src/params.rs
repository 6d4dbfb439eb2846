//! # Transaction Parameter Validation
//!
//! Checks a [`TransactionRequest`] before it reaches the wallet so malformed
//! input is reported as [`WalletError::InvalidParams`] instead of an opaque
//! provider error.
//!
//! ## Rules
//!
//! - `from` / `to` must be 20-byte hex addresses (returned lower-cased)
//! - quantities (`value`, `gas`, fee fields, `nonce`) must be `0x` hex
//! - `data` must be `0x` hex bytes
//! - a request without `to` is a deployment and must carry `data`
//! - legacy `gasPrice` cannot be combined with EIP-1559 fee fields

use lib_core::{Result, WalletError};
use shared::TransactionRequest;

/// Validate `tx` and return a normalized copy.
pub fn validate_transaction(tx: &TransactionRequest) -> Result<TransactionRequest> {
    let invalid = WalletError::InvalidParams;
    let mut normalized = tx.clone();

    if let Some(from) = &tx.from {
        normalized.from = Some(lib_utils::validate_address(from, "from").map_err(invalid)?);
    }
    if let Some(to) = &tx.to {
        normalized.to = Some(lib_utils::validate_address(to, "to").map_err(invalid)?);
    }

    let quantities = [
        ("value", &tx.value),
        ("gas", &tx.gas),
        ("gasPrice", &tx.gas_price),
        ("maxFeePerGas", &tx.max_fee_per_gas),
        ("maxPriorityFeePerGas", &tx.max_priority_fee_per_gas),
        ("nonce", &tx.nonce),
    ];
    for (field, value) in quantities {
        if let Some(value) = value {
            lib_utils::validate_hex_quantity(value, field).map_err(invalid)?;
        }
    }

    if let Some(data) = &tx.data {
        lib_utils::validate_hex_data(data, "data").map_err(invalid)?;
    }

    let has_code = tx.data.as_deref().is_some_and(|d| d.len() > 2);
    if tx.to.is_none() && !has_code {
        return Err(WalletError::InvalidParams(
            "a transaction without 'to' must carry contract bytecode in 'data'".to_string(),
        ));
    }

    if tx.gas_price.is_some() && (tx.max_fee_per_gas.is_some() || tx.max_priority_fee_per_gas.is_some()) {
        return Err(WalletError::InvalidParams(
            "gasPrice cannot be combined with maxFeePerGas/maxPriorityFeePerGas".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TO: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    #[test]
    fn test_transfer_is_normalized() {
        let tx = validate_transaction(&TransactionRequest::transfer(TO, "0xde0b6b3a7640000")).unwrap();
        assert_eq!(tx.to.as_deref(), Some("0x70997970c51812dc3a010c7d01b50e0d17dc79c8"));
    }

    #[test]
    fn test_deployment_requires_data() {
        let empty = TransactionRequest::default();
        assert!(matches!(validate_transaction(&empty), Err(WalletError::InvalidParams(_))));

        let deploy = TransactionRequest::default().with_data("0x6080604052");
        assert!(validate_transaction(&deploy).is_ok());
    }

    #[test]
    fn test_rejects_decimal_value() {
        let tx = TransactionRequest::transfer(TO, "1000");
        let err = validate_transaction(&tx).unwrap_err();
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn test_rejects_mixed_fee_models() {
        let tx = TransactionRequest {
            gas_price: Some("0x1".to_string()),
            max_fee_per_gas: Some("0x2".to_string()),
            ..TransactionRequest::transfer(TO, "0x1")
        };
        assert!(validate_transaction(&tx).is_err());
    }

    #[test]
    fn test_rejects_odd_length_data() {
        let tx = TransactionRequest::transfer(TO, "0x0").with_data("0xabc");
        assert!(validate_transaction(&tx).is_err());
    }
}
