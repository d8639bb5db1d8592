//! Holder Records
//!
//! A single token holder inside a snapshot. The decimal-adjusted balance is
//! always derived from the raw integer balance, never taken from upstream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::address::normalize_address;
use super::ValidationError;

/// One holder of a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRecord {
    address: String,
    balance: String,
    balance_raw: String,
    #[serde(default)]
    label: String,
}

impl HolderRecord {
    /// Build a record from the raw integer balance and the token decimals
    pub fn new(
        address: impl Into<String>,
        balance_raw: impl Into<String>,
        decimals: u8,
        label: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let balance_raw = balance_raw.into();
        let balance = shift_decimals(&balance_raw, decimals)?;

        Ok(Self {
            address: address.into(),
            balance,
            balance_raw,
            label: label.into(),
        })
    }

    /// Address as returned upstream
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Lowercase address, used as identity key
    pub fn normalized_address(&self) -> String {
        normalize_address(&self.address)
    }

    /// Balance in smallest units, verbatim from upstream
    pub fn balance_raw(&self) -> &str {
        &self.balance_raw
    }

    /// Exact decimal-adjusted balance
    pub fn balance(&self) -> &str {
        &self.balance
    }

    /// Known label, empty when unknown
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_label(&self) -> bool {
        !self.label.is_empty()
    }

    /// Balance as a `Decimal`, or `None` when it exceeds `Decimal` range
    pub fn balance_decimal(&self) -> Option<Decimal> {
        Decimal::from_str(&self.balance).ok()
    }

    /// Balance as a float for display. Lossy for very large values.
    pub fn balance_f64(&self) -> f64 {
        self.balance.parse::<f64>().unwrap_or(0.0)
    }
}

/// Shift an unsigned integer string right by `decimals` places.
///
/// Exact for any length of input. Leading zeros of the integer part and
/// trailing zeros of the fraction are trimmed.
pub fn shift_decimals(raw: &str, decimals: u8) -> Result<String, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidBalance(raw.to_string()));
    }

    let digits = raw.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let scale = decimals as usize;

    if scale == 0 {
        return Ok(digits.to_string());
    }

    let (int_part, frac_part) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = scale))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        Ok(int_part)
    } else {
        Ok(format!("{}.{}", int_part, frac_part))
    }
}
