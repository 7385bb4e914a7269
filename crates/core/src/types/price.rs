//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are `rust_decimal::Decimal` so that `79.99 * 3` is exactly
//! `239.97`. Catalog prices carry two decimal places.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a price amount from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price amount: {0}")]
    Invalid(String),
    /// The input is below zero.
    #[error("price amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a USD price.
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }

    /// Parse a non-negative amount such as a price ceiling typed by a user.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the input is not a decimal number and
    /// `PriceError::Negative` if it is below zero.
    pub fn parse_amount(s: &str) -> Result<Decimal, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol used when formatting amounts.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_two_places() {
        assert_eq!(Price::usd(Decimal::new(300, 0)).display(), "$300.00");
        assert_eq!(Price::usd(Decimal::new(7999, 2)).display(), "$79.99");
        assert_eq!(Price::usd(Decimal::ZERO).display(), "$0.00");
    }

    #[test]
    fn test_display_uses_currency_symbol() {
        let price = Price::from_cents(1250, CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£12.50");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(Price::parse_amount("50").unwrap(), Decimal::new(50, 0));
        assert_eq!(Price::parse_amount(" 49.99 ").unwrap(), Decimal::new(4999, 2));
        assert_eq!(Price::parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert!(matches!(
            Price::parse_amount("-1"),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            Price::parse_amount("cheap"),
            Err(PriceError::Invalid(_))
        ));
    }
}
