use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fraction digits shown on statements.
const CURRENCY_SCALE: i64 = 2;

/// Largest accepted exponent shift, either way, when parsing.
const MAX_PARSED_SCALE: i64 = 64;

/// A non-negative monetary value with exact decimal arithmetic.
///
/// An `Amount` can only be obtained through [`Amount::of`] (or parsing), so a negative
/// value never exists. Arithmetic returns a new value or fails with [`NegativeAmountError`].
/// Equality and ordering are numeric: `2.0 == 2.00`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(BigDecimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("amount cannot be negative (got {0})")]
pub struct NegativeAmountError(pub BigDecimal);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAmountError {
    #[error("invalid amount format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Negative(#[from] NegativeAmountError),
}

impl Amount {
    /// Build an amount, rejecting negative values.
    pub fn of(value: BigDecimal) -> Result<Self, NegativeAmountError> {
        if value < BigDecimal::from(0) {
            return Err(NegativeAmountError(value));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(BigDecimal::from(0))
    }

    pub fn value(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::from(0)
    }

    /// Sum of both amounts. Cannot go negative, but stays fallible like every
    /// other way of producing an `Amount`.
    pub fn add(&self, other: &Amount) -> Result<Amount, NegativeAmountError> {
        Amount::of(&self.0 + &other.0)
    }

    /// Difference of both amounts. Fails when `other` is greater than `self`.
    pub fn subtract(&self, other: &Amount) -> Result<Amount, NegativeAmountError> {
        Amount::of(&self.0 - &other.0)
    }

    /// Two fraction digits, rounded half to even: `2.005` -> `"2.00"`, `2.015` -> `"2.02"`,
    /// `0.004` -> `"0.00"`.
    pub fn to_currency_string(&self) -> String {
        // A value rounding to zero can come back without its scale; its digits are still "0"
        let (units, _) = self
            .0
            .with_scale_round(CURRENCY_SCALE, RoundingMode::HalfEven)
            .with_scale(CURRENCY_SCALE)
            .into_bigint_and_exponent();
        plain_string(&units.to_string(), CURRENCY_SCALE)
    }
}

/// Positional notation for `units * 10^-scale`, never scientific.
fn plain_string(units: &str, scale: i64) -> String {
    if scale <= 0 {
        if units == "0" {
            return units.to_string();
        }
        return format!("{units}{}", "0".repeat(scale.unsigned_abs() as usize));
    }

    let scale = scale as usize;
    let digits = format!("{units:0>width$}", width = scale + 1);
    let (whole, fraction) = digits.split_at(digits.len() - scale);
    format!("{whole}.{fraction}")
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

/// Exact value in plain notation: `1E-7` displays as `0.0000001`.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (units, scale) = self.0.clone().into_bigint_and_exponent();
        f.write_str(&plain_string(&units.to_string(), scale))
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Parse a decimal string such as `"50"`, `"12.5"` or `"0.005"`.
    /// Exponents are accepted only while the scale stays within `MAX_PARSED_SCALE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ParseAmountError::InvalidFormat(s.to_string()));
        }
        let value = BigDecimal::from_str(input)
            .map_err(|_| ParseAmountError::InvalidFormat(s.to_string()))?;

        let (_, scale) = value.clone().into_bigint_and_exponent();
        if scale.unsigned_abs() > MAX_PARSED_SCALE.unsigned_abs() {
            return Err(ParseAmountError::InvalidFormat(s.to_string()));
        }
        Ok(Amount::of(value)?)
    }
}

impl TryFrom<String> for Amount {
    type Error = ParseAmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<i64> for Amount {
    type Error = NegativeAmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::of(BigDecimal::from(value))
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn test_of_rejects_negative() {
        let result = Amount::of(BigDecimal::from(-1));
        assert!(matches!(result, Err(NegativeAmountError(_))));
    }

    #[test]
    fn test_of_accepts_zero() {
        let zero = Amount::of(BigDecimal::from(0)).unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero, Amount::zero());
    }

    #[test]
    fn test_add() {
        assert_eq!(amount("10").add(&amount("2.5")).unwrap(), amount("12.5"));
        assert_eq!(Amount::zero().add(&amount("0.01")).unwrap(), amount("0.01"));
    }

    #[test]
    fn test_subtract() {
        assert_eq!(amount("10").subtract(&amount("2.5")).unwrap(), amount("7.5"));
        assert_eq!(amount("10").subtract(&amount("10")).unwrap(), Amount::zero());
    }

    #[test]
    fn test_subtract_below_zero_fails() {
        let result = amount("10").subtract(&amount("10.01"));
        assert!(matches!(result, Err(NegativeAmountError(_))));
    }

    #[test]
    fn test_subtract_fails_exactly_when_other_is_greater() {
        let balance = amount("100.10");
        for candidate in ["0", "0.01", "100.09", "100.10", "100.100", "100.11", "1000"] {
            let requested = amount(candidate);
            assert_eq!(
                balance.subtract(&requested).is_err(),
                requested > balance,
                "mismatch for {}",
                candidate
            );
        }
    }

    #[test]
    fn test_equality_is_numeric() {
        assert_eq!(amount("2.0"), amount("2.00"));
        assert_eq!(amount("2000"), amount("2000.000"));
        assert_ne!(amount("2.0"), amount("2.01"));
    }

    #[test]
    fn test_ordering() {
        assert!(amount("1.99") < amount("2"));
        assert!(amount("10") > amount("9.999"));
        assert!(amount("5") <= amount("5.0"));
    }

    #[test]
    fn test_to_currency_string() {
        assert_eq!(amount("2000").to_currency_string(), "2000.00");
        assert_eq!(amount("12.5").to_currency_string(), "12.50");
        assert_eq!(amount("0").to_currency_string(), "0.00");
        assert_eq!(amount("0.01").to_currency_string(), "0.01");
    }

    #[test]
    fn test_to_currency_string_rounds_half_to_even() {
        assert_eq!(amount("2.005").to_currency_string(), "2.00");
        assert_eq!(amount("2.015").to_currency_string(), "2.02");
        assert_eq!(amount("2.025").to_currency_string(), "2.02");
        assert_eq!(amount("2.0051").to_currency_string(), "2.01");
        assert_eq!(amount("0.125").to_currency_string(), "0.12");
    }

    #[test]
    fn test_to_currency_string_keeps_scale_when_rounding_to_zero() {
        assert_eq!(amount("0.001").to_currency_string(), "0.00");
        assert_eq!(amount("0.004").to_currency_string(), "0.00");
        assert_eq!(amount("0.005").to_currency_string(), "0.00");
        assert_eq!(amount("1e-9").to_currency_string(), "0.00");
        assert_eq!(amount("0.006").to_currency_string(), "0.01");
    }

    #[test]
    fn test_display_is_plain_notation() {
        assert_eq!(amount("1E-7").to_string(), "0.0000001");
        assert_eq!(amount("1e+25").to_string(), "10000000000000000000000000");
        assert_eq!(amount("60.125").to_string(), "60.125");
        assert_eq!(amount("0.00").to_string(), "0.00");
        assert_eq!(amount("0").to_string(), "0");
        assert_eq!(amount("1e3").to_currency_string(), "1000.00");
    }

    #[test]
    fn test_parse_rejects_unbounded_exponent() {
        for input in ["1e2000000000", "1e-2000000000", "5E+65"] {
            assert!(
                matches!(input.parse::<Amount>(), Err(ParseAmountError::InvalidFormat(_))),
                "accepted {}",
                input
            );
        }
        assert_eq!(amount("1e64").to_string(), format!("1{}", "0".repeat(64)));
    }

    #[test]
    fn test_exact_accumulation() {
        // 0.1 added a thousand times is exactly 100
        let step = amount("0.1");
        let mut total = Amount::zero();
        for _ in 0..1000 {
            total = total.add(&step).unwrap();
        }
        assert_eq!(total, amount("100"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(amount(" 50 "), Amount::try_from(50).unwrap());
        assert!("abc".parse::<Amount>().is_err());
        assert!("".parse::<Amount>().is_err());
        assert!(matches!(
            "-5".parse::<Amount>(),
            Err(ParseAmountError::Negative(_))
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&amount("12.34")).unwrap();
        assert_eq!(json, "\"12.34\"");
        let parsed: Amount = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(parsed, amount("7.5"));
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
    }
}
