//! Money type
//!
//! Exact-decimal domain primitive for wallet balances and signed deltas.
//! Backed by `rust_decimal::Decimal`; no binary floating point is involved
//! at any stage, so arithmetic never introduces rounding error.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

/// Money is an exact decimal quantity.
///
/// Unlike a balance, a `Money` value may be negative: withdrawals travel to
/// the store as negative deltas. Positivity is enforced at the parsing
/// boundary with [`Money::parse_positive`].
///
/// # Example
/// ```
/// use wallet_ledger::domain::Money;
///
/// let deposit = Money::parse_positive("100.00").unwrap();
/// let withdraw = -Money::parse_positive("40.00").unwrap();
/// let balance = deposit.checked_add(withdraw).unwrap();
/// assert_eq!(balance.to_string(), "60.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

/// Errors that can occur when parsing or combining Money
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Invalid amount format: {0}")]
    InvalidAmount(String),

    #[error("Amount must be greater than zero (got {0})")]
    NonPositiveAmount(Money),

    #[error("Amount exceeds the representable range or precision")]
    Overflow,
}

impl Money {
    /// Zero
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wrap a decimal value.
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse a decimal numeral: optional sign, digits, optional fractional part.
    ///
    /// # Errors
    /// - `MoneyError::InvalidAmount` for empty, non-numeric or malformed text
    ///   (multiple points, exponents, separators, too many digits)
    pub fn parse(text: &str) -> Result<Self, MoneyError> {
        if !is_decimal_numeral(text) {
            return Err(MoneyError::InvalidAmount(format!("'{}' is not a decimal number", text)));
        }

        // rust_decimal's parser is more lenient than the grammar above
        // (underscores, bare '+'), so only hand it validated text.
        let unsigned = text.strip_prefix('+').unwrap_or(text);
        let value = Decimal::from_str_exact(unsigned)
            .map_err(|e| MoneyError::InvalidAmount(format!("'{}': {}", text, e)))?;

        Ok(Self(value))
    }

    /// Parse a decimal numeral that must be strictly positive.
    ///
    /// # Errors
    /// - `MoneyError::InvalidAmount` for malformed text
    /// - `MoneyError::NonPositiveAmount` if the value is <= 0
    pub fn parse_positive(text: &str) -> Result<Self, MoneyError> {
        let money = Self::parse(text)?;
        if !money.is_positive() {
            return Err(MoneyError::NonPositiveAmount(money));
        }
        Ok(money)
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact addition.
    ///
    /// `Decimal` rescales a sum that needs more than 28 significant digits,
    /// dropping fractional digits. Such a sum is rejected, not rounded.
    ///
    /// # Errors
    /// - `MoneyError::Overflow` if the sum leaves the representable range
    ///   or cannot be represented exactly
    pub fn checked_add(self, other: Money) -> Result<Money, MoneyError> {
        let sum = self.0.checked_add(other.0).ok_or(MoneyError::Overflow)?;

        // Every significant fractional digit of both operands must survive
        let needed_scale = self.0.normalize().scale().max(other.0.normalize().scale());
        if sum.scale() < needed_scale {
            return Err(MoneyError::Overflow);
        }

        Ok(Money(sum))
    }
}

/// `[+-]?[0-9]+(\.[0-9]+)?`
fn is_decimal_numeral(text: &str) -> bool {
    let unsigned = text
        .strip_prefix('+')
        .or_else(|| text.strip_prefix('-'))
        .unwrap_or(text);

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    all_digits(int_part) && frac_part.map_or(true, all_digits)
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Decimal's Display is plain notation and keeps the scale.
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::parse(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        money.to_string()
    }
}
