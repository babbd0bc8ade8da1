//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The admin frontend sends prices as JSON numbers: 150, 12.5, 99.99     │
//! │  Parsed as f64:  0.1 + 0.2 = 0.30000000000000004  ❌                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (tiyin for UZS, 1/100)              │
//! │    "12.5"  ──► parse_decimal ──► Money(1250)                           │
//! │    "99.99" ──► parse_decimal ──► Money(9999)                           │
//! │    "1.005" ──► parse_decimal ──► Err(TooPrecise)                       │
//! │                                                                         │
//! │  The decimal text is parsed directly; no float ever exists.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use depot_core::money::Money;
//!
//! let cost = Money::parse_decimal("100").unwrap();
//! let sell = Money::parse_decimal("150.5").unwrap();
//! assert!(cost <= sell);
//! assert_eq!(sell.minor(), 15050);
//! assert_eq!(sell.to_string(), "150.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use thiserror::Error;
use ts_rs::TS;

/// Number of minor units in one major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// Digits allowed after the decimal point.
const MAX_FRACTION_DIGITS: usize = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (1/100 of the major unit).
///
/// ## Where Money is Used
/// ```text
/// AddInvoiceItem.costPrice ──► StockLog.cost_price_minor
/// AddInvoiceItem.sellingPrice ──► StockLog.selling_price_minor
/// AddSaleItem.sellingPrice ──► SaleLog.selling_price_minor
/// Product.price_minor × stock ──► Remainder.total ("2250.00")
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// let price = Money::from_minor(15000); // 150.00
    /// assert_eq!(price.major(), 150);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a quantity, saturating instead of overflowing.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// let unit = Money::from_major(150);
    /// assert_eq!(unit.multiply_quantity(15).to_string(), "2250.00");
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Parses a plain decimal string in major units.
    ///
    /// ## Accepted Input
    /// ```text
    /// "150"     → 15000
    /// "150.5"   → 15050
    /// "150.50"  → 15050
    /// "-3.25"   → -325
    /// "1e3"     → Err(InvalidFormat)   exponent notation
    /// "1.005"   → Err(TooPrecise)      more than 2 fraction digits
    /// ```
    ///
    /// ## Why a String?
    /// JSON numbers reach us as `serde_json::Number`, whose text form is
    /// exactly what the client sent. Parsing the text keeps floats out.
    pub fn parse_decimal(input: &str) -> Result<Money, MoneyParseError> {
        let text = input.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidFormat(input.to_string()));
        }
        if unsigned.contains('.') && fraction.is_empty() {
            return Err(MoneyParseError::InvalidFormat(input.to_string()));
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::InvalidFormat(input.to_string()));
        }

        // Trailing zeros carry no precision: "150.500" is still 150.50
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(MoneyParseError::TooPrecise(input.to_string()));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| MoneyParseError::Overflow(input.to_string()))?;
        let mut fraction_minor: i64 = 0;
        for (i, digit) in fraction.bytes().enumerate() {
            let weight = if i == 0 { 10 } else { 1 };
            fraction_minor += i64::from(digit - b'0') * weight;
        }

        let minor = whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(fraction_minor))
            .ok_or_else(|| MoneyParseError::Overflow(input.to_string()))?;

        Ok(Money(if negative { -minor } else { minor }))
    }
}

/// Failure to turn decimal text into [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("'{0}' is not a decimal number")]
    InvalidFormat(String),

    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Fixed two-decimal rendering, e.g. `150.00`, `-5.50`.
///
/// This is the wire format of the remainders report.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(15000).to_string(), "150.00");
        assert_eq!(Money::from_minor(225000).to_string(), "2250.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
        assert_eq!(Money::from_minor(7).to_string(), "0.07");
    }

    #[test]
    fn test_parse_whole_and_fractional() {
        assert_eq!(Money::parse_decimal("150").unwrap().minor(), 15000);
        assert_eq!(Money::parse_decimal("150.5").unwrap().minor(), 15050);
        assert_eq!(Money::parse_decimal("150.05").unwrap().minor(), 15005);
        assert_eq!(Money::parse_decimal("150.0").unwrap().minor(), 15000);
        assert_eq!(Money::parse_decimal("0.99").unwrap().minor(), 99);
        assert_eq!(Money::parse_decimal("-3.25").unwrap().minor(), -325);
    }

    #[test]
    fn test_parse_rejects_bad_text() {
        assert!(matches!(
            Money::parse_decimal("1e3"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse_decimal(""),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse_decimal("12."),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse_decimal("abc"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            Money::parse_decimal("1.005"),
            Err(MoneyParseError::TooPrecise(_))
        ));
        assert!(matches!(
            Money::parse_decimal("99999999999999999999"),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_trailing_zeros_are_not_precision() {
        assert_eq!(Money::parse_decimal("1.500").unwrap().minor(), 150);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit = Money::from_major(150);
        assert_eq!(unit.multiply_quantity(15).minor(), 225000);
        assert_eq!((unit * 2).minor(), 30000);
        assert_eq!(
            Money::from_minor(i64::MAX).multiply_quantity(2).minor(),
            i64::MAX
        );
    }

    #[test]
    fn test_arithmetic_and_ordering() {
        let a = Money::from_major(100);
        let b = Money::from_major(150);
        assert!(a < b);
        assert_eq!((a + b).minor(), 25000);
        assert_eq!((b - a).minor(), 5000);
        assert!(a.is_positive());
        assert!(!Money::zero().is_positive());
    }
}
