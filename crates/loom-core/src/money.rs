//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Factory price = $9.99 × 0.97 = 9.6903                                  │
//! │  × 1,250 metres = 12112.875 → which cent does the client owe?          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents, one rounding per line                    │
//! │    line  = 1250 × 999 = 1,248,750 cents                                 │
//! │    disc  = (1,248,750 × 300 + 5000) / 10000 = 37,463 cents              │
//! │    total = 1,211,287 cents = $12,112.87                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use loom_core::money::Money;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let line = price * 8;                // $80.00
//! assert_eq!(line.cents(), 8000);
//!
//! // Amounts typed by an admin are parsed, never built from floats
//! let paid: Money = "40.50".parse().unwrap();
//! assert_eq!(paid.cents(), 4050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Balances and ledger amounts go negative (client debt)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON columns and the frontend
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► resolve() ──► stock_cost + factory_cost             │
/// │                                        │                                │
/// │                                        ▼                                │
/// │                              Order.total_amount (fixed)                 │
/// │                                        │                                │
/// │  PaymentProof.amount ──► Order.paid_amount ──► Client.balance          │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use loom_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use loom_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the discount portion of this amount, rounded half-up to the cent.
    ///
    /// Uses i128 so large wholesale lines cannot overflow:
    /// `(amount_cents * bps + 5000) / 10000`.
    pub fn discount_portion(&self, rate: DiscountRate) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Applies a discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use loom_core::money::Money;
    /// use loom_core::types::DiscountRate;
    ///
    /// // 3 units at $10.00 from the factory (3% off)
    /// let line = Money::from_cents(3000);
    /// let factory = line.apply_discount(DiscountRate::FACTORY_DEFAULT);
    /// assert_eq!(factory.cents(), 2910); // $29.10
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount_portion(rate)
    }

    /// Formats the amount with two decimals and the given decimal separator.
    ///
    /// Used by the CSV export (`12.50` for English, `12,50` otherwise).
    pub fn to_decimal_string(&self, decimal_comma: bool) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let sep = if decimal_comma { ',' } else { '.' };
        format!(
            "{}{}{}{:02}",
            sign,
            self.dollars().abs(),
            sep,
            self.cents_part()
        )
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a user-typed decimal amount ("40", "40.5", "40,50", "-3.20").
///
/// Anything that is not a plain decimal with at most two fraction digits is
/// rejected, which also rules out `NaN` and `inf`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a decimal amount", s),
        };

        let trimmed = s.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (major, minor) = match body.find(['.', ',']) {
            Some(idx) => (&body[..idx], &body[idx + 1..]),
            None => (body, ""),
        };

        if major.is_empty() && minor.is_empty() {
            return Err(invalid());
        }
        if !major.chars().all(|c| c.is_ascii_digit())
            || !minor.chars().all(|c| c.is_ascii_digit())
            || minor.len() > 2
        {
            return Err(invalid());
        }

        let major: i64 = if major.is_empty() {
            0
        } else {
            major.parse().map_err(|_| invalid())?
        };
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => minor.parse().map_err(|_| invalid())?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style display. Frontends format with their own locale rules.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_factory_discount_rounding() {
        // 1 × $9.99 at 3% = 29.97 cents off → 30 cents
        let line = Money::from_cents(999);
        assert_eq!(line.discount_portion(DiscountRate::FACTORY_DEFAULT).cents(), 30);
        assert_eq!(line.apply_discount(DiscountRate::FACTORY_DEFAULT).cents(), 969);

        // Large line stays exact to the cent
        let big = Money::from_cents(999) * 1250;
        assert_eq!(big.apply_discount(DiscountRate::FACTORY_DEFAULT).cents(), 1_211_287);
    }

    #[test]
    fn test_decimal_string() {
        let m = Money::from_cents(7910);
        assert_eq!(m.to_decimal_string(false), "79.10");
        assert_eq!(m.to_decimal_string(true), "79,10");
        assert_eq!(Money::from_cents(-3000).to_decimal_string(true), "-30,00");
        assert_eq!(Money::from_cents(5).to_decimal_string(false), "0.05");
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!("40".parse::<Money>().unwrap().cents(), 4000);
        assert_eq!("40.5".parse::<Money>().unwrap().cents(), 4050);
        assert_eq!("40,05".parse::<Money>().unwrap().cents(), 4005);
        assert_eq!(".75".parse::<Money>().unwrap().cents(), 75);
        assert_eq!("-3.20".parse::<Money>().unwrap().cents(), -320);
        assert_eq!(" 12 ".parse::<Money>().unwrap().cents(), 1200);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "NaN", "inf", "abc", "1.234", "1.2.3", "--1", ".", "1e5"] {
            assert!(bad.parse::<Money>().is_err(), "accepted {:?}", bad);
        }
    }
}
