//! # Money Module
//!
//! Provides the `Money` and `Percent` types used by coupon discount math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    100 * 0.07 = 7.000000000000001  ❌ WRONG!                            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer cents and basis points                          │
//! │    10000 cents * 700 bps / 10000 = 700 cents                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use aegis_core::money::{Money, Percent};
//!
//! let purchase = Money::from_major(100);          // $100.00
//! let discount = purchase.percentage(Percent::from_bps(2000)); // 20%
//! assert_eq!(discount, Money::from_major(20));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

/// Basis points in one hundred percent.
pub const FULL_PERCENT_BPS: i64 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Purchase amount ──► min purchase check ──► raw discount               │
/// │                                               │                         │
/// │  Coupon.max_discount_cents ─────────────────► clamp ──► discount       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use aegis_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use aegis_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(25).cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole currency unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Computes `self × percent`, rounding half up to the nearest cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128 so
    /// large purchases cannot overflow.
    ///
    /// ```rust
    /// use aegis_core::money::{Money, Percent};
    ///
    /// // $10.00 at 8.25% = $0.825 → $0.83
    /// let part = Money::from_cents(1000).percentage(Percent::from_bps(825));
    /// assert_eq!(part.cents(), 83);
    /// ```
    pub fn percentage(&self, percent: Percent) -> Money {
        let scaled = self.0 as i128 * percent.bps() as i128 + (FULL_PERCENT_BPS as i128 / 2);
        Money::from_cents((scaled / FULL_PERCENT_BPS as i128) as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Ord::min(self, other)
    }
}

/// Shows money as `$12.34`, for logs and debugging only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
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

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points (1 bps = 0.01%).
///
/// `2000` is 20%, `10000` is 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(i64);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: i64) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from whole percent (20 → 20%).
    #[inline]
    pub const fn from_whole(pct: i64) -> Self {
        Percent(pct * 100)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, (self.0 % 100).abs())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major() {
        let money = Money::from_major(12);
        assert_eq!(money.cents(), 1200);
        assert_eq!(money.major(), 12);
        assert_eq!(money.cents_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Percent::from_bps(825).to_string(), "8.25%");
    }

    #[test]
    fn test_percentage_whole() {
        let purchase = Money::from_major(100);
        assert_eq!(purchase.percentage(Percent::from_whole(20)), Money::from_major(20));
        assert_eq!(purchase.percentage(Percent::from_whole(100)), purchase);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 15% of $0.33 = 4.95 cents → 5 cents
        let part = Money::from_cents(33).percentage(Percent::from_bps(1500));
        assert_eq!(part.cents(), 5);

        // 15% of $0.31 = 4.65 cents → 5 cents; 15% of $0.29 = 4.35 → 4
        assert_eq!(Money::from_cents(31).percentage(Percent::from_bps(1500)).cents(), 5);
        assert_eq!(Money::from_cents(29).percentage(Percent::from_bps(1500)).cents(), 4);
    }

    #[test]
    fn test_percentage_large_amount_does_not_overflow() {
        let big = Money::from_cents(i64::MAX / 2);
        let half = big.percentage(Percent::from_bps(5000));
        assert!(half.cents() > 0);
    }

    #[test]
    fn test_min_and_arithmetic() {
        let a = Money::from_major(30);
        let b = Money::from_major(20);
        assert_eq!(a.min(b), b);
        assert_eq!((a - b).cents(), 1000);
        let mut total = a;
        total += b;
        assert_eq!(total, Money::from_major(50));
    }
}
