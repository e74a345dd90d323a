//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents In, Decimal Numbers On The Wire
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing prices as floats:                                              │
//! │    9.99 * 3 = 29.970000000000002  ❌ WRONG!                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    999 cents * 3 = 2997 cents                                           │
//! │                                                                         │
//! │  The persisted cart and the mock catalog carry prices as JSON numbers  │
//! │  in major units ("price": 9.99). Those are converted to cents exactly  │
//! │  once, at the serde boundary, by rounding to the nearest cent.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quickcommerce_core::money::Money;
//!
//! let price = Money::from_cents(999); // $9.99
//! let line_total = price * 3;         // $29.97
//! assert_eq!(line_total.cents(), 2997);
//! assert_eq!(line_total.to_string(), "$29.97");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Largest magnitude accepted from a decimal amount: $1,000,000,000.
pub const MAX_DECIMAL_CENTS: i64 = 100_000_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serde**: Written and read as a decimal JSON number in major units,
///   matching the persisted cart layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units to Money, rounding to the
    /// nearest cent.
    ///
    /// Returns `None` for NaN, infinities and anything beyond
    /// ±[`MAX_DECIMAL_CENTS`] cents.
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(9.99), Some(Money::from_cents(999)));
    /// assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
    /// assert_eq!(Money::from_decimal(f64::NAN), None);
    /// assert_eq!(Money::from_decimal(1e17), None);
    /// ```
    pub fn from_decimal(amount: f64) -> Option<Self> {
        let cents = (amount * 100.0).round();
        if !cents.is_finite() || cents.abs() > MAX_DECIMAL_CENTS as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the amount in major units as a float.
    ///
    /// Only for the wire format and display; never compute with it.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a rate in basis points and rounds half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(2997); // $29.97
    /// let tax = subtotal.apply_rate_bps(800); // 8%
    /// // $29.97 × 8% = $2.3976 → $2.40
    /// assert_eq!(tax.cents(), 240);
    /// ```
    pub fn apply_rate_bps(&self, bps: u32) -> Money {
        // i128 so large carts cannot overflow the intermediate product
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use quickcommerce_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(999); // $9.99
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 1998);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Serde (decimal wire format)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount).ok_or_else(|| {
            serde::de::Error::custom("price must be a finite number within ±$1,000,000,000")
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.34`. The CLI has its own currency-aware formatter.
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

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Multiplication by i64 (line totals).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
