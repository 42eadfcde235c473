//! # Money Module
//!
//! Provides the `Money` type for handling monetary values exactly.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Percentages make it worse:                                             │
//! │    19.99 × 7.5 / 100 = 1.49925 (must stay 1.49925, not 1.4992499..)    │
//! │                                                                         │
//! │  OUR SOLUTION: Base-10 Decimal                                          │
//! │    Every amount is a 96-bit integer mantissa with a decimal scale.      │
//! │    Add, subtract, × quantity, × rate, ÷ 100 are all exact.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Minor-Unit Boundary
//! The payment provider only accepts integer minor units (cents, kopecks).
//! [`Money::to_minor_units`] is the single place where precision is dropped:
//! scale by 100, then truncate toward zero.
//!
//! ## Usage
//! ```rust
//! use orderdesk_core::money::Money;
//!
//! let price: Money = "10.99".parse().unwrap();
//! let line = price.multiply_quantity(3);          // 32.97
//! let total = line + Money::from_minor_units(500); // 37.97
//!
//! assert_eq!(total.to_string(), "37.97");
//! assert_eq!(total.to_minor_units().unwrap(), 3797);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// An exact monetary amount in the major currency unit (rubles, dollars).
///
/// ## Design Decisions
/// - **Decimal (signed)**: negative values are legal; a fixed discount larger
///   than the order total produces a negative taxable base
/// - **Single field tuple struct**: zero-cost wrapper over `Decimal`
/// - **Serialized as a string**: `"10.99"`, never a JSON float
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Where Money is Used                                  │
/// │                                                                         │
/// │  Item.price ──► OrderLine.unit_price (snapshot) ──► line total          │
/// │                                                                         │
/// │  Σ line totals ──► total ──► discount ──► taxable ──► tax ──► final     │
/// │                                                                         │
/// │  final ──► to_minor_units() ──► payment provider (integer)             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from integer minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let price = Money::from_minor_units(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor_units(minor: i64) -> Self {
        Money(Decimal::new(minor, 2))
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a line quantity.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    ///
    /// let unit_price: Money = "2.99".parse().unwrap();
    /// assert_eq!(unit_price.multiply_quantity(3).to_string(), "8.97");
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `rate` percent of this amount: `self × rate / 100`.
    ///
    /// No rounding happens here. 7.5% of 19.99 is exactly 1.49925.
    ///
    /// ## Example
    /// ```rust
    /// use orderdesk_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let base: Money = "90.00".parse().unwrap();
    /// let tax = base.percentage(Decimal::from(20));
    /// assert_eq!(tax, "18.00".parse::<Money>().unwrap());
    /// ```
    #[inline]
    pub fn percentage(&self, rate: Decimal) -> Self {
        Money(self.0 * rate / Decimal::ONE_HUNDRED)
    }

    /// Converts to integer minor units for the payment provider.
    ///
    /// ## Rounding Rule
    /// ```text
    /// amount × 100 ──► truncate toward zero ──► i64
    ///
    ///   19.995  ──►  1999.5  ──►  1999   (never 2000)
    ///  -10.005  ──► -1000.5  ──► -1000
    /// ```
    ///
    /// ## Errors
    /// [`CoreError::AmountOutOfRange`] when the scaled value does not fit i64.
    pub fn to_minor_units(&self) -> CoreResult<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|scaled| scaled.trunc())
            .and_then(|whole| whole.to_i64())
            .ok_or_else(|| CoreError::AmountOutOfRange {
                amount: self.to_string(),
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows at least two decimal places (`10` → `10.00`) and never rounds
/// away extra precision (`19.995` stays `19.995`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.scale() < 2 {
            let mut padded = self.0;
            padded.rescale(2);
            write!(f, "{}", padded)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Money {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Money)
            .map_err(|e| CoreError::InvalidAmount {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

/// Multiplication by a quantity.
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

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
