//! # Discount Policy
//!
//! Turns a discount definition and a base amount into a discount amount.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  discount          base        →  discount amount                │
//! │  ───────────────   ─────────      ─────────────────────────────  │
//! │  none / inactive   any            0                              │
//! │  percentage 10     100.00         10.00   (base × value / 100)   │
//! │  fixed 30.00       20.00          30.00   (NOT capped to base)   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fixed discount larger than the base is returned as-is. The pricing
//! engine then works with a negative taxable base.

use crate::money::Money;
use crate::types::{Discount, DiscountKind};

/// Computes the discount amount for `base`.
///
/// ## Example
/// ```rust
/// use orderdesk_core::discount::apply_discount;
/// use orderdesk_core::money::Money;
///
/// assert!(apply_discount(None, "100.00".parse().unwrap()).is_zero());
/// ```
pub fn apply_discount(discount: Option<&Discount>, base: Money) -> Money {
    match discount {
        Some(d) if d.is_active => match d.kind {
            DiscountKind::Percentage => base.percentage(d.value),
            DiscountKind::Fixed => Money::new(d.value),
        },
        _ => Money::zero(),
    }
}
