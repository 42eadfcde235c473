//! # Order Pricing Engine
//!
//! Composes order lines, the discount policy and the tax policy into the
//! four order-level amounts.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      price_order(lines, discount, tax)                  │
//! │                                                                         │
//! │  1. order_currency(lines) ──► MixedCurrency? stop, nothing computed     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. total    = Σ unit_price × quantity                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. discount = apply_discount(discount, total)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  4. taxable  = total − discount          (may be negative)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  5. tax      = apply_tax(tax, taxable)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  6. final    = total − discount + tax                                   │
//! │                                                                         │
//! │  Worked example: total 100.00, 10% off, 20% tax                        │
//! │    discount 10.00 ─► taxable 90.00 ─► tax 18.00 ─► final 108.00         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Pure: inputs are borrowed immutably, a new [`OrderAmounts`] is returned
//! - Idempotent: same inputs, same amounts
//! - No rounding: amounts keep full decimal precision; only the payment
//!   boundary truncates (see [`Money::to_minor_units`])

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::discount::apply_discount;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::apply_tax;
use crate::types::{Currency, Discount, OrderLine, Tax};

/// The four derived amounts of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmounts {
    pub total_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub final_amount: Money,
}

impl OrderAmounts {
    /// Total minus discount: the base tax is computed on.
    #[inline]
    pub fn taxable_base(&self) -> Money {
        self.total_amount - self.discount_amount
    }
}

/// Resolves the single currency shared by all lines.
///
/// This is the one place the single-currency rule is checked. Callers store
/// the result instead of re-deriving it from individual lines.
///
/// ## Errors
/// - [`CoreError::EmptyOrder`] when there are no lines
/// - [`CoreError::MixedCurrency`] when lines disagree, listing every
///   currency found in sorted order
pub fn order_currency(lines: &[OrderLine]) -> CoreResult<Currency> {
    let currencies: BTreeSet<Currency> = lines.iter().map(|l| l.currency).collect();

    let mut iter = currencies.iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(CoreError::EmptyOrder),
        (Some(currency), None) => Ok(*currency),
        (Some(_), Some(_)) => Err(CoreError::MixedCurrency {
            currencies: currencies.iter().map(|c| c.code().to_string()).collect(),
        }),
    }
}

/// Sum of `unit_price × quantity` over all lines.
pub fn lines_total(lines: &[OrderLine]) -> Money {
    lines.iter().map(OrderLine::line_total).sum()
}

/// Prices an order.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use orderdesk_core::pricing::price_order;
/// use orderdesk_core::{Currency, Item, Money, OrderLine};
///
/// let item = Item {
///     id: "i1".into(),
///     name: "Tea".into(),
///     description: "Green".into(),
///     price: "25.00".parse().unwrap(),
///     currency: Currency::Usd,
///     created_at: Utc::now(),
/// };
/// let lines = vec![OrderLine::from_item("l1", "o1", &item, 4, Utc::now())];
///
/// let amounts = price_order(&lines, None, None).unwrap();
/// assert_eq!(amounts.total_amount, "100.00".parse::<Money>().unwrap());
/// assert_eq!(amounts.final_amount, amounts.total_amount);
/// ```
pub fn price_order(
    lines: &[OrderLine],
    discount: Option<&Discount>,
    tax: Option<&Tax>,
) -> CoreResult<OrderAmounts> {
    order_currency(lines)?;

    let total_amount = lines_total(lines);
    let discount_amount = apply_discount(discount, total_amount);
    let taxable = total_amount - discount_amount;
    let tax_amount = apply_tax(tax, taxable);
    let final_amount = total_amount - discount_amount + tax_amount;

    Ok(OrderAmounts {
        total_amount,
        discount_amount,
        tax_amount,
        final_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
