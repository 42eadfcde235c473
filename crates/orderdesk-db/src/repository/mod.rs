//! # Repository Module
//!
//! Database repository implementations for Orderdesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / service                                                │
//! │       │                                                                 │
//! │       │  db.orders().create(&new_order)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, new_order)      one transaction                     │
//! │  ├── get_snapshot(&self, id)                                           │
//! │  ├── persist_session(&self, order) version-checked                     │
//! │  └── persist_status(&self, order)  version-checked                     │
//! │       │                                                                 │
//! │       │  SQL (decimal TEXT ⇄ Money via the row types below)            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`item::ItemRepository`] - Catalog items
//! - [`discount::DiscountRepository`] - Discounts and their active flag
//! - [`tax::TaxRepository`] - Taxes and their active flag
//! - [`order::OrderRepository`] - Orders, lines, lifecycle persistence

pub mod discount;
pub mod item;
pub mod order;
pub mod tax;

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{DbError, DbResult};
use orderdesk_core::Money;

/// Parses a decimal TEXT column.
pub(crate) fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DbError::CorruptData {
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Parses a decimal TEXT column into Money.
pub(crate) fn parse_money(column: &str, value: &str) -> DbResult<Money> {
    parse_decimal(column, value).map(Money::new)
}

/// Canonical TEXT form of an amount. Keeps full precision.
pub(crate) fn money_text(money: Money) -> String {
    money.amount().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_text_keeps_precision() {
        let m = Money::new(dec!(19.995));
        assert_eq!(money_text(m), "19.995");
        assert_eq!(parse_money("price", &money_text(m)).unwrap(), m);
    }

    #[test]
    fn test_corrupt_decimal_is_reported() {
        let err = parse_decimal("rate", "twenty").unwrap_err();
        assert!(matches!(err, DbError::CorruptData { .. }));
    }
}
