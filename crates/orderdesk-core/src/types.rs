//! # Domain Types
//!
//! Core domain types used throughout Orderdesk.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │    Discount     │   │       Tax       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  kind           │   │  rate (%)       │       │
//! │  │  price          │   │  value          │   │  is_active      │       │
//! │  │  currency       │   │  is_active      │   └─────────────────┘       │
//! │  └────────┬────────┘   └────────┬────────┘            │                │
//! │           │ snapshot            │ by reference        │ by reference   │
//! │           ▼                     ▼                     ▼                │
//! │  ┌─────────────────┐   ┌─────────────────────────────────────────┐     │
//! │  │   OrderLine     │──►│                 Order                   │     │
//! │  │  unit_price     │   │  status, currency, 4 derived amounts,   │     │
//! │  │  quantity       │   │  payment_session_id, version            │     │
//! │  └─────────────────┘   └─────────────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Rule
//! An [`OrderLine`] copies the item's name, description, currency and price
//! when it is created. Editing the item afterwards never changes an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Currency
// =============================================================================

/// Currencies an item can be priced in.
///
/// Lowercase ISO 4217 codes, the form the payment provider expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Currency; 3] = [Currency::Rub, Currency::Usd, Currency::Eur];

    /// Returns the lowercase currency code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "rub",
            Currency::Usd => "usd",
            Currency::Eur => "eur",
        }
    }

    /// Returns the display symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Rub => "₽",
            Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Rub
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: Currency::ALL.iter().map(|c| c.code().to_string()).collect(),
            })
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog item available for ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on checkout.
    pub name: String,

    /// Description passed to the payment provider.
    pub description: String,

    /// Unit price in major units.
    pub price: Money,

    /// Currency the price is expressed in.
    pub currency: Currency,

    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percent of the order total.
    Percentage,
    /// `value` is an absolute amount in the order currency.
    Fixed,
}

impl DiscountKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["percentage".to_string(), "fixed".to_string()],
            }),
        }
    }
}

/// A discount that can be applied to an order.
///
/// Immutable after creation except for `is_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Percent (for `Percentage`) or amount (for `Fixed`).
    pub value: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Tax
// =============================================================================

/// A tax applied on top of the discounted order total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tax {
    pub id: String,
    pub name: String,
    /// Rate as a percentage: `20` means 20%.
    pub rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ```text
///            ┌──────► Paid       (terminal)
/// Pending ───┤
///            └──────► Cancelled  (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment. Amounts may still be recomputed.
    Pending,
    /// Payment confirmed by the provider.
    Paid,
    /// Cancelled by an explicit request.
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec![
                    "pending".to_string(),
                    "paid".to_string(),
                    "cancelled".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line in an order.
/// Uses snapshot pattern to freeze item data at the time the line is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    /// Item name at time of ordering (frozen).
    pub name_snapshot: String,
    /// Item description at time of ordering (frozen).
    pub description_snapshot: String,
    /// Item currency at time of ordering (frozen).
    pub currency: Currency,
    /// Unit price at time of ordering (frozen).
    pub unit_price: Money,
    /// Quantity ordered, at least 1.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Creates a line from an item, copying its price.
    ///
    /// ## Price Freezing
    /// The price is captured at this moment. If the item price changes
    /// later, this line keeps the original price.
    pub fn from_item(
        id: impl Into<String>,
        order_id: impl Into<String>,
        item: &Item,
        quantity: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        OrderLine {
            id: id.into(),
            order_id: order_id.into(),
            item_id: item.id.clone(),
            name_snapshot: item.name.clone(),
            description_snapshot: item.description.clone(),
            currency: item.currency,
            unit_price: item.price,
            quantity,
            created_at,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order with its derived amounts.
///
/// The four amounts are only ever written by the pricing engine (see
/// [`Order::create`] and [`Order::reprice`]); status only changes through
/// the lifecycle methods in [`crate::lifecycle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    /// Currency shared by every line, resolved once at pricing time.
    pub currency: Currency,
    pub discount_id: Option<String>,
    pub tax_id: Option<String>,
    pub total_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub final_amount: Money,
    /// Provider checkout session or payment intent id.
    pub payment_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version, bumped on every persisted change.
    pub version: i64,
}

/// An order together with everything resolved for it.
///
/// This is what receipts, admin views and the payment adapter read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub discount: Option<Discount>,
    pub tax: Option<Tax>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn coffee() -> Item {
        Item {
            id: "item-1".to_string(),
            name: "Coffee".to_string(),
            description: "Whole beans".to_string(),
            price: Money::new(dec!(12.50)),
            currency: Currency::Usd,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_currency_parse_and_display() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" rub ".parse::<Currency>().unwrap(), Currency::Rub);
        assert!("gbp".parse::<Currency>().is_err());
        assert_eq!(Currency::Eur.to_string(), "eur");
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(Currency::Rub.symbol(), "₽");
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(Currency::Eur.symbol(), "€");
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!("PAID".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_discount_kind_parse() {
        assert_eq!(
            "percentage".parse::<DiscountKind>().unwrap(),
            DiscountKind::Percentage
        );
        assert_eq!("Fixed".parse::<DiscountKind>().unwrap(), DiscountKind::Fixed);
        assert!("bogo".parse::<DiscountKind>().is_err());
    }

    #[test]
    fn test_line_snapshots_item() {
        let mut item = coffee();
        let line = OrderLine::from_item("line-1", "order-1", &item, 3, Utc::now());

        item.price = Money::new(dec!(99.00));
        item.name = "Renamed".to_string();

        assert_eq!(line.unit_price, Money::new(dec!(12.50)));
        assert_eq!(line.name_snapshot, "Coffee");
        assert_eq!(line.currency, Currency::Usd);
        assert_eq!(line.line_total(), Money::new(dec!(37.50)));
    }

    #[test]
    fn test_discount_serializes_kind_as_type() {
        let discount = Discount {
            id: "d1".to_string(),
            name: "Spring".to_string(),
            kind: DiscountKind::Percentage,
            value: dec!(10),
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&discount).unwrap();
        assert_eq!(json["type"], "percentage");
        assert_eq!(json["value"], "10");
    }
}
