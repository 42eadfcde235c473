//! # orderdesk-core: Pure Pricing and Lifecycle Logic
//!
//! This crate turns a list of (item, quantity) pairs plus an optional
//! discount and tax into the four order amounts, and owns the order state
//! machine. It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderdesk Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    POST /api/orders, /success, /cancel, catalog admin          │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────┐   ┌───────────▼───────────────┐   │
//! │  │  orderdesk-db (SQLite, sqlx)    │   │  orderdesk-pay (reqwest)  │   │
//! │  │  repositories, migrations       │   │  PaymentProvider, Stripe  │   │
//! │  └──────────────┬──────────────────┘   └───────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │               ★ orderdesk-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   money ─► discount ─► tax ─► pricing ─► lifecycle ─► checkout  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money` and the minor-unit conversion
//! - [`types`] - Item, Discount, Tax, Order, OrderLine
//! - [`discount`] / [`tax`] - The two pricing policies
//! - [`pricing`] - The pricing engine and the single-currency check
//! - [`lifecycle`] - `pending → paid | cancelled`
//! - [`checkout`] - Typed request handed to the payment adapter
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use orderdesk_core::{Currency, Item, Money, Order, OrderLine};
//!
//! let item = Item {
//!     id: "item-1".into(),
//!     name: "Coffee".into(),
//!     description: "Whole beans".into(),
//!     price: "100.00".parse().unwrap(),
//!     currency: Currency::Rub,
//!     created_at: Utc::now(),
//! };
//! let lines = vec![OrderLine::from_item("line-1", "order-1", &item, 1, Utc::now())];
//!
//! let order = Order::create("order-1", &lines, None, None, Utc::now()).unwrap();
//! assert_eq!(order.final_amount, "100.00".parse::<Money>().unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod discount;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::CheckoutRequest;
pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::OrderEvent;
pub use money::Money;
pub use pricing::{order_currency, price_order, OrderAmounts};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches typos like 1000 instead of 10.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of item, discount and tax names.
pub const MAX_NAME_LENGTH: usize = 200;
