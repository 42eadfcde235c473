//! # Error Types
//!
//! Domain-specific error types for orderdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderdesk-core errors (this file)                                     │
//! │  ├── CoreError        - Pricing / lifecycle rule violations            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  orderdesk-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  orderdesk-pay errors (separate crate)                                 │
//! │  └── PaymentError     - Payment provider failures                      │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fail-Fast Rule
//! Every pricing and lifecycle function either returns a complete result or
//! one of these errors. There are no partially priced orders and no
//! half-applied transitions.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Order lines span more than one currency.
    ///
    /// ## When This Occurs
    /// ```text
    /// POST /api/orders { items: [usd item, rub item] }
    ///      │
    ///      ▼
    /// order_currency(lines) sees {usd, rub}
    ///      │
    ///      ▼
    /// MixedCurrency ── nothing priced, nothing persisted
    /// ```
    #[error("All items in an order must share one currency, found: {}", .currencies.join(", "))]
    MixedCurrency { currencies: Vec<String> },

    /// Lifecycle transition attempted from a terminal state.
    ///
    /// ## When This Occurs
    /// - Marking an already paid order as paid again
    /// - Cancelling a paid order
    /// - Paying a cancelled order
    #[error("Order {order_id} cannot go from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// A referenced Item, Discount or Tax does not exist.
    #[error("{entity} not found: {id}")]
    UnknownReference { entity: String, id: String },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Requesting a checkout session for a paid or cancelled order
    /// - Re-pricing a frozen order
    #[error("Order {order_id} is {status}, cannot perform operation")]
    InvalidOrderStatus { order_id: String, status: String },

    /// A payment session is already attached to the order.
    #[error("Order {order_id} already has payment session {session_id}")]
    SessionAlreadyAttached { order_id: String, session_id: String },

    /// An order has no lines, so there is nothing to price.
    #[error("Order has no items")]
    EmptyOrder,

    /// Amount text could not be parsed as a decimal.
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Amount does not fit the provider's integer minor units.
    #[error("Amount {amount} is out of range for minor-unit conversion")]
    AmountOutOfRange { amount: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an UnknownReference error for a given entity type and ID.
    pub fn unknown(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::UnknownReference {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
