//! # Order Lifecycle
//!
//! The order state machine and the only code that mutates an [`Order`].
//!
//! ## State Machine
//! ```text
//!   Order::create ──► ┌─────────┐  PaymentConfirmed  ┌────────┐
//!                     │ PENDING │ ─────────────────► │  PAID  │  terminal
//!   reprice ────────► │         │                    └────────┘
//!   attach session ─► │         │  Cancel            ┌───────────┐
//!                     └─────────┘ ─────────────────► │ CANCELLED │  terminal
//!                                                    └───────────┘
//!
//!   From PAID or CANCELLED every event is rejected with
//!   InvalidTransition and the order is left untouched.
//! ```
//!
//! ## Frozen Amounts
//! The four amounts can only be written while the order is pending. After a
//! terminal transition [`Order::reprice`] refuses to run, so deactivating a
//! discount or tax never changes a finished order.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::pricing::{order_currency, price_order, OrderAmounts};
use crate::types::{Discount, Order, OrderLine, OrderStatus, Tax};

/// Events that drive the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    /// The payment provider confirmed a successful payment.
    PaymentConfirmed,
    /// Explicit cancellation request.
    Cancel,
}

impl OrderEvent {
    /// Status the event leads to from `pending`.
    pub const fn target(&self) -> OrderStatus {
        match self {
            OrderEvent::PaymentConfirmed => OrderStatus::Paid,
            OrderEvent::Cancel => OrderStatus::Cancelled,
        }
    }
}

impl OrderStatus {
    /// Paid and cancelled orders never change again.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Computes the next status for `event`.
    ///
    /// ## Errors
    /// [`CoreError::InvalidTransition`] from any terminal status.
    pub fn transition(&self, order_id: &str, event: OrderEvent) -> CoreResult<OrderStatus> {
        match self {
            OrderStatus::Pending => Ok(event.target()),
            OrderStatus::Paid | OrderStatus::Cancelled => Err(CoreError::InvalidTransition {
                order_id: order_id.to_string(),
                from: self.as_str().to_string(),
                to: event.target().as_str().to_string(),
            }),
        }
    }
}

impl Order {
    /// Creates a pending order priced from `lines`.
    ///
    /// The currency is resolved here once and stored on the order. The
    /// discount and tax are bound by reference; their current definitions
    /// decide the amounts.
    pub fn create(
        id: impl Into<String>,
        lines: &[OrderLine],
        discount: Option<&Discount>,
        tax: Option<&Tax>,
        now: DateTime<Utc>,
    ) -> CoreResult<Order> {
        let currency = order_currency(lines)?;
        let amounts = price_order(lines, discount, tax)?;

        Ok(Order {
            id: id.into(),
            status: OrderStatus::Pending,
            currency,
            discount_id: discount.map(|d| d.id.clone()),
            tax_id: tax.map(|t| t.id.clone()),
            total_amount: amounts.total_amount,
            discount_amount: amounts.discount_amount,
            tax_amount: amounts.tax_amount,
            final_amount: amounts.final_amount,
            payment_session_id: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            cancelled_at: None,
            version: 0,
        })
    }

    /// The four stored amounts.
    pub fn amounts(&self) -> OrderAmounts {
        OrderAmounts {
            total_amount: self.total_amount,
            discount_amount: self.discount_amount,
            tax_amount: self.tax_amount,
            final_amount: self.final_amount,
        }
    }

    /// Recomputes the amounts from `lines`. Only allowed while pending.
    ///
    /// On error the order is left unchanged.
    pub fn reprice(
        &mut self,
        lines: &[OrderLine],
        discount: Option<&Discount>,
        tax: Option<&Tax>,
    ) -> CoreResult<()> {
        self.ensure_pending()?;

        let currency = order_currency(lines)?;
        let amounts = price_order(lines, discount, tax)?;

        self.currency = currency;
        self.total_amount = amounts.total_amount;
        self.discount_amount = amounts.discount_amount;
        self.tax_amount = amounts.tax_amount;
        self.final_amount = amounts.final_amount;
        Ok(())
    }

    /// Records the provider session or intent id.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidOrderStatus`] unless pending
    /// - [`CoreError::SessionAlreadyAttached`] if an id is already set
    pub fn attach_payment_session(
        &mut self,
        session_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_pending()?;

        if let Some(existing) = &self.payment_session_id {
            return Err(CoreError::SessionAlreadyAttached {
                order_id: self.id.clone(),
                session_id: existing.clone(),
            });
        }

        self.payment_session_id = Some(session_id.into());
        self.updated_at = now;
        Ok(())
    }

    /// `pending → paid`.
    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.status = self.status.transition(&self.id, OrderEvent::PaymentConfirmed)?;
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `pending → cancelled`.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.status = self.status.transition(&self.id, OrderEvent::Cancel)?;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Fails with [`CoreError::InvalidOrderStatus`] unless the order is pending.
    pub fn ensure_pending(&self) -> CoreResult<()> {
        if self.status == OrderStatus::Pending {
            Ok(())
        } else {
            Err(CoreError::InvalidOrderStatus {
                order_id: self.id.clone(),
                status: self.status.as_str().to_string(),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
