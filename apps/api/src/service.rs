//! # Checkout Service
//!
//! Orchestrates the order store and the payment provider.
//!
//! ## Checkout Session Flow
//! ```text
//! NewOrder ──► orders().create()          priced + persisted atomically
//!                  │
//!                  ▼
//!          CheckoutRequest::for_order     pending? single currency?
//!                  │
//!                  ▼
//!          payments.create_checkout_session
//!                  │            └── failure: 502 with order_id, order stays pending
//!                  ▼
//!          orders().attach_session        version-checked write
//! ```
//!
//! The provider is never called while a database transaction is open.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::AppState;
use orderdesk_core::{CheckoutRequest, CoreError, Order, OrderEvent, OrderSnapshot};
use orderdesk_db::{NewOrder, NewOrderLine};
use orderdesk_pay::{PaymentStatus, RedirectUrls};

/// A hosted checkout page bound to an order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStarted {
    pub order_id: String,
    pub session_id: String,
    pub checkout_url: String,
}

/// A payment intent bound to an order.
#[derive(Debug, Clone, Serialize)]
pub struct IntentStarted {
    pub order_id: String,
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// Outcome of a confirmation or cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub message: &'static str,
}

pub struct CheckoutService {
    state: Arc<AppState>,
}

impl CheckoutService {
    pub fn new(state: Arc<AppState>) -> Self {
        CheckoutService { state }
    }

    /// Creates the order, then opens a checkout session for it.
    pub async fn checkout_new_order(&self, new: &NewOrder) -> ApiResult<CheckoutStarted> {
        let snapshot = self.state.db.orders().create(new).await?;
        self.open_session(snapshot).await
    }

    /// Single-item order of quantity one, then a checkout session.
    pub async fn quick_buy(&self, item_id: &str) -> ApiResult<CheckoutStarted> {
        let new = NewOrder {
            lines: vec![NewOrderLine {
                item_id: item_id.to_string(),
                quantity: 1,
            }],
            ..NewOrder::default()
        };
        self.checkout_new_order(&new).await
    }

    /// Opens a checkout session for an existing pending order.
    ///
    /// Used to retry after a provider failure.
    pub async fn checkout_existing(&self, order_id: &str) -> ApiResult<CheckoutStarted> {
        let snapshot = self.snapshot(order_id).await?;
        self.open_session(snapshot).await
    }

    /// Creates the order, then a payment intent for its final amount.
    pub async fn create_payment_intent(&self, new: &NewOrder) -> ApiResult<IntentStarted> {
        let snapshot = self.state.db.orders().create(new).await?;
        let request = checkout_request(&snapshot)?;
        let mut order = snapshot.order;
        let order_id = order.id.clone();

        let intent = self
            .state
            .payments
            .create_payment_intent(&request)
            .await
            .map_err(|e| ApiError::from(e).for_order(&order_id))?;

        self.state
            .db
            .orders()
            .attach_session(&mut order, &intent.id)
            .await
            .map_err(|e| ApiError::from(e).for_order(&order_id))?;

        Ok(IntentStarted {
            order_id,
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    /// Asks the provider whether the order's session was paid and, if so,
    /// moves the order to `paid`.
    pub async fn confirm_payment(&self, order_id: &str) -> ApiResult<StatusReport> {
        let mut order = self.order(order_id).await?;
        order.status.transition(&order.id, OrderEvent::PaymentConfirmed)?;

        let Some(session_id) = order.payment_session_id.clone() else {
            return Err(ApiError::new(
                ErrorCode::NoPaymentSession,
                format!("Order {order_id} has no payment session"),
            ));
        };

        let status = self
            .state
            .payments
            .payment_status(&session_id)
            .await
            .map_err(|e| ApiError::from(e).for_order(order_id))?;

        match status {
            PaymentStatus::Paid => {
                self.state.db.orders().mark_paid(&mut order).await?;
                Ok(StatusReport {
                    status: "success",
                    message: "Order paid",
                })
            }
            PaymentStatus::Unpaid => {
                warn!(order_id, session_id = %session_id, "Success redirect for unpaid session");
                Ok(StatusReport {
                    status: "unpaid",
                    message: "Payment has not been completed",
                })
            }
        }
    }

    /// `pending → cancelled`.
    pub async fn cancel(&self, order_id: &str) -> ApiResult<StatusReport> {
        let mut order = self.order(order_id).await?;
        self.state.db.orders().cancel(&mut order).await?;
        Ok(StatusReport {
            status: "cancelled",
            message: "Order cancelled",
        })
    }

    async fn open_session(&self, snapshot: OrderSnapshot) -> ApiResult<CheckoutStarted> {
        let request = checkout_request(&snapshot)?;
        let mut order = snapshot.order;

        if let Some(existing) = &order.payment_session_id {
            return Err(CoreError::SessionAlreadyAttached {
                order_id: order.id.clone(),
                session_id: existing.clone(),
            }
            .into());
        }

        let order_id = order.id.clone();
        let urls = RedirectUrls::for_order(&self.state.config.public_base_url, &order_id);
        let session = self
            .state
            .payments
            .create_checkout_session(&request, &urls)
            .await
            .map_err(|e| ApiError::from(e).for_order(&order_id))?;

        self.state
            .db
            .orders()
            .attach_session(&mut order, &session.id)
            .await
            .map_err(|e| ApiError::from(e).for_order(&order_id))?;

        Ok(CheckoutStarted {
            order_id,
            session_id: session.id,
            checkout_url: session.url,
        })
    }

    async fn order(&self, order_id: &str) -> ApiResult<Order> {
        self.state
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))
    }

    async fn snapshot(&self, order_id: &str) -> ApiResult<OrderSnapshot> {
        self.state
            .db
            .orders()
            .get_snapshot(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))
    }
}

fn checkout_request(snapshot: &OrderSnapshot) -> ApiResult<CheckoutRequest> {
    CheckoutRequest::for_order(snapshot)
        .map_err(|e| ApiError::from(e).for_order(&snapshot.order.id))
}
