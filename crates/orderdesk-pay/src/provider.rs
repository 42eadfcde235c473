//! # Payment Provider Seam
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apps/api service                                                       │
//! │       │  Arc<dyn PaymentProvider>                                       │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────┐      ┌──────────────────────────┐         │
//! │  │ StripeProvider (reqwest) │  or  │ test fake (in-memory)    │         │
//! │  └──────────────────────────┘      └──────────────────────────┘         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations receive a [`CheckoutRequest`] that orderdesk-core has
//! already checked: pending status, one currency, minor units in range.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PaymentResult;
use orderdesk_core::CheckoutRequest;

/// Where the provider sends the buyer after checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl RedirectUrls {
    /// `{base}/orders/{id}/success` and `{base}/orders/{id}/cancel`.
    pub fn for_order(public_base_url: &str, order_id: &str) -> Self {
        let base = public_base_url.trim_end_matches('/');
        RedirectUrls {
            success_url: format!("{base}/orders/{order_id}/success"),
            cancel_url: format!("{base}/orders/{order_id}/cancel"),
        }
    }
}

/// A hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A payment intent for client-side confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Outcome of a payment status lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// A payment provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a hosted checkout session for the order.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        urls: &RedirectUrls,
    ) -> PaymentResult<CheckoutSession>;

    /// Creates a payment intent for the order's final amount.
    async fn create_payment_intent(&self, request: &CheckoutRequest) -> PaymentResult<PaymentIntent>;

    /// Looks up whether the session or intent `id` has been paid.
    async fn payment_status(&self, id: &str) -> PaymentResult<PaymentStatus>;

    /// Key handed to browser clients.
    fn public_key(&self) -> &str;
}
