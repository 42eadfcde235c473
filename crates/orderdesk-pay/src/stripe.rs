//! # Stripe Adapter
//!
//! Talks to the Stripe REST API directly with form-encoded requests.
//!
//! ## Checkout Flow
//! ```text
//! CheckoutRequest
//!      │
//!      ├── coupon?   ──► POST /coupons     ──► discounts[0][coupon]
//!      ├── tax_rate? ──► POST /tax_rates   ──► line_items[i][tax_rates][0]
//!      │                  (failures are logged and skipped)
//!      ▼
//! POST /checkout/sessions ──► { id, url }
//! ```
//!
//! Status lookups go to `/checkout/sessions/{id}` or, for ids starting with
//! `pi_`, to `/payment_intents/{id}`.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::provider::{
    CheckoutSession, PaymentIntent, PaymentProvider, PaymentStatus, RedirectUrls,
};
use orderdesk_core::checkout::{CouponSpec, TaxRateSpec};
use orderdesk_core::CheckoutRequest;

type Params = Vec<(String, String)>;

fn param(key: impl Into<String>, value: impl Into<String>) -> (String, String) {
    (key.into(), value.into())
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Form parameters for `POST /checkout/sessions`.
pub fn checkout_session_params(
    request: &CheckoutRequest,
    urls: &RedirectUrls,
    coupon_id: Option<&str>,
    tax_rate_id: Option<&str>,
) -> Params {
    let mut params = vec![
        param("payment_method_types[0]", "card"),
        param("mode", "payment"),
    ];

    for (i, line) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        params.push(param(
            format!("{prefix}[price_data][currency]"),
            line.currency.code(),
        ));
        params.push(param(
            format!("{prefix}[price_data][product_data][name]"),
            line.name.as_str(),
        ));
        if !line.description.is_empty() {
            params.push(param(
                format!("{prefix}[price_data][product_data][description]"),
                line.description.as_str(),
            ));
        }
        params.push(param(
            format!("{prefix}[price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        params.push(param(format!("{prefix}[quantity]"), line.quantity.to_string()));
        if let Some(rate) = tax_rate_id {
            params.push(param(format!("{prefix}[tax_rates][0]"), rate));
        }
    }

    if let Some(coupon) = coupon_id {
        params.push(param("discounts[0][coupon]", coupon));
    }

    params.push(param("success_url", urls.success_url.as_str()));
    params.push(param("cancel_url", urls.cancel_url.as_str()));
    params.push(param("metadata[order_id]", request.order_id.as_str()));
    params
}

/// Form parameters for `POST /coupons`. Coupons apply once.
pub fn coupon_params(spec: &CouponSpec) -> Params {
    match spec {
        CouponSpec::PercentOff { name, percent } => vec![
            param("duration", "once"),
            param("name", name.as_str()),
            param("percent_off", percent.normalize().to_string()),
        ],
        CouponSpec::AmountOff {
            name,
            amount,
            currency,
        } => vec![
            param("duration", "once"),
            param("name", name.as_str()),
            param("amount_off", amount.to_string()),
            param("currency", currency.code()),
        ],
    }
}

/// Form parameters for `POST /tax_rates`.
pub fn tax_rate_params(spec: &TaxRateSpec, country: &str) -> Params {
    vec![
        param("display_name", spec.display_name.as_str()),
        param("percentage", spec.percentage.normalize().to_string()),
        param("inclusive", spec.inclusive.to_string()),
        param("country", country),
        param("description", spec.description.as_str()),
    ]
}

/// Form parameters for `POST /payment_intents`.
pub fn payment_intent_params(request: &CheckoutRequest) -> Params {
    vec![
        param("amount", request.amount.to_string()),
        param("currency", request.currency.code()),
        param("metadata[order_id]", request.order_id.as_str()),
    ]
}

// =============================================================================
// Adapter
// =============================================================================

/// Stripe-backed [`PaymentProvider`].
pub struct StripeProvider {
    client: Client,
    config: ProviderConfig,
}

impl StripeProvider {
    pub fn new(config: ProviderConfig) -> PaymentResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(StripeProvider { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base, path)
    }

    async fn post_form(&self, path: &str, params: &Params) -> PaymentResult<Value> {
        debug!(path, "Stripe POST");
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(params)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get(&self, path: &str) -> PaymentResult<Value> {
        debug!(path, "Stripe GET");
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_coupon(&self, spec: &CouponSpec) -> PaymentResult<String> {
        let body = self.post_form("coupons", &coupon_params(spec)).await?;
        string_field(&body, "id")
    }

    async fn create_tax_rate(&self, spec: &TaxRateSpec) -> PaymentResult<String> {
        let params = tax_rate_params(spec, &self.config.tax_country);
        let body = self.post_form("tax_rates", &params).await?;
        string_field(&body, "id")
    }
}

async fn read_json(response: reqwest::Response) -> PaymentResult<Value> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(PaymentError::Rejected {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    response
        .json()
        .await
        .map_err(|e| PaymentError::MalformedResponse(e.to_string()))
}

/// `error.message` from a Stripe error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

fn string_field(body: &Value, field: &str) -> PaymentResult<String> {
    body[field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| PaymentError::MalformedResponse(format!("missing `{field}` in {body}")))
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
        urls: &RedirectUrls,
    ) -> PaymentResult<CheckoutSession> {
        let coupon_id = match &request.coupon {
            Some(spec) => match self.create_coupon(spec).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(order_id = %request.order_id, error = %e, "Coupon creation failed, continuing without discount");
                    None
                }
            },
            None => None,
        };

        let tax_rate_id = match &request.tax_rate {
            Some(spec) => match self.create_tax_rate(spec).await {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(order_id = %request.order_id, error = %e, "Tax rate creation failed, continuing without tax");
                    None
                }
            },
            None => None,
        };

        let params =
            checkout_session_params(request, urls, coupon_id.as_deref(), tax_rate_id.as_deref());
        let body = self.post_form("checkout/sessions", &params).await?;

        let session = CheckoutSession {
            id: string_field(&body, "id")?,
            url: string_field(&body, "url")?,
        };
        info!(order_id = %request.order_id, session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    async fn create_payment_intent(&self, request: &CheckoutRequest) -> PaymentResult<PaymentIntent> {
        let body = self
            .post_form("payment_intents", &payment_intent_params(request))
            .await?;

        let intent = PaymentIntent {
            id: string_field(&body, "id")?,
            client_secret: string_field(&body, "client_secret")?,
        };
        info!(order_id = %request.order_id, payment_intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }

    async fn payment_status(&self, id: &str) -> PaymentResult<PaymentStatus> {
        let paid = if id.starts_with("pi_") {
            let body = self.get(&format!("payment_intents/{id}")).await?;
            body["status"].as_str() == Some("succeeded")
        } else {
            let body = self.get(&format!("checkout/sessions/{id}")).await?;
            body["payment_status"].as_str() == Some("paid")
        };

        Ok(if paid {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        })
    }

    fn public_key(&self) -> &str {
        &self.config.public_key
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
