//! # HTTP Routes
//!
//! ```text
//! Orders & checkout
//!   POST  /api/orders                  create + checkout session
//!   GET   /api/orders?status=&limit=   list, newest first
//!   GET   /api/orders/{id}             order with lines, discount, tax
//!   POST  /api/orders/{id}/checkout    retry checkout for a pending order
//!   POST  /api/orders/{id}/cancel      pending → cancelled
//!   POST  /api/items/{id}/checkout     quick buy, quantity 1
//!   POST  /api/payment-intent          create + payment intent
//!   GET   /orders/{id}/success         provider redirect, confirms payment
//!   GET   /orders/{id}/cancel          provider redirect, cancels
//!
//! Catalog
//!   GET|POST        /api/items, /api/discounts, /api/taxes
//!   GET             /api/items/{id}
//!   GET|PATCH       /api/discounts/{id}, /api/taxes/{id}
//!
//! Misc
//!   GET   /api/config                  publishable key
//!   GET   /health
//! ```

pub mod catalog;
pub mod orders;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/orders", post(orders::create_order).get(orders::list_orders))
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/checkout", post(orders::checkout_order))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order))
        .route("/api/items/{id}/checkout", post(orders::quick_buy))
        .route("/api/payment-intent", post(orders::create_payment_intent))
        .route("/orders/{id}/success", get(orders::order_success))
        .route("/orders/{id}/cancel", get(orders::cancel_order))
        .route("/api/items", get(catalog::list_items).post(catalog::create_item))
        .route("/api/items/{id}", get(catalog::get_item))
        .route(
            "/api/discounts",
            get(catalog::list_discounts).post(catalog::create_discount),
        )
        .route(
            "/api/discounts/{id}",
            get(catalog::get_discount).patch(catalog::set_discount_active),
        )
        .route("/api/taxes", get(catalog::list_taxes).post(catalog::create_tax))
        .route(
            "/api/taxes/{id}",
            get(catalog::get_tax).patch(catalog::set_tax_active),
        )
        .route("/api/config", get(public_config))
        .route("/health", get(health))
        .with_state(state)
}

async fn public_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "public_key": state.payments.public_key() }))
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "database unavailable" })),
        )
    }
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use orderdesk_core::checkout::CouponSpec;
    use orderdesk_core::{CheckoutRequest, Currency, DiscountKind, Money};
    use orderdesk_db::{Database, DbConfig, NewDiscount, NewItem, NewTax};
    use orderdesk_pay::{
        CheckoutSession, PaymentError, PaymentIntent, PaymentProvider, PaymentResult,
        PaymentStatus, ProviderConfig, RedirectUrls,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tower::ServiceExt;

    // =========================================================================
    // Fake Provider
    // =========================================================================

    #[derive(Default)]
    struct FakeProvider {
        fail: AtomicBool,
        counter: AtomicUsize,
        paid: Mutex<HashSet<String>>,
        requests: Mutex<Vec<(CheckoutRequest, RedirectUrls)>>,
    }

    impl FakeProvider {
        fn unavailable() -> PaymentError {
            PaymentError::Rejected {
                status: 503,
                message: "provider unavailable".to_string(),
            }
        }

        fn mark_paid(&self, id: &str) {
            self.paid.lock().unwrap().insert(id.to_string());
        }
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn create_checkout_session(
            &self,
            request: &CheckoutRequest,
            urls: &RedirectUrls,
        ) -> PaymentResult<CheckoutSession> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), urls.clone()));
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CheckoutSession {
                id: format!("cs_fake_{n}"),
                url: format!("https://checkout.test/cs_fake_{n}"),
            })
        }

        async fn create_payment_intent(
            &self,
            request: &CheckoutRequest,
        ) -> PaymentResult<PaymentIntent> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(PaymentIntent {
                id: format!("pi_fake_{}", request.amount),
                client_secret: format!("pi_fake_{}_secret", request.amount),
            })
        }

        async fn payment_status(&self, id: &str) -> PaymentResult<PaymentStatus> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(if self.paid.lock().unwrap().contains(id) {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Unpaid
            })
        }

        fn public_key(&self) -> &str {
            "pk_test_fake"
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    struct TestApp {
        router: Router,
        state: Arc<AppState>,
        provider: Arc<FakeProvider>,
    }

    async fn setup() -> TestApp {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let provider = Arc::new(FakeProvider::default());
        let config = ApiConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            public_base_url: "http://shop.test".to_string(),
            order_list_limit: 50,
            provider: ProviderConfig::new("sk_test", "pk_test_fake"),
        };
        let state = AppState::new(db, provider.clone(), config);
        TestApp {
            router: router(state.clone()),
            state,
            provider,
        }
    }

    async fn item(app: &TestApp, name: &str, price: Decimal, currency: Currency) -> String {
        app.state
            .db
            .items()
            .create(NewItem {
                name: name.to_string(),
                description: format!("{name} description"),
                price: Money::new(price),
                currency,
            })
            .await
            .unwrap()
            .id
    }

    async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn decimal(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn create_order(app: &TestApp, body: Value) -> String {
        let (status, json) = send(app, Method::POST, "/api/orders", Some(body)).await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["order_id"].as_str().unwrap().to_string()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    #[tokio::test]
    async fn test_create_order_opens_checkout_session() {
        let app = setup().await;
        let item_id = item(&app, "Kettle", dec!(100.00), Currency::Rub).await;
        let discount = app
            .state
            .db
            .discounts()
            .create(NewDiscount {
                name: "Ten".to_string(),
                kind: DiscountKind::Percentage,
                value: dec!(10),
                is_active: true,
            })
            .await
            .unwrap();
        let tax = app
            .state
            .db
            .taxes()
            .create(NewTax {
                name: "VAT".to_string(),
                rate: dec!(20),
                is_active: true,
            })
            .await
            .unwrap();

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({
                "items": [{ "item_id": item_id }],
                "discount_id": discount.id,
                "tax_id": tax.id,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["session_id"], "cs_fake_1");
        assert_eq!(json["checkout_url"], "https://checkout.test/cs_fake_1");
        let order_id = json["order_id"].as_str().unwrap();

        let (status, order) = send(&app, Method::GET, &format!("/api/orders/{order_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["order"]["status"], "pending");
        assert_eq!(order["order"]["payment_session_id"], "cs_fake_1");
        assert_eq!(decimal(&order["order"]["total_amount"]), dec!(100));
        assert_eq!(decimal(&order["order"]["discount_amount"]), dec!(10));
        assert_eq!(decimal(&order["order"]["tax_amount"]), dec!(18));
        assert_eq!(decimal(&order["order"]["final_amount"]), dec!(108));
        assert_eq!(order["lines"].as_array().unwrap().len(), 1);

        let requests = app.provider.requests.lock().unwrap();
        let (request, urls) = &requests[0];
        assert_eq!(request.amount, 10800);
        assert!(request.coupon.is_some());
        assert!(request.tax_rate.is_some());
        assert_eq!(urls.success_url, format!("http://shop.test/orders/{order_id}/success"));
    }

    #[tokio::test]
    async fn test_mixed_currency_is_unprocessable() {
        let app = setup().await;
        let rub = item(&app, "Tea", dec!(450), Currency::Rub).await;
        let usd = item(&app, "Pen", dec!(34.99), Currency::Usd).await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "items": [{ "item_id": rub }, { "item_id": usd }] })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "mixed_currency");
        assert_eq!(app.state.db.orders().count().await.unwrap(), 0);
        assert!(app.provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_item_and_empty_order() {
        let app = setup().await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "items": [{ "item_id": "missing" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");

        let (status, json) = send(&app, Method::POST, "/api/orders", Some(json!({ "items": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_invalid_quantity_is_rejected() {
        let app = setup().await;
        let id = item(&app, "Mug", dec!(690), Currency::Rub).await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "items": [{ "item_id": id, "quantity": 0 }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_order_pending_and_retry_succeeds() {
        let app = setup().await;
        let id = item(&app, "Lamp", dec!(49), Currency::Eur).await;
        app.provider.fail.store(true, Ordering::SeqCst);

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "items": [{ "item_id": id, "quantity": 2 }] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "provider_failed");
        let order_id = json["error"]["order_id"].as_str().unwrap().to_string();

        let order = app.state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status.as_str(), "pending");
        assert!(order.payment_session_id.is_none());

        app.provider.fail.store(false, Ordering::SeqCst);
        let (status, json) = send(
            &app,
            Method::POST,
            &format!("/api/orders/{order_id}/checkout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["order_id"], order_id.as_str());

        let (status, json) = send(
            &app,
            Method::POST,
            &format!("/api/orders/{order_id}/checkout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");
    }

    #[tokio::test]
    async fn test_retry_after_discount_deactivated_keeps_coupon() {
        let app = setup().await;
        let item_id = item(&app, "Kettle", dec!(100.00), Currency::Rub).await;
        let discount = app
            .state
            .db
            .discounts()
            .create(NewDiscount {
                name: "Ten".to_string(),
                kind: DiscountKind::Percentage,
                value: dec!(10),
                is_active: true,
            })
            .await
            .unwrap();
        app.provider.fail.store(true, Ordering::SeqCst);

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({
                "items": [{ "item_id": item_id }],
                "discount_id": discount.id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let order_id = json["error"]["order_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/api/discounts/{}", discount.id),
            Some(json!({ "is_active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        app.provider.fail.store(false, Ordering::SeqCst);
        let (status, json) = send(
            &app,
            Method::POST,
            &format!("/api/orders/{order_id}/checkout"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{json}");

        let requests = app.provider.requests.lock().unwrap();
        let (request, _) = &requests[0];
        assert_eq!(request.amount, 9000);
        assert!(matches!(
            request.coupon,
            Some(CouponSpec::PercentOff { percent, .. }) if percent == dec!(10)
        ));
    }

    #[tokio::test]
    async fn test_quick_buy() {
        let app = setup().await;
        let id = item(&app, "Bookends", dec!(27.50), Currency::Eur).await;

        let (status, json) = send(&app, Method::POST, &format!("/api/items/{id}/checkout"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["url"], "https://checkout.test/cs_fake_1");
        let requests = app.provider.requests.lock().unwrap();
        assert_eq!(requests[0].0.line_items[0].quantity, 1);
        assert_eq!(requests[0].0.amount, 2750);
    }

    #[tokio::test]
    async fn test_payment_intent() {
        let app = setup().await;
        let id = item(&app, "Ink", dec!(9.995), Currency::Usd).await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/payment-intent",
            Some(json!({ "items": [{ "item_id": id, "quantity": 3 }] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{json}");
        // 29.985 truncates to 2998 minor units
        assert_eq!(json["payment_intent_id"], "pi_fake_2998");
        assert_eq!(json["client_secret"], "pi_fake_2998_secret");

        let order_id = json["order_id"].as_str().unwrap();
        let order = app.state.db.orders().get_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(order.payment_session_id.as_deref(), Some("pi_fake_2998"));
        assert_eq!(order.final_amount, Money::new(dec!(29.985)));
    }

    // =========================================================================
    // Confirmation / Cancellation
    // =========================================================================

    #[tokio::test]
    async fn test_success_redirect_confirms_payment_once() {
        let app = setup().await;
        let id = item(&app, "Notebook", dec!(12.50), Currency::Usd).await;
        let order_id = create_order(&app, json!({ "items": [{ "item_id": id }] })).await;
        let success = format!("/orders/{order_id}/success");

        let (status, json) = send(&app, Method::GET, &success, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "unpaid");

        app.provider.mark_paid("cs_fake_1");
        let (status, json) = send(&app, Method::GET, &success, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");

        let order = app.state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status.as_str(), "paid");
        assert!(order.paid_at.is_some());

        let (status, json) = send(&app, Method::GET, &success, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "invalid_transition");

        let (status, _) = send(&app, Method::GET, &format!("/orders/{order_id}/cancel"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_cancel_then_success_is_rejected() {
        let app = setup().await;
        let id = item(&app, "Notebook", dec!(12.50), Currency::Usd).await;
        let order_id = create_order(&app, json!({ "items": [{ "item_id": id }] })).await;
        app.provider.mark_paid("cs_fake_1");

        let (status, json) = send(
            &app,
            Method::POST,
            &format!("/api/orders/{order_id}/cancel"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "cancelled");

        let (status, _) = send(&app, Method::GET, &format!("/orders/{order_id}/success"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let order = app.state.db.orders().get_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status.as_str(), "cancelled");
    }

    #[tokio::test]
    async fn test_success_without_session() {
        let app = setup().await;
        let id = item(&app, "Mug", dec!(690), Currency::Rub).await;
        app.provider.fail.store(true, Ordering::SeqCst);
        let (_, json) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({ "items": [{ "item_id": id }] })),
        )
        .await;
        let order_id = json["error"]["order_id"].as_str().unwrap().to_string();
        app.provider.fail.store(false, Ordering::SeqCst);

        let (status, json) = send(&app, Method::GET, &format!("/orders/{order_id}/success"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "no_payment_session");
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let app = setup().await;
        for uri in ["/api/orders/nope", "/orders/nope/success", "/orders/nope/cancel"] {
            let (status, _) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    // =========================================================================
    // Listings & Catalog
    // =========================================================================

    #[tokio::test]
    async fn test_list_orders_by_status() {
        let app = setup().await;
        let id = item(&app, "Tea", dec!(450), Currency::Rub).await;
        let first = create_order(&app, json!({ "items": [{ "item_id": id }] })).await;
        let second = create_order(&app, json!({ "items": [{ "item_id": id, "quantity": 2 }] })).await;
        send(&app, Method::POST, &format!("/api/orders/{first}/cancel"), None).await;

        let (status, json) = send(&app, Method::GET, "/api/orders", None).await;
        assert_eq!(status, StatusCode::OK);
        let all = json.as_array().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["id"], second.as_str());

        let (_, json) = send(&app, Method::GET, "/api/orders?status=cancelled", None).await;
        let cancelled = json.as_array().unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0]["id"], first.as_str());

        let (status, json) = send(&app, Method::GET, "/api/orders?status=shipped", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_failed");
    }

    #[tokio::test]
    async fn test_items_endpoints() {
        let app = setup().await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(json!({ "name": "Candle", "price": "19.90", "currency": "usd" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["currency_symbol"], "$");
        let id = json["id"].as_str().unwrap().to_string();

        let (status, json) = send(&app, Method::GET, &format!("/api/items/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Candle");
        assert_eq!(decimal(&json["price"]), dec!(19.90));

        let (_, json) = send(&app, Method::GET, "/api/items", None).await;
        assert_eq!(json.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/items",
            Some(json!({ "name": "  ", "price": "1.00", "currency": "usd" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/items/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discount_and_tax_endpoints() {
        let app = setup().await;

        let (status, discount) = send(
            &app,
            Method::POST,
            "/api/discounts",
            Some(json!({ "name": "Five off", "type": "fixed", "value": "5.00" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{discount}");
        assert_eq!(discount["is_active"], true);
        let discount_id = discount["id"].as_str().unwrap().to_string();

        let (status, json) = send(
            &app,
            Method::PATCH,
            &format!("/api/discounts/{discount_id}"),
            Some(json!({ "is_active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["is_active"], false);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/taxes",
            Some(json!({ "name": "Bad", "rate": "-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, tax) = send(
            &app,
            Method::POST,
            "/api/taxes",
            Some(json!({ "name": "VAT", "rate": "20" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let tax_id = tax["id"].as_str().unwrap();

        let (status, json) = send(&app, Method::GET, &format!("/api/taxes/{tax_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "VAT");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/taxes/missing",
            Some(json!({ "is_active": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = send(&app, Method::GET, "/api/discounts", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_config_and_health() {
        let app = setup().await;

        let (status, json) = send(&app, Method::GET, "/api/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["public_key"], "pk_test_fake");

        let (status, json) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }
}
