//! Order, checkout and payment confirmation handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::service::{CheckoutService, CheckoutStarted, IntentStarted, StatusReport};
use crate::state::AppState;
use orderdesk_core::{Order, OrderSnapshot, OrderStatus};
use orderdesk_db::{NewOrder, NewOrderLine};

/// Upper bound for `?limit=` on order listings.
const MAX_LIST_LIMIT: u32 = 500;

// =============================================================================
// Request / Response Bodies
// =============================================================================

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// `{ items: [{ item_id, quantity? }], discount_id?, tax_id? }`
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub discount_id: Option<String>,
    pub tax_id: Option<String>,
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        NewOrder {
            lines: req
                .items
                .into_iter()
                .map(|i| NewOrderLine {
                    item_id: i.item_id,
                    quantity: i.quantity,
                })
                .collect(),
            discount_id: req.discount_id,
            tax_id: req.tax_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuickBuyResponse {
    pub order_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/orders`
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<CheckoutStarted>> {
    let new = NewOrder::from(req);
    let started = CheckoutService::new(state).checkout_new_order(&new).await?;
    Ok(Json(started))
}

/// `POST /api/orders/{id}/checkout`
pub async fn checkout_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CheckoutStarted>> {
    let started = CheckoutService::new(state).checkout_existing(&id).await?;
    Ok(Json(started))
}

/// `POST /api/items/{id}/checkout`
pub async fn quick_buy(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> ApiResult<Json<QuickBuyResponse>> {
    let started = CheckoutService::new(state).quick_buy(&item_id).await?;
    Ok(Json(QuickBuyResponse {
        order_id: started.order_id,
        url: started.checkout_url,
    }))
}

/// `POST /api/payment-intent`
pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Json<IntentStarted>> {
    let new = NewOrder::from(req);
    let started = CheckoutService::new(state).create_payment_intent(&new).await?;
    Ok(Json(started))
}

/// `GET /orders/{id}/success`
pub async fn order_success(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusReport>> {
    let report = CheckoutService::new(state).confirm_payment(&id).await?;
    Ok(Json(report))
}

/// `GET /orders/{id}/cancel` and `POST /api/orders/{id}/cancel`
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StatusReport>> {
    let report = CheckoutService::new(state).cancel(&id).await?;
    Ok(Json(report))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderSnapshot>> {
    state
        .db
        .orders()
        .get_snapshot(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

/// `GET /api/orders?status=pending&limit=20`, newest first.
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;
    let limit = query
        .limit
        .unwrap_or(state.config.order_list_limit)
        .clamp(1, MAX_LIST_LIMIT);

    let orders = state.db.orders().list(status, limit).await?;
    Ok(Json(orders))
}
