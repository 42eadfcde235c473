//! Catalog administration: items, discounts, taxes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use orderdesk_core::{Currency, Discount, DiscountKind, Item, Money, Tax};
use orderdesk_db::{NewDiscount, NewItem, NewTax};

fn active_by_default() -> bool {
    true
}

// =============================================================================
// Items
// =============================================================================

/// An item with its currency symbol for display.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub currency_symbol: &'static str,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        let currency_symbol = item.currency.symbol();
        ItemView {
            item,
            currency_symbol,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub currency: Currency,
}

/// `POST /api/items`
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemView>)> {
    let item = state
        .db
        .items()
        .create(NewItem {
            name: req.name,
            description: req.description,
            price: req.price,
            currency: req.currency,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// `GET /api/items`
pub async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ItemView>>> {
    let items = state.db.items().list().await?;
    Ok(Json(items.into_iter().map(ItemView::from).collect()))
}

/// `GET /api/items/{id}`
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemView>> {
    state
        .db
        .items()
        .get_by_id(&id)
        .await?
        .map(|item| Json(item.into()))
        .ok_or_else(|| ApiError::not_found("Item", &id))
}

// =============================================================================
// Discounts
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateDiscountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// `{ "is_active": false }`
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// `POST /api/discounts`
pub async fn create_discount(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDiscountRequest>,
) -> ApiResult<(StatusCode, Json<Discount>)> {
    let discount = state
        .db
        .discounts()
        .create(NewDiscount {
            name: req.name,
            kind: req.kind,
            value: req.value,
            is_active: req.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// `GET /api/discounts`
pub async fn list_discounts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.db.discounts().list().await?))
}

/// `GET /api/discounts/{id}`
pub async fn get_discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Discount>> {
    state
        .db
        .discounts()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Discount", &id))
}

/// `PATCH /api/discounts/{id}`
///
/// Existing orders keep the amounts computed at creation.
pub async fn set_discount_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<Discount>> {
    let discount = state.db.discounts().set_active(&id, req.is_active).await?;
    Ok(Json(discount))
}

// =============================================================================
// Taxes
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateTaxRequest {
    pub name: String,
    pub rate: Decimal,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

/// `POST /api/taxes`
pub async fn create_tax(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTaxRequest>,
) -> ApiResult<(StatusCode, Json<Tax>)> {
    let tax = state
        .db
        .taxes()
        .create(NewTax {
            name: req.name,
            rate: req.rate,
            is_active: req.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(tax)))
}

/// `GET /api/taxes`
pub async fn list_taxes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Tax>>> {
    Ok(Json(state.db.taxes().list().await?))
}

/// `GET /api/taxes/{id}`
pub async fn get_tax(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Tax>> {
    state
        .db
        .taxes()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Tax", &id))
}

/// `PATCH /api/taxes/{id}`
pub async fn set_tax_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<Tax>> {
    let tax = state.db.taxes().set_active(&id, req.is_active).await?;
    Ok(Json(tax))
}
