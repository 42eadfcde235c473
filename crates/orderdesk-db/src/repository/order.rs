//! # Order Repository
//!
//! Database operations for orders and order lines.
//!
//! ## Order Lifecycle in the Database
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Persistence                                 │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     ├── validate line count + quantities                               │
//! │     ├── load items, discount, tax      ── missing? UnknownReference    │
//! │     ├── snapshot lines, Order::create  ── mixed currency? rejected     │
//! │     ├── INSERT orders, INSERT order_lines                              │
//! │     └── COMMIT  (any error above: rollback, nothing persisted)         │
//! │                                                                         │
//! │  2. ATTACH SESSION                                                     │
//! │     └── UPDATE ... WHERE version = ? AND status = 'pending'            │
//! │                   AND payment_session_id IS NULL                       │
//! │                                                                         │
//! │  3. MARK PAID / CANCEL                                                 │
//! │     └── UPDATE ... WHERE version = ? AND status = 'pending'            │
//! │                                                                         │
//! │  0 rows affected in 2 or 3 → DbError::Conflict, nothing changed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optimistic Locking
//! Every mutation carries the `version` the caller read and bumps it. Two
//! handlers racing on the same order cannot both win: the second one sees
//! zero affected rows.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::discount::{DiscountRow, DISCOUNT_COLUMNS};
use super::item::{ItemRow, ITEM_COLUMNS};
use super::tax::{TaxRow, TAX_COLUMNS};
use super::{money_text, parse_money};
use crate::error::{DbError, DbResult};
use crate::repository::discount::DiscountRepository;
use crate::repository::tax::TaxRepository;
use orderdesk_core::validation::{validate_line_count, validate_quantity};
use orderdesk_core::{
    CoreError, Currency, Discount, Item, Order, OrderLine, OrderSnapshot, OrderStatus, Tax,
};

// =============================================================================
// Inputs
// =============================================================================

/// One requested line: which item and how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub item_id: String,
    pub quantity: i64,
}

/// Input for creating an order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewOrder {
    pub lines: Vec<NewOrderLine>,
    pub discount_id: Option<String>,
    pub tax_id: Option<String>,
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    status: OrderStatus,
    currency: Currency,
    discount_id: Option<String>,
    tax_id: Option<String>,
    total_amount: String,
    discount_amount: String,
    tax_amount: String,
    final_amount: String,
    payment_session_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            total_amount: parse_money("orders.total_amount", &row.total_amount)?,
            discount_amount: parse_money("orders.discount_amount", &row.discount_amount)?,
            tax_amount: parse_money("orders.tax_amount", &row.tax_amount)?,
            final_amount: parse_money("orders.final_amount", &row.final_amount)?,
            id: row.id,
            status: row.status,
            currency: row.currency,
            discount_id: row.discount_id,
            tax_id: row.tax_id,
            payment_session_id: row.payment_session_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            paid_at: row.paid_at,
            cancelled_at: row.cancelled_at,
            version: row.version,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: String,
    order_id: String,
    item_id: String,
    name_snapshot: String,
    description_snapshot: String,
    currency: Currency,
    unit_price: String,
    quantity: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = DbError;

    fn try_from(row: OrderLineRow) -> DbResult<Self> {
        Ok(OrderLine {
            unit_price: parse_money("order_lines.unit_price", &row.unit_price)?,
            id: row.id,
            order_id: row.order_id,
            item_id: row.item_id,
            name_snapshot: row.name_snapshot,
            description_snapshot: row.description_snapshot,
            currency: row.currency,
            quantity: row.quantity,
            created_at: row.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = r#"
    id, status, currency, discount_id, tax_id,
    total_amount, discount_amount, tax_amount, final_amount,
    payment_session_id, created_at, updated_at, paid_at, cancelled_at, version
"#;

const LINE_COLUMNS: &str = r#"
    id, order_id, item_id, name_snapshot, description_snapshot,
    currency, unit_price, quantity, created_at
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let snapshot = db.orders().create(&NewOrder {
///     lines: vec![NewOrderLine { item_id, quantity: 2 }],
///     discount_id: None,
///     tax_id: Some(vat_id),
/// }).await?;
///
/// let mut order = snapshot.order;
/// db.orders().attach_session(&mut order, "cs_test_123").await?;
/// db.orders().mark_paid(&mut order).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates, prices and stores an order with its lines, atomically.
    ///
    /// ## Errors
    /// - `Domain(Validation)` for an empty order, too many lines or a bad
    ///   quantity
    /// - `Domain(UnknownReference)` for a missing item, discount or tax
    /// - `Domain(MixedCurrency)` when items disagree on currency
    ///
    /// In every error case no order and no line is persisted.
    pub async fn create(&self, new: &NewOrder) -> DbResult<OrderSnapshot> {
        validate_line_count(new.lines.len())?;
        for line in &new.lines {
            validate_quantity(line.quantity)?;
        }

        let mut tx = self.pool.begin().await?;

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut lines = Vec::with_capacity(new.lines.len());
        for requested in &new.lines {
            let item = fetch_item(&mut tx, &requested.item_id)
                .await?
                .ok_or_else(|| CoreError::unknown("Item", &requested.item_id))?;

            lines.push(OrderLine::from_item(
                Uuid::new_v4().to_string(),
                order_id.clone(),
                &item,
                requested.quantity,
                now,
            ));
        }

        let discount = match &new.discount_id {
            Some(id) => Some(
                fetch_discount(&mut tx, id)
                    .await?
                    .ok_or_else(|| CoreError::unknown("Discount", id))?,
            ),
            None => None,
        };

        let tax = match &new.tax_id {
            Some(id) => Some(
                fetch_tax(&mut tx, id)
                    .await?
                    .ok_or_else(|| CoreError::unknown("Tax", id))?,
            ),
            None => None,
        };

        let order = Order::create(order_id, &lines, discount.as_ref(), tax.as_ref(), now)?;

        insert_order(&mut tx, &order).await?;
        for (position, line) in lines.iter().enumerate() {
            insert_line(&mut tx, line, position as i64).await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order.id,
            lines = lines.len(),
            currency = %order.currency,
            final_amount = %order.final_amount,
            "Order created"
        );

        Ok(OrderSnapshot {
            order,
            lines,
            discount,
            tax,
        })
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets the lines of an order in the order they were requested.
    pub async fn get_lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = ?1 ORDER BY position"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    /// Gets an order with its lines and its resolved discount and tax.
    ///
    /// The discount and tax are returned in their current state. The stored
    /// amounts are not recomputed from them.
    pub async fn get_snapshot(&self, id: &str) -> DbResult<Option<OrderSnapshot>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let lines = self.get_lines(id).await?;

        let discount = match &order.discount_id {
            Some(discount_id) => {
                DiscountRepository::new(self.pool.clone())
                    .get_by_id(discount_id)
                    .await?
            }
            None => None,
        };

        let tax = match &order.tax_id {
            Some(tax_id) => TaxRepository::new(self.pool.clone()).get_by_id(tax_id).await?,
            None => None,
        };

        Ok(Some(OrderSnapshot {
            order,
            lines,
            discount,
            tax,
        }))
    }

    /// Lists orders, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<OrderStatus>, limit: u32) -> DbResult<Vec<Order>> {
        debug!(status = ?status, limit, "Listing orders");

        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE (?1 IS NULL OR status = ?1)
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#
        ))
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Counts orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Attaches a provider session id to a pending order and persists it.
    ///
    /// `order` is updated only when the write succeeds.
    pub async fn attach_session(&self, order: &mut Order, session_id: &str) -> DbResult<()> {
        let mut updated = order.clone();
        updated.attach_payment_session(session_id, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                payment_session_id = ?3,
                updated_at = ?4,
                version = version + 1
            WHERE id = ?1
              AND version = ?2
              AND status = 'pending'
              AND payment_session_id IS NULL
            "#,
        )
        .bind(&updated.id)
        .bind(updated.version)
        .bind(&updated.payment_session_id)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(order_id = %order.id, version = order.version, "Stale order on session attach");
            return Err(DbError::conflict("Order", &order.id));
        }

        updated.version += 1;
        *order = updated;

        info!(order_id = %order.id, session_id = %session_id, "Payment session attached");
        Ok(())
    }

    /// `pending → paid`, persisted with a version check.
    pub async fn mark_paid(&self, order: &mut Order) -> DbResult<()> {
        let mut updated = order.clone();
        updated.mark_paid(Utc::now())?;
        self.persist_status(order, updated).await
    }

    /// `pending → cancelled`, persisted with a version check.
    pub async fn cancel(&self, order: &mut Order) -> DbResult<()> {
        let mut updated = order.clone();
        updated.cancel(Utc::now())?;
        self.persist_status(order, updated).await
    }

    async fn persist_status(&self, order: &mut Order, mut updated: Order) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = ?3,
                paid_at = ?4,
                cancelled_at = ?5,
                updated_at = ?6,
                version = version + 1
            WHERE id = ?1
              AND version = ?2
              AND status = 'pending'
            "#,
        )
        .bind(&updated.id)
        .bind(updated.version)
        .bind(updated.status)
        .bind(updated.paid_at)
        .bind(updated.cancelled_at)
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(order_id = %order.id, version = order.version, "Stale order on status change");
            return Err(DbError::conflict("Order", &order.id));
        }

        updated.version += 1;
        *order = updated;

        info!(order_id = %order.id, status = %order.status, "Order status changed");
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_item(tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<Option<Item>> {
    let row: Option<ItemRow> =
        sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    row.map(Item::try_from).transpose()
}

async fn fetch_discount(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> DbResult<Option<Discount>> {
    let row: Option<DiscountRow> = sqlx::query_as(&format!(
        "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    row.map(Discount::try_from).transpose()
}

async fn fetch_tax(tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<Option<Tax>> {
    let row: Option<TaxRow> =
        sqlx::query_as(&format!("SELECT {TAX_COLUMNS} FROM taxes WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
    row.map(Tax::try_from).transpose()
}

async fn insert_order(tx: &mut Transaction<'_, Sqlite>, order: &Order) -> DbResult<()> {
    debug!(order_id = %order.id, "Inserting order");

    sqlx::query(
        r#"
        INSERT INTO orders (
            id, status, currency, discount_id, tax_id,
            total_amount, discount_amount, tax_amount, final_amount,
            payment_session_id, created_at, updated_at, paid_at, cancelled_at, version
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13, ?14, ?15
        )
        "#,
    )
    .bind(&order.id)
    .bind(order.status)
    .bind(order.currency)
    .bind(&order.discount_id)
    .bind(&order.tax_id)
    .bind(money_text(order.total_amount))
    .bind(money_text(order.discount_amount))
    .bind(money_text(order.tax_amount))
    .bind(money_text(order.final_amount))
    .bind(&order.payment_session_id)
    .bind(order.created_at)
    .bind(order.updated_at)
    .bind(order.paid_at)
    .bind(order.cancelled_at)
    .bind(order.version)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_line(
    tx: &mut Transaction<'_, Sqlite>,
    line: &OrderLine,
    position: i64,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO order_lines (
            id, order_id, item_id, name_snapshot, description_snapshot,
            currency, unit_price, quantity, position, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.item_id)
    .bind(&line.name_snapshot)
    .bind(&line.description_snapshot)
    .bind(line.currency)
    .bind(money_text(line.unit_price))
    .bind(line.quantity)
    .bind(position)
    .bind(line.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
