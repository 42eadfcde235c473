//! # Item Repository
//!
//! Database operations for catalog items.
//!
//! Items are referenced by order lines through a price snapshot, so nothing
//! here can change an existing order.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::{money_text, parse_money};
use crate::error::{DbError, DbResult};
use orderdesk_core::validation::{validate_name, validate_price};
use orderdesk_core::{Currency, Item, Money};

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub currency: Currency,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    id: String,
    name: String,
    description: String,
    price: String,
    currency: Currency,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = DbError;

    fn try_from(row: ItemRow) -> DbResult<Self> {
        Ok(Item {
            price: parse_money("items.price", &row.price)?,
            id: row.id,
            name: row.name,
            description: row.description,
            currency: row.currency,
            created_at: row.created_at,
        })
    }
}

pub(crate) const ITEM_COLUMNS: &str = "id, name, description, price, currency, created_at";

/// Repository for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let item = db.items().create(NewItem { .. }).await?;
/// let same = db.items().get_by_id(&item.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Validates and inserts a new item.
    pub async fn create(&self, new: NewItem) -> DbResult<Item> {
        validate_name(&new.name)?;
        validate_price(new.price)?;

        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description.trim().to_string(),
            price: new.price,
            currency: new.currency,
            created_at: Utc::now(),
        };

        self.insert(&item).await?;
        Ok(item)
    }

    /// Inserts a fully built item.
    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (id, name, description, price, currency, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(money_text(item.price))
        .bind(item.currency)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let row: Option<ItemRow> =
            sqlx::query_as(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Item::try_from).transpose()
    }

    /// Lists all items, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed items");
        rows.into_iter().map(Item::try_from).collect()
    }

    /// Counts items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
