//! # Discount Repository
//!
//! Database operations for discounts.
//!
//! A discount is immutable once created except for `is_active`. Toggling the
//! flag affects orders created afterwards only; stored order amounts are
//! never recomputed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_decimal;
use crate::error::{DbError, DbResult};
use orderdesk_core::validation::{validate_discount_value, validate_name};
use orderdesk_core::{Discount, DiscountKind};

/// Input for creating a discount.
#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub name: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DiscountRow {
    id: String,
    name: String,
    kind: DiscountKind,
    value: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<DiscountRow> for Discount {
    type Error = DbError;

    fn try_from(row: DiscountRow) -> DbResult<Self> {
        Ok(Discount {
            value: parse_decimal("discounts.value", &row.value)?,
            id: row.id,
            name: row.name,
            kind: row.kind,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

pub(crate) const DISCOUNT_COLUMNS: &str = "id, name, kind, value, is_active, created_at";

/// Repository for discount database operations.
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Validates and inserts a new discount.
    pub async fn create(&self, new: NewDiscount) -> DbResult<Discount> {
        validate_name(&new.name)?;
        validate_discount_value(new.value)?;

        let discount = Discount {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            kind: new.kind,
            value: new.value,
            is_active: new.is_active,
            created_at: Utc::now(),
        };

        debug!(id = %discount.id, kind = discount.kind.as_str(), value = %discount.value, "Inserting discount");

        sqlx::query(
            r#"
            INSERT INTO discounts (id, name, kind, value, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.name)
        .bind(discount.kind)
        .bind(discount.value.to_string())
        .bind(discount.is_active)
        .bind(discount.created_at)
        .execute(&self.pool)
        .await?;

        Ok(discount)
    }

    /// Gets a discount by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        let row: Option<DiscountRow> = sqlx::query_as(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Discount::try_from).transpose()
    }

    /// Lists all discounts, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Discount>> {
        let rows: Vec<DiscountRow> = sqlx::query_as(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Discount::try_from).collect()
    }

    /// Activates or deactivates a discount.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<Discount> {
        let result = sqlx::query("UPDATE discounts SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        info!(id = %id, is_active, "Discount active flag changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
