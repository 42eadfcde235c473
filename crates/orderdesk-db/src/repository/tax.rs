//! # Tax Repository
//!
//! Database operations for taxes. Same shape as discounts: immutable except
//! for `is_active`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::parse_decimal;
use crate::error::{DbError, DbResult};
use orderdesk_core::validation::{validate_name, validate_tax_rate};
use orderdesk_core::Tax;

/// Input for creating a tax.
#[derive(Debug, Clone)]
pub struct NewTax {
    pub name: String,
    pub rate: Decimal,
    pub is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TaxRow {
    id: String,
    name: String,
    rate: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaxRow> for Tax {
    type Error = DbError;

    fn try_from(row: TaxRow) -> DbResult<Self> {
        Ok(Tax {
            rate: parse_decimal("taxes.rate", &row.rate)?,
            id: row.id,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

pub(crate) const TAX_COLUMNS: &str = "id, name, rate, is_active, created_at";

/// Repository for tax database operations.
#[derive(Debug, Clone)]
pub struct TaxRepository {
    pool: SqlitePool,
}

impl TaxRepository {
    /// Creates a new TaxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TaxRepository { pool }
    }

    /// Validates and inserts a new tax.
    pub async fn create(&self, new: NewTax) -> DbResult<Tax> {
        validate_name(&new.name)?;
        validate_tax_rate(new.rate)?;

        let tax = Tax {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            rate: new.rate,
            is_active: new.is_active,
            created_at: Utc::now(),
        };

        debug!(id = %tax.id, rate = %tax.rate, "Inserting tax");

        sqlx::query(
            r#"
            INSERT INTO taxes (id, name, rate, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&tax.id)
        .bind(&tax.name)
        .bind(tax.rate.to_string())
        .bind(tax.is_active)
        .bind(tax.created_at)
        .execute(&self.pool)
        .await?;

        Ok(tax)
    }

    /// Gets a tax by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Tax>> {
        let row: Option<TaxRow> =
            sqlx::query_as(&format!("SELECT {TAX_COLUMNS} FROM taxes WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Tax::try_from).transpose()
    }

    /// Lists all taxes, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Tax>> {
        let rows: Vec<TaxRow> = sqlx::query_as(&format!(
            "SELECT {TAX_COLUMNS} FROM taxes ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Tax::try_from).collect()
    }

    /// Activates or deactivates a tax.
    pub async fn set_active(&self, id: &str, is_active: bool) -> DbResult<Tax> {
        let result = sqlx::query("UPDATE taxes SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tax", id));
        }

        info!(id = %id, is_active, "Tax active flag changed");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Tax", id))
    }
}
