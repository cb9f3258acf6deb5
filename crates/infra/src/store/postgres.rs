//! Postgres-backed item store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls` | `Unavailable` | Backend unreachable |
//! | `Database` | `Query` | Statement rejected (e.g. `23514` check violation on `quantity >= 0`) |
//! | `ColumnDecode`, `ColumnNotFound`, `Decode` | `Corrupt` | Row shape does not match `items` |
//! | Other | `Query` | Anything else |
//!
//! ## Concurrency
//!
//! `compare_and_set_quantity` is a single conditional `UPDATE` on quantity
//! (and `is_active` for reservations); Postgres row locking makes it atomic
//! with respect to other writers of the same row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use stockrecon_core::ItemId;
use stockrecon_inventory::Item;

use super::{ItemStore, StoreError};

const ITEMS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id              BIGINT PRIMARY KEY,
    name            TEXT NOT NULL,
    quantity        BIGINT NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    min_stock_level BIGINT NOT NULL DEFAULT 0,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `items` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(ITEMS_SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, quantity, min_stock_level, is_active, updated_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(item_from_row).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn compare_and_set_quantity(
        &self,
        id: ItemId,
        expected: i64,
        new: i64,
        at: DateTime<Utc>,
        require_active: bool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET quantity = $3, updated_at = $4
            WHERE id = $1 AND quantity = $2 AND (is_active OR NOT $5)
            "#,
        )
        .bind(id.get())
        .bind(expected)
        .bind(new)
        .bind(at)
        .bind(require_active)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("compare_and_set_quantity", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, quantity, min_stock_level, is_active, updated_at
            FROM items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(item_from_row).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}

fn item_from_row(row: &PgRow) -> Result<Item, StoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode", e);
    let id: i64 = row.try_get("id").map_err(decode)?;
    let name: String = row.try_get("name").map_err(decode)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode)?;
    let min_stock_level: i64 = row.try_get("min_stock_level").map_err(decode)?;
    let is_active: bool = row.try_get("is_active").map_err(decode)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(decode)?;

    Item::restore(
        ItemId::new(id),
        name,
        quantity,
        min_stock_level,
        is_active,
        updated_at,
    )
    .map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Query(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        _ => StoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}
