//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Row Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                                                                 │
//! │  ├── scalar columns   id, client_id, status, total/paid cents, dates   │
//! │  ├── items            JSON [OrderItem { .., productSnapshot }]          │
//! │  └── payment_proofs   JSON [PaymentProof]                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole order is rewritten on every upsert. Items and proofs are small
//! and always change together with the totals they feed.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_column;
use loom_core::{Money, Order};

/// Flat `orders` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    client_id: String,
    telegram_id: String,
    username: String,
    client_brand: String,
    client_phone: String,
    status: String,
    items: String,
    total_amount_cents: i64,
    paid_amount_cents: i64,
    currency: String,
    created_at: DateTime<Utc>,
    status_updated_at: DateTime<Utc>,
    payment_proofs: String,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        Ok(Order {
            status: parse_column("status", &row.status)?,
            items: serde_json::from_str(&row.items).map_err(|e| DbError::invalid_data("items", e))?,
            payment_proofs: serde_json::from_str(&row.payment_proofs)
                .map_err(|e| DbError::invalid_data("payment_proofs", e))?,
            id: row.id,
            client_id: row.client_id,
            telegram_id: row.telegram_id,
            username: row.username,
            client_brand: row.client_brand,
            client_phone: row.client_phone,
            total_amount: Money::from_cents(row.total_amount_cents),
            paid_amount: Money::from_cents(row.paid_amount_cents),
            currency: row.currency,
            created_at: row.created_at,
            status_updated_at: row.status_updated_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT
        id, client_id, telegram_id, username, client_brand, client_phone,
        status, items, total_amount_cents, paid_amount_cents, currency,
        created_at, status_updated_at, payment_proofs
    FROM orders
"#;

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists every order in insertion order, cancelled ones included.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded orders");
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lists one client's orders, oldest first.
    pub async fn list_by_client(&self, client_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{SELECT_ORDER} WHERE client_id = ?1 ORDER BY created_at, rowid"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Inserts the order or replaces every column of the existing row.
    pub async fn upsert(&self, order: &Order) -> DbResult<()> {
        debug!(
            order_id = %order.id,
            status = %order.status,
            proofs = order.payment_proofs.len(),
            "Upserting order"
        );

        let items = serde_json::to_string(&order.items)?;
        let proofs = serde_json::to_string(&order.payment_proofs)?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, client_id, telegram_id, username, client_brand, client_phone,
                status, items, total_amount_cents, paid_amount_cents, currency,
                created_at, status_updated_at, payment_proofs
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14
            )
            ON CONFLICT(id) DO UPDATE SET
                client_id = excluded.client_id,
                telegram_id = excluded.telegram_id,
                username = excluded.username,
                client_brand = excluded.client_brand,
                client_phone = excluded.client_phone,
                status = excluded.status,
                items = excluded.items,
                total_amount_cents = excluded.total_amount_cents,
                paid_amount_cents = excluded.paid_amount_cents,
                currency = excluded.currency,
                created_at = excluded.created_at,
                status_updated_at = excluded.status_updated_at,
                payment_proofs = excluded.payment_proofs
            "#,
        )
        .bind(&order.id)
        .bind(&order.client_id)
        .bind(&order.telegram_id)
        .bind(&order.username)
        .bind(&order.client_brand)
        .bind(&order.client_phone)
        .bind(order.status.as_str())
        .bind(items)
        .bind(order.total_amount.cents())
        .bind(order.paid_amount.cents())
        .bind(&order.currency)
        .bind(order.created_at)
        .bind(order.status_updated_at)
        .bind(proofs)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
