//! # Client Repository
//!
//! Database operations for clients. The stored balance is a cache of the
//! value replayed from orders; the storefront rewrites it after every order
//! or payment change.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_column;
use loom_core::{Client, Money};

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: String,
    telegram_id: String,
    username: String,
    name: String,
    brand: String,
    phone: String,
    role: String,
    balance_cents: i64,
}

impl TryFrom<ClientRow> for Client {
    type Error = DbError;

    fn try_from(row: ClientRow) -> DbResult<Self> {
        Ok(Client {
            role: parse_column("role", &row.role)?,
            id: row.id,
            telegram_id: row.telegram_id,
            username: row.username,
            name: row.name,
            brand: row.brand,
            phone: row.phone,
            balance: Money::from_cents(row.balance_cents),
        })
    }
}

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    /// Creates a new ClientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists all clients in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Client>> {
        let rows: Vec<ClientRow> = sqlx::query_as(
            r#"
            SELECT id, telegram_id, username, name, brand, phone, role, balance_cents
            FROM clients
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded clients");
        rows.into_iter().map(Client::try_from).collect()
    }

    /// Gets a client by ID, failing with `NotFound` when absent.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Client> {
        let row: Option<ClientRow> = sqlx::query_as(
            r#"
            SELECT id, telegram_id, username, name, brand, phone, role, balance_cents
            FROM clients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DbError::not_found("Client", id))?
            .try_into()
    }

    /// Inserts the client or replaces the existing row.
    pub async fn upsert(&self, client: &Client) -> DbResult<()> {
        debug!(client_id = %client.id, balance = %client.balance, "Upserting client");

        sqlx::query(
            r#"
            INSERT INTO clients (id, telegram_id, username, name, brand, phone, role, balance_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                telegram_id = excluded.telegram_id,
                username = excluded.username,
                name = excluded.name,
                brand = excluded.brand,
                phone = excluded.phone,
                role = excluded.role,
                balance_cents = excluded.balance_cents
            "#,
        )
        .bind(&client.id)
        .bind(&client.telegram_id)
        .bind(&client.username)
        .bind(&client.name)
        .bind(&client.brand)
        .bind(&client.phone)
        .bind(client.role.as_str())
        .bind(client.balance.cents())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
