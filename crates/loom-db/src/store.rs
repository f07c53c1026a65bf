//! # Store Trait
//!
//! The storage seam used by the storefront. Everything above this trait
//! works on whole collections and whole records; nothing above it knows
//! about SQL.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront (startup load)     Persister (background writes)           │
//! │          │                              │                               │
//! │          └──────────────┬───────────────┘                               │
//! │                         ▼                                               │
//! │              Arc<dyn Store>                                             │
//! │               ├── Database     (SQLite, production)                     │
//! │               └── MemoryStore  (tests, can be told to fail writes)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::DbResult;
use crate::pool::Database;
use loom_core::{Client, Expense, Order, Product, SearchLog};

/// Generic upsert/query store for the storefront's collections.
#[async_trait]
pub trait Store: Send + Sync {
    async fn products(&self) -> DbResult<Vec<Product>>;

    async fn orders(&self) -> DbResult<Vec<Order>>;

    async fn clients(&self) -> DbResult<Vec<Client>>;

    async fn expenses(&self) -> DbResult<Vec<Expense>>;

    async fn search_logs(&self) -> DbResult<Vec<SearchLog>>;

    async fn upsert_product(&self, product: &Product) -> DbResult<()>;

    async fn upsert_order(&self, order: &Order) -> DbResult<()>;

    async fn upsert_client(&self, client: &Client) -> DbResult<()>;

    async fn create_expense(&self, expense: &Expense) -> DbResult<()>;

    async fn create_search_log(&self, log: &SearchLog) -> DbResult<()>;
}

#[async_trait]
impl Store for Database {
    async fn products(&self) -> DbResult<Vec<Product>> {
        Database::products(self).list().await
    }

    async fn orders(&self) -> DbResult<Vec<Order>> {
        Database::orders(self).list().await
    }

    async fn clients(&self) -> DbResult<Vec<Client>> {
        Database::clients(self).list().await
    }

    async fn expenses(&self) -> DbResult<Vec<Expense>> {
        Database::expenses(self).list().await
    }

    async fn search_logs(&self) -> DbResult<Vec<SearchLog>> {
        Database::search_logs(self).list().await
    }

    async fn upsert_product(&self, product: &Product) -> DbResult<()> {
        Database::products(self).upsert(product).await
    }

    async fn upsert_order(&self, order: &Order) -> DbResult<()> {
        Database::orders(self).upsert(order).await
    }

    async fn upsert_client(&self, client: &Client) -> DbResult<()> {
        Database::clients(self).upsert(client).await
    }

    async fn create_expense(&self, expense: &Expense) -> DbResult<()> {
        Database::expenses(self).insert(expense).await
    }

    async fn create_search_log(&self, log: &SearchLog) -> DbResult<()> {
        Database::search_logs(self).insert(log).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pool::DbConfig;
    use loom_core::{Money, Role};

    #[tokio::test]
    async fn test_database_behind_trait_object() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn Store> = Arc::new(db);

        let client = Client {
            id: "c1".to_string(),
            telegram_id: "1".to_string(),
            username: "@aida".to_string(),
            name: "Aida".to_string(),
            brand: "Aida Couture".to_string(),
            phone: String::new(),
            role: Role::Manager,
            balance: Money::from_cents(250),
        };
        store.upsert_client(&client).await.unwrap();

        assert_eq!(store.clients().await.unwrap(), vec![client]);
        assert!(store.orders().await.unwrap().is_empty());
        assert!(store.products().await.unwrap().is_empty());
    }
}
