//! # In-Memory Store
//!
//! A [`Store`] backed by plain vectors, for tests and demos.
//!
//! Writes can be made to fail, either permanently ([`MemoryStore::set_fail_writes`])
//! or for the next N attempts ([`MemoryStore::fail_next_writes`]), to exercise
//! the storefront's retry path. Every write attempt is counted, failed or not.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::Store;
use loom_core::{Client, Expense, Order, Product, SearchLog};

#[derive(Debug, Default)]
struct Tables {
    products: Vec<Product>,
    orders: Vec<Order>,
    clients: Vec<Client>,
    expenses: Vec<Expense>,
    search_logs: Vec<SearchLog>,
}

/// Vector-backed store. Lists come back in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
    failures_left: AtomicUsize,
    write_attempts: AtomicUsize,
}

/// Replaces the record with the same id, or appends it.
fn upsert_by<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with the given records.
    pub fn with_data(products: Vec<Product>, clients: Vec<Client>, orders: Vec<Order>) -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().expect("Store mutex poisoned");
            tables.products = products;
            tables.clients = clients;
            tables.orders = orders;
        }
        store
    }

    /// Makes every following write fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `count` writes fail, then succeed again.
    pub fn fail_next_writes(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Number of write calls seen so far, including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn check_write(&self, what: &str) -> DbResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::WriteRejected(format!("{what}: store is failing writes")));
        }

        let consumed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            debug!(what, "Injected write failure");
            return Err(DbError::WriteRejected(format!("{what}: injected failure")));
        }

        Ok(())
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("Store mutex poisoned");
        f(&mut tables)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn products(&self) -> DbResult<Vec<Product>> {
        Ok(self.with_tables(|t| t.products.clone()))
    }

    async fn orders(&self) -> DbResult<Vec<Order>> {
        Ok(self.with_tables(|t| t.orders.clone()))
    }

    async fn clients(&self) -> DbResult<Vec<Client>> {
        Ok(self.with_tables(|t| t.clients.clone()))
    }

    async fn expenses(&self) -> DbResult<Vec<Expense>> {
        Ok(self.with_tables(|t| t.expenses.clone()))
    }

    async fn search_logs(&self) -> DbResult<Vec<SearchLog>> {
        Ok(self.with_tables(|t| t.search_logs.clone()))
    }

    async fn upsert_product(&self, product: &Product) -> DbResult<()> {
        self.check_write("product")?;
        self.with_tables(|t| upsert_by(&mut t.products, product, |p| p.id == product.id));
        Ok(())
    }

    async fn upsert_order(&self, order: &Order) -> DbResult<()> {
        self.check_write("order")?;
        self.with_tables(|t| upsert_by(&mut t.orders, order, |o| o.id == order.id));
        Ok(())
    }

    async fn upsert_client(&self, client: &Client) -> DbResult<()> {
        self.check_write("client")?;
        self.with_tables(|t| upsert_by(&mut t.clients, client, |c| c.id == client.id));
        Ok(())
    }

    async fn create_expense(&self, expense: &Expense) -> DbResult<()> {
        self.check_write("expense")?;
        self.with_tables(|t| {
            if t.expenses.iter().any(|e| e.id == expense.id) {
                return Err(DbError::duplicate("expenses.id", &expense.id));
            }
            t.expenses.push(expense.clone());
            Ok(())
        })
    }

    async fn create_search_log(&self, log: &SearchLog) -> DbResult<()> {
        self.check_write("search log")?;
        self.with_tables(|t| t.search_logs.push(log.clone()));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::{Money, Role};

    fn client(id: &str, cents: i64) -> Client {
        Client {
            id: id.to_string(),
            telegram_id: String::new(),
            username: String::new(),
            name: id.to_string(),
            brand: String::new(),
            phone: String::new(),
            role: Role::User,
            balance: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = MemoryStore::new();
        store.upsert_client(&client("a", 0)).await.unwrap();
        store.upsert_client(&client("b", 0)).await.unwrap();
        store.upsert_client(&client("a", -500)).await.unwrap();

        let clients = store.clients().await.unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].balance.cents(), -500);
        assert_eq!(store.write_attempts(), 3);
    }

    #[tokio::test]
    async fn test_fail_writes_switch() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);

        let err = store.upsert_client(&client("a", 0)).await.unwrap_err();
        assert!(matches!(err, DbError::WriteRejected(_)));
        assert!(store.clients().await.unwrap().is_empty());

        store.set_fail_writes(false);
        store.upsert_client(&client("a", 0)).await.unwrap();
        assert_eq!(store.clients().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_writes_counts_down() {
        let store = MemoryStore::new();
        store.fail_next_writes(2);

        assert!(store.upsert_client(&client("a", 0)).await.is_err());
        assert!(store.upsert_client(&client("a", 0)).await.is_err());
        assert!(store.upsert_client(&client("a", 0)).await.is_ok());
        assert_eq!(store.write_attempts(), 3);
    }
}
