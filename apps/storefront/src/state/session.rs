//! # Storefront Session
//!
//! The loaded collections plus everything commands need to act on them.
//!
//! Every mutation is a short read-modify-write under the data mutex,
//! followed by queued [`PersistJob`]s once the lock is released.

use std::sync::{Arc, Mutex};

use tracing::info;

use super::carts::CartState;
use super::persist::{PersistJob, Persister};
use crate::config::StorefrontConfig;
use loom_core::cart::Cart;
use loom_core::{Client, DiscountRate, Expense, Order, Product, SearchLog};
use loom_db::{DbResult, Store};

/// Search logs kept in memory, newest first. The store keeps all of them.
pub const MAX_SEARCH_LOGS: usize = 100;

/// In-memory copy of everything the store holds, except that search logs
/// are capped at [`MAX_SEARCH_LOGS`].
#[derive(Debug, Clone, Default)]
pub struct Collections {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub clients: Vec<Client>,
    pub expenses: Vec<Expense>,
    pub search_logs: Vec<SearchLog>,
}

impl Collections {
    pub fn client(&self, client_id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == client_id)
    }

    pub fn order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == order_id)
    }
}

/// Shared storefront state.
pub struct Storefront {
    config: StorefrontConfig,
    data: Mutex<Collections>,
    carts: CartState,
    persister: Persister,
}

impl Storefront {
    /// Loads every collection from the store and starts the persistence
    /// worker on the same store.
    pub async fn load(store: Arc<dyn Store>, config: StorefrontConfig) -> DbResult<Self> {
        let (products, orders, clients, expenses, mut search_logs) = tokio::try_join!(
            store.products(),
            store.orders(),
            store.clients(),
            store.expenses(),
            store.search_logs(),
        )?;

        search_logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        search_logs.truncate(MAX_SEARCH_LOGS);

        info!(
            products = products.len(),
            orders = orders.len(),
            clients = clients.len(),
            "Storefront data loaded"
        );

        let persister = Persister::spawn(store, &config.persistence);

        Ok(Self {
            config,
            data: Mutex::new(Collections {
                products,
                orders,
                clients,
                expenses,
                search_logs,
            }),
            carts: CartState::new(),
            persister,
        })
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn discount(&self) -> DiscountRate {
        self.config.discount()
    }

    pub fn currency(&self) -> &str {
        &self.config.store.currency
    }

    pub fn carts(&self) -> &CartState {
        &self.carts
    }

    /// Runs `f` with the data lock held. Never await inside `f`.
    pub fn with_data<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Collections) -> R,
    {
        let mut data = self.data.lock().expect("Storefront data mutex poisoned");
        f(&mut *data)
    }

    /// Runs `f` with both the data and the client's cart locked, in that order.
    pub fn with_data_and_cart<F, R>(&self, client_id: &str, f: F) -> R
    where
        F: FnOnce(&mut Collections, &mut Cart) -> R,
    {
        let mut data = self.data.lock().expect("Storefront data mutex poisoned");
        self.carts.with_cart_mut(client_id, |cart| f(&mut *data, cart))
    }

    /// Clone of the current collections, for reports.
    pub fn snapshot(&self) -> Collections {
        self.with_data(|data| data.clone())
    }

    pub async fn persist(&self, jobs: Vec<PersistJob>) {
        self.persister.enqueue_all(jobs).await;
    }

    /// Waits until every queued write has been attempted.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Jobs dropped after exhausting their retries.
    pub fn failed_writes(&self) -> usize {
        self.persister.failed_writes()
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("store", &self.config.store.name)
            .field("active_carts", &self.carts.active_carts())
            .finish_non_exhaustive()
    }
}
