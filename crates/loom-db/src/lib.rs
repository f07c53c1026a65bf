//! # loom-db: Storage Layer for Loom Wholesale
//!
//! Persistent storage for the storefront's collections: products, orders,
//! clients, expenses and search logs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Loom Data Flow                                   │
//! │                                                                         │
//! │  Storefront command (place_order, add_payment, ...)                    │
//! │       │  mutates in-memory state, queues a PersistJob                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     loom-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Store trait  │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Database ─────┼───►│ OrderRepo     │    │ 001_initial  │  │   │
//! │  │   │ MemoryStore   │    │ ProductRepo   │    │ _schema.sql  │  │   │
//! │  │   │               │    │ ClientRepo .. │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQLite repositories
//! - [`store`] - The `Store` trait and its SQLite implementation
//! - [`memory`] - In-memory `Store` for tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use loom_db::{Database, DbConfig, Store};
//!
//! let db = Database::new(DbConfig::new("loom.db")).await?;
//! let orders = db.orders().await?;   // via Store
//! db.upsert_order(&order).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use store::Store;

pub use repository::client::ClientRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::search_log::SearchLogRepository;
