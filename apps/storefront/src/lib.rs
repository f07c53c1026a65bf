//! # Loom Storefront Library
//!
//! Session layer of the wholesale storefront: configuration, in-memory
//! state, command functions and the background persistence worker.
//!
//! ## Module Organization
//! ```text
//! loom_storefront/
//! ├── lib.rs          ◄─── You are here (tracing, startup helpers)
//! ├── main.rs         ◄─── Report exporter CLI
//! ├── config.rs       ◄─── storefront.toml + LOOM_* overrides
//! ├── error.rs        ◄─── ApiError returned by commands
//! ├── classifier.rs   ◄─── VisualClassifier boundary
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Storefront (collections + locks)
//! │   ├── carts.rs    ◄─── Per-client carts
//! │   └── persist.rs  ◄─── Persister (queue, retry, backoff)
//! └── commands/
//!     ├── cart.rs     ◄─── Cart lines, quotes, reorder
//!     ├── order.rs    ◄─── Checkout, cancel, status changes
//!     ├── payment.rs  ◄─── Payment proofs
//!     ├── client.rs   ◄─── Clients, balances, statements
//!     ├── catalog.rs  ◄─── Products, text search, expenses
//!     ├── search.rs   ◄─── Photo search
//!     └── report.rs   ◄─── Dashboard, CSV exports
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()              RUST_LOG or "info,loom=debug,sqlx=warn"│
//! │  2. StorefrontConfig::load()    defaults ► toml ► LOOM_* ► validate    │
//! │  3. open_storefront(&config)    SQLite pool, migrations                │
//! │       Storefront::load(store)   collections in memory, worker spawned  │
//! │  4. commands::*(&storefront)    ...                                     │
//! │  5. storefront.flush().await    drain pending writes before exit       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod classifier;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use classifier::{FixedClassifier, VisualClassifier};
pub use config::{ConfigError, StorefrontConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{PersistJob, Storefront};

use loom_db::{Database, DbConfig, DbError, DbResult};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=loom=trace` - Show trace for loom crates only
/// - Default: INFO, debug for loom crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,loom=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured SQLite database and loads a storefront over it.
pub async fn open_storefront(config: StorefrontConfig) -> DbResult<Storefront> {
    let db_path = config.database_path();
    info!(?db_path, "Opening database");

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
    }

    let db = Database::new(DbConfig::new(db_path).max_connections(config.database.max_connections)).await?;
    Storefront::load(Arc::new(db), config).await
}
