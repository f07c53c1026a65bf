//! # State Module
//!
//! In-memory session state for the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Storefront                                                            │
//! │  ├── config      StorefrontConfig (read-only after load)               │
//! │  ├── data        Mutex<Collections>   products, orders, clients,       │
//! │  │                                    expenses, search logs            │
//! │  ├── carts       CartState            Mutex<HashMap<client, Cart>>     │
//! │  └── persister   Persister            mpsc ──► worker ──► Store        │
//! │                                                                         │
//! │  LOCK ORDER: data before carts. Neither lock is held across .await.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod carts;
mod persist;
mod session;

pub use carts::CartState;
pub use persist::{PersistJob, Persister};
pub use session::{Collections, Storefront, MAX_SEARCH_LOGS};
