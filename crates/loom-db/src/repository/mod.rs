//! # Repository Module
//!
//! SQLite repositories, one per stored collection.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store::upsert_order(&order)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── list(&self)                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_client(&self, client_id)                                  │
//! │  └── upsert(&self, order)                                              │
//! │       │                                                                 │
//! │       │  OrderRow (FromRow)  ◄──►  loom_core::Order                    │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are read into flat `*Row` structs and converted with `TryFrom`, so a
//! bad enum or JSON value surfaces as [`DbError::InvalidData`] instead of a
//! panic. Lists come back in insertion order (`ORDER BY rowid`).
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog
//! - [`OrderRepository`](order::OrderRepository) - Orders with items and proofs
//! - [`ClientRepository`](client::ClientRepository) - Clients and balances
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Business expenses
//! - [`SearchLogRepository`](search_log::SearchLogRepository) - Search history

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{DbError, DbResult};

pub mod client;
pub mod expense;
pub mod order;
pub mod product;
pub mod search_log;

/// Parses a text-coded enum column.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> DbResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|e| DbError::invalid_data(column, e))
}
