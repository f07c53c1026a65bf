//! # loom-core: Pure Business Logic for Loom Wholesale
//!
//! This crate is the **heart** of the wholesale storefront. It contains the
//! pricing, fulfillment, ledger and reporting logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Loom Wholesale Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (apps/storefront)                 │   │
//! │  │   add_to_cart ──► checkout ──► set_order_status ──► export     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ loom-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  fulfillment ─► cart ─► order ─► inventory                      │   │
//! │  │                           │                                     │   │
//! │  │                 payment ──┴──► ledger ─► report ─► export       │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    loom-db (Storage Layer)                      │   │
//! │  │           Store trait, SQLite repositories, MemoryStore         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, PaymentProof, Client, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`fulfillment`] - Stock/factory split and blended pricing
//! - [`inventory`] - Available/reserved counters and stock effects
//! - [`order`] - Checkout and the order status state machine
//! - [`cart`] - Cart construction, reorder and live quotes
//! - [`payment`] - Payment proofs and paid totals
//! - [`ledger`] - Client balances and statement rows
//! - [`report`] - Dashboard figures and report row sets
//! - [`export`] - Localized CSV formatting
//! - [`search`] - Catalog filter and visual match ranking
//!
//! ## Example Usage
//!
//! ```rust
//! use loom_core::fulfillment::resolve;
//! use loom_core::money::Money;
//! use loom_core::types::DiscountRate;
//!
//! // 8 metres at $10.00 with 5 on hand
//! let split = resolve(8, 5, false, Money::from_cents(1000), DiscountRate::FACTORY_DEFAULT);
//!
//! assert_eq!(split.stock_qty, 5);
//! assert_eq!(split.factory_qty, 3);
//! assert_eq!(split.total_cost.cents(), 7910); // $79.10
//! assert_eq!(split.savings.cents(), 90);      // $0.90
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod export;
pub mod fulfillment;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod order;
pub mod payment;
pub mod report;
pub mod search;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use loom_core::Money` instead of
// `use loom_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency stamped on orders when the store does not configure one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps order documents a reasonable size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Wholesale lines are large (metres of fabric), but a 7-digit quantity is
/// almost always a typo.
pub const MAX_ITEM_QUANTITY: i64 = 1_000_000;
