//! # Storefront Commands
//!
//! Every operation a client or admin can trigger, as plain functions over a
//! shared [`Storefront`](crate::state::Storefront).
//!
//! ## Command Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  pub async fn some_command(sf: &Storefront, args..) -> ApiResult<T>    │
//! │                                                                         │
//! │   1. debug!(..)                          entry log with ids            │
//! │   2. sf.with_data(|data| { .. })         synchronous, lock held        │
//! │        loom_core does the work                                          │
//! │        returns (response, Vec<PersistJob>)                             │
//! │   3. sf.persist(jobs).await              lock released, queued         │
//! │   4. Ok(response)                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`cart`] - Cart lines, live quotes, reorder
//! - [`order`] - Checkout, cancellation, admin status changes
//! - [`payment`] - Payment proofs
//! - [`client`] - Client records, balances and statements
//! - [`catalog`] - Products, text search and expenses
//! - [`search`] - Photo search
//! - [`report`] - Dashboard and CSV exports

pub mod cart;
pub mod catalog;
pub mod client;
pub mod order;
pub mod payment;
pub mod report;
pub mod search;
