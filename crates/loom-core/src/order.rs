//! # Order Engine
//!
//! Checkout and the order status state machine.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout ──► ORDERED ──► CONFIRMED ──► PRODUCTION ──► TRANSIT          │
//! │                  │   Commit ▲             ▲ Commit        │             │
//! │                  │          └─────────────┘               ▼             │
//! │                  │                                    WAREHOUSE         │
//! │                  │                                        │             │
//! │                  │                                        ▼             │
//! │                  │                              READY_FOR_DELIVERY      │
//! │                  │                                        │             │
//! │                  ▼                                        ▼             │
//! │              CANCELLED ◄──── Release ──── (any)      DELIVERED          │
//! │          (no effect from ORDERED)                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Admins may assign any status directly. The inventory effect depends only
//! on the (previous, new) pair, so it is applied at most once per crossing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::fulfillment::resolve_for_product;
use crate::inventory::{apply_stock_effect, StockEffect, StockOutcome};
use crate::money::Money;
use crate::types::{Client, DiscountRate, Order, OrderItem, OrderStatus, Product};
use crate::DEFAULT_CURRENCY;

/// Prefix of every order id.
pub const ORDER_ID_PREFIX: &str = "ORD-";

/// Generates `ORD-` followed by 9 uppercase alphanumerics.
pub fn generate_order_id() -> String {
    let random = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", ORDER_ID_PREFIX, &random[..9])
}

// =============================================================================
// Checkout
// =============================================================================

/// Everything checkout needs besides the cart, catalog and client.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub order_id: String,
    pub currency: String,
    pub discount: DiscountRate,
    pub now: DateTime<Utc>,
}

impl CheckoutContext {
    pub fn new(currency: impl Into<String>, discount: DiscountRate, now: DateTime<Utc>) -> Self {
        Self {
            order_id: generate_order_id(),
            currency: currency.into(),
            discount,
            now,
        }
    }
}

impl Default for CheckoutContext {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY, DiscountRate::FACTORY_DEFAULT, Utc::now())
    }
}

/// Turns a cart into an ORDERED order.
///
/// Each line is resolved against the catalog as it is now and stamped with a
/// full product snapshot. Inventory is not touched; stock is committed when
/// the order is confirmed.
///
/// ## Errors
/// - `EmptyCart` if there is nothing to order
/// - `ProductNotFound` if a line's product left the catalog
pub fn checkout(cart: &Cart, catalog: &[Product], client: &Client, ctx: &CheckoutContext) -> CoreResult<Order> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut items = Vec::with_capacity(cart.items().len());
    let mut total = Money::zero();

    for line in cart.items() {
        let product = catalog
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        let split = resolve_for_product(
            product,
            line.variant_id.as_deref(),
            line.quantity,
            line.force_factory,
            ctx.discount,
        );
        total += split.total_cost;

        items.push(OrderItem {
            product_id: line.product_id.clone(),
            variant_id: line.variant_id.clone(),
            quantity: line.quantity,
            force_factory: line.force_factory,
            stock_qty: split.stock_qty,
            factory_qty: split.factory_qty,
            product_snapshot: Some(product.clone()),
        });
    }

    Ok(Order {
        id: ctx.order_id.clone(),
        client_id: client.id.clone(),
        telegram_id: client.telegram_id.clone(),
        username: client.username.clone(),
        client_brand: client.brand.clone(),
        client_phone: client.phone.clone(),
        status: OrderStatus::Ordered,
        items,
        total_amount: total,
        paid_amount: Money::zero(),
        currency: ctx.currency.clone(),
        created_at: ctx.now,
        status_updated_at: ctx.now,
        payment_proofs: Vec::new(),
    })
}

// =============================================================================
// Status Transitions
// =============================================================================

/// Inventory effect of moving an order from `previous` to `new`.
///
/// | previous                | new                     | effect  |
/// |-------------------------|-------------------------|---------|
/// | ORDERED                 | CONFIRMED, PRODUCTION   | Commit  |
/// | not ORDERED/CANCELLED   | CANCELLED               | Release |
/// | anything else           |                         | None    |
pub fn stock_effect(previous: OrderStatus, new: OrderStatus) -> StockEffect {
    use OrderStatus::*;

    match (previous, new) {
        (Ordered, Confirmed | Production) => StockEffect::Commit,
        (Ordered | Cancelled, Cancelled) => StockEffect::None,
        (_, Cancelled) => StockEffect::Release,
        _ => StockEffect::None,
    }
}

/// Client self-service cancellation. Only allowed while ORDERED.
///
/// Nothing was committed yet, so inventory is untouched. Returns false and
/// leaves the order alone in any other status.
pub fn cancel_order(order: &mut Order, now: DateTime<Utc>) -> bool {
    if order.status != OrderStatus::Ordered {
        return false;
    }

    order.status = OrderStatus::Cancelled;
    order.status_updated_at = now;
    true
}

/// Result of an admin status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub effect: StockEffect,
    pub stock: StockOutcome,
}

/// Admin status assignment. Any target is allowed; inventory follows
/// [`stock_effect`] for the (previous, new) pair.
pub fn set_status(
    order: &mut Order,
    new_status: OrderStatus,
    products: &mut [Product],
    now: DateTime<Utc>,
) -> StatusChange {
    let effect = stock_effect(order.status, new_status);
    let stock = apply_stock_effect(products, &order.items, effect);

    order.status = new_status;
    order.status_updated_at = now;
    StatusChange { effect, stock }
}

// =============================================================================
// Unit Tests
// =============================================================================
