//! # Order Commands
//!
//! Checkout, client cancellation and admin status changes.
//!
//! ## Side Effects per Command
//! ```text
//! ┌──────────────────┬────────────────────┬───────────────┬───────────────┐
//! │ command          │ inventory          │ balance       │ persisted     │
//! ├──────────────────┼────────────────────┼───────────────┼───────────────┤
//! │ place_order      │ untouched          │ recomputed    │ order, client │
//! │ cancel_order     │ untouched          │ recomputed    │ order, client │
//! │ set_order_status │ commit / release   │ recomputed    │ products,     │
//! │                  │ (pair rule)        │               │ order, client │
//! └──────────────────┴────────────────────┴───────────────┴───────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::{Collections, PersistJob, Storefront};
use loom_core::ledger::apply_balance;
use loom_core::order::{self as core_order, CheckoutContext};
use loom_core::{CoreError, Order, OrderStatus};

/// Recomputes the owner's balance and queues the order and client writes.
pub(crate) fn order_jobs(data: &mut Collections, order: &Order) -> Vec<PersistJob> {
    let mut jobs = vec![PersistJob::UpsertOrder(order.clone())];
    match apply_balance(&mut data.clients, &order.client_id, &data.orders) {
        Some(client) => jobs.push(PersistJob::UpsertClient(client)),
        None => warn!(order_id = %order.id, client_id = %order.client_id, "Order owner is not a known client"),
    }
    jobs
}

/// Turns the client's cart into an ORDERED order and empties the cart.
///
/// ## Errors
/// - `NOT_FOUND` for an unknown client or a product that left the catalog
/// - `CART_ERROR` when the cart is empty (no order is created)
pub async fn place_order(sf: &Storefront, client_id: &str) -> ApiResult<Order> {
    debug!(client_id = %client_id, "place_order command");
    let ctx = CheckoutContext::new(sf.currency(), sf.discount(), Utc::now());

    let (order, jobs) = sf.with_data_and_cart(client_id, |data, cart| -> ApiResult<_> {
        let client = data
            .client(client_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Client", client_id))?;

        let order = core_order::checkout(cart, &data.products, &client, &ctx)?;
        data.orders.push(order.clone());
        cart.clear();

        let jobs = order_jobs(data, &order);
        Ok((order, jobs))
    })?;

    info!(
        order_id = %order.id,
        client_id = %client_id,
        total = %order.total_amount,
        lines = order.items.len(),
        "Order placed"
    );
    sf.persist(jobs).await;
    Ok(order)
}

/// Client self-service cancellation of their own ORDERED order.
///
/// ## Errors
/// - `NOT_FOUND` when the order does not exist or belongs to someone else
/// - `BUSINESS_LOGIC` when the order has moved past ORDERED
pub async fn cancel_order(sf: &Storefront, client_id: &str, order_id: &str) -> ApiResult<Order> {
    debug!(client_id = %client_id, order_id = %order_id, "cancel_order command");

    let (order, jobs) = sf.with_data(|data| -> ApiResult<_> {
        let order = data
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.client_id == client_id)
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        if !core_order::cancel_order(order, Utc::now()) {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id.clone(),
                current_status: order.status.to_string(),
            }
            .into());
        }

        let order = order.clone();
        let jobs = order_jobs(data, &order);
        Ok((order, jobs))
    })?;

    info!(order_id = %order_id, client_id = %client_id, "Order cancelled by client");
    sf.persist(jobs).await;
    Ok(order)
}

/// Admin status assignment. Any status may be set; inventory follows the
/// (previous, new) pair rule.
pub async fn set_order_status(sf: &Storefront, order_id: &str, status: OrderStatus) -> ApiResult<Order> {
    debug!(order_id = %order_id, status = %status, "set_order_status command");

    let (order, previous, jobs) = sf.with_data(|data| -> ApiResult<_> {
        let order = data
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        let previous = order.status;
        let change = core_order::set_status(order, status, &mut data.products, Utc::now());
        let order = order.clone();

        if !change.stock.missing.is_empty() {
            warn!(
                order_id = %order_id,
                missing = ?change.stock.missing,
                "Stock change skipped for products no longer in the catalog"
            );
        }

        let mut jobs: Vec<PersistJob> = data
            .products
            .iter()
            .filter(|p| change.stock.touched.contains(&p.id))
            .cloned()
            .map(PersistJob::UpsertProduct)
            .collect();
        jobs.extend(order_jobs(data, &order));
        Ok((order, previous, jobs))
    })?;

    info!(order_id = %order_id, from = %previous, to = %status, "Order status changed");
    sf.persist(jobs).await;
    Ok(order)
}

/// Orders newest first, optionally for one client only.
pub fn list_orders(sf: &Storefront, client_id: Option<&str>) -> Vec<Order> {
    debug!(client_id = ?client_id, "list_orders command");

    let mut orders: Vec<Order> = sf.with_data(|data| {
        data.orders
            .iter()
            .filter(|o| client_id.map_or(true, |id| o.client_id == id))
            .cloned()
            .collect()
    });
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

pub fn get_order(sf: &Storefront, order_id: &str) -> ApiResult<Order> {
    debug!(order_id = %order_id, "get_order command");
    sf.with_data(|data| data.orders.iter().find(|o| o.id == order_id).cloned())
        .ok_or_else(|| ApiError::not_found("Order", order_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_cart, get_cart};
    use crate::commands::payment::add_payment;
    use crate::commands::testing::{client, fabric, storefront_with};
    use crate::error::ErrorCode;
    use loom_core::PaymentMethod;
    use loom_core::payment::PaymentInput;
    use loom_core::Money;
    use loom_db::Store;

    #[tokio::test]
    async fn test_place_order_clears_cart_and_sets_balance() {
        let (sf, store) = storefront_with(vec![fabric("silk", 1000, 5)], vec![client("c1", "Aida")], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 8, false).unwrap();

        let order = place_order(&sf, "c1").await.unwrap();
        assert_eq!(order.status, OrderStatus::Ordered);
        assert_eq!(order.total_amount.cents(), 7910);
        assert_eq!(order.items[0].stock_qty, 5);
        assert_eq!(order.items[0].factory_qty, 3);
        assert!(get_cart(&sf, "c1").items.is_empty());

        // Checkout never touches inventory
        assert_eq!(sf.snapshot().products[0].available_qty, 5);

        sf.flush().await;
        assert_eq!(store.orders().await.unwrap().len(), 1);
        let clients = store.clients().await.unwrap();
        assert_eq!(clients[0].balance.cents(), -7910);
    }

    #[tokio::test]
    async fn test_place_order_with_empty_cart() {
        let (sf, _) = storefront_with(vec![], vec![client("c1", "Aida")], vec![]).await;

        let err = place_order(&sf, "c1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(sf.snapshot().orders.is_empty());
    }

    #[tokio::test]
    async fn test_client_cancel_only_while_ordered() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![client("c1", "Aida")], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 2, false).unwrap();
        let first = place_order(&sf, "c1").await.unwrap();
        add_to_cart(&sf, "c1", "silk", None, 2, false).unwrap();
        let second = place_order(&sf, "c1").await.unwrap();

        let cancelled = cancel_order(&sf, "c1", &first.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(sf.snapshot().products[0].available_qty, 5);

        set_order_status(&sf, &second.id, OrderStatus::Confirmed).await.unwrap();
        let err = cancel_order(&sf, "c1", &second.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let err = cancel_order(&sf, "someone-else", &second.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    /// $100 order confirmed, $40 paid, then cancelled by the admin.
    #[tokio::test]
    async fn test_confirm_pay_cancel_restores_stock_and_balance() {
        let (sf, store) = storefront_with(vec![fabric("silk", 1000, 10)], vec![client("c1", "Aida")], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 10, false).unwrap();
        let order = place_order(&sf, "c1").await.unwrap();
        assert_eq!(order.total_amount.cents(), 10000);

        set_order_status(&sf, &order.id, OrderStatus::Confirmed).await.unwrap();
        assert_eq!(sf.snapshot().products[0].available_qty, 0);

        add_payment(&sf, &order.id, PaymentInput::new(Money::from_cents(4000), PaymentMethod::Cash))
            .await
            .unwrap();
        assert_eq!(sf.snapshot().clients[0].balance.cents(), -6000);

        let cancelled = set_order_status(&sf, &order.id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(cancelled.paid_amount.cents(), 4000);

        let data = sf.snapshot();
        assert_eq!(data.products[0].available_qty, 10);
        assert!(data.clients[0].balance.is_zero());

        sf.flush().await;
        assert_eq!(store.products().await.unwrap()[0].available_qty, 10);
        assert!(store.clients().await.unwrap()[0].balance.is_zero());
    }

    #[tokio::test]
    async fn test_failed_writes_keep_local_state() {
        use crate::config::StorefrontConfig;
        use loom_db::MemoryStore;
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::with_data(
            vec![fabric("silk", 1000, 5)],
            vec![client("c1", "Aida")],
            vec![],
        ));
        let mut config = StorefrontConfig::default();
        config.persistence.max_retries = 1;
        config.persistence.initial_backoff_ms = 1;
        let sf = Storefront::load(store.clone(), config).await.unwrap();

        store.set_fail_writes(true);
        add_to_cart(&sf, "c1", "silk", None, 2, false).unwrap();
        let order = place_order(&sf, "c1").await.unwrap();
        sf.flush().await;

        // Order and client writes both gave up; nothing was rolled back
        assert_eq!(sf.failed_writes(), 2);
        assert_eq!(sf.snapshot().orders[0].id, order.id);
        assert!(store.orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_and_get_orders() {
        let (sf, _) = storefront_with(
            vec![fabric("silk", 1000, 5)],
            vec![client("c1", "Aida"), client("c2", "Bek")],
            vec![],
        )
        .await;
        add_to_cart(&sf, "c1", "silk", None, 1, false).unwrap();
        let order = place_order(&sf, "c1").await.unwrap();
        add_to_cart(&sf, "c2", "silk", None, 1, false).unwrap();
        place_order(&sf, "c2").await.unwrap();

        assert_eq!(list_orders(&sf, None).len(), 2);
        assert_eq!(list_orders(&sf, Some("c1")).len(), 1);
        assert_eq!(get_order(&sf, &order.id).unwrap().client_id, "c1");
        assert_eq!(get_order(&sf, "ORD-NOPE").unwrap_err().code, ErrorCode::NotFound);
    }
}
