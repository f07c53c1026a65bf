//! # Cart Commands
//!
//! Client cart manipulation. Carts live in memory only and are priced live
//! against the current catalog on every read.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                        │
//! │  │  Empty   │────►│ In Cart  │────►│  Order   │                        │
//! │  │  Cart    │     │ (quoted) │     │ ORDERED  │                        │
//! │  └──────────┘     └──────────┘     └──────────┘                        │
//! │       ▲                │                │                               │
//! │       │           add_to_cart      place_order                         │
//! │       │           update_cart_item  (order.rs)                         │
//! │       │           remove_from_cart                                      │
//! │       │                │                                                │
//! │       └──── clear_cart ┘        reorder: old order ──► cart            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::{Collections, Storefront};
use loom_core::cart::{self as core_cart, Cart, CartQuote};
use loom_core::{CartItem, DiscountRate};

/// Cart lines plus their live quote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub quote: CartQuote,
}

impl CartResponse {
    fn build(cart: &Cart, data: &Collections, discount: DiscountRate) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            quote: core_cart::quote(cart, &data.products, discount),
        }
    }
}

/// Gets the client's cart with a fresh quote.
pub fn get_cart(sf: &Storefront, client_id: &str) -> CartResponse {
    debug!(client_id = %client_id, "get_cart command");
    let discount = sf.discount();
    sf.with_data_and_cart(client_id, |data, cart| CartResponse::build(cart, data, discount))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Same product and variant already in cart: quantities merge
/// - MOQ, variant and factory MOQ rules are checked before anything changes
pub fn add_to_cart(
    sf: &Storefront,
    client_id: &str,
    product_id: &str,
    variant_id: Option<&str>,
    quantity: i64,
    force_factory: bool,
) -> ApiResult<CartResponse> {
    debug!(
        client_id = %client_id,
        product_id = %product_id,
        quantity = %quantity,
        force_factory,
        "add_to_cart command"
    );
    let discount = sf.discount();

    sf.with_data_and_cart(client_id, |data, cart| -> ApiResult<CartResponse> {
        let product = data
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| ApiError::not_found("Product", product_id))?;

        cart.add_item(product, variant_id, quantity, force_factory, discount)?;
        Ok(CartResponse::build(cart, data, discount))
    })
}

/// Sets a line's quantity. Zero removes the line.
///
/// The new quantity is held to the same MOQ rules as [`add_to_cart`].
pub fn update_cart_item(
    sf: &Storefront,
    client_id: &str,
    product_id: &str,
    variant_id: Option<&str>,
    quantity: i64,
) -> ApiResult<CartResponse> {
    debug!(client_id = %client_id, product_id = %product_id, quantity = %quantity, "update_cart_item command");
    let discount = sf.discount();

    sf.with_data_and_cart(client_id, |data, cart| -> ApiResult<CartResponse> {
        let found = if quantity <= 0 {
            cart.remove_item(product_id, variant_id)
        } else {
            let product = data
                .products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| ApiError::not_found("Product", product_id))?;
            cart.update_quantity(product, variant_id, quantity, discount)?
        };

        if !found {
            return Err(ApiError::cart(format!("Product {} is not in the cart", product_id)));
        }
        Ok(CartResponse::build(cart, data, discount))
    })
}

pub fn remove_from_cart(
    sf: &Storefront,
    client_id: &str,
    product_id: &str,
    variant_id: Option<&str>,
) -> ApiResult<CartResponse> {
    debug!(client_id = %client_id, product_id = %product_id, "remove_from_cart command");
    let discount = sf.discount();

    sf.with_data_and_cart(client_id, |data, cart| {
        if !cart.remove_item(product_id, variant_id) {
            return Err(ApiError::cart(format!("Product {} is not in the cart", product_id)));
        }
        Ok(CartResponse::build(cart, data, discount))
    })
}

pub fn clear_cart(sf: &Storefront, client_id: &str) -> CartResponse {
    debug!(client_id = %client_id, "clear_cart command");
    let discount = sf.discount();

    sf.with_data_and_cart(client_id, |data, cart| {
        cart.clear();
        CartResponse::build(cart, data, discount)
    })
}

/// Copies one of the client's past orders back into their cart.
///
/// Lines whose product left the catalog are skipped silently.
pub fn reorder(sf: &Storefront, client_id: &str, order_id: &str) -> ApiResult<CartResponse> {
    debug!(client_id = %client_id, order_id = %order_id, "reorder command");
    let discount = sf.discount();

    sf.with_data_and_cart(client_id, |data, cart| -> ApiResult<CartResponse> {
        let order = data
            .orders
            .iter()
            .find(|o| o.id == order_id && o.client_id == client_id)
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        let added = core_cart::reorder(cart, order, &data.products);
        debug!(order_id = %order_id, lines = added, "Order lines copied to cart");
        Ok(CartResponse::build(cart, data, discount))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{client, fabric, storefront_with};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_quotes_split() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![client("c1", "Aida")], vec![]).await;

        let cart = add_to_cart(&sf, "c1", "silk", None, 8, false).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.quote.stock_qty, 5);
        assert_eq!(cart.quote.factory_qty, 3);
        assert_eq!(cart.quote.total.cents(), 7910);
        assert_eq!(cart.quote.savings.cents(), 90);
    }

    #[tokio::test]
    async fn test_forced_factory_line() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5)], vec![], vec![]).await;

        let cart = add_to_cart(&sf, "c1", "silk", None, 8, true).unwrap();
        assert_eq!(cart.quote.stock_qty, 0);
        assert_eq!(cart.quote.factory_qty, 8);
        assert_eq!(cart.quote.total.cents(), 7760);
        assert_eq!(cart.quote.savings.cents(), 240);
    }

    #[tokio::test]
    async fn test_add_rejects_below_moq_and_unknown_product() {
        let mut silk = fabric("silk", 1000, 50);
        silk.moq = 10;
        let (sf, _) = storefront_with(vec![silk], vec![], vec![]).await;

        let err = add_to_cart(&sf, "c1", "silk", None, 3, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&sf, "c1").items.is_empty());

        let err = add_to_cart(&sf, "c1", "ghost", None, 3, false).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_update_remove_clear() {
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 5), fabric("linen", 500, 0)], vec![], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 2, false).unwrap();
        add_to_cart(&sf, "c1", "linen", None, 4, false).unwrap();

        let cart = update_cart_item(&sf, "c1", "silk", None, 3).unwrap();
        assert_eq!(cart.items[0].quantity, 3);

        let cart = remove_from_cart(&sf, "c1", "linen", None).unwrap();
        assert_eq!(cart.items.len(), 1);

        let err = remove_from_cart(&sf, "c1", "linen", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        assert!(clear_cart(&sf, "c1").items.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_bad_quantities() {
        let mut silk = fabric("silk", 1000, 50);
        silk.moq = 10;
        let (sf, _) = storefront_with(vec![silk], vec![], vec![]).await;
        add_to_cart(&sf, "c1", "silk", None, 10, false).unwrap();

        let err = update_cart_item(&sf, "c1", "silk", None, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = update_cart_item(&sf, "c1", "silk", None, i64::MAX / 100).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Cart is untouched and still usable
        let cart = get_cart(&sf, "c1");
        assert_eq!(cart.items[0].quantity, 10);
        assert_eq!(cart.quote.total.cents(), 10_000);

        let err = update_cart_item(&sf, "c1", "ghost", None, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(update_cart_item(&sf, "c1", "silk", None, 0).unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_reorder_unknown_order() {
        let (sf, _) = storefront_with(vec![], vec![], vec![]).await;
        let err = reorder(&sf, "c1", "ORD-NOPE").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
