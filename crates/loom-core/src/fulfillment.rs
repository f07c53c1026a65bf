//! # Fulfillment Resolver
//!
//! Decides how much of a line is served from on-hand stock and how much is
//! backordered from the factory, and prices the blend.
//!
//! ## The Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  requested 8 m, 5 m sellable, $10.00/m, factory discount 3%            │
//! │                                                                         │
//! │   ┌──────────── stock ────────────┐┌──── factory ────┐                 │
//! │   │  5 × $10.00        = $50.00   ││ 3 × $10.00 = $30│                 │
//! │   │                               ││ − 3%  = $29.10  │                 │
//! │   └───────────────────────────────┘└─────────────────┘                 │
//! │                                                                         │
//! │   total   = $79.10                                                      │
//! │   savings = 8 × $10.00 − $79.10 = $0.90                                 │
//! │                                                                         │
//! │   force_factory: everything goes right, stock is never touched         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same function runs at checkout (where the result is snapshotted onto
//! the order item) and for live cart quotes (recomputed on every render).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountRate, Product};

// =============================================================================
// Fulfillment
// =============================================================================

/// Result of splitting one line between stock and factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Fulfillment {
    pub stock_qty: i64,
    pub factory_qty: i64,
    pub stock_cost: Money,
    pub factory_cost: Money,
    pub total_cost: Money,
    /// What the client saves against buying everything at list price.
    pub savings: Money,
}

/// Splits `requested_qty` between stock and factory and prices the result.
///
/// ## Rules
/// - `force_factory` sends the whole quantity to the factory
/// - otherwise stock is used first, up to `available_stock` (negative is 0)
/// - the factory part is discounted once per line, rounded half-up to the cent
/// - `requested_qty <= 0` resolves to all zeros
///
/// ## Example
/// ```rust
/// use loom_core::fulfillment::resolve;
/// use loom_core::money::Money;
/// use loom_core::types::DiscountRate;
///
/// let forced = resolve(8, 5, true, Money::from_cents(1000), DiscountRate::FACTORY_DEFAULT);
/// assert_eq!((forced.stock_qty, forced.factory_qty), (0, 8));
/// assert_eq!(forced.total_cost.cents(), 7760);
/// assert_eq!(forced.savings.cents(), 240);
/// ```
pub fn resolve(
    requested_qty: i64,
    available_stock: i64,
    force_factory: bool,
    unit_price: Money,
    discount: DiscountRate,
) -> Fulfillment {
    if requested_qty <= 0 {
        return Fulfillment::default();
    }

    let stock_qty = if force_factory {
        0
    } else {
        requested_qty.min(available_stock.max(0))
    };
    let factory_qty = requested_qty - stock_qty;

    let stock_cost = unit_price * stock_qty;
    let factory_cost = (unit_price * factory_qty).apply_discount(discount);
    let total_cost = stock_cost + factory_cost;
    let savings = unit_price * requested_qty - total_cost;

    Fulfillment {
        stock_qty,
        factory_qty,
        stock_cost,
        factory_cost,
        total_cost,
        savings,
    }
}

/// Units of a product (or one of its variants) that can be sold from stock.
///
/// - With variants: the selected variant's `stock`; no/unknown variant is 0.
/// - Without variants: `available_qty - reserved_qty`.
///
/// Never negative.
pub fn sellable_quantity(product: &Product, variant_id: Option<&str>) -> i64 {
    if product.has_variants() {
        return variant_id
            .and_then(|id| product.variant(id))
            .map(|v| v.stock.max(0))
            .unwrap_or(0);
    }

    (product.available_qty - product.reserved_qty).max(0)
}

/// Resolves a line against a product's current sellable stock and price.
pub fn resolve_for_product(
    product: &Product,
    variant_id: Option<&str>,
    quantity: i64,
    force_factory: bool,
    discount: DiscountRate,
) -> Fulfillment {
    resolve(
        quantity,
        sellable_quantity(product, variant_id),
        force_factory,
        product.price,
        discount,
    )
}

/// Per-unit factory price, for display next to the list price.
pub fn factory_unit_price(unit_price: Money, discount: DiscountRate) -> Money {
    unit_price.apply_discount(discount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fabric, with_variants};

    const TEN: Money = Money::from_cents(1000);

    #[test]
    fn test_partial_stock_split() {
        let f = resolve(8, 5, false, TEN, DiscountRate::FACTORY_DEFAULT);

        assert_eq!(f.stock_qty, 5);
        assert_eq!(f.factory_qty, 3);
        assert_eq!(f.stock_cost.cents(), 5000);
        assert_eq!(f.factory_cost.cents(), 2910);
        assert_eq!(f.total_cost.cents(), 7910);
        assert_eq!(f.savings.cents(), 90);
    }

    #[test]
    fn test_forced_factory() {
        let f = resolve(8, 5, true, TEN, DiscountRate::FACTORY_DEFAULT);

        assert_eq!(f.stock_qty, 0);
        assert_eq!(f.factory_qty, 8);
        assert_eq!(f.total_cost.cents(), 7760);
        assert_eq!(f.savings.cents(), 240);
    }

    #[test]
    fn test_full_stock_has_no_savings() {
        let f = resolve(4, 10, false, TEN, DiscountRate::FACTORY_DEFAULT);
        assert_eq!((f.stock_qty, f.factory_qty), (4, 0));
        assert_eq!(f.total_cost.cents(), 4000);
        assert!(f.savings.is_zero());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(resolve(0, 5, false, TEN, DiscountRate::FACTORY_DEFAULT), Fulfillment::default());
        assert_eq!(resolve(-3, 5, false, TEN, DiscountRate::FACTORY_DEFAULT), Fulfillment::default());

        // Negative stock behaves like none
        let f = resolve(3, -7, false, TEN, DiscountRate::FACTORY_DEFAULT);
        assert_eq!((f.stock_qty, f.factory_qty), (0, 3));
    }

    #[test]
    fn test_split_properties_hold_across_inputs() {
        let prices = [0, 1, 33, 999, 1000, 123_457];
        for requested in 0..40 {
            for available in -5..45 {
                for &cents in &prices {
                    for force in [false, true] {
                        let price = Money::from_cents(cents);
                        let f = resolve(requested, available, force, price, DiscountRate::FACTORY_DEFAULT);

                        assert_eq!(f.stock_qty + f.factory_qty, requested);
                        assert!(f.stock_qty >= 0 && f.factory_qty >= 0);
                        if force {
                            assert_eq!(f.stock_qty, 0);
                        }
                        assert_eq!(f.total_cost, f.stock_cost + f.factory_cost);
                        assert_eq!(
                            f.factory_cost,
                            (price * f.factory_qty).apply_discount(DiscountRate::FACTORY_DEFAULT)
                        );
                        assert!(!f.savings.is_negative());
                    }
                }
            }
        }
    }

    #[test]
    fn test_sellable_quantity_without_variants() {
        let mut product = fabric("p1", 1000);
        product.available_qty = 12;
        product.reserved_qty = 4;
        assert_eq!(sellable_quantity(&product, None), 8);

        product.reserved_qty = 20;
        assert_eq!(sellable_quantity(&product, None), 0);
    }

    #[test]
    fn test_sellable_quantity_with_variants() {
        let product = with_variants(fabric("p1", 1000), &[("A", 7), ("B", -2)]);

        assert_eq!(sellable_quantity(&product, Some("A")), 7);
        assert_eq!(sellable_quantity(&product, Some("B")), 0);
        assert_eq!(sellable_quantity(&product, Some("Z")), 0);
        assert_eq!(sellable_quantity(&product, None), 0);
    }

    #[test]
    fn test_resolve_for_product_uses_variant_stock() {
        let mut product = with_variants(fabric("p1", 1000), &[("A", 2)]);
        product.available_qty = 100;

        let f = resolve_for_product(&product, Some("A"), 5, false, DiscountRate::FACTORY_DEFAULT);
        assert_eq!((f.stock_qty, f.factory_qty), (2, 3));
    }

    #[test]
    fn test_factory_unit_price() {
        assert_eq!(factory_unit_price(TEN, DiscountRate::FACTORY_DEFAULT).cents(), 970);
        assert_eq!(factory_unit_price(TEN, DiscountRate::zero()).cents(), 1000);
    }
}
