//! # Inventory Ledger
//!
//! Available/reserved counters per product and stock per variant.
//!
//! Counters only move when an order changes status (see
//! [`crate::order::stock_effect`]). Only the stock part of a line
//! (`stock_qty`) is ever committed or released; factory quantities never
//! touch inventory.
//!
//! ```text
//! ORDERED ──► CONFIRMED/PRODUCTION   Commit:  available −= stock_qty
//! CONFIRMED.. ──► CANCELLED          Release: available += stock_qty
//! ```
//!
//! Underflow is clamped to zero, never reported as an error.

use serde::{Deserialize, Serialize};

use crate::types::{OrderItem, Product};

/// Inventory side effect of an order status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockEffect {
    /// Take the snapshotted stock quantities out of inventory.
    Commit,
    /// Put them back.
    Release,
    None,
}

impl StockEffect {
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, StockEffect::None)
    }
}

/// Which products an effect touched, and which lines could not be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockOutcome {
    /// Ids of products whose counters changed (deduplicated, in line order).
    pub touched: Vec<String>,
    /// Product ids (or `product/variant`) no longer in the catalog.
    pub missing: Vec<String>,
}

/// Moves a product's available/reserved counters by the given deltas.
///
/// Each counter is clamped to a minimum of 0. Returns false for an unknown id.
pub fn adjust(products: &mut [Product], product_id: &str, qty_delta: i64, reserve_delta: i64) -> bool {
    match products.iter_mut().find(|p| p.id == product_id) {
        Some(product) => {
            product.available_qty = (product.available_qty + qty_delta).max(0);
            product.reserved_qty = (product.reserved_qty + reserve_delta).max(0);
            true
        }
        None => false,
    }
}

/// Moves one variant's stock, clamped at 0. Parent counters are untouched.
pub fn adjust_variant(products: &mut [Product], product_id: &str, variant_id: &str, qty_delta: i64) -> bool {
    let variant = products
        .iter_mut()
        .find(|p| p.id == product_id)
        .and_then(|p| p.variants.iter_mut().find(|v| v.id == variant_id));

    match variant {
        Some(variant) => {
            variant.stock = (variant.stock + qty_delta).max(0);
            true
        }
        None => false,
    }
}

/// Applies a stock effect for every line of an order.
pub fn apply_stock_effect(products: &mut [Product], items: &[OrderItem], effect: StockEffect) -> StockOutcome {
    let sign = match effect {
        StockEffect::Commit => -1,
        StockEffect::Release => 1,
        StockEffect::None => return StockOutcome::default(),
    };

    let mut outcome = StockOutcome::default();

    for item in items.iter().filter(|i| i.stock_qty > 0) {
        let delta = sign * item.stock_qty;
        let applied = match item.variant_id.as_deref() {
            Some(variant_id) => adjust_variant(products, &item.product_id, variant_id, delta),
            None => adjust(products, &item.product_id, delta, 0),
        };

        if applied {
            if !outcome.touched.contains(&item.product_id) {
                outcome.touched.push(item.product_id.clone());
            }
        } else {
            outcome.missing.push(match &item.variant_id {
                Some(variant_id) => format!("{}/{}", item.product_id, variant_id),
                None => item.product_id.clone(),
            });
        }
    }

    outcome
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fabric, order_item, stocked, with_variants};

    #[test]
    fn test_adjust_clamps_at_zero() {
        let mut products = vec![stocked(fabric("p1", 1000), 5)];

        assert!(adjust(&mut products, "p1", -3, 2));
        assert_eq!(products[0].available_qty, 2);
        assert_eq!(products[0].reserved_qty, 2);

        assert!(adjust(&mut products, "p1", -10, -10));
        assert_eq!(products[0].available_qty, 0);
        assert_eq!(products[0].reserved_qty, 0);

        assert!(!adjust(&mut products, "nope", 1, 0));
    }

    #[test]
    fn test_adjust_variant_leaves_parent_alone() {
        let mut products = vec![with_variants(stocked(fabric("p1", 1000), 50), &[("A", 4)])];

        assert!(adjust_variant(&mut products, "p1", "A", -6));
        assert_eq!(products[0].variants[0].stock, 0);
        assert_eq!(products[0].available_qty, 50);

        assert!(!adjust_variant(&mut products, "p1", "B", 1));
        assert!(!adjust_variant(&mut products, "p2", "A", 1));
    }

    #[test]
    fn test_commit_then_release_restores_counters() {
        let product = stocked(fabric("p1", 1000), 10);
        let mut products = vec![product.clone()];
        let items = vec![order_item(&product, 8, 5)];

        let outcome = apply_stock_effect(&mut products, &items, StockEffect::Commit);
        assert_eq!(outcome.touched, vec!["p1".to_string()]);
        assert_eq!(products[0].available_qty, 5);

        apply_stock_effect(&mut products, &items, StockEffect::Release);
        assert_eq!(products[0].available_qty, 10);
    }

    #[test]
    fn test_factory_only_lines_do_not_touch_stock() {
        let product = stocked(fabric("p1", 1000), 10);
        let mut products = vec![product.clone()];
        let items = vec![order_item(&product, 8, 0)];

        let outcome = apply_stock_effect(&mut products, &items, StockEffect::Commit);
        assert!(outcome.touched.is_empty());
        assert_eq!(products[0].available_qty, 10);
    }

    #[test]
    fn test_variant_lines_move_variant_stock() {
        let product = with_variants(stocked(fabric("p1", 1000), 30), &[("A", 6)]);
        let mut products = vec![product.clone()];
        let mut item = order_item(&product, 4, 4);
        item.variant_id = Some("A".to_string());

        apply_stock_effect(&mut products, &[item], StockEffect::Commit);
        assert_eq!(products[0].variants[0].stock, 2);
        assert_eq!(products[0].available_qty, 30);
    }

    #[test]
    fn test_missing_products_are_reported() {
        let gone = fabric("gone", 1000);
        let mut products = vec![stocked(fabric("p1", 1000), 3)];
        let items = vec![order_item(&gone, 2, 2)];

        let outcome = apply_stock_effect(&mut products, &items, StockEffect::Release);
        assert!(outcome.touched.is_empty());
        assert_eq!(outcome.missing, vec!["gone".to_string()]);
    }

    #[test]
    fn test_none_effect_is_noop() {
        let product = stocked(fabric("p1", 1000), 10);
        let mut products = vec![product.clone()];
        let items = vec![order_item(&product, 8, 5)];

        let outcome = apply_stock_effect(&mut products, &items, StockEffect::None);
        assert_eq!(outcome, StockOutcome::default());
        assert_eq!(products[0], product);
    }
}
