//! # Cart
//!
//! A client's cart holds intent only: which product/variant, how much, and
//! whether to skip stock and order everything from the factory. The split is
//! computed live by [`quote`] and frozen only at checkout.
//!
//! ## Add-to-Cart Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(product, variant, qty, force_factory)                        │
//! │       │                                                                 │
//! │       ├── has variants, none/unknown?      → VariantRequired           │
//! │       ├── qty < moq?                       → BelowMoq                  │
//! │       ├── 0 < factory part < factory MOQ?  → FactoryMoqNotMet          │
//! │       │                                                                 │
//! │       └── merge with (product, variant) line or append                 │
//! │            merged force_factory = existing || new                      │
//! │            merged qty ≤ MAX_ITEM_QUANTITY                              │
//! │                                                                         │
//! │  update_quantity(product, variant, qty): same MOQ rules on new qty     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::fulfillment::{factory_unit_price, resolve_for_product, Fulfillment};
use crate::money::Money;
use crate::types::{CartItem, DiscountRate, Order, Product};
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Validates and adds a line, merging with an existing one.
    ///
    /// ## Errors
    /// - `BelowMoq` when `quantity < product.moq`
    /// - `VariantRequired` when the product has variants and `variant_id`
    ///   is missing or unknown
    /// - `FactoryMoqNotMet` when the factory part of this quantity is
    ///   non-zero but below the factory MOQ
    /// - `Validation` for non-positive quantities or a full cart
    pub fn add_item(
        &mut self,
        product: &Product,
        variant_id: Option<&str>,
        quantity: i64,
        force_factory: bool,
        discount: DiscountRate,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let variant_id = if product.has_variants() {
            match variant_id.filter(|id| product.variant(id).is_some()) {
                Some(id) => Some(id),
                None => {
                    return Err(CoreError::VariantRequired {
                        sku: product.sku.clone(),
                    })
                }
            }
        } else {
            None
        };

        check_line(product, variant_id, quantity, force_factory, discount)?;

        if self.find(&product.id, variant_id).is_none() {
            validate_cart_size(self.items.len()).map_err(|_| CoreError::CartTooLarge {
                max: crate::MAX_CART_ITEMS,
            })?;
        }

        match self.find_mut(&product.id, variant_id) {
            Some(existing) => {
                let merged = existing.quantity + quantity;
                validate_quantity(merged)?;
                existing.quantity = merged;
                existing.force_factory = existing.force_factory || force_factory;
            }
            None => self.items.push(CartItem {
                product_id: product.id.clone(),
                variant_id: variant_id.map(str::to_string),
                quantity,
                force_factory,
            }),
        }

        Ok(())
    }

    /// Adds a line without the product rules. Merging replaces the force flag
    /// with the new one, which is what reorder wants. Quantities are capped at
    /// `MAX_ITEM_QUANTITY`.
    pub fn push_line(&mut self, product_id: &str, variant_id: Option<&str>, quantity: i64, force_factory: bool) {
        let quantity = quantity.min(MAX_ITEM_QUANTITY);
        match self.find_mut(product_id, variant_id) {
            Some(existing) => {
                existing.quantity = (existing.quantity + quantity).min(MAX_ITEM_QUANTITY);
                existing.force_factory = force_factory;
            }
            None => self.items.push(CartItem {
                product_id: product_id.to_string(),
                variant_id: variant_id.map(str::to_string),
                quantity,
                force_factory,
            }),
        }
    }

    /// Sets a line's quantity. Zero or less removes the line.
    ///
    /// A positive quantity goes through the same quantity, MOQ and factory
    /// MOQ rules as [`Cart::add_item`], using the line's force flag. The line
    /// is left as it was on error.
    ///
    /// Returns false if there is no such line.
    pub fn update_quantity(
        &mut self,
        product: &Product,
        variant_id: Option<&str>,
        quantity: i64,
        discount: DiscountRate,
    ) -> CoreResult<bool> {
        if quantity <= 0 {
            return Ok(self.remove_item(&product.id, variant_id));
        }

        let Some(line) = self.find_mut(&product.id, variant_id) else {
            return Ok(false);
        };

        validate_quantity(quantity)?;
        check_line(product, variant_id, quantity, line.force_factory, discount)?;
        line.quantity = quantity;
        Ok(true)
    }

    pub fn remove_item(&mut self, product_id: &str, variant_id: Option<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.is_line(product_id, variant_id));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn find(&self, product_id: &str, variant_id: Option<&str>) -> Option<&CartItem> {
        self.items.iter().find(|i| i.is_line(product_id, variant_id))
    }

    fn find_mut(&mut self, product_id: &str, variant_id: Option<&str>) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.is_line(product_id, variant_id))
    }
}

/// MOQ and factory MOQ rules for a line of `quantity`.
fn check_line(
    product: &Product,
    variant_id: Option<&str>,
    quantity: i64,
    force_factory: bool,
    discount: DiscountRate,
) -> CoreResult<()> {
    if quantity < product.moq {
        return Err(CoreError::BelowMoq {
            sku: product.sku.clone(),
            moq: product.moq,
            requested: quantity,
        });
    }

    let line = quote_line(product, variant_id, quantity, force_factory, discount);
    if !line.factory_moq_met {
        return Err(CoreError::FactoryMoqNotMet {
            sku: product.sku.clone(),
            factory_moq: product.effective_factory_moq(),
            factory_qty: line.fulfillment.factory_qty,
        });
    }

    Ok(())
}

// =============================================================================
// Reorder
// =============================================================================

/// Copies an old order's lines back into the cart.
///
/// Lines whose product is gone from the catalog are skipped. A line matching
/// an existing cart line adds its quantity and takes the order's force flag.
/// No validation runs; the order itself is not touched.
///
/// Returns the number of lines re-added.
pub fn reorder(cart: &mut Cart, order: &Order, catalog: &[Product]) -> usize {
    let mut added = 0;

    for item in &order.items {
        if !catalog.iter().any(|p| p.id == item.product_id) {
            continue;
        }
        cart.push_line(
            &item.product_id,
            item.variant_id.as_deref(),
            item.quantity,
            item.force_factory,
        );
        added += 1;
    }

    added
}

// =============================================================================
// Quotes
// =============================================================================

/// Live pricing of one line. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineQuote {
    pub product_id: String,
    pub variant_id: Option<String>,
    pub quantity: i64,
    pub force_factory: bool,
    pub unit_price: Money,
    pub factory_unit_price: Money,
    pub fulfillment: Fulfillment,
    /// False when the factory part is non-zero and below the factory MOQ.
    pub factory_moq_met: bool,
}

/// Live pricing of a whole cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub lines: Vec<LineQuote>,
    pub total: Money,
    pub savings: Money,
    pub stock_qty: i64,
    pub factory_qty: i64,
}

/// Prices one prospective line against the product's current stock.
pub fn quote_line(
    product: &Product,
    variant_id: Option<&str>,
    quantity: i64,
    force_factory: bool,
    discount: DiscountRate,
) -> LineQuote {
    let fulfillment = resolve_for_product(product, variant_id, quantity, force_factory, discount);
    let factory_moq = product.effective_factory_moq();

    LineQuote {
        product_id: product.id.clone(),
        variant_id: variant_id.map(str::to_string),
        quantity,
        force_factory,
        unit_price: product.price,
        factory_unit_price: factory_unit_price(product.price, discount),
        fulfillment,
        factory_moq_met: fulfillment.factory_qty == 0 || fulfillment.factory_qty >= factory_moq,
    }
}

/// Prices every cart line. Lines whose product vanished are skipped.
pub fn quote(cart: &Cart, catalog: &[Product], discount: DiscountRate) -> CartQuote {
    let mut result = CartQuote::default();

    for item in cart.items() {
        let Some(product) = catalog.iter().find(|p| p.id == item.product_id) else {
            continue;
        };

        let line = quote_line(
            product,
            item.variant_id.as_deref(),
            item.quantity,
            item.force_factory,
            discount,
        );
        result.total += line.fulfillment.total_cost;
        result.savings += line.fulfillment.savings;
        result.stock_qty += line.fulfillment.stock_qty;
        result.factory_qty += line.fulfillment.factory_qty;
        result.lines.push(line);
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
