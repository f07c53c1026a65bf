//! # Reporting Aggregator
//!
//! Dashboard figures and the per-line row sets behind the CSV reports.
//!
//! ## Where the Numbers Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  non-cancelled orders ──► revenue = Σ total_amount                     │
//! │        │                  avg_check = revenue / orders                 │
//! │        ▼                                                                │
//! │  each item's snapshot ──► item revenue (stock + discounted factory)    │
//! │                           cogs      = qty × purchase price             │
//! │                           logistics = qty × logistics cost             │
//! │                                                                         │
//! │  gross profit = revenue − cogs − logistics                             │
//! │  net profit   = gross profit − Σ expenses                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything reads the product snapshot on the order item, never the live
//! catalog. Items without a snapshot are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountRate, Expense, Order, OrderItem, OrderStatus, Product, ProductType};

/// Supplier name used when the snapshot has none.
pub const UNKNOWN_SUPPLIER: &str = "Unknown";

/// WeChat contact used when the snapshot has none.
pub const NO_WECHAT: &str = "-";

// =============================================================================
// Row Types
// =============================================================================

/// One order line with its profit figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub order_id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub username: String,
    pub client_brand: String,
    pub status: OrderStatus,
    pub sku: String,
    pub title: String,
    pub product_type: ProductType,
    pub quantity: i64,
    pub unit: String,
    pub price: Money,
    pub purchase_price: Money,
    /// Logistics cost per unit.
    pub logistics_cost: Money,
    /// Blended line total (what the client pays for this line).
    pub revenue: Money,
    pub cogs: Money,
    pub logistics: Money,
    pub profit: Money,
    pub order_total: Money,
    pub paid: Money,
    pub remaining: Money,
}

/// What to order from which supplier, per order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRow {
    pub supplier_name: String,
    pub supplier_wechat: String,
    pub client_brand: String,
    pub username: String,
    pub sku: String,
    /// Factory quantity when there is one, else the whole line.
    pub quantity: i64,
    pub purchase_price: Money,
}

/// Headline figures for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub order_count: usize,
    pub revenue: Money,
    pub avg_check: Money,
    pub cogs: Money,
    pub logistics: Money,
    pub total_expenses: Money,
    pub gross_profit: Money,
    pub net_profit: Money,
    pub fabric_sales: Vec<SalesRow>,
    pub hardware_sales: Vec<SalesRow>,
    pub supplier_rows: Vec<SupplierRow>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Line revenue recomputed from the snapshotted split.
pub fn item_revenue(item: &OrderItem, snapshot: &Product, discount: DiscountRate) -> Money {
    snapshot.price * item.stock_qty + (snapshot.price * item.factory_qty).apply_discount(discount)
}

fn active(orders: &[Order]) -> impl Iterator<Item = &Order> {
    orders.iter().filter(|o| !o.is_cancelled())
}

/// Sales rows for the given orders, optionally limited to one product type.
///
/// The dashboard passes non-cancelled orders only; the SALES exports pass
/// every order and let the status column show cancellations.
pub fn sales_rows<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    filter: Option<ProductType>,
    discount: DiscountRate,
) -> Vec<SalesRow> {
    let mut rows = Vec::new();

    for order in orders {
        for item in &order.items {
            let Some(snap) = item.product_snapshot.as_ref() else {
                continue;
            };
            if filter.is_some_and(|t| t != snap.product_type) {
                continue;
            }

            let purchase_price = snap.purchase_price.unwrap_or_default();
            let logistics_cost = snap.logistics_cost.unwrap_or_default();
            let revenue = item_revenue(item, snap, discount);
            let cogs = purchase_price * item.quantity;
            let logistics = logistics_cost * item.quantity;

            rows.push(SalesRow {
                order_id: order.id.clone(),
                date: order.created_at,
                username: order.username.clone(),
                client_brand: order.client_brand.clone(),
                status: order.status,
                sku: snap.sku.clone(),
                title: snap.title.clone(),
                product_type: snap.product_type,
                quantity: item.quantity,
                unit: snap.unit.clone(),
                price: snap.price,
                purchase_price,
                logistics_cost,
                revenue,
                cogs,
                logistics,
                profit: revenue - cogs - logistics,
                order_total: order.total_amount,
                paid: order.paid_amount,
                remaining: order.total_amount - order.paid_amount,
            });
        }
    }

    rows
}

/// Supplier rows for non-cancelled orders.
pub fn supplier_rows(orders: &[Order]) -> Vec<SupplierRow> {
    active(orders)
        .flat_map(|order| {
            order.items.iter().filter_map(move |item| {
                let snap = item.product_snapshot.as_ref()?;
                Some(SupplierRow {
                    supplier_name: snap
                        .supplier_name
                        .clone()
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string()),
                    supplier_wechat: snap
                        .supplier_wechat
                        .clone()
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| NO_WECHAT.to_string()),
                    client_brand: order.client_brand.clone(),
                    username: order.username.clone(),
                    sku: snap.sku.clone(),
                    quantity: if item.factory_qty > 0 {
                        item.factory_qty
                    } else {
                        item.quantity
                    },
                    purchase_price: snap.purchase_price.unwrap_or_default(),
                })
            })
        })
        .collect()
}

/// Computes the dashboard figures.
pub fn dashboard_stats(orders: &[Order], expenses: &[Expense], discount: DiscountRate) -> DashboardStats {
    let order_count = active(orders).count();
    let revenue: Money = active(orders).map(|o| o.total_amount).sum();
    let avg_check = if order_count == 0 {
        Money::zero()
    } else {
        let n = order_count as i64;
        Money::from_cents((revenue.cents() + n / 2) / n)
    };

    let (fabric_sales, hardware_sales): (Vec<SalesRow>, Vec<SalesRow>) = sales_rows(active(orders), None, discount)
        .into_iter()
        .partition(|r| r.product_type == ProductType::Fabric);

    let cogs: Money = fabric_sales.iter().chain(&hardware_sales).map(|r| r.cogs).sum();
    let logistics: Money = fabric_sales.iter().chain(&hardware_sales).map(|r| r.logistics).sum();
    let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();
    let gross_profit = revenue - cogs - logistics;

    DashboardStats {
        order_count,
        revenue,
        avg_check,
        cogs,
        logistics,
        total_expenses,
        gross_profit,
        net_profit: gross_profit - total_expenses,
        fabric_sales,
        hardware_sales,
        supplier_rows: supplier_rows(orders),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, client, fabric, hardware, order, order_item};
    use crate::types::ExpenseCategory;

    const D: DiscountRate = DiscountRate::FACTORY_DEFAULT;

    fn costed(mut p: Product, purchase: i64, logistics: i64) -> Product {
        p.purchase_price = Some(Money::from_cents(purchase));
        p.logistics_cost = Some(Money::from_cents(logistics));
        p
    }

    fn expense(cents: i64) -> Expense {
        Expense {
            id: "e1".to_string(),
            title: "Rent".to_string(),
            amount: Money::from_cents(cents),
            category: ExpenseCategory::Rent,
            date: at(1),
            receipt: None,
        }
    }

    fn sample_orders() -> Vec<Order> {
        let aida = client("c1", "Aida");
        let silk = costed(fabric("silk", 1000), 600, 50);
        let zip = costed(hardware("zip", 200), 100, 10);

        let mut o1 = order("ORD-1", &aida, 0, at(1));
        o1.items = vec![order_item(&silk, 8, 5), order_item(&zip, 10, 10)];
        o1.total_amount = Money::from_cents(7910 + 2000);

        let mut cancelled = order("ORD-2", &aida, 0, at(2));
        cancelled.items = vec![order_item(&silk, 100, 100)];
        cancelled.total_amount = Money::from_cents(100_000);
        cancelled.status = OrderStatus::Cancelled;

        vec![o1, cancelled]
    }

    #[test]
    fn test_item_revenue_uses_snapshot_split() {
        let silk = fabric("silk", 1000);
        let item = order_item(&silk, 8, 5);
        assert_eq!(item_revenue(&item, &silk, D).cents(), 7910);
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = dashboard_stats(&sample_orders(), &[expense(1500)], D);

        assert_eq!(stats.order_count, 1);
        assert_eq!(stats.revenue.cents(), 9910);
        assert_eq!(stats.avg_check.cents(), 9910);
        // 8 × 6.00 + 10 × 1.00
        assert_eq!(stats.cogs.cents(), 4800 + 1000);
        // 8 × 0.50 + 10 × 0.10
        assert_eq!(stats.logistics.cents(), 400 + 100);
        assert_eq!(stats.gross_profit.cents(), 9910 - 5800 - 500);
        assert_eq!(stats.total_expenses.cents(), 1500);
        assert_eq!(stats.net_profit.cents(), 9910 - 5800 - 500 - 1500);
        assert_eq!(stats.fabric_sales.len(), 1);
        assert_eq!(stats.hardware_sales.len(), 1);
        assert_eq!(stats.fabric_sales[0].profit.cents(), 7910 - 4800 - 400);
    }

    #[test]
    fn test_dashboard_stats_empty() {
        let stats = dashboard_stats(&[], &[], D);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_supplier_rows_defaults_and_quantities() {
        let mut orders = sample_orders();
        orders[0].items[1].product_snapshot.as_mut().unwrap().supplier_name = Some("Guangzhou Zip".to_string());

        let rows = supplier_rows(&orders);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].supplier_name, UNKNOWN_SUPPLIER);
        assert_eq!(rows[0].supplier_wechat, NO_WECHAT);
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[1].supplier_name, "Guangzhou Zip");
        assert_eq!(rows[1].quantity, 10);
        assert_eq!(rows[0].client_brand, "Aida Brand");
    }

    #[test]
    fn test_sales_rows_filter_and_skip_missing_snapshot() {
        let mut orders = sample_orders();
        orders[0].items[1].product_snapshot = None;

        assert_eq!(sales_rows(&orders[..1], None, D).len(), 1);
        assert_eq!(sales_rows(&orders[..1], Some(ProductType::Hardware), D).len(), 0);

        let fabric_rows = sales_rows(&orders[..1], Some(ProductType::Fabric), D);
        assert_eq!(fabric_rows[0].remaining.cents(), 9910);
        assert_eq!(fabric_rows[0].order_total.cents(), 9910);

        // Cancelled orders are listed when passed in
        let all = sales_rows(&orders, None, D);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].status, OrderStatus::Cancelled);
    }
}
