//! # Domain Types
//!
//! Core domain types used throughout Loom Wholesale.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │  PaymentProof   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, sku        │   │  id ORD-XXXX    │   │  id PAY-<ms>    │       │
//! │  │  price          │   │  status         │   │  amount         │       │
//! │  │  moq/factory_moq│   │  items[]        │   │  method         │       │
//! │  │  available_qty  │   │  total_amount   │   │  receipt        │       │
//! │  │  variants[]     │   │  paid_amount    │   └─────────────────┘       │
//! │  └─────────────────┘   └────────┬────────┘                              │
//! │                                 │                                       │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │                        │   OrderItem     │   │     Client      │       │
//! │                        │  stock_qty      │   │  balance        │       │
//! │                        │  factory_qty    │   │  (derived)      │       │
//! │                        │  product snap   │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An `OrderItem` carries a full copy of the `Product` as it was at checkout.
//! Reports and statements read the snapshot, never the live catalog, so a
//! later price change cannot rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 300 bps = 3% (the factory backorder discount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Factory backorder discount: 3%.
    pub const FACTORY_DEFAULT: DiscountRate = DiscountRate(300);

    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::FACTORY_DEFAULT
    }
}

// =============================================================================
// Text-Coded Enums
// =============================================================================
// Every enum below is stored as its SCREAMING_SNAKE_CASE name in the database
// and the JSON payloads. The macro keeps `as_str`, `FromStr` and `Display` in
// one place so the three can never drift apart.

macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored/wire name of this variant.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: vec![$($text.to_string()),+],
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Client role. Only admins and managers see internal fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

text_enum!(Role, "role", { User => "USER", Manager => "MANAGER", Admin => "ADMIN" });

/// Catalog family. Also used as the catalog filter for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    Fabric,
    Hardware,
}

text_enum!(ProductType, "product type", { Fabric => "FABRIC", Hardware => "HARDWARE" });

/// Merchandising status shown on the product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    #[default]
    InStock,
    Preorder,
    OutOfStock,
}

text_enum!(AvailabilityStatus, "availability status", {
    InStock => "IN_STOCK",
    Preorder => "PREORDER",
    OutOfStock => "OUT_OF_STOCK",
});

/// Order lifecycle status.
///
/// ```text
/// ORDERED → CONFIRMED → PRODUCTION → TRANSIT → WAREHOUSE
///                                                  │
///                      DELIVERED ◄── READY_FOR_DELIVERY
///
/// CANCELLED is reachable from anywhere by admin assignment.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Ordered,
    Confirmed,
    Production,
    Transit,
    Warehouse,
    ReadyForDelivery,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    Ordered => "ORDERED",
    Confirmed => "CONFIRMED",
    Production => "PRODUCTION",
    Transit => "TRANSIT",
    Warehouse => "WAREHOUSE",
    ReadyForDelivery => "READY_FOR_DELIVERY",
    Delivered => "DELIVERED",
    Cancelled => "CANCELLED",
});

impl OrderStatus {
    /// DELIVERED and CANCELLED end the normal flow.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Transfer,
    Card,
}

text_enum!(PaymentMethod, "payment method", {
    Cash => "CASH",
    Transfer => "TRANSFER",
    Card => "CARD",
});

/// Review status of a payment proof. Admin-entered proofs are approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Approved,
    Pending,
    Rejected,
}

text_enum!(PaymentStatus, "payment status", {
    Approved => "APPROVED",
    Pending => "PENDING",
    Rejected => "REJECTED",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Salary,
    Logistics,
    Marketing,
    #[default]
    Other,
}

text_enum!(ExpenseCategory, "expense category", {
    Rent => "RENT",
    Utilities => "UTILITIES",
    Salary => "SALARY",
    Logistics => "LOGISTICS",
    Marketing => "MARKETING",
    Other => "OTHER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchLogType {
    #[default]
    Text,
    Photo,
}

text_enum!(SearchLogType, "search type", { Text => "TEXT", Photo => "PHOTO" });

/// Exportable report. See `export::build_report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Supplier,
    Clients,
    ClientLedger,
    SalesAll,
    SalesFabric,
    SalesHardware,
    Expenses,
    Income,
    Inventory,
    SearchLogs,
}

text_enum!(ReportType, "report type", {
    Supplier => "SUPPLIER",
    Clients => "CLIENTS",
    ClientLedger => "CLIENT_LEDGER",
    SalesAll => "SALES_ALL",
    SalesFabric => "SALES_FABRIC",
    SalesHardware => "SALES_HARDWARE",
    Expenses => "EXPENSES",
    Income => "INCOME",
    Inventory => "INVENTORY",
    SearchLogs => "SEARCH_LOGS",
});

impl ReportType {
    /// Product type a sales report is restricted to.
    pub const fn sales_filter(&self) -> Option<ProductType> {
        match self {
            ReportType::SalesFabric => Some(ProductType::Fabric),
            ReportType::SalesHardware => Some(ProductType::Hardware),
            _ => None,
        }
    }

    pub const fn is_sales(&self) -> bool {
        matches!(
            self,
            ReportType::SalesAll | ReportType::SalesFabric | ReportType::SalesHardware
        )
    }

    /// Base of the exported file name, before the date suffix.
    pub const fn file_stem(&self) -> &'static str {
        match self {
            ReportType::Supplier => "supplier_report",
            ReportType::Clients => "clients_list",
            ReportType::ClientLedger => "client_ledger",
            ReportType::SalesAll => "sales_all",
            ReportType::SalesFabric => "sales_fabric",
            ReportType::SalesHardware => "sales_hardware",
            ReportType::Expenses => "expenses_report",
            ReportType::Income => "income_report",
            ReportType::Inventory => "inventory_stock",
            ReportType::SearchLogs => "search_logs",
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A color/design variant of a product with its own stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVariant {
    /// Short code, e.g. "A".
    pub id: String,
    /// Display name, e.g. "Midnight Blue".
    pub name: String,
    /// Hex color swatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub stock: i64,
}

/// A catalog product.
///
/// When `variants` is non-empty, saleability is decided per variant and the
/// parent's `available_qty`/`reserved_qty` are not consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    pub product_type: ProductType,

    #[serde(default)]
    pub category: String,

    /// Selling price per unit.
    pub price: Money,

    pub currency: String,

    /// Cost price per unit (internal).
    #[serde(default)]
    pub purchase_price: Option<Money>,

    /// Cost to bring one unit to the warehouse (internal).
    #[serde(default)]
    pub logistics_cost: Option<Money>,

    /// Unit of measure ("m", "pcs").
    pub unit: String,

    /// Minimum order quantity for stock purchases.
    pub moq: i64,

    /// Minimum quantity for the factory backorder part. Falls back to `moq`.
    #[serde(default)]
    pub factory_moq: Option<i64>,

    pub status: AvailabilityStatus,

    pub available_qty: i64,

    pub reserved_qty: i64,

    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    #[serde(default)]
    pub box_qty: Option<i64>,

    /// Fabric weight in grams per square metre.
    #[serde(default)]
    pub gsm: Option<i64>,

    #[serde(default)]
    pub width_cm: Option<i64>,

    #[serde(default)]
    pub supplier_name: Option<String>,

    #[serde(default)]
    pub supplier_wechat: Option<String>,
}

impl Product {
    /// Returns true if the product is sold per variant.
    #[inline]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Looks up a variant by its short code.
    pub fn variant(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    /// Effective factory MOQ (`factory_moq`, else `moq`).
    #[inline]
    pub fn effective_factory_moq(&self) -> i64 {
        self.factory_moq.unwrap_or(self.moq)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A line in a client's cart. Holds intent only; the split is computed live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub force_factory: bool,
}

impl CartItem {
    /// Returns true if this line is for the given product/variant pair.
    pub fn is_line(&self, product_id: &str, variant_id: Option<&str>) -> bool {
        self.product_id == product_id && self.variant_id.as_deref() == variant_id
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line of a placed order, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub force_factory: bool,
    /// Units served from on-hand stock.
    pub stock_qty: i64,
    /// Units backordered from the factory.
    pub factory_qty: i64,
    /// Product as it was at checkout.
    #[serde(default)]
    pub product_snapshot: Option<Product>,
}

/// A client order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD-` followed by 9 uppercase alphanumerics.
    pub id: String,
    pub client_id: String,
    pub telegram_id: String,
    pub username: String,
    pub client_brand: String,
    pub client_phone: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Fixed at creation.
    pub total_amount: Money,
    /// Always the sum of `payment_proofs` amounts.
    pub paid_amount: Money,
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub status_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub payment_proofs: Vec<PaymentProof>,
}

impl Order {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Number of lines on the order.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Payment Proof
// =============================================================================

/// A payment recorded against an order. An order can have several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// `PAY-<unix millis>`.
    pub id: String,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Uploaded file url or name.
    #[serde(default)]
    pub receipt: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub status: PaymentStatus,
}

// =============================================================================
// Client
// =============================================================================

/// A wholesale client (a Telegram user with a brand).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub telegram_id: String,
    pub username: String,
    pub name: String,
    pub brand: String,
    pub phone: String,
    pub role: Role,
    /// Positive = overpaid, negative = debt. Derived, see `ledger::sync_balance`.
    #[serde(default)]
    pub balance: Money,
}

// =============================================================================
// Expenses & Search Logs
// =============================================================================

/// An operating expense, subtracted from gross profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Money,
    pub category: ExpenseCategory,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub receipt: Option<String>,
}

/// A catalog search made by a client, by text or by photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SearchLog {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    #[serde(rename = "type")]
    pub log_type: SearchLogType,
    #[serde(default)]
    pub query: Option<String>,
    pub results_count: i64,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
