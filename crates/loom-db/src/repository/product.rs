//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! Variants are stored as a JSON array next to the product row; they are
//! never queried on their own.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_column;
use loom_core::{Money, Product};

/// Flat `products` row.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    sku: String,
    title: String,
    description: String,
    product_type: String,
    category: String,
    price_cents: i64,
    currency: String,
    purchase_price_cents: Option<i64>,
    logistics_cost_cents: Option<i64>,
    unit: String,
    moq: i64,
    factory_moq: Option<i64>,
    status: String,
    available_qty: i64,
    reserved_qty: i64,
    variants: String,
    box_qty: Option<i64>,
    gsm: Option<i64>,
    width_cm: Option<i64>,
    supplier_name: Option<String>,
    supplier_wechat: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        Ok(Product {
            product_type: parse_column("product_type", &row.product_type)?,
            status: parse_column("status", &row.status)?,
            variants: serde_json::from_str(&row.variants)
                .map_err(|e| DbError::invalid_data("variants", e))?,
            id: row.id,
            sku: row.sku,
            title: row.title,
            description: row.description,
            category: row.category,
            price: Money::from_cents(row.price_cents),
            currency: row.currency,
            purchase_price: row.purchase_price_cents.map(Money::from_cents),
            logistics_cost: row.logistics_cost_cents.map(Money::from_cents),
            unit: row.unit,
            moq: row.moq,
            factory_moq: row.factory_moq,
            available_qty: row.available_qty,
            reserved_qty: row.reserved_qty,
            box_qty: row.box_qty,
            gsm: row.gsm,
            width_cm: row.width_cm,
            supplier_name: row.supplier_name,
            supplier_wechat: row.supplier_wechat,
        })
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT
        id, sku, title, description, product_type, category,
        price_cents, currency, purchase_price_cents, logistics_cost_cents,
        unit, moq, factory_moq, status, available_qty, reserved_qty,
        variants, box_qty, gsm, width_cm, supplier_name, supplier_wechat
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists the whole catalog in insertion order.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded products");
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts the product or replaces every column of the existing row.
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        debug!(product_id = %product.id, sku = %product.sku, "Upserting product");

        let variants = serde_json::to_string(&product.variants)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, title, description, product_type, category,
                price_cents, currency, purchase_price_cents, logistics_cost_cents,
                unit, moq, factory_moq, status, available_qty, reserved_qty,
                variants, box_qty, gsm, width_cm, supplier_name, supplier_wechat
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19, ?20, ?21, ?22
            )
            ON CONFLICT(id) DO UPDATE SET
                sku = excluded.sku,
                title = excluded.title,
                description = excluded.description,
                product_type = excluded.product_type,
                category = excluded.category,
                price_cents = excluded.price_cents,
                currency = excluded.currency,
                purchase_price_cents = excluded.purchase_price_cents,
                logistics_cost_cents = excluded.logistics_cost_cents,
                unit = excluded.unit,
                moq = excluded.moq,
                factory_moq = excluded.factory_moq,
                status = excluded.status,
                available_qty = excluded.available_qty,
                reserved_qty = excluded.reserved_qty,
                variants = excluded.variants,
                box_qty = excluded.box_qty,
                gsm = excluded.gsm,
                width_cm = excluded.width_cm,
                supplier_name = excluded.supplier_name,
                supplier_wechat = excluded.supplier_wechat,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.product_type.as_str())
        .bind(&product.category)
        .bind(product.price.cents())
        .bind(&product.currency)
        .bind(product.purchase_price.map(|m| m.cents()))
        .bind(product.logistics_cost.map(|m| m.cents()))
        .bind(&product.unit)
        .bind(product.moq)
        .bind(product.factory_moq)
        .bind(product.status.as_str())
        .bind(product.available_qty)
        .bind(product.reserved_qty)
        .bind(variants)
        .bind(product.box_qty)
        .bind(product.gsm)
        .bind(product.width_cm)
        .bind(&product.supplier_name)
        .bind(&product.supplier_wechat)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
