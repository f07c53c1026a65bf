//! Test fixtures shared by the unit tests of this crate.

use chrono::{DateTime, TimeZone, Utc};

use crate::money::Money;
use crate::types::*;

/// 2024-03-<day> 12:00 UTC.
pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

pub fn fabric(id: &str, price_cents: i64) -> Product {
    Product {
        id: id.to_string(),
        sku: format!("SKU-{}", id.to_uppercase()),
        title: format!("Fabric {}", id),
        description: String::new(),
        product_type: ProductType::Fabric,
        category: "Silk".to_string(),
        price: Money::from_cents(price_cents),
        currency: "USD".to_string(),
        purchase_price: None,
        logistics_cost: None,
        unit: "m".to_string(),
        moq: 1,
        factory_moq: None,
        status: AvailabilityStatus::InStock,
        available_qty: 0,
        reserved_qty: 0,
        variants: Vec::new(),
        box_qty: None,
        gsm: None,
        width_cm: None,
        supplier_name: None,
        supplier_wechat: None,
    }
}

pub fn hardware(id: &str, price_cents: i64) -> Product {
    Product {
        product_type: ProductType::Hardware,
        category: "Zippers".to_string(),
        title: format!("Hardware {}", id),
        unit: "pcs".to_string(),
        ..fabric(id, price_cents)
    }
}

pub fn stocked(mut product: Product, available: i64) -> Product {
    product.available_qty = available;
    product
}

pub fn with_variants(mut product: Product, variants: &[(&str, i64)]) -> Product {
    product.variants = variants
        .iter()
        .map(|(id, stock)| ProductVariant {
            id: id.to_string(),
            name: format!("Variant {}", id),
            color: None,
            stock: *stock,
        })
        .collect();
    product
}

pub fn client(id: &str, name: &str) -> Client {
    Client {
        id: id.to_string(),
        telegram_id: format!("tg-{}", id),
        username: format!("@{}", name.to_lowercase()),
        name: name.to_string(),
        brand: format!("{} Brand", name),
        phone: "+996 555 000 000".to_string(),
        role: Role::User,
        balance: Money::zero(),
    }
}

pub fn order_item(product: &Product, quantity: i64, stock_qty: i64) -> OrderItem {
    OrderItem {
        product_id: product.id.clone(),
        variant_id: None,
        quantity,
        force_factory: false,
        stock_qty,
        factory_qty: quantity - stock_qty,
        product_snapshot: Some(product.clone()),
    }
}

/// An order with a fixed total and no payments.
pub fn order(id: &str, client: &Client, total_cents: i64, created: DateTime<Utc>) -> Order {
    Order {
        id: id.to_string(),
        client_id: client.id.clone(),
        telegram_id: client.telegram_id.clone(),
        username: client.username.clone(),
        client_brand: client.brand.clone(),
        client_phone: client.phone.clone(),
        status: OrderStatus::Ordered,
        items: Vec::new(),
        total_amount: Money::from_cents(total_cents),
        paid_amount: Money::zero(),
        currency: "USD".to_string(),
        created_at: created,
        status_updated_at: created,
        payment_proofs: Vec::new(),
    }
}

pub fn proof(id: &str, cents: i64, method: PaymentMethod, when: DateTime<Utc>) -> PaymentProof {
    PaymentProof {
        id: id.to_string(),
        amount: Money::from_cents(cents),
        method,
        receipt: None,
        timestamp: when,
        status: PaymentStatus::Approved,
    }
}

/// Adds a proof and keeps `paid_amount` consistent.
pub fn paid(mut order: Order, proof: PaymentProof) -> Order {
    order.paid_amount += proof.amount;
    order.payment_proofs.push(proof);
    order
}
