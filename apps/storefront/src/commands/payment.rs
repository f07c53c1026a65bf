//! # Payment Commands
//!
//! Recording and correcting payment proofs on an order.
//!
//! ```text
//! amount text ──parse──► Money ──validate──► add_or_edit_payment
//!                                               │
//!                         paid_amount = Σ proofs │ balance recomputed
//!                                               ▼
//!                                     order + client persisted
//! ```
//!
//! Payments are accepted in any order status, including CANCELLED. A
//! cancelled order's payments stay on the order but drop out of the balance.

use chrono::Utc;
use tracing::{debug, info};

use super::order::order_jobs;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::Storefront;
use loom_core::payment::{self as core_payment, PaymentInput};
use loom_core::validation::validate_payment_amount;
use loom_core::{Money, Order, PaymentMethod};

/// Adds a payment proof, or edits one when `input.editing_id` is set.
///
/// ## Errors
/// - `VALIDATION_ERROR` for a zero or negative amount (nothing changes)
/// - `NOT_FOUND` for an unknown order or proof id
pub async fn add_payment(sf: &Storefront, order_id: &str, input: PaymentInput) -> ApiResult<Order> {
    debug!(
        order_id = %order_id,
        amount = %input.amount,
        method = %input.method,
        editing = ?input.editing_id,
        "add_payment command"
    );
    validate_payment_amount(input.amount)?;

    let editing = input.editing_id.is_some();
    let (order, jobs) = sf.with_data(|data| -> ApiResult<_> {
        let order = data
            .order_mut(order_id)
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        if let Some(proof_id) = input.editing_id.as_deref() {
            if !order.payment_proofs.iter().any(|p| p.id == proof_id) {
                return Err(ApiError::not_found("Payment", proof_id));
            }
        }

        if !core_payment::add_or_edit_payment(order, input, Utc::now()) {
            return Err(ApiError::new(ErrorCode::PaymentError, "Payment was not recorded"));
        }

        let order = order.clone();
        let jobs = order_jobs(data, &order);
        Ok((order, jobs))
    })?;

    info!(
        order_id = %order_id,
        paid = %order.paid_amount,
        outstanding = %core_payment::outstanding(&order),
        edited = editing,
        "Payment recorded"
    );
    sf.persist(jobs).await;
    Ok(order)
}

/// Same as [`add_payment`] with the amount as typed by a person
/// ("40", "40.50", "40,50").
pub async fn submit_payment(
    sf: &Storefront,
    order_id: &str,
    amount: &str,
    method: PaymentMethod,
    receipt: Option<String>,
    editing_id: Option<String>,
) -> ApiResult<Order> {
    let amount: Money = amount.parse()?;

    let mut input = PaymentInput::new(amount, method);
    input.receipt = receipt;
    input.editing_id = editing_id;
    add_payment(sf, order_id, input).await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{at, client, fabric, storefront_with};
    use loom_core::{Client, OrderStatus};

    fn open_order(owner: &Client, cents: i64) -> Order {
        Order {
            id: "ORD-1".to_string(),
            client_id: owner.id.clone(),
            telegram_id: owner.telegram_id.clone(),
            username: owner.username.clone(),
            client_brand: owner.brand.clone(),
            client_phone: owner.phone.clone(),
            status: OrderStatus::Ordered,
            items: Vec::new(),
            total_amount: Money::from_cents(cents),
            paid_amount: Money::zero(),
            currency: "USD".to_string(),
            created_at: at(1),
            status_updated_at: at(1),
            payment_proofs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_and_edit_payment() {
        let aida = client("c1", "Aida");
        let (sf, _) = storefront_with(vec![fabric("silk", 1000, 0)], vec![aida.clone()], vec![open_order(&aida, 5000)]).await;

        let order = submit_payment(&sf, "ORD-1", "20,50", PaymentMethod::Cash, None, None)
            .await
            .unwrap();
        assert_eq!(order.paid_amount.cents(), 2050);
        assert_eq!(sf.snapshot().clients[0].balance.cents(), -2950);

        let proof_id = order.payment_proofs[0].id.clone();
        let order = submit_payment(&sf, "ORD-1", "50", PaymentMethod::Transfer, None, Some(proof_id))
            .await
            .unwrap();
        assert_eq!(order.payment_proofs.len(), 1);
        assert_eq!(order.paid_amount.cents(), 5000);
        assert_eq!(order.payment_proofs[0].method, PaymentMethod::Transfer);
        assert!(sf.snapshot().clients[0].balance.is_zero());
    }

    #[tokio::test]
    async fn test_invalid_amounts_change_nothing() {
        let aida = client("c1", "Aida");
        let (sf, _) = storefront_with(vec![], vec![aida.clone()], vec![open_order(&aida, 5000)]).await;

        for text in ["0", "-5", "abc", "NaN", "inf", ""] {
            let err = submit_payment(&sf, "ORD-1", text, PaymentMethod::Cash, None, None)
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "amount {:?}", text);
        }

        let data = sf.snapshot();
        assert!(data.orders[0].payment_proofs.is_empty());
        assert!(data.orders[0].paid_amount.is_zero());
    }

    #[tokio::test]
    async fn test_unknown_proof_and_order() {
        let aida = client("c1", "Aida");
        let (sf, _) = storefront_with(vec![], vec![aida.clone()], vec![open_order(&aida, 5000)]).await;

        let input = PaymentInput::new(Money::from_cents(100), PaymentMethod::Card).editing("PAY-404");
        let err = add_payment(&sf, "ORD-1", input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(sf.snapshot().orders[0].payment_proofs.is_empty());

        let input = PaymentInput::new(Money::from_cents(100), PaymentMethod::Card);
        let err = add_payment(&sf, "ORD-404", input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
