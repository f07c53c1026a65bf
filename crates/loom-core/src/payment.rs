//! # Payment Ledger
//!
//! Payment proofs recorded against an order. `paid_amount` is always
//! recomputed from the proofs, never incremented.
//!
//! ```text
//! Admin enters "40.50" ──parse──► Money(4050)
//!        │
//!        ├── editing an existing proof? ──► replace amount/method
//!        │                                  (receipt only if a new one)
//!        └── otherwise ──► append PAY-<millis>, APPROVED
//!        │
//!        ▼
//! paid_amount = Σ proofs.amount
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, PaymentMethod, PaymentProof, PaymentStatus};

/// Prefix of every payment proof id.
pub const PAYMENT_ID_PREFIX: &str = "PAY-";

/// A payment as entered in the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    /// Id of the proof being edited, if any.
    #[serde(default)]
    pub editing_id: Option<String>,
    pub amount: Money,
    pub method: PaymentMethod,
    /// Newly uploaded receipt. `None` keeps the existing one when editing.
    #[serde(default)]
    pub receipt: Option<String>,
}

impl PaymentInput {
    pub fn new(amount: Money, method: PaymentMethod) -> Self {
        Self {
            editing_id: None,
            amount,
            method,
            receipt: None,
        }
    }

    pub fn editing(mut self, proof_id: impl Into<String>) -> Self {
        self.editing_id = Some(proof_id.into());
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }
}

/// Records or edits a payment and recomputes the paid total.
///
/// Returns false and changes nothing when the amount is not positive or when
/// `editing_id` names a proof that does not exist on this order.
pub fn add_or_edit_payment(order: &mut Order, input: PaymentInput, now: DateTime<Utc>) -> bool {
    if !input.amount.is_positive() {
        return false;
    }

    match input.editing_id.as_deref() {
        Some(editing_id) => {
            let Some(proof) = order.payment_proofs.iter_mut().find(|p| p.id == editing_id) else {
                return false;
            };
            proof.amount = input.amount;
            proof.method = input.method;
            if input.receipt.is_some() {
                proof.receipt = input.receipt;
            }
        }
        None => {
            let id = next_payment_id(order, now);
            order.payment_proofs.push(PaymentProof {
                id,
                amount: input.amount,
                method: input.method,
                receipt: input.receipt,
                timestamp: now,
                status: PaymentStatus::Approved,
            });
        }
    }

    recompute_paid(order);
    true
}

/// Sets `paid_amount` to the sum of the order's proofs.
pub fn recompute_paid(order: &mut Order) {
    order.paid_amount = order.payment_proofs.iter().map(|p| p.amount).sum();
}

/// Amount still owed on the order. Negative when overpaid.
pub fn outstanding(order: &Order) -> Money {
    order.total_amount - order.paid_amount
}

/// `PAY-<millis>`, moved forward a millisecond at a time if this order
/// already has a proof with that id.
fn next_payment_id(order: &Order, now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis();
    loop {
        let id = format!("{}{}", PAYMENT_ID_PREFIX, millis);
        if !order.payment_proofs.iter().any(|p| p.id == id) {
            return id;
        }
        millis += 1;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
