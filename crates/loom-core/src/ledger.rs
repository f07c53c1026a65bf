//! # Client Balance & Statements
//!
//! A client's balance is never edited directly. It is replayed from the
//! order and payment history every time something changes.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  balance = Σ paid_amount − Σ total_amount   (non-cancelled orders)     │
//! │                                                                         │
//! │   < 0  client owes us (debt)                                            │
//! │   > 0  client has credit (overpaid)                                     │
//! │                                                                         │
//! │  Statement (same data, as a time series):                              │
//! │   date        type     description              debit  credit  running │
//! │   03/01/2024  ORDER    Order #ORD-1 (2 items)   50.00          -50.00  │
//! │   03/02/2024  PAYMENT  Payment (CASH)                  50.00    0.00   │
//! │   03/03/2024  ORDER    Order #ORD-2 (1 items)   30.00          -30.00  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The final running balance of every client in a statement equals
//! [`sync_balance`] for that client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Client, Order};

// =============================================================================
// Balances
// =============================================================================

/// Σ paid − Σ total over the client's non-cancelled orders.
///
/// Idempotent. This is the only way balances are computed.
pub fn sync_balance(client_id: &str, orders: &[Order]) -> Money {
    orders
        .iter()
        .filter(|o| o.client_id == client_id && !o.is_cancelled())
        .map(|o| o.paid_amount - o.total_amount)
        .sum()
}

/// Writes the recomputed balance onto the client record.
///
/// Returns the updated client for persistence, or `None` for an unknown id.
pub fn apply_balance(clients: &mut [Client], client_id: &str, orders: &[Order]) -> Option<Client> {
    let client = clients.iter_mut().find(|c| c.id == client_id)?;
    client.balance = sync_balance(client_id, orders);
    Some(client.clone())
}

// =============================================================================
// Statements
// =============================================================================

/// Which clients a statement covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerScope {
    All,
    Client(String),
}

impl LedgerScope {
    fn includes(&self, client_id: &str) -> bool {
        match self {
            LedgerScope::All => true,
            LedgerScope::Client(id) => id == client_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Order,
    Payment,
}

impl TransactionType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Order => "ORDER",
            TransactionType::Payment => "PAYMENT",
        }
    }
}

/// One line of a client statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub client_id: String,
    pub client_name: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub description: String,
    /// Signed: orders negative, payments positive.
    pub amount: Money,
    pub debit: Money,
    pub credit: Money,
    /// Client's balance after this row.
    pub running_balance: Money,
    pub order_id: String,
}

/// Replays orders and payments into statement rows.
///
/// One ORDER row per non-cancelled order, one PAYMENT row per proof. Rows
/// are sorted by date with a stable sort, so rows with the same timestamp
/// keep the order they were emitted in (clients in list order, each order
/// followed by its payments). Only clients present in `clients` appear.
pub fn generate_ledger(orders: &[Order], clients: &[Client], scope: &LedgerScope) -> Vec<StatementRow> {
    let mut rows = Vec::new();

    for client in clients.iter().filter(|c| scope.includes(&c.id)) {
        for order in orders
            .iter()
            .filter(|o| o.client_id == client.id && !o.is_cancelled())
        {
            rows.push(StatementRow {
                date: order.created_at,
                client_id: client.id.clone(),
                client_name: client.name.clone(),
                tx_type: TransactionType::Order,
                description: format!("Order #{} ({} items)", order.id, order.item_count()),
                amount: -order.total_amount,
                debit: order.total_amount,
                credit: Money::zero(),
                running_balance: Money::zero(),
                order_id: order.id.clone(),
            });

            for proof in &order.payment_proofs {
                rows.push(StatementRow {
                    date: proof.timestamp,
                    client_id: client.id.clone(),
                    client_name: client.name.clone(),
                    tx_type: TransactionType::Payment,
                    description: format!("Payment ({})", proof.method),
                    amount: proof.amount,
                    debit: Money::zero(),
                    credit: proof.amount,
                    running_balance: Money::zero(),
                    order_id: order.id.clone(),
                });
            }
        }
    }

    rows.sort_by_key(|r| r.date);

    let mut balances: HashMap<String, Money> = HashMap::new();
    for row in &mut rows {
        let balance = balances.entry(row.client_id.clone()).or_default();
        *balance += row.amount;
        row.running_balance = *balance;
    }

    rows
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, client, order, paid, proof};
    use crate::types::{OrderStatus, PaymentMethod};

    #[test]
    fn test_sync_balance_excludes_cancelled() {
        let aida = client("c1", "Aida");
        let mut cancelled = paid(order("ORD-1", &aida, 10000, at(1)), proof("PAY-1", 4000, PaymentMethod::Cash, at(2)));
        cancelled.status = OrderStatus::Cancelled;

        let orders = vec![cancelled];
        assert!(sync_balance("c1", &orders).is_zero());
    }

    #[test]
    fn test_sync_balance_is_idempotent() {
        let aida = client("c1", "Aida");
        let orders = vec![
            paid(order("ORD-1", &aida, 5000, at(1)), proof("PAY-1", 5000, PaymentMethod::Cash, at(2))),
            order("ORD-2", &aida, 3000, at(3)),
            order("ORD-X", &client("c2", "Bek"), 9900, at(3)),
        ];

        let first = sync_balance("c1", &orders);
        assert_eq!(first.cents(), -3000);
        assert_eq!(sync_balance("c1", &orders), first);
    }

    #[test]
    fn test_apply_balance() {
        let aida = client("c1", "Aida");
        let mut clients = vec![aida.clone()];
        let orders = vec![order("ORD-1", &aida, 2500, at(1))];

        let updated = apply_balance(&mut clients, "c1", &orders).unwrap();
        assert_eq!(updated.balance.cents(), -2500);
        assert_eq!(clients[0].balance.cents(), -2500);
        assert!(apply_balance(&mut clients, "nobody", &orders).is_none());
    }

    #[test]
    fn test_statement_running_balances() {
        let aida = client("c1", "Aida");
        let clients = vec![aida.clone()];
        let orders = vec![
            paid(order("ORD-1", &aida, 5000, at(1)), proof("PAY-1", 5000, PaymentMethod::Cash, at(2))),
            order("ORD-2", &aida, 3000, at(3)),
        ];

        let rows = generate_ledger(&orders, &clients, &LedgerScope::All);
        let running: Vec<i64> = rows.iter().map(|r| r.running_balance.cents()).collect();
        assert_eq!(running, vec![-5000, 0, -3000]);

        assert_eq!(rows[0].tx_type, TransactionType::Order);
        assert_eq!(rows[0].description, "Order #ORD-1 (0 items)");
        assert_eq!(rows[0].debit.cents(), 5000);
        assert_eq!(rows[1].description, "Payment (CASH)");
        assert_eq!(rows[1].credit.cents(), 5000);
        assert_eq!(rows[1].order_id, "ORD-1");
    }

    #[test]
    fn test_statement_ties_keep_emission_order() {
        let aida = client("c1", "Aida");
        let bek = client("c2", "Bek");
        let clients = vec![aida.clone(), bek.clone()];
        let orders = vec![
            order("ORD-B", &bek, 100, at(1)),
            paid(order("ORD-A", &aida, 100, at(1)), proof("PAY-1", 100, PaymentMethod::Card, at(1))),
        ];

        let rows = generate_ledger(&orders, &clients, &LedgerScope::All);
        let ids: Vec<(&str, TransactionType)> = rows.iter().map(|r| (r.order_id.as_str(), r.tx_type)).collect();
        assert_eq!(
            ids,
            vec![
                ("ORD-A", TransactionType::Order),
                ("ORD-A", TransactionType::Payment),
                ("ORD-B", TransactionType::Order),
            ]
        );
    }

    #[test]
    fn test_statement_scope_and_unknown_clients() {
        let aida = client("c1", "Aida");
        let ghost = client("c9", "Ghost");
        let clients = vec![aida.clone(), client("c2", "Bek")];
        let orders = vec![order("ORD-1", &aida, 100, at(1)), order("ORD-9", &ghost, 100, at(1))];

        let all = generate_ledger(&orders, &clients, &LedgerScope::All);
        assert_eq!(all.len(), 1);

        let bek_only = generate_ledger(&orders, &clients, &LedgerScope::Client("c2".to_string()));
        assert!(bek_only.is_empty());
    }

    #[test]
    fn test_final_running_balance_matches_sync_balance() {
        let aida = client("c1", "Aida");
        let bek = client("c2", "Bek");
        let clients = vec![aida.clone(), bek.clone()];

        let mut cancelled = order("ORD-3", &aida, 7000, at(4));
        cancelled.status = OrderStatus::Cancelled;
        let orders = vec![
            paid(
                paid(order("ORD-1", &aida, 12000, at(1)), proof("PAY-1", 2000, PaymentMethod::Cash, at(5))),
                proof("PAY-2", 15000, PaymentMethod::Transfer, at(9)),
            ),
            order("ORD-2", &bek, 4500, at(2)),
            paid(order("ORD-4", &bek, 1000, at(3)), proof("PAY-3", 999, PaymentMethod::Card, at(3))),
            cancelled,
        ];

        let rows = generate_ledger(&orders, &clients, &LedgerScope::All);
        for c in &clients {
            let last = rows.iter().filter(|r| r.client_id == c.id).last().unwrap();
            assert_eq!(last.running_balance, sync_balance(&c.id, &orders));
        }
    }
}
