//! # Expense Repository
//!
//! Expenses are append-only: created once, listed for the dashboard and the
//! EXPENSES/INCOME reports.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_column;
use loom_core::{Expense, Money};

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    title: String,
    amount_cents: i64,
    category: String,
    date: DateTime<Utc>,
    receipt: Option<String>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = DbError;

    fn try_from(row: ExpenseRow) -> DbResult<Self> {
        Ok(Expense {
            category: parse_column("category", &row.category)?,
            id: row.id,
            title: row.title,
            amount: Money::from_cents(row.amount_cents),
            date: row.date,
            receipt: row.receipt,
        })
    }
}

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Lists expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            r#"
            SELECT id, title, amount_cents, category, date, receipt
            FROM expenses
            ORDER BY date DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Expense::try_from).collect()
    }

    /// Inserts a new expense.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - an expense with this id exists
    pub async fn insert(&self, expense: &Expense) -> DbResult<()> {
        debug!(expense_id = %expense.id, amount = %expense.amount, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (id, title, amount_cents, category, date, receipt)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.title)
        .bind(expense.amount.cents())
        .bind(expense.category.as_str())
        .bind(expense.date)
        .bind(&expense.receipt)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &expense.id),
            other => other,
        })?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use loom_core::{Expense, ExpenseCategory, Money};

    fn expense(id: &str, day: u32) -> Expense {
        Expense {
            id: id.to_string(),
            title: "Warehouse rent".to_string(),
            amount: Money::from_cents(150_000),
            category: ExpenseCategory::Rent,
            date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            receipt: None,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        repo.insert(&expense("e1", 1)).await.unwrap();
        repo.insert(&expense("e2", 5)).await.unwrap();

        let ids: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["e2", "e1"]);
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.expenses();

        repo.insert(&expense("e1", 1)).await.unwrap();
        let err = repo.insert(&expense("e1", 2)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "e1"));
    }
}
