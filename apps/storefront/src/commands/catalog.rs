//! # Catalog Commands
//!
//! Product maintenance, text search and business expenses.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::{Collections, PersistJob, Storefront, MAX_SEARCH_LOGS};
use loom_core::search::filter_catalog;
use loom_core::validation::{validate_currency, validate_search_query, validate_sku};
use loom_core::{
    Expense, ExpenseCategory, Money, Product, ProductType, SearchLog, SearchLogType, ValidationError,
};

/// Text searches shorter than this are not worth logging.
const MIN_LOGGED_QUERY_LEN: usize = 3;
/// Creates or updates a product.
///
/// ## Rules
/// - SKU must be valid and unique across other products
/// - Price must not be negative and MOQ must be at least 1
/// - Stock counters are clamped to zero
pub async fn save_product(sf: &Storefront, mut product: Product) -> ApiResult<Product> {
    debug!(product_id = %product.id, sku = %product.sku, "save_product command");

    validate_sku(&product.sku)?;
    validate_currency(&product.currency)?;
    if product.price.is_negative() {
        return Err(ApiError::validation("Price cannot be negative"));
    }
    if product.moq < 1 {
        return Err(ApiError::validation("Minimum order quantity must be at least 1"));
    }
    product.sku = product.sku.trim().to_string();
    product.available_qty = product.available_qty.max(0);
    product.reserved_qty = product.reserved_qty.max(0);
    for variant in &mut product.variants {
        variant.stock = variant.stock.max(0);
    }

    let product = sf.with_data(|data| -> ApiResult<Product> {
        if data
            .products
            .iter()
            .any(|p| p.id != product.id && p.sku.eq_ignore_ascii_case(&product.sku))
        {
            return Err(ApiError::validation(format!("SKU '{}' already exists", product.sku)));
        }

        match data.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => data.products.push(product.clone()),
        }
        Ok(product)
    })?;

    info!(product_id = %product.id, sku = %product.sku, "Product saved");
    sf.persist(vec![PersistJob::UpsertProduct(product.clone())]).await;
    Ok(product)
}

/// Filters the catalog by type and text.
///
/// Queries longer than two characters are recorded as TEXT search logs.
pub async fn search_catalog(
    sf: &Storefront,
    client_id: &str,
    product_type: Option<ProductType>,
    query: &str,
) -> ApiResult<Vec<Product>> {
    let query = validate_search_query(query)?;
    debug!(client_id = %client_id, query = %query, product_type = ?product_type, "search_catalog command");

    let (results, log) = sf.with_data(|data| {
        let results: Vec<Product> = filter_catalog(&data.products, product_type, &query)
            .into_iter()
            .cloned()
            .collect();

        let log = (query.chars().count() >= MIN_LOGGED_QUERY_LEN).then(|| {
            record_search(data, client_id, SearchLogType::Text, Some(query.clone()), results.len(), Utc::now())
        });
        (results, log)
    });

    if let Some(log) = log {
        sf.persist(vec![PersistJob::CreateSearchLog(log)]).await;
    }
    Ok(results)
}

/// Appends a search log to the collections and returns it for persistence.
pub(crate) fn record_search(
    data: &mut Collections,
    client_id: &str,
    log_type: SearchLogType,
    query: Option<String>,
    results_count: usize,
    timestamp: DateTime<Utc>,
) -> SearchLog {
    let client_name = data
        .client(client_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| client_id.to_string());

    let log = SearchLog {
        id: Uuid::new_v4().to_string(),
        client_id: client_id.to_string(),
        client_name,
        log_type,
        query,
        results_count: results_count as i64,
        timestamp,
    };
    data.search_logs.insert(0, log.clone());
    data.search_logs.truncate(MAX_SEARCH_LOGS);
    log
}

/// Records a business expense.
pub async fn add_expense(
    sf: &Storefront,
    title: &str,
    amount: Money,
    category: ExpenseCategory,
    date: Option<DateTime<Utc>>,
    receipt: Option<String>,
) -> ApiResult<Expense> {
    debug!(title = %title, amount = %amount, category = %category, "add_expense command");

    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "expense title".to_string(),
        }
        .into());
    }
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "expense amount".to_string(),
        }
        .into());
    }

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        amount,
        category,
        date: date.unwrap_or_else(Utc::now),
        receipt,
    };

    sf.with_data(|data| data.expenses.push(expense.clone()));
    info!(expense_id = %expense.id, amount = %expense.amount, "Expense recorded");
    sf.persist(vec![PersistJob::CreateExpense(expense.clone())]).await;
    Ok(expense)
}

/// Expenses, newest first.
pub fn list_expenses(sf: &Storefront) -> Vec<Expense> {
    let mut expenses = sf.with_data(|data| data.expenses.clone());
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    expenses
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{at, client, fabric, storefront_with};
    use crate::error::ErrorCode;
    use loom_db::Store;

    #[tokio::test]
    async fn test_search_logs_only_longer_queries() {
        let (sf, store) = storefront_with(
            vec![fabric("silk", 1000, 0), fabric("linen", 800, 0)],
            vec![client("c1", "Aida")],
            vec![],
        )
        .await;

        let hits = search_catalog(&sf, "c1", Some(ProductType::Fabric), "  SKU-SILK ").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "silk");

        let all = search_catalog(&sf, "c1", None, "si").await.unwrap();
        assert_eq!(all.len(), 1);

        let logs = sf.snapshot().search_logs;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].log_type, SearchLogType::Text);
        assert_eq!(logs[0].query.as_deref(), Some("SKU-SILK"));
        assert_eq!(logs[0].client_name, "Aida");
        assert_eq!(logs[0].results_count, 1);

        sf.flush().await;
        assert_eq!(store.search_logs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_log_keeps_newest() {
        let (sf, store) = storefront_with(vec![], vec![client("c1", "Aida")], vec![]).await;

        sf.with_data(|data| {
            for i in 0..MAX_SEARCH_LOGS + 5 {
                record_search(data, "c1", SearchLogType::Text, Some(format!("q{}", i)), 0, at(1));
            }
        });

        let logs = sf.snapshot().search_logs;
        assert_eq!(logs.len(), MAX_SEARCH_LOGS);
        assert_eq!(logs[0].query.as_deref(), Some("q104"));
        assert_eq!(logs[MAX_SEARCH_LOGS - 1].query.as_deref(), Some("q5"));

        search_catalog(&sf, "c1", None, "linen").await.unwrap();
        sf.flush().await;
        assert_eq!(sf.snapshot().search_logs[0].query.as_deref(), Some("linen"));
        assert_eq!(store.search_logs().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_rejects_long_query() {
        let (sf, _) = storefront_with(vec![], vec![], vec![]).await;
        let err = search_catalog(&sf, "c1", None, &"x".repeat(101)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_save_product_validates_and_clamps() {
        let (sf, store) = storefront_with(vec![fabric("silk", 1000, 0)], vec![], vec![]).await;

        let mut linen = fabric("linen", 800, -4);
        linen.sku = "SKU-SILK".to_string();
        assert_eq!(save_product(&sf, linen.clone()).await.unwrap_err().code, ErrorCode::ValidationError);

        linen.sku = "bad sku".to_string();
        assert!(save_product(&sf, linen.clone()).await.is_err());

        linen.sku = "LIN-01".to_string();
        let saved = save_product(&sf, linen).await.unwrap();
        assert_eq!(saved.available_qty, 0);

        sf.flush().await;
        assert_eq!(store.products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_expense() {
        let (sf, store) = storefront_with(vec![], vec![], vec![]).await;

        let rent = add_expense(&sf, "Rent", Money::from_cents(50_000), ExpenseCategory::Rent, Some(at(1)), None)
            .await
            .unwrap();
        add_expense(&sf, "Ads", Money::from_cents(1_000), ExpenseCategory::Marketing, Some(at(2)), None)
            .await
            .unwrap();
        assert!(add_expense(&sf, " ", Money::from_cents(1), ExpenseCategory::Other, None, None).await.is_err());
        assert!(add_expense(&sf, "Zero", Money::zero(), ExpenseCategory::Other, None, None).await.is_err());

        let expenses = list_expenses(&sf);
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[1].id, rent.id);

        sf.flush().await;
        assert_eq!(store.expenses().await.unwrap().len(), 2);
    }
}
