//! # Search Log Repository
//!
//! Append-only history of catalog searches (text and photo), read back for
//! the SEARCH_LOGS report.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::parse_column;
use loom_core::SearchLog;

#[derive(Debug, sqlx::FromRow)]
struct SearchLogRow {
    id: String,
    client_id: String,
    client_name: String,
    log_type: String,
    query: Option<String>,
    results_count: i64,
    timestamp: DateTime<Utc>,
}

impl TryFrom<SearchLogRow> for SearchLog {
    type Error = DbError;

    fn try_from(row: SearchLogRow) -> DbResult<Self> {
        Ok(SearchLog {
            log_type: parse_column("log_type", &row.log_type)?,
            id: row.id,
            client_id: row.client_id,
            client_name: row.client_name,
            query: row.query,
            results_count: row.results_count,
            timestamp: row.timestamp,
        })
    }
}

/// Repository for search log operations.
#[derive(Debug, Clone)]
pub struct SearchLogRepository {
    pool: SqlitePool,
}

impl SearchLogRepository {
    /// Creates a new SearchLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SearchLogRepository { pool }
    }

    /// Lists search logs, newest first.
    pub async fn list(&self) -> DbResult<Vec<SearchLog>> {
        let rows: Vec<SearchLogRow> = sqlx::query_as(
            r#"
            SELECT id, client_id, client_name, log_type, query, results_count, timestamp
            FROM search_logs
            ORDER BY timestamp DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SearchLog::try_from).collect()
    }

    /// Appends a search log entry.
    pub async fn insert(&self, log: &SearchLog) -> DbResult<()> {
        debug!(
            client_id = %log.client_id,
            log_type = %log.log_type,
            results = log.results_count,
            "Recording search"
        );

        sqlx::query(
            r#"
            INSERT INTO search_logs (id, client_id, client_name, log_type, query, results_count, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&log.id)
        .bind(&log.client_id)
        .bind(&log.client_name)
        .bind(log.log_type.as_str())
        .bind(&log.query)
        .bind(log.results_count)
        .bind(log.timestamp)
        .execute(&self.pool)
        .await?;

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
    use loom_core::{SearchLog, SearchLogType};

    #[tokio::test]
    async fn test_photo_log_without_query() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.search_logs();

        let log = SearchLog {
            id: "s1".to_string(),
            client_id: "c1".to_string(),
            client_name: "Aida".to_string(),
            log_type: SearchLogType::Photo,
            query: None,
            results_count: 3,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
        };
        repo.insert(&log).await.unwrap();

        assert_eq!(repo.list().await.unwrap(), vec![log]);
    }
}
