//! Structured store: the `financial_records` table
//!
//! The core treats this table as read-only. The schema is fixed and known
//! to the query-generation prompt; generated queries are executed verbatim
//! once the read-only guard has accepted them, so aggregates come from SQL
//! execution rather than model arithmetic.

use sdk::errors::EngineError;
use sqlx::SqlitePool;

use super::row_to_json;

/// Fixed schema definition handed to the query-generation prompt.
///
/// Must stay in sync with migrations/001_initial.sql.
pub const FINANCIAL_RECORDS_DDL: &str = "\
CREATE TABLE financial_records (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,          -- ISO-8601, e.g. '2023-10-01'
    department TEXT NOT NULL,
    category TEXT NOT NULL,
    vendor TEXT NOT NULL,
    amount REAL NOT NULL,
    description TEXT
)";

/// One financial record as seeded by the ingestion collaborator
#[derive(Debug, Clone)]
pub struct FinancialRecord {
    pub date: &'static str,
    pub department: &'static str,
    pub category: &'static str,
    pub vendor: &'static str,
    pub amount: f64,
    pub description: &'static str,
}

/// Read-only access to the structured store
#[derive(Clone)]
pub struct FinancialStore {
    pool: SqlitePool,
}

impl FinancialStore {
    /// Create a new store handle over a shared pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute an already-validated read query and capture the literal rows.
    ///
    /// The caller is responsible for the read-only guard; this method only
    /// maps execution failures to the store error category.
    pub async fn execute_read(&self, sql: &str) -> Result<Vec<serde_json::Value>, EngineError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(format!("Query execution failed: {}", e)))?;

        rows.iter()
            .map(|row| {
                row_to_json(row).map_err(|e| {
                    EngineError::StoreUnavailable(format!("Row decoding failed: {}", e))
                })
            })
            .collect()
    }

    /// Count all records. Used by diagnostics.
    pub async fn count(&self) -> Result<i64, EngineError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM financial_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tempfile::TempDir;

    async fn seeded_store() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();

        sqlx::query(
            "INSERT INTO financial_records (date, department, category, vendor, amount, description)
             VALUES ('2023-10-01', 'IT', 'Software', 'AWS', 15400.0, 'Cloud Infrastructure Q3'),
                    ('2023-11-01', 'IT', 'Software', 'AWS', 16200.0, 'Cloud Infrastructure Q4 Start')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        (temp_dir, db)
    }

    #[tokio::test]
    async fn test_execute_read_returns_rows() {
        let (_guard, db) = seeded_store().await;
        let store = FinancialStore::new(db.pool().clone());

        let rows = store
            .execute_read("SELECT vendor, amount FROM financial_records ORDER BY amount")
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["vendor"], "AWS");
        assert_eq!(rows[0]["amount"], 15400.0);
    }

    #[tokio::test]
    async fn test_aggregate_computed_by_store() {
        let (_guard, db) = seeded_store().await;
        let store = FinancialStore::new(db.pool().clone());

        let rows = store
            .execute_read(
                "SELECT SUM(amount) AS total_amount FROM financial_records WHERE vendor = 'AWS'",
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["total_amount"], 31600.0);
    }

    #[tokio::test]
    async fn test_execute_read_empty_result() {
        let (_guard, db) = seeded_store().await;
        let store = FinancialStore::new(db.pool().clone());

        let rows = store
            .execute_read("SELECT * FROM financial_records WHERE vendor = 'Nobody'")
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_query_is_store_error() {
        let (_guard, db) = seeded_store().await;
        let store = FinancialStore::new(db.pool().clone());

        let err = store
            .execute_read("SELECT nonexistent_column FROM financial_records")
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_count() {
        let (_guard, db) = seeded_store().await;
        let store = FinancialStore::new(db.pool().clone());

        assert_eq!(store.count().await.unwrap(), 2);
    }
}
