//! Schema provisioning and synthetic data seeding
//!
//! External ingestion collaborator: resets both stores and loads the demo
//! dataset — five financial records and three strategic documents. The
//! documents are embedded at ingest time with the same configured provider
//! and dimensionality the query path uses, so indexed vectors and query
//! vectors can never diverge.

use sdk::errors::EngineError;
use serde_json::json;
use tracing::info;

use super::{Database, DocumentStore};
use crate::db::records::FinancialRecord;
use crate::llm::embedding::EmbeddingProvider;

/// Counts of what seeding inserted
#[derive(Debug, Clone, Copy)]
pub struct SeedReport {
    pub records: usize,
    pub documents: usize,
}

/// Synthetic financial data
const FINANCIAL_DATA: &[FinancialRecord] = &[
    FinancialRecord {
        date: "2023-10-01",
        department: "IT",
        category: "Software",
        vendor: "AWS",
        amount: 15400.00,
        description: "Cloud Infrastructure Q3",
    },
    FinancialRecord {
        date: "2023-10-05",
        department: "Marketing",
        category: "Ads",
        vendor: "Google Ads",
        amount: 4500.50,
        description: "Q3 Campaign",
    },
    FinancialRecord {
        date: "2023-11-01",
        department: "IT",
        category: "Software",
        vendor: "AWS",
        amount: 16200.00,
        description: "Cloud Infrastructure Q4 Start",
    },
    FinancialRecord {
        date: "2023-11-15",
        department: "HR",
        category: "Training",
        vendor: "Udemy",
        amount: 1200.00,
        description: "Python Training",
    },
    FinancialRecord {
        date: "2023-12-01",
        department: "IT",
        category: "Hardware",
        vendor: "Dell",
        amount: 8500.00,
        description: "New Laptops",
    },
];

/// Synthetic strategic documents
const STRATEGIC_DOCS: &[&str] = &[
    "The Q3 Cloud Strategy focused on scaling our AWS infrastructure to handle \
     the Black Friday traffic surge. This resulted in a 10% increase in spend \
     compared to Q2.",
    "Marketing spend for Q4 is projected to decrease as we shift from paid ads \
     to organic social media growth.",
    "The IT Hardware budget was utilized to upgrade developer laptops. We chose \
     Dell over Apple to maintain compatibility with Windows legacy systems.",
];

/// Reset both stores and load the demo dataset.
///
/// Existing rows are cleared first, so seeding is repeatable during
/// development.
pub async fn seed_demo_data(
    db: &Database,
    embedder: &dyn EmbeddingProvider,
) -> Result<SeedReport, EngineError> {
    info!("Seeding demo data");

    sqlx::query("DELETE FROM financial_records")
        .execute(db.pool())
        .await
        .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;
    sqlx::query("DELETE FROM strategic_docs")
        .execute(db.pool())
        .await
        .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;

    for record in FINANCIAL_DATA {
        sqlx::query(
            "INSERT INTO financial_records (date, department, category, vendor, amount, description)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.date)
        .bind(record.department)
        .bind(record.category)
        .bind(record.vendor)
        .bind(record.amount)
        .bind(record.description)
        .execute(db.pool())
        .await
        .map_err(|e| EngineError::StoreUnavailable(format!("Record insert failed: {}", e)))?;
    }
    info!("Inserted {} financial records", FINANCIAL_DATA.len());

    let docs = DocumentStore::new(db.pool().clone(), embedder.dimension());
    for (position, text) in STRATEGIC_DOCS.iter().enumerate() {
        let embedding = embedder.embed(text).await?;
        docs.insert_chunk(text, &embedding, json!({"source": "seed", "position": position}))
            .await?;
    }
    info!("Indexed {} strategic documents", STRATEGIC_DOCS.len());

    Ok(SeedReport {
        records: FINANCIAL_DATA.len(),
        documents: STRATEGIC_DOCS.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Deterministic stand-in for the embedding endpoint
    struct StubEmbedder {
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        fn dimension(&self) -> usize {
            self.dimension
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
            let mut vector = vec![0.0; self.dimension];
            vector[text.len() % self.dimension] = 1.0;
            Ok(vector)
        }
    }

    #[tokio::test]
    async fn test_seed_inserts_all_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        let embedder = StubEmbedder { dimension: 4 };

        let report = seed_demo_data(&db, &embedder).await.unwrap();

        assert_eq!(report.records, 5);
        assert_eq!(report.documents, 3);

        let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial_records")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(records, 5);

        let aws_total: f64 = sqlx::query_scalar(
            "SELECT SUM(amount) FROM financial_records WHERE vendor = 'AWS'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(aws_total, 31600.0);
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        let embedder = StubEmbedder { dimension: 4 };

        seed_demo_data(&db, &embedder).await.unwrap();
        seed_demo_data(&db, &embedder).await.unwrap();

        let docs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM strategic_docs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(docs, 3);
    }
}
