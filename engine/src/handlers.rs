//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - ask: Route a question and print the grounded answer
//! - seed: Provision the schema and load the demo dataset
//! - doctor: Validate configuration and check store/model availability
//!
//! All handlers go through the shared `Bootstrap` guard, so repeated
//! commands in one process reuse the same store pool and model clients.

use anyhow::Result;
use sdk::errors::AnalystErrorExt;
use sdk::types::Provenance;
use serde_json::json;

use crate::bootstrap::Bootstrap;
use crate::config::Config;
use crate::db::seed::seed_demo_data;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Process-wide boot-once guard
static BOOT: Bootstrap = Bootstrap::new();

/// Answer one question and print the result
pub async fn handle_ask(question: String, config: &Config, format: OutputFormat) -> Result<()> {
    let analyst = BOOT.get_or_boot(config).await?;

    match analyst.answer(&question).await {
        Ok(response) => {
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Text => {
                    println!("{}", response.answer_text);
                    let evidence = match &response.provenance {
                        Provenance::Rows { rows } => format!("{} row(s)", rows.len()),
                        Provenance::Chunks { chunks } => format!("{} chunk(s)", chunks.len()),
                    };
                    println!();
                    println!("[{} | {}]", response.tool_id, evidence);
                }
            }
            Ok(())
        }
        Err(e) => {
            let hint = e.user_hint().to_string();
            Err(anyhow::Error::new(e).context(hint))
        }
    }
}

/// Provision the schema and load the synthetic demo dataset
pub async fn handle_seed(config: &Config, format: OutputFormat) -> Result<()> {
    let analyst = BOOT.get_or_boot(config).await?;

    let report = seed_demo_data(analyst.db(), analyst.embedder().as_ref()).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "records": report.records,
                    "documents": report.documents,
                })
            );
        }
        OutputFormat::Text => {
            println!(
                "Seeded {} financial records and {} strategic documents.",
                report.records, report.documents
            );
        }
    }

    Ok(())
}

/// Validate configuration and check store/model availability
pub async fn handle_doctor(config: &Config, format: OutputFormat) -> Result<()> {
    let analyst = BOOT.get_or_boot(config).await?;

    let records = crate::db::FinancialStore::new(analyst.db().pool().clone())
        .count()
        .await;
    let documents =
        crate::db::DocumentStore::new(analyst.db().pool().clone(), config.embedding.dimension)
            .count()
            .await;
    let chat_healthy = analyst.chat().check_health().await;
    let embedder_healthy = analyst.embedder().check_health().await;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                json!({
                    "store": {
                        "reachable": records.is_ok() && documents.is_ok(),
                        "financial_records": records.as_ref().ok(),
                        "strategic_docs": documents.as_ref().ok(),
                    },
                    "chat_model": { "healthy": chat_healthy, "model": config.llm.model },
                    "embedding_model": {
                        "healthy": embedder_healthy,
                        "model": config.embedding.model,
                        "dimension": config.embedding.dimension,
                    },
                })
            );
        }
        OutputFormat::Text => {
            println!("Configuration: ok");
            match (&records, &documents) {
                (Ok(r), Ok(d)) => {
                    println!("Store:         ok ({} records, {} documents)", r, d)
                }
                _ => println!("Store:         unreachable"),
            }
            println!(
                "Chat model:    {} ({})",
                if chat_healthy { "ok" } else { "unavailable" },
                config.llm.model
            );
            println!(
                "Embeddings:    {} ({}, dimension {})",
                if embedder_healthy { "ok" } else { "unavailable" },
                config.embedding.model,
                config.embedding.dimension
            );
        }
    }

    Ok(())
}
