//! Structured retrieval engine
//!
//! Translates a natural-language question into a single read-only SQL query
//! over the `financial_records` schema, executes it, and renders the literal
//! rows as a natural-language summary. The generated query text originates
//! from a model and is never trusted as safe: a mandatory guard rejects
//! anything that is not a single SELECT statement before execution.
//!
//! Numeric aggregation always happens in SQL execution. The summarization
//! call only narrates rows it is given.

use async_trait::async_trait;
use regex::Regex;
use sdk::errors::EngineError;
use sdk::retrieval_tool::RetrievalTool;
use sdk::types::{EngineResponse, Provenance};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::db::records::{FinancialStore, FINANCIAL_RECORDS_DDL};
use crate::llm::{extract_fenced_block, LLMProvider, Message};

/// Stable identifier of the structured path
pub const STRUCTURED_TOOL_ID: &str = "financial_sql";

/// Capability description advertised to the selector
const CAPABILITY: &str = "Useful for translating a natural language query into a SQL query over \
     the financial_records table, containing date, department, category, vendor, and amount. \
     Use this for questions about money, spending, costs, or totals.";

/// Rows beyond this many are elided from the summarization prompt.
/// Provenance always carries the full result set.
const MAX_PROMPT_ROWS: usize = 50;

/// Tokens that disqualify a generated query from execution.
///
/// The scan is conservative: a SELECT whose string literal happens to
/// contain one of these words is rejected too. A refused query costs one
/// rephrase; an executed mutation cannot be taken back.
fn mutating_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(insert|update|delete|drop|alter|create|replace|truncate|attach|detach|pragma|vacuum|reindex)\b",
        )
        .expect("guard pattern is valid")
    })
}

/// Reject any generated query that is not a single read-only statement.
pub fn ensure_read_only(sql: &str) -> Result<(), EngineError> {
    let trimmed = sql.trim().trim_end_matches(';').trim();

    if trimmed.is_empty() {
        return Err(EngineError::UnsafeQueryRejected(
            "empty statement".to_string(),
        ));
    }

    if trimmed.contains(';') {
        return Err(EngineError::UnsafeQueryRejected(
            "multiple statements".to_string(),
        ));
    }

    let first_word = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if first_word != "select" && first_word != "with" {
        return Err(EngineError::UnsafeQueryRejected(format!(
            "statement must start with SELECT, got '{}'",
            first_word
        )));
    }

    if let Some(found) = mutating_token_pattern().find(trimmed) {
        return Err(EngineError::UnsafeQueryRejected(format!(
            "mutating token '{}'",
            found.as_str()
        )));
    }

    Ok(())
}

/// Pull the SQL statement out of a model response.
///
/// Models are instructed to emit bare SQL but frequently wrap it in code
/// fences anyway.
pub fn extract_sql(raw: &str) -> String {
    let body = extract_fenced_block(raw).unwrap_or(raw);
    body.trim().to_string()
}

/// The structured retrieval path
pub struct SqlRetrievalEngine {
    llm: Arc<dyn LLMProvider>,
    store: FinancialStore,
}

impl SqlRetrievalEngine {
    /// Create a new engine over the shared chat model and store handle
    pub fn new(llm: Arc<dyn LLMProvider>, store: FinancialStore) -> Self {
        Self { llm, store }
    }

    fn generation_messages(question: &str) -> Vec<Message> {
        let system = format!(
            "You translate business questions into a single read-only SQLite SELECT \
             statement over this schema:\n\n{}\n\n\
             Rules:\n\
             - Output exactly one SELECT (or WITH ... SELECT) statement and nothing else. \
             No commentary, no code fences.\n\
             - Never use INSERT, UPDATE, DELETE, or any DDL.\n\
             - Compute aggregates (SUM, COUNT, AVG) in SQL, with descriptive column aliases.",
            FINANCIAL_RECORDS_DDL
        );

        vec![Message::system(system), Message::user(question)]
    }

    fn summary_messages(question: &str, rows: &[serde_json::Value]) -> Vec<Message> {
        let shown = &rows[..rows.len().min(MAX_PROMPT_ROWS)];
        let mut rendered = serde_json::Value::from(shown.to_vec()).to_string();
        if rows.len() > MAX_PROMPT_ROWS {
            rendered.push_str(&format!(
                "\n(showing first {} of {} rows)",
                MAX_PROMPT_ROWS,
                rows.len()
            ));
        }

        let system = "You summarize query results for business questions. Use only the \
                      values present in the rows. Do not invent, estimate, or extrapolate \
                      any value that is not present. Quote exact figures as they appear.";

        vec![
            Message::system(system),
            Message::user(format!(
                "Question: {}\n\nRows (JSON):\n{}",
                question, rendered
            )),
        ]
    }
}

#[async_trait]
impl RetrievalTool for SqlRetrievalEngine {
    fn id(&self) -> &str {
        STRUCTURED_TOOL_ID
    }

    fn describe(&self) -> &str {
        CAPABILITY
    }

    async fn invoke(&self, question: &str) -> Result<EngineResponse, EngineError> {
        let raw = self.llm.complete(&Self::generation_messages(question)).await?;
        let sql = extract_sql(&raw);
        debug!(%sql, "Generated query");

        if let Err(rejection) = ensure_read_only(&sql) {
            warn!(%sql, %rejection, "Rejected generated query");
            return Err(rejection);
        }

        let rows = self.store.execute_read(&sql).await?;

        // Empty result set: state it plainly rather than giving the model a
        // chance to fabricate a number.
        if rows.is_empty() {
            return Ok(EngineResponse::new(
                "No matching records were found for this question.",
                Provenance::Rows { rows },
                STRUCTURED_TOOL_ID,
            ));
        }

        let answer = self.llm.complete(&Self::summary_messages(question, &rows)).await?;

        Ok(EngineResponse::new(
            answer,
            Provenance::Rows { rows },
            STRUCTURED_TOOL_ID,
        ))
    }
}
