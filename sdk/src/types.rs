//! Unified response and provenance types
//!
//! Both retrieval engines return the same response shape. The provenance
//! field carries the literal evidence the answer was grounded in — SQL rows
//! for the structured path, document chunks for the semantic path — so the
//! caller can always trace a claim back to stored data.

use serde::{Deserialize, Serialize};

/// Response produced by a retrieval engine for one question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    /// Natural-language answer text
    pub answer_text: String,

    /// Literal evidence the answer was synthesized from
    pub provenance: Provenance,

    /// Id of the tool that produced this response
    pub tool_id: String,
}

impl EngineResponse {
    /// Create a new response
    pub fn new(
        answer_text: impl Into<String>,
        provenance: Provenance,
        tool_id: impl Into<String>,
    ) -> Self {
        Self {
            answer_text: answer_text.into(),
            provenance,
            tool_id: tool_id.into(),
        }
    }
}

/// Evidence behind an answer: rows from the structured store, or chunks
/// from the vector store. Exactly one shape per response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Literal result rows from the structured store, keyed by column name
    Rows { rows: Vec<serde_json::Value> },

    /// Retrieved document chunks from the vector store
    Chunks { chunks: Vec<RetrievedChunk> },
}

impl Provenance {
    /// Number of evidence items carried
    pub fn len(&self) -> usize {
        match self {
            Self::Rows { rows } => rows.len(),
            Self::Chunks { chunks } => chunks.len(),
        }
    }

    /// True when no evidence was retrieved
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A document chunk returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk text
    pub text: String,

    /// Cosine similarity against the query embedding
    pub score: f32,

    /// Metadata stored alongside the chunk at index time
    pub metadata: serde_json::Value,
}
