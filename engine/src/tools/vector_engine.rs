//! Semantic retrieval engine
//!
//! Embeds the question, retrieves the nearest indexed chunks by cosine
//! similarity, and synthesizes an answer strictly from the retrieved text.
//! The synthesis prompt carries only chunk text as context and instructs
//! the model to say so when that context does not address the question —
//! an off-topic query must come back as "not covered", not as an invented
//! cause.

use async_trait::async_trait;
use sdk::errors::EngineError;
use sdk::retrieval_tool::RetrievalTool;
use sdk::types::{EngineResponse, Provenance, RetrievedChunk};
use std::sync::Arc;
use tracing::debug;

use crate::config::RetrievalConfig;
use crate::db::DocumentStore;
use crate::llm::embedding::EmbeddingProvider;
use crate::llm::{LLMProvider, Message};

/// Stable identifier of the semantic path
pub const SEMANTIC_TOOL_ID: &str = "strategic_docs";

/// Capability description advertised to the selector
const CAPABILITY: &str = "Useful for answering semantic questions about business strategy, \
     decisions, quarterly reports, and qualitative rationale. \
     Use this for questions asking 'Why', 'How', or for summaries.";

/// The semantic retrieval path
pub struct VectorRetrievalEngine {
    llm: Arc<dyn LLMProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: DocumentStore,
    retrieval: RetrievalConfig,
}

impl VectorRetrievalEngine {
    /// Create a new engine over the shared model clients and store handle
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: DocumentStore,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            retrieval,
        }
    }

    fn synthesis_messages(question: &str, chunks: &[RetrievedChunk]) -> Vec<Message> {
        let context = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| format!("[{}] {}", index + 1, chunk.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let system = "You answer business questions strictly from the provided context \
                      passages. If the context does not address the question, say so \
                      explicitly instead of speculating. Never introduce figures or \
                      claims that are not in the context.";

        vec![
            Message::system(system),
            Message::user(format!(
                "Context passages:\n{}\n\nQuestion: {}",
                context, question
            )),
        ]
    }
}

#[async_trait]
impl RetrievalTool for VectorRetrievalEngine {
    fn id(&self) -> &str {
        SEMANTIC_TOOL_ID
    }

    fn describe(&self) -> &str {
        CAPABILITY
    }

    async fn invoke(&self, question: &str) -> Result<EngineResponse, EngineError> {
        let query = self.embedder.embed(question).await?;

        let chunks = self
            .store
            .search(&query, self.retrieval.top_k, self.retrieval.similarity_floor)
            .await?;
        debug!(retrieved = chunks.len(), "Similarity search complete");

        // Empty store (or nothing above the floor): state it plainly.
        if chunks.is_empty() {
            return Ok(EngineResponse::new(
                "No relevant documents were found for this question.",
                Provenance::Chunks { chunks },
                SEMANTIC_TOOL_ID,
            ));
        }

        let answer = self
            .llm
            .complete(&Self::synthesis_messages(question, &chunks))
            .await?;

        Ok(EngineResponse::new(
            answer,
            Provenance::Chunks { chunks },
            SEMANTIC_TOOL_ID,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk(text: &str, score: f32) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            score,
            metadata: json!({}),
        }
    }

    #[test]
    fn test_synthesis_prompt_numbers_passages() {
        let chunks = vec![
            chunk("The Q3 Cloud Strategy scaled AWS infrastructure.", 0.9),
            chunk("Marketing spend shifts to organic growth.", 0.4),
        ];

        let messages = VectorRetrievalEngine::synthesis_messages("Why is Q3 high?", &chunks);

        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("strictly from the provided context"));
        assert!(messages[1].content.contains("[1] The Q3 Cloud Strategy"));
        assert!(messages[1].content.contains("[2] Marketing spend"));
        assert!(messages[1].content.contains("Why is Q3 high?"));
    }

    #[test]
    fn test_synthesis_prompt_contains_only_chunk_text_as_context() {
        let chunks = vec![chunk("single passage", 1.0)];
        let messages = VectorRetrievalEngine::synthesis_messages("question", &chunks);

        // Scores and metadata stay out of the prompt
        assert!(!messages[1].content.contains("1.0"));
        assert!(!messages[1].content.contains("metadata"));
    }
}
