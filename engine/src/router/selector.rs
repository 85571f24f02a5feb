//! Tool selector
//!
//! Issues one classification call per query: the question plus the ordered
//! capability descriptors go to the chat model, which is instructed to
//! answer with exactly one tool id. The free-text output is never trusted
//! as structurally correct — it is parsed against the exact candidate-id
//! set before any dispatch, and a selection that yields no valid id fails
//! with `SelectionFailure` rather than defaulting to an arbitrary tool.
//! A registry holding a single tool bypasses the model call entirely.

use sdk::errors::EngineError;
use sdk::retrieval_tool::ToolDescriptor;
use std::sync::Arc;
use tracing::debug;

use crate::llm::{LLMProvider, Message};

/// Routing decision for one query. Produced fresh per query, not persisted.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Id of the selected tool, validated against the candidate set
    pub selected_tool_id: String,

    /// Raw classification output, kept for tracing
    pub rationale: Option<String>,
}

/// Selects exactly one tool per query
pub struct Selector {
    llm: Arc<dyn LLMProvider>,
}

impl Selector {
    /// Create a new selector over the shared chat model
    pub fn new(llm: Arc<dyn LLMProvider>) -> Self {
        Self { llm }
    }

    /// Classify the question against the candidate set.
    ///
    /// Single-selection only: this never returns multiple tools or partial
    /// weights.
    pub async fn select(
        &self,
        question: &str,
        candidates: &[ToolDescriptor],
    ) -> Result<RoutingDecision, EngineError> {
        match candidates.len() {
            0 => Err(EngineError::Config(
                "Routing attempted with no tools registered".to_string(),
            )),
            1 => {
                // Trivial selection: no model call needed
                debug!(tool = %candidates[0].id, "Single candidate, bypassing classification");
                Ok(RoutingDecision {
                    selected_tool_id: candidates[0].id.clone(),
                    rationale: Some("only registered tool".to_string()),
                })
            }
            _ => {
                let raw = self
                    .llm
                    .complete(&Self::classification_messages(question, candidates))
                    .await?;
                debug!(%raw, "Classification output");
                parse_selection(&raw, candidates)
            }
        }
    }

    fn classification_messages(question: &str, candidates: &[ToolDescriptor]) -> Vec<Message> {
        let listing = candidates
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                format!(
                    "{}. {}: {}",
                    index + 1,
                    descriptor.id,
                    descriptor.capability_text
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let system = format!(
            "You route business questions to retrieval tools by capability. \
             Select the single best tool for the question.\n\n\
             Available tools:\n{}\n\n\
             Respond with exactly one tool id from the list and nothing else.",
            listing
        );

        vec![Message::system(system), Message::user(question)]
    }
}

/// Parse raw classification output against the candidate-id set.
///
/// An exact (trimmed, unquoted) match is accepted directly. Otherwise the
/// earliest occurrence of any candidate id in the text wins — a documented
/// tie-break, not silent ambiguity. Zero extractable ids is a
/// `SelectionFailure`.
pub fn parse_selection(
    raw: &str,
    candidates: &[ToolDescriptor],
) -> Result<RoutingDecision, EngineError> {
    let trimmed = raw.trim();
    let unquoted = trimmed.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | ' '));

    if let Some(descriptor) = candidates.iter().find(|c| c.id == unquoted) {
        return Ok(RoutingDecision {
            selected_tool_id: descriptor.id.clone(),
            rationale: (trimmed != descriptor.id).then(|| trimmed.to_string()),
        });
    }

    // Earliest embedded occurrence wins; candidate order breaks exact ties
    let earliest = candidates
        .iter()
        .filter_map(|descriptor| raw.find(&descriptor.id).map(|pos| (pos, descriptor)))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((_, descriptor)) => Ok(RoutingDecision {
            selected_tool_id: descriptor.id.clone(),
            rationale: Some(trimmed.to_string()),
        }),
        None => {
            let excerpt: String = trimmed.chars().take(120).collect();
            Err(EngineError::SelectionFailure(format!(
                "no candidate tool id in classification output: '{}'",
                excerpt
            )))
        }
    }
}
