//! Retrieval tool trait and descriptor types
//!
//! This module defines the `RetrievalTool` trait that both retrieval engines
//! implement. The router and selector depend only on this interface, never
//! on concrete engine types: the selector reads capability descriptions, the
//! router dispatches the chosen tool's `invoke`.

use crate::errors::EngineError;
use crate::types::EngineResponse;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait implemented by each retrieval path
#[async_trait]
pub trait RetrievalTool: Send + Sync {
    /// Stable identifier, unique within a registry
    fn id(&self) -> &str;

    /// Free-form description of what kinds of questions this tool answers.
    ///
    /// This text is the only signal the selector uses.
    fn describe(&self) -> &str;

    /// Answer one question against this tool's backing store
    async fn invoke(&self, question: &str) -> Result<EngineResponse, EngineError>;
}

/// Capability descriptor advertised to the selector
///
/// Immutable after registration. Registry order is significant only as the
/// deterministic tie-break order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Stable identifier
    pub id: String,

    /// Free-form capability description
    pub capability_text: String,
}

impl ToolDescriptor {
    /// Build a descriptor from a registered tool
    pub fn for_tool(tool: &dyn RetrievalTool) -> Self {
        Self {
            id: tool.id().to_string(),
            capability_text: tool.describe().to_string(),
        }
    }
}
