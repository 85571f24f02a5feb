pub mod sql_engine;
pub mod vector_engine;

pub use sql_engine::SqlRetrievalEngine;
pub use vector_engine::VectorRetrievalEngine;

use sdk::errors::EngineError;
use sdk::retrieval_tool::{RetrievalTool, ToolDescriptor};
use std::sync::Arc;

/// Registry of retrieval tools the router can dispatch to.
///
/// Descriptors are immutable after registration. Order is significant only
/// as the deterministic tie-break order for the selector. At least one tool
/// must be registered before routing is attempted.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn RetrievalTool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Append a tool. No two tools may share an id.
    pub fn register(&mut self, tool: Arc<dyn RetrievalTool>) -> Result<(), EngineError> {
        if self.tools.iter().any(|existing| existing.id() == tool.id()) {
            return Err(EngineError::Config(format!(
                "Duplicate tool id registered: {}",
                tool.id()
            )));
        }

        self.tools.push(tool);
        Ok(())
    }

    /// Capability descriptors in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|tool| ToolDescriptor::for_tool(tool.as_ref()))
            .collect()
    }

    /// Look up a tool by id
    pub fn get(&self, id: &str) -> Option<&Arc<dyn RetrievalTool>> {
        self.tools.iter().find(|tool| tool.id() == id)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sdk::types::{EngineResponse, Provenance};

    struct NamedTool {
        id: &'static str,
    }

    #[async_trait]
    impl RetrievalTool for NamedTool {
        fn id(&self) -> &str {
            self.id
        }

        fn describe(&self) -> &str {
            "test tool"
        }

        async fn invoke(&self, _question: &str) -> Result<EngineResponse, EngineError> {
            Ok(EngineResponse::new(
                "answer",
                Provenance::Rows { rows: vec![] },
                self.id,
            ))
        }
    }

    #[test]
    fn test_registration_preserves_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool { id: "first" })).unwrap();
        registry.register(Arc::new(NamedTool { id: "second" })).unwrap();

        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].id, "first");
        assert_eq!(descriptors[1].id, "second");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool { id: "twin" })).unwrap();

        let err = registry
            .register(Arc::new(NamedTool { id: "twin" }))
            .unwrap_err();

        assert!(matches!(err, EngineError::Config(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(NamedTool { id: "lookup" })).unwrap();

        assert!(registry.get("lookup").is_some());
        assert!(registry.get("ghost").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.descriptors().is_empty());
    }
}
