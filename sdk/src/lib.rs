//! Analyst SDK
//!
//! Shared library providing the retrieval-tool contract, the unified
//! response types, and the error taxonomy used across the engine.

/// Retrieval tool trait and descriptor types
pub mod retrieval_tool;

/// Error types and handling
pub mod errors;

/// Unified response and provenance types
pub mod types;

// Re-export commonly used types
pub use errors::{AnalystErrorExt, EngineError};
pub use retrieval_tool::{RetrievalTool, ToolDescriptor};
pub use types::{EngineResponse, Provenance, RetrievedChunk};
