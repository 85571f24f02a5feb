//! Analyst Engine Library
//!
//! This library provides the core functionality of the analyst engine:
//! a hybrid query router that answers natural-language business questions
//! from either a structured SQL store or a semantic vector store.
//! It is used by both the main binary and integration tests.

/// Boot-once engine construction
pub mod bootstrap;

/// Configuration management module
pub mod config;

/// Database persistence module (structured and vector stores)
pub mod db;

/// Chat and embedding model abstraction layer
pub mod llm;

/// Query router and tool selector
pub mod router;

/// Retrieval engines and tool registry
pub mod tools;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
