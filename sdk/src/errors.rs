//! Error types and handling
//!
//! This module provides the error taxonomy used throughout the analyst
//! engine. All errors implement the `AnalystErrorExt` trait which provides
//! user-friendly hints and indicates whether errors are recoverable by the
//! caller (retry, rephrase) or require configuration changes.
//!
//! Per-query failures are always surfaced as a typed result distinct from a
//! normal answer. No failure is downgraded to a fabricated answer.

use thiserror::Error;

/// Trait for analyst error extensions
///
/// Provides additional context for errors: a hint that is safe to show an
/// end user, and whether the caller can usefully retry or rephrase.
pub trait AnalystErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint does not contain credentials, generated SQL, or internal
    /// implementation details.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable from the caller's side
    ///
    /// Recoverable errors can be retried or rephrased. Non-recoverable
    /// errors require configuration changes or indicate a broken invariant.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Config**: startup-detectable faults — empty registry, embedding
///   dimensionality mismatch, missing credentials
/// - **SelectionFailure**: no valid tool id extractable from the
///   classification output; the selector never defaults to an arbitrary tool
/// - **UnsafeQueryRejected**: a generated structured query contained a
///   mutating operation and was refused before execution
/// - **StoreUnavailable**: structured or vector store connection/query
///   failure
/// - **ModelCall / ModelTimeout**: transport failure or timeout talking to
///   the language or embedding model
/// - **UnknownTool**: a validated routing decision referenced a tool the
///   registry does not hold — a registry/selector desync, fatal
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration faults (fatal, surfaced at startup where possible)
    #[error("Configuration error: {0}")]
    Config(String),

    // Routing errors
    #[error("Tool selection failed: {0}")]
    SelectionFailure(String),

    #[error("Routing decision referenced unknown tool: {0}")]
    UnknownTool(String),

    // Structured engine errors
    #[error("Unsafe query rejected: {0}")]
    UnsafeQueryRejected(String),

    // Store errors
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // Model call errors
    #[error("Model call failed: {0}")]
    ModelCall(String),

    #[error("Model call timed out")]
    ModelTimeout,

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalystErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml and credentials",
            Self::SelectionFailure(_) => {
                "The question could not be routed. Try rephrasing it"
            }
            Self::UnknownTool(_) => "Internal routing fault. This is a bug",
            Self::UnsafeQueryRejected(_) => {
                "The generated query was not read-only and was refused"
            }
            Self::StoreUnavailable(_) => "Data store unavailable. Try again shortly",
            Self::ModelCall(_) => "Model provider unavailable. Check your network",
            Self::ModelTimeout => "Model provider took too long to respond. Try again",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Configuration and invariant faults require intervention
            Self::Config(_) | Self::UnknownTool(_) => false,

            // All other errors are retryable or rephrasable by the caller
            _ => true,
        }
    }
}
