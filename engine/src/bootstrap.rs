//! Boot-once engine construction
//!
//! Store connections and model clients are expensive to set up, so they are
//! constructed once and reused across queries. `Bootstrap` guards that
//! construction with a synchronization primitive: even when multiple
//! queries race on first use, at most one `Analyst` is built, and the
//! resulting handle is shared read-only thereafter.
//!
//! Credentials are resolved here, at startup — a missing credential is a
//! configuration fault before any query runs, not a mid-query surprise.

use sdk::errors::EngineError;
use sdk::types::EngineResponse;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config::Config;
use crate::db::{Database, DocumentStore, FinancialStore};
use crate::llm::embedding::{EmbeddingProvider, HttpEmbeddingProvider};
use crate::llm::openai_like::OpenAiLikeProvider;
use crate::llm::LLMProvider;
use crate::router::{Router, Selector};
use crate::tools::{SqlRetrievalEngine, ToolRegistry, VectorRetrievalEngine};

/// Fully wired engine: shared stores, model clients, registry, and router
pub struct Analyst {
    db: Database,
    chat: Arc<dyn LLMProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    router: Router,
}

impl std::fmt::Debug for Analyst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyst").finish_non_exhaustive()
    }
}

impl Analyst {
    /// Construct every shared handle and wire the router.
    ///
    /// Registers exactly one instance per retrieval path, structured first —
    /// registration order is the selector's deterministic tie-break order.
    pub async fn boot(config: &Config) -> Result<Self, EngineError> {
        info!("Booting analyst engine");

        let chat_key = resolve_credential(&config.llm.api_key_env, true)?;
        let embed_key = resolve_credential(&config.embedding.api_key_env, false)?;

        let chat: Arc<dyn LLMProvider> =
            Arc::new(OpenAiLikeProvider::try_new(config.llm.clone(), chat_key)?);
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbeddingProvider::try_new(
            config.embedding.clone(),
            embed_key,
        )?);

        let db = Database::new(&config.db_path())
            .await
            .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;

        let records = FinancialStore::new(db.pool().clone());
        let docs = DocumentStore::new(db.pool().clone(), config.embedding.dimension);

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SqlRetrievalEngine::new(chat.clone(), records)))?;
        registry.register(Arc::new(VectorRetrievalEngine::new(
            chat.clone(),
            embedder.clone(),
            docs,
            config.retrieval.clone(),
        )))?;

        let router = Router::new(registry, Selector::new(chat.clone()))?;

        info!("Analyst engine ready");
        Ok(Self {
            db,
            chat,
            embedder,
            router,
        })
    }

    /// Caller-facing surface: answer one question
    pub async fn answer(&self, question: &str) -> Result<EngineResponse, EngineError> {
        self.router.answer(question).await
    }

    /// The query router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The shared database
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The shared chat model client
    pub fn chat(&self) -> &Arc<dyn LLMProvider> {
        &self.chat
    }

    /// The shared embedding client
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}

/// One-time initialization guard for the shared engine
pub struct Bootstrap {
    cell: OnceCell<Arc<Analyst>>,
}

impl Bootstrap {
    /// Create an empty guard
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Get the shared engine, booting it on first use.
    ///
    /// Concurrent first callers race on the cell, not on construction:
    /// exactly one `Analyst::boot` runs, everyone receives the same handle.
    pub async fn get_or_boot(&self, config: &Config) -> Result<Arc<Analyst>, EngineError> {
        self.cell
            .get_or_try_init(|| async { Analyst::boot(config).await.map(Arc::new) })
            .await
            .cloned()
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a credential from the environment variable named in config.
///
/// An empty variable name means the endpoint is unauthenticated (allowed
/// only where `required` is false). A named variable that resolves to
/// nothing is a configuration fault.
fn resolve_credential(env_var: &str, required: bool) -> Result<String, EngineError> {
    if env_var.trim().is_empty() {
        return if required {
            Err(EngineError::Config(
                "No credential environment variable configured".to_string(),
            ))
        } else {
            Ok(String::new())
        };
    }

    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(EngineError::Config(format!(
            "Credential environment variable '{}' is not set",
            env_var
        ))),
    }
}
