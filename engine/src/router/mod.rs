//! Query router
//!
//! Wires registry → selector → chosen engine → response. Each query walks a
//! fixed lifecycle: Received → Classified → Executing → Responded, with
//! Failed reachable from every state. The router never retries and never
//! falls back from one engine to the other — a wrong routing decision
//! surfaces as a wrong (or explicitly "not found") answer, not a cascade.

pub mod selector;

pub use selector::{RoutingDecision, Selector};

use sdk::errors::EngineError;
use sdk::types::EngineResponse;
use tracing::{debug, error, info};

use crate::tools::ToolRegistry;

/// Lifecycle phase of one query, logged at each transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryPhase {
    Received,
    Classified,
    Executing,
    Responded,
    Failed,
}

/// Routes each question to exactly one retrieval tool
pub struct Router {
    registry: ToolRegistry,
    selector: Selector,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Router {
    /// Create a new router.
    ///
    /// Fails fast when the registry is empty — routing with zero tools is a
    /// configuration fault, not a per-query condition.
    pub fn new(registry: ToolRegistry, selector: Selector) -> Result<Self, EngineError> {
        if registry.is_empty() {
            return Err(EngineError::Config(
                "Router requires at least one registered tool".to_string(),
            ));
        }

        Ok(Self { registry, selector })
    }

    /// The registered tools
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer one question.
    ///
    /// The chosen engine's response is surfaced verbatim; any failure
    /// propagates as its typed error, never as a partially-rendered answer.
    pub async fn answer(&self, question: &str) -> Result<EngineResponse, EngineError> {
        let mut phase = QueryPhase::Received;
        debug!(?phase, "Query accepted");

        let decision = match self
            .selector
            .select(question, &self.registry.descriptors())
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                transition(&mut phase, QueryPhase::Failed);
                return Err(e);
            }
        };
        transition(&mut phase, QueryPhase::Classified);
        info!(tool = %decision.selected_tool_id, "Routing decision made");

        let result = self.dispatch(&decision, question).await;
        match &result {
            Ok(response) => {
                transition(&mut phase, QueryPhase::Responded);
                debug!(
                    tool = %response.tool_id,
                    evidence = response.provenance.len(),
                    "Query answered"
                );
            }
            Err(e) => {
                transition(&mut phase, QueryPhase::Failed);
                debug!(%e, "Query failed during execution");
            }
        }

        result
    }

    /// Dispatch a validated decision to its engine.
    ///
    /// A decision referencing an id the registry does not hold means the
    /// selector and registry have desynced — a broken invariant, not a
    /// user-recoverable condition.
    async fn dispatch(
        &self,
        decision: &RoutingDecision,
        question: &str,
    ) -> Result<EngineResponse, EngineError> {
        let tool = self.registry.get(&decision.selected_tool_id).ok_or_else(|| {
            error!(
                tool = %decision.selected_tool_id,
                "Validated decision references unregistered tool"
            );
            EngineError::UnknownTool(decision.selected_tool_id.clone())
        })?;

        tool.invoke(question).await
    }
}

fn transition(phase: &mut QueryPhase, to: QueryPhase) {
    debug!(from = ?*phase, ?to, "Query phase transition");
    *phase = to;
}
