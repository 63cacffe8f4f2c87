//! The request orchestrator: classify, normalize, dispatch, narrate.
//!
//! One [`Dispatcher::handle`] call is a single sequential chain of at most
//! three network calls. Classification and normalization failures abort the
//! request; an adapter failure becomes part of the result; a narration
//! failure only costs the narrative. Nothing here retries.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::classifier::{self, Classification, CLASSIFIER_SYSTEM_PROMPT};
use super::envelope::ResultEnvelope;
use super::narrator;
use super::schema::{IntentRegistry, ResolvedQuery};
use super::DispatchError;
use crate::config::LlmConfig;
use crate::integrations::RawResult;
use crate::providers::{CompletionRequest, LlmProvider};

/// Orchestrates the two-phase model-call protocol around the registry.
///
/// Shared across request tasks; all state is read-only after construction.
pub struct Dispatcher {
    provider: Arc<dyn LlmProvider>,
    registry: IntentRegistry,
    llm: LlmConfig,
    narrate: bool,
}

impl Dispatcher {
    /// Create a dispatcher over a provider and a fully populated registry.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        registry: IntentRegistry,
        llm: LlmConfig,
        narrate: bool,
    ) -> Self {
        Self {
            provider,
            registry,
            llm,
            narrate,
        }
    }

    /// The intent registry backing this dispatcher.
    pub fn registry(&self) -> &IntentRegistry {
        &self.registry
    }

    /// Handle one free-text question end to end.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when classification fails (unparseable
    /// model output or failed model call), the intent is unknown, or a
    /// required parameter is missing. Adapter and narration failures do not
    /// error: they surface inside the returned envelope.
    pub async fn handle(&self, question: &str) -> Result<ResultEnvelope, DispatchError> {
        let classification = self.classify(question).await?;
        info!(intent = %classification.intent, "question classified");

        let query = self
            .registry
            .normalize(&classification.intent, &classification.parameters)?;
        let normalized_params = Value::Object(query.params.clone());
        debug!(intent = %query.intent, params = %normalized_params, "parameters normalized");

        let raw_result = self.dispatch(&query).await;

        let narrative = if self.narrate {
            narrator::narrate(self.provider.as_ref(), &self.llm, question, &raw_result).await
        } else {
            None
        };

        Ok(ResultEnvelope::build(
            question,
            query.intent,
            query.params,
            raw_result,
            narrative,
        ))
    }

    /// Classify a question into an intent name plus raw parameters.
    async fn classify(&self, question: &str) -> Result<Classification, DispatchError> {
        let request = CompletionRequest {
            system: Some(CLASSIFIER_SYSTEM_PROMPT.to_owned()),
            prompt: classifier::compose_prompt(question, &self.registry.catalog()),
            max_tokens: self.llm.classify_max_tokens,
            temperature: self.llm.classify_temperature,
        };

        let response = self.provider.complete(request).await?;
        debug!(raw = %response.text, "classifier raw output");

        classifier::parse_classification(&response.text)
    }

    /// Invoke the bound handler, capturing any failure as result data.
    async fn dispatch(&self, query: &ResolvedQuery) -> RawResult {
        let Some(entry) = self.registry.resolve(&query.intent) else {
            // Unreachable after normalize, but a registry mutation bug
            // should degrade to an error result, not a panic.
            return RawResult::error(format!("no handler bound for intent {}", query.intent));
        };

        match entry.handler().execute(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(intent = %query.intent, error = %e, "adapter call failed");
                RawResult::error(e.to_string())
            }
        }
    }

    /// Handle a structured request that skips classification.
    ///
    /// Used by callers that already know the intent (direct endpoints);
    /// runs the same normalize/dispatch path, without narration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownIntent`] or
    /// [`DispatchError::MissingParameter`] from normalization.
    pub async fn handle_structured(
        &self,
        intent: &str,
        parameters: &Map<String, Value>,
    ) -> Result<RawResult, DispatchError> {
        let query = self.registry.normalize(intent, parameters)?;
        Ok(self.dispatch(&query).await)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("model", &self.provider.model_id())
            .field("intents", &self.registry.len())
            .field("narrate", &self.narrate)
            .finish()
    }
}
