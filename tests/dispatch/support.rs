//! Shared fakes for dispatch tests: a scripted provider and recording
//! handlers, so the full pipeline runs without any network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use oraculo::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};
use oraculo::integrations::{AdapterError, IntentHandler, RawResult};
use oraculo::providers::{
    CompletionRequest, CompletionResponse, LlmProvider, ProviderError, UsageStats,
};

/// A provider that replays a fixed sequence of replies.
///
/// `Ok(text)` becomes a successful completion; `Err(msg)` becomes an HTTP
/// 500 provider error. Running out of replies also errors, which makes
/// call-count assumptions visible in test failures.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(Into::into).map_err(Into::into))
                    .collect(),
            ),
        }
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().expect("lock").len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let next = self.replies.lock().expect("lock").pop_front();
        match next {
            Some(Ok(text)) => Ok(CompletionResponse {
                text,
                usage: UsageStats {
                    input_tokens: 1,
                    output_tokens: 1,
                },
                model: "scripted".to_owned(),
            }),
            Some(Err(message)) => Err(ProviderError::HttpStatus {
                status: 500,
                body: message,
            }),
            None => Err(ProviderError::HttpStatus {
                status: 500,
                body: "scripted provider exhausted".to_owned(),
            }),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

/// A handler that records invocations and returns a canned outcome.
pub struct RecordingHandler {
    calls: Arc<AtomicUsize>,
    outcome: Result<RawResult, String>,
}

impl RecordingHandler {
    pub fn succeeding(result: RawResult) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            calls: Arc::clone(&calls),
            outcome: Ok(result),
        });
        (handler, calls)
    }

    pub fn failing(reason: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            calls: Arc::clone(&calls),
            outcome: Err(reason.to_owned()),
        });
        (handler, calls)
    }
}

#[async_trait::async_trait]
impl IntentHandler for RecordingHandler {
    async fn execute(&self, _query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(result) => Ok(result.clone()),
            Err(reason) => Err(AdapterError::Invalid(reason.clone())),
        }
    }
}

/// A registry with one analytics-report-shaped intent bound to `handler`.
pub fn report_registry(handler: Arc<dyn IntentHandler>) -> IntentRegistry {
    let mut registry = IntentRegistry::new();
    registry.register(
        IntentSchema::new("ga4", "relatório de métricas")
            .param(ParamSpec::text("dimensao", "country"))
            .param(ParamSpec::text("metrica", "sessions"))
            .param(ParamSpec::text("periodo", "7daysAgo"))
            .param(ParamSpec::text("filtro_campo", ""))
            .param(ParamSpec::text("filtro_valor", ""))
            .param(ParamSpec::operator("filtro_condicao", "igual")),
        handler,
    );
    registry
}
