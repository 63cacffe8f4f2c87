//! Result narration: the optional second model call.
//!
//! Given the original question and the adapter's raw result, asks the model
//! for a plain-language explanation. Narration is best-effort: any failure
//! is logged and the envelope simply omits the narrative. An error result
//! is narrated like any other; "the upstream call failed" is something the
//! user deserves to have explained.

use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::integrations::RawResult;
use crate::providers::{CompletionRequest, LlmProvider};

/// System instruction for the narration call.
pub const NARRATOR_SYSTEM_PROMPT: &str = "Você é um assistente de analytics. \
Interprete resultados com base na pergunta original e forneça uma explicação \
clara.";

/// Compose the user prompt for the narration call.
pub fn compose_prompt(question: &str, raw: &RawResult) -> String {
    format!(
        "Pergunta: {question}\n\nResultados:\n{}",
        raw.render_text()
    )
}

/// Ask the model to narrate a result. Returns `None` on any failure.
pub async fn narrate(
    provider: &dyn LlmProvider,
    llm: &LlmConfig,
    question: &str,
    raw: &RawResult,
) -> Option<String> {
    let request = CompletionRequest {
        system: Some(NARRATOR_SYSTEM_PROMPT.to_owned()),
        prompt: compose_prompt(question, raw),
        max_tokens: llm.narrate_max_tokens,
        temperature: llm.narrate_temperature,
    };

    match provider.complete(request).await {
        Ok(response) => {
            let text = response.text.trim().to_owned();
            if text.is_empty() {
                debug!("narration returned empty text, omitting narrative");
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            warn!(error = %e, "narration failed, omitting narrative");
            None
        }
    }
}
