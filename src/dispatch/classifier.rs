//! Question classification: free text to `{tipo_consulta, parametros}`.
//!
//! The classifier composes a prompt from the registry's intent catalog and
//! parses the model's reply. Models are told to answer with pure JSON but
//! routinely wrap it in markdown code fences anyway, so parsing strips
//! fences before giving up. A reply that still is not valid JSON fails the
//! request with the raw text attached; there is no retry.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::DispatchError;

/// System instruction for the classification call.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "Você é um assistente de analytics. \
Seu trabalho é transformar perguntas em linguagem natural em objetos JSON \
válidos com o formato especificado. Responda SOMENTE com JSON puro. Sem \
explicações. Sem formatação Markdown. Sem prefixos ou sufixos. Apenas JSON.";

/// The classifier's verdict: an intent name plus raw parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    /// The classified intent name.
    #[serde(rename = "tipo_consulta")]
    pub intent: String,
    /// Raw parameter object, not yet normalized.
    #[serde(rename = "parametros", default)]
    pub parameters: Map<String, Value>,
}

/// Compose the user prompt for the classification call.
///
/// `catalog` is the registry's intent listing (see
/// [`super::schema::IntentRegistry::catalog`]); embedding it here keeps the
/// prompt and the dispatch table in lockstep.
pub fn compose_prompt(question: &str, catalog: &str) -> String {
    format!(
        "Pergunta: {question}\n\n\
         Tipos de consulta disponíveis:\n\
         {catalog}\n\n\
         Retorne um JSON neste formato:\n\n\
         {{\n\
         \x20 \"tipo_consulta\": \"<um dos tipos acima>\",\n\
         \x20 \"parametros\": {{\n\
         \x20   // parâmetros relevantes conforme o tipo\n\
         \x20 }}\n\
         }}\n\n\
         Apenas o JSON. Nenhuma explicação."
    )
}

/// Parse the model reply into a [`Classification`].
///
/// Tries the raw text first, then the content of a markdown code fence.
///
/// # Errors
///
/// Returns [`DispatchError::Classification`] with the unmodified reply
/// attached when no valid JSON of the required shape can be found.
pub fn parse_classification(response: &str) -> Result<Classification, DispatchError> {
    let trimmed = response.trim();

    let attempt = serde_json::from_str::<Classification>(trimmed);
    let attempt = match attempt {
        Ok(c) => return Ok(c),
        Err(e) => e,
    };

    if let Some(block) = extract_json_block(trimmed) {
        if let Ok(c) = serde_json::from_str::<Classification>(block) {
            return Ok(c);
        }
    }

    Err(DispatchError::Classification {
        reason: attempt.to_string(),
        raw: response.to_owned(),
    })
}

/// Extract the content of a markdown code fence.
///
/// Supports both ```` ```json ```` and bare ```` ``` ```` fences.
fn extract_json_block(text: &str) -> Option<&str> {
    let start_marker_json = "```json";
    let start_marker_plain = "```";
    let end_marker = "```";

    let content_start = if let Some(pos) = text.find(start_marker_json) {
        pos.checked_add(start_marker_json.len())?
    } else if let Some(pos) = text.find(start_marker_plain) {
        pos.checked_add(start_marker_plain.len())?
    } else {
        return None;
    };

    let rest = text.get(content_start..)?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);

    let end_pos = rest.find(end_marker)?;
    let content = rest.get(..end_pos)?;
    Some(content.trim())
}
