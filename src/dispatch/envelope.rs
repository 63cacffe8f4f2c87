//! The uniform response object returned to callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::integrations::RawResult;

/// The assembled response for one handled question.
///
/// Pure assembly: fields are carried through exactly as computed, with no
/// transformation. The serialized field names are the gateway's wire
/// protocol, shared with the classifier's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// The original question text.
    #[serde(rename = "pergunta")]
    pub question: String,
    /// The resolved intent name.
    #[serde(rename = "tipo_consulta")]
    pub intent: String,
    /// The validated, defaulted parameters that were dispatched.
    #[serde(rename = "parametros")]
    pub parameters: Map<String, Value>,
    /// The adapter's output, which may itself describe a failure.
    #[serde(rename = "resultado_bruto")]
    pub raw_result: RawResult,
    /// Plain-language interpretation, when narration ran and succeeded.
    #[serde(rename = "interpretacao", skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl ResultEnvelope {
    /// Assemble an envelope. No I/O, no failure modes.
    pub fn build(
        question: impl Into<String>,
        intent: impl Into<String>,
        parameters: Map<String, Value>,
        raw_result: RawResult,
        narrative: Option<String>,
    ) -> Self {
        Self {
            question: question.into(),
            intent: intent.into(),
            parameters,
            raw_result,
            narrative,
        }
    }
}
