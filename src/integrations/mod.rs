//! Third-party integrations and the adapter contract.
//!
//! Each integration exposes a client built at startup with explicit
//! dependencies (shared HTTP client, credential, config values) plus one
//! [`IntentHandler`] per intent. Handlers receive parameters already
//! validated and defaulted by the dispatch layer and never re-derive
//! defaults.
//!
//! Handler failures are data, not control flow: the dispatcher converts an
//! [`AdapterError`] into [`RawResult::Error`] so narration can still explain
//! what went wrong. "Nothing found" is [`RawResult::Empty`], distinguishable
//! from an error without parsing strings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::schema::ResolvedQuery;

pub mod ga4;
pub mod search_console;
pub mod sheets;
pub mod trello;
pub mod youtube;

// ---------------------------------------------------------------------------
// RawResult
// ---------------------------------------------------------------------------

/// Adapter output before narration and envelope assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawResult {
    /// A tabular result: a header row plus data rows in matching order.
    Rows {
        /// Field names, dimensions first, then metrics.
        headers: Vec<String>,
        /// Data rows; each row has one cell per header.
        rows: Vec<Vec<String>>,
    },
    /// A structured object result (listing/creation operations).
    Object {
        /// The result fields.
        value: Value,
    },
    /// The call succeeded but matched no data.
    Empty,
    /// The upstream call failed; the reason is carried as data.
    Error {
        /// Failure description.
        reason: String,
    },
}

impl RawResult {
    /// Build an object result.
    pub fn object(value: Value) -> Self {
        Self::Object { value }
    }

    /// Build an error result.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            reason: reason.into(),
        }
    }

    /// Render the result as plain text for the narration prompt.
    pub fn render_text(&self) -> String {
        match self {
            Self::Rows { headers, rows } => {
                let mut lines = Vec::with_capacity(rows.len().saturating_add(1));
                lines.push(headers.join(" | "));
                for row in rows {
                    lines.push(row.join(" | "));
                }
                lines.join("\n")
            }
            Self::Object { value } => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Empty => "Nenhum dado encontrado.".to_owned(),
            Self::Error { reason } => format!("[Erro] {reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of an integration call.
///
/// Never crosses the dispatch boundary as an error: the dispatcher captures
/// it as [`RawResult::Error`].
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// HTTP transport failure (includes timeouts).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Upstream responded with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, bounded.
        body: String,
    },
    /// Response body did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
    /// A credential this integration needs is not configured.
    #[error("missing credential: {0}")]
    Credential(&'static str),
    /// The validated parameters are unusable for this operation.
    #[error("{0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// The bound integration function executing one intent.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    /// Execute the intent with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] on transport, auth or decode failure; the
    /// dispatcher converts it to [`RawResult::Error`].
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError>;
}

// ---------------------------------------------------------------------------
// Shared HTTP helpers
// ---------------------------------------------------------------------------

/// Read a response as JSON, mapping non-success statuses to
/// [`AdapterError::Status`] with a bounded body.
///
/// # Errors
///
/// Returns [`AdapterError`] on transport failure, bad status, or a body
/// that is not valid JSON.
pub(crate) async fn read_json_response(response: reqwest::Response) -> Result<Value, AdapterError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AdapterError::Status {
            status: status.as_u16(),
            body: truncate(&body, 256),
        });
    }
    serde_json::from_str(&body).map_err(|e| AdapterError::Decode(e.to_string()))
}

/// Clamp a requested row limit to the configured cap.
///
/// Non-positive or absurd requests resolve to the cap itself.
pub(crate) fn clamp_limit(requested: i64, max_rows: usize) -> usize {
    usize::try_from(requested)
        .ok()
        .filter(|n| *n > 0)
        .map_or(max_rows, |n| n.min(max_rows))
}

/// Truncate a string to a character budget, appending a marker.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_owned();
    }
    let shortened: String = s.chars().take(max_chars).collect();
    format!("{shortened}...[truncated]")
}
