//! Natural-language dispatch core.
//!
//! The request pipeline: a free-text question is classified by the LLM into
//! `{tipo_consulta, parametros}` ([`classifier`]), normalized against the
//! intent's parameter schema ([`schema`], with operator canonicalization
//! from [`operators`]), dispatched to the bound integration handler, and
//! optionally narrated by a second LLM call ([`narrator`]). The
//! [`dispatcher::Dispatcher`] orchestrates the phases and assembles the
//! final [`envelope::ResultEnvelope`].

pub mod classifier;
pub mod dispatcher;
pub mod envelope;
pub mod narrator;
pub mod operators;
pub mod schema;

pub use dispatcher::Dispatcher;
pub use envelope::ResultEnvelope;
pub use operators::{canonicalize, MatchOperator};
pub use schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

use crate::providers::ProviderError;

/// Errors that abort a request before or during dispatch.
///
/// Adapter failures are deliberately absent: they are captured as
/// [`crate::integrations::RawResult::Error`] data so narration can still
/// explain them. Narration failures never abort either; the envelope just
/// omits the narrative.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The classifier output could not be parsed as the required JSON shape.
    /// Carries the raw model output for diagnosis. Not retried.
    #[error("classifier output is not valid JSON ({reason}); raw output: {raw}")]
    Classification {
        /// Why parsing failed.
        reason: String,
        /// The unmodified model output.
        raw: String,
    },
    /// The classified intent name has no registry entry.
    #[error("unrecognized query type: {0}")]
    UnknownIntent(String),
    /// A parameter marked required was absent after classification.
    #[error("intent '{intent}' requires parameter '{name}'")]
    MissingParameter {
        /// The intent being normalized.
        intent: String,
        /// The missing parameter name.
        name: String,
    },
    /// The classification model call itself failed (transport or status).
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
