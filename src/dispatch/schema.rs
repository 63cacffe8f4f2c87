//! Intent schema registry and the parameter normalization pass.
//!
//! The registry is the single source of truth for dispatch: one entry per
//! intent, each pairing a parameter schema with the bound integration
//! handler. It is built once at startup and read-only afterwards. The same
//! table feeds the classifier prompt (intent catalog) and the normalization
//! pass, so the classifier, the validator and the dispatcher can never
//! drift apart.
//!
//! Normalization is the only place defaults and canonicalization are
//! applied: a raw parameter map from the classifier goes in, a
//! [`ResolvedQuery`] with exactly the declared parameters comes out.
//! Unknown parameters are dropped, never forwarded silently.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::operators::canonicalize;
use super::DispatchError;
use crate::integrations::IntentHandler;

// ---------------------------------------------------------------------------
// Parameter specs
// ---------------------------------------------------------------------------

/// Semantic kind of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A text value.
    Text,
    /// An integer value.
    Integer,
    /// A boolean flag.
    Flag,
    /// A list of text values.
    TextList,
    /// A list of JSON objects (e.g. filter descriptors).
    ObjectList,
    /// A list of rows, each a list of cell values.
    Matrix,
}

impl ParamKind {
    /// Kind name shown in the classifier's intent catalog.
    fn catalog_name(self) -> &'static str {
        match self {
            Self::Text => "texto",
            Self::Integer => "inteiro",
            Self::Flag => "booleano",
            Self::TextList => "lista de textos",
            Self::ObjectList => "lista de objetos",
            Self::Matrix => "lista de linhas",
        }
    }
}

/// Default behavior when a parameter is absent from the classifier output.
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// The parameter must be present; normalization fails otherwise.
    Required,
    /// Use this value when absent.
    Value(Value),
}

/// Normalization rule applied to a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRule {
    /// No transformation.
    None,
    /// Canonicalize the value as a match operator (see
    /// [`super::operators::canonicalize`]).
    Operator,
}

/// Declaration of one parameter of an intent.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: &'static str,
    kind: ParamKind,
    default: ParamDefault,
    rule: ParamRule,
}

impl ParamSpec {
    /// A text parameter with a default.
    pub fn text(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: ParamDefault::Value(Value::String(default.to_owned())),
            rule: ParamRule::None,
        }
    }

    /// A required text parameter.
    pub fn required_text(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: ParamDefault::Required,
            rule: ParamRule::None,
        }
    }

    /// A filter-condition parameter, canonicalized as a match operator.
    ///
    /// The default is itself canonicalized during normalization, so any
    /// alias works as a default value.
    pub fn operator(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: ParamDefault::Value(Value::String(default.to_owned())),
            rule: ParamRule::Operator,
        }
    }

    /// An integer parameter with a default.
    pub fn integer(name: &'static str, default: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Integer,
            default: ParamDefault::Value(Value::from(default)),
            rule: ParamRule::None,
        }
    }

    /// A boolean parameter with a default.
    pub fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Flag,
            default: ParamDefault::Value(Value::Bool(default)),
            rule: ParamRule::None,
        }
    }

    /// A list-of-text parameter with a default.
    pub fn text_list(name: &'static str, default: &[&str]) -> Self {
        let items = default
            .iter()
            .map(|s| Value::String((*s).to_owned()))
            .collect();
        Self {
            name,
            kind: ParamKind::TextList,
            default: ParamDefault::Value(Value::Array(items)),
            rule: ParamRule::None,
        }
    }

    /// An optional list-of-objects parameter, defaulting to null (absent).
    pub fn object_list(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::ObjectList,
            default: ParamDefault::Value(Value::Null),
            rule: ParamRule::None,
        }
    }

    /// A required list-of-rows parameter.
    pub fn required_matrix(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Matrix,
            default: ParamDefault::Required,
            rule: ParamRule::None,
        }
    }

    /// The parameter name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Catalog line fragment: `name (kind, obrigatório | padrão x)`.
    fn describe(&self) -> String {
        match &self.default {
            ParamDefault::Required => {
                format!("{} ({}, obrigatório)", self.name, self.kind.catalog_name())
            }
            ParamDefault::Value(v) => format!(
                "{} ({}, padrão {})",
                self.name,
                self.kind.catalog_name(),
                v
            ),
        }
    }
}

/// Coerce a raw JSON value to the declared kind.
///
/// Lenient on purpose: the classifier is a language model and gets types
/// slightly wrong ("20" for 20, a bare string for a one-element list).
/// Returns `None` when the value cannot be read as the declared kind.
fn coerce(kind: ParamKind, value: &Value) -> Option<Value> {
    match kind {
        ParamKind::Text => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        ParamKind::Integer => match value {
            Value::Number(n) => n.as_i64().map(Value::from),
            Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
            _ => None,
        },
        ParamKind::Flag => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "sim" => Some(Value::Bool(true)),
                "false" | "não" | "nao" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        ParamKind::TextList => match value {
            Value::Array(_) => Some(value.clone()),
            Value::String(s) => Some(Value::Array(vec![Value::String(s.clone())])),
            _ => None,
        },
        ParamKind::ObjectList => match value {
            Value::Array(_) | Value::Null => Some(value.clone()),
            _ => None,
        },
        ParamKind::Matrix => match value {
            Value::Array(_) => Some(value.clone()),
            _ => None,
        },
    }
}

// ---------------------------------------------------------------------------
// IntentSchema
// ---------------------------------------------------------------------------

/// Parameter schema for one intent.
#[derive(Debug, Clone)]
pub struct IntentSchema {
    name: &'static str,
    description: &'static str,
    params: Vec<ParamSpec>,
}

impl IntentSchema {
    /// Create a schema with no parameters.
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
        }
    }

    /// Add a parameter declaration (builder style).
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// The intent name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable description shown in the classifier catalog.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// The declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Apply defaults, coercion and normalization rules to a raw parameter
    /// map from the classifier.
    ///
    /// Parameters not declared here are dropped. A declared parameter whose
    /// raw value cannot be coerced falls back to its default.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MissingParameter`] when a required parameter
    /// is absent or uncoercible.
    pub fn normalize(&self, raw: &Map<String, Value>) -> Result<Map<String, Value>, DispatchError> {
        let mut resolved = Map::new();

        for spec in &self.params {
            let coerced = raw.get(spec.name).and_then(|v| coerce(spec.kind, v));

            let value = match (coerced, &spec.default) {
                (Some(v), _) => v,
                (None, ParamDefault::Value(default)) => default.clone(),
                (None, ParamDefault::Required) => {
                    return Err(DispatchError::MissingParameter {
                        intent: self.name.to_owned(),
                        name: spec.name.to_owned(),
                    })
                }
            };

            let value = match spec.rule {
                ParamRule::None => value,
                ParamRule::Operator => {
                    let surface = value.as_str().unwrap_or_default();
                    Value::String(canonicalize(surface).as_str().to_owned())
                }
            };

            resolved.insert(spec.name.to_owned(), value);
        }

        let dropped: Vec<&String> = raw
            .keys()
            .filter(|k| !self.params.iter().any(|p| p.name == k.as_str()))
            .collect();
        if !dropped.is_empty() {
            debug!(intent = self.name, ?dropped, "dropping undeclared parameters");
        }

        Ok(resolved)
    }

    /// One catalog line: `name: description. Parâmetros: ...`.
    fn catalog_line(&self) -> String {
        if self.params.is_empty() {
            format!("- {}: {}. Sem parâmetros.", self.name, self.description)
        } else {
            let params: Vec<String> = self.params.iter().map(ParamSpec::describe).collect();
            format!(
                "- {}: {}. Parâmetros: {}.",
                self.name,
                self.description,
                params.join(", ")
            )
        }
    }
}

// ---------------------------------------------------------------------------
// ResolvedQuery
// ---------------------------------------------------------------------------

/// A validated, defaulted parameter set bound to one intent.
///
/// Request-scoped; built by [`IntentRegistry::normalize`] and consumed by
/// the bound handler. The accessors encode the adapter contract: values
/// were already validated, so reads are infallible with neutral fallbacks.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    /// The resolved intent name.
    pub intent: String,
    /// Validated parameter values, keyed by declared name.
    pub params: Map<String, Value>,
}

impl ResolvedQuery {
    /// Read a text parameter ("" when absent).
    pub fn text(&self, name: &str) -> &str {
        self.params.get(name).and_then(Value::as_str).unwrap_or("")
    }

    /// Read an integer parameter (0 when absent).
    pub fn integer(&self, name: &str) -> i64 {
        self.params.get(name).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Read a boolean parameter (false when absent).
    pub fn flag(&self, name: &str) -> bool {
        self.params
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Read a list-of-text parameter (empty when absent).
    pub fn text_list(&self, name: &str) -> Vec<String> {
        self.params
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Read a raw parameter value.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

// ---------------------------------------------------------------------------
// IntentRegistry
// ---------------------------------------------------------------------------

/// One registry entry: the schema plus the bound handler.
pub struct IntentEntry {
    schema: IntentSchema,
    handler: Arc<dyn IntentHandler>,
}

impl IntentEntry {
    /// The intent's parameter schema.
    pub fn schema(&self) -> &IntentSchema {
        &self.schema
    }

    /// The bound integration handler.
    pub fn handler(&self) -> &Arc<dyn IntentHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for IntentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentEntry")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Static table mapping intent name to schema and handler.
///
/// Built once at startup, read-only afterwards; lookups are O(1) by name.
/// Registration order is preserved for the classifier catalog.
#[derive(Debug, Default)]
pub struct IntentRegistry {
    entries: HashMap<String, IntentEntry>,
    order: Vec<String>,
}

impl IntentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an intent. A duplicate name replaces the earlier entry.
    pub fn register(&mut self, schema: IntentSchema, handler: Arc<dyn IntentHandler>) {
        let name = schema.name().to_owned();
        if self
            .entries
            .insert(name.clone(), IntentEntry { schema, handler })
            .is_some()
        {
            warn!(intent = %name, "intent registered twice, replacing earlier entry");
        } else {
            self.order.push(name);
        }
    }

    /// Look up an intent by name.
    pub fn resolve(&self, name: &str) -> Option<&IntentEntry> {
        self.entries.get(name)
    }

    /// Normalize raw classifier parameters for an intent.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownIntent`] for unregistered names and
    /// [`DispatchError::MissingParameter`] for absent required parameters.
    pub fn normalize(
        &self,
        intent: &str,
        raw: &Map<String, Value>,
    ) -> Result<ResolvedQuery, DispatchError> {
        let entry = self
            .resolve(intent)
            .ok_or_else(|| DispatchError::UnknownIntent(intent.to_owned()))?;
        let params = entry.schema.normalize(raw)?;
        Ok(ResolvedQuery {
            intent: intent.to_owned(),
            params,
        })
    }

    /// Registered intent names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The intent catalog injected into the classifier prompt.
    ///
    /// One line per intent with its parameters, defaults and required
    /// markers, so the prompt always matches what dispatch will accept.
    pub fn catalog(&self) -> String {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|entry| entry.schema.catalog_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of registered intents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
