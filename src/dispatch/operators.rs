//! String-filter operator canonicalization.
//!
//! Filter conditions arrive as free text: users and LLMs write "contém",
//! "contem", "contains" or "CONTAINS" and mean the same thing. The alias
//! table maps every known surface form, accented and unaccented, Portuguese
//! and English, onto the closed [`MatchOperator`] set. Unknown strings fall
//! back to [`MatchOperator::Exact`] rather than failing the request.

use serde::{Deserialize, Serialize};

/// Canonical string-filter comparison semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchOperator {
    /// Exact string equality.
    Exact,
    /// Substring match.
    Contains,
    /// Prefix match.
    BeginsWith,
    /// Suffix match.
    EndsWith,
    /// Partial regular-expression match.
    PartialRegex,
    /// Full regular-expression match.
    FullRegex,
}

impl MatchOperator {
    /// Canonical name, stable across the wire and the alias table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Contains => "CONTAINS",
            Self::BeginsWith => "BEGINS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::PartialRegex => "PARTIAL_REGEX",
            Self::FullRegex => "FULL_REGEX",
        }
    }

    /// Match-type name expected by the analytics reporting API.
    ///
    /// Identical to [`Self::as_str`] except the regex variants, which the
    /// wire spells with a trailing `P`.
    pub fn ga4_match_type(self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Contains => "CONTAINS",
            Self::BeginsWith => "BEGINS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::PartialRegex => "PARTIAL_REGEXP",
            Self::FullRegex => "FULL_REGEXP",
        }
    }
}

impl std::fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a free-form filter condition to a canonical operator.
///
/// Lookup is over the trimmed, lowercased input. The table enumerates
/// accented and unaccented variants explicitly; no accent folding is
/// applied. Absent entries resolve to [`MatchOperator::Exact`], so this
/// never fails. Canonical names are themselves aliases, which makes the
/// function idempotent.
pub fn canonicalize(raw: &str) -> MatchOperator {
    match raw.trim().to_lowercase().as_str() {
        "igual" | "igual a" | "exato" | "exata" | "exact" | "equals" | "equal" | "=" | "==" => {
            MatchOperator::Exact
        }
        "contém" | "contem" | "contendo" | "inclui" | "contains" | "includes" => {
            MatchOperator::Contains
        }
        "começa com" | "comeca com" | "inicia com" | "begins_with" | "begins with"
        | "starts with" => MatchOperator::BeginsWith,
        "termina com" | "finaliza com" | "ends_with" | "ends with" => MatchOperator::EndsWith,
        "regex" | "regex parcial" | "expressão regular" | "expressao regular" | "partial_regex"
        | "partial regex" => MatchOperator::PartialRegex,
        "regex completa" | "regex completo" | "regex total" | "full_regex" | "full regex" => {
            MatchOperator::FullRegex
        }
        _ => MatchOperator::Exact,
    }
}
