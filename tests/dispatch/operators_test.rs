//! Canonicalization properties of the operator alias table.

use oraculo::dispatch::{canonicalize, MatchOperator};

const ALIAS_TABLE: &[(&str, MatchOperator)] = &[
    ("igual", MatchOperator::Exact),
    ("exato", MatchOperator::Exact),
    ("equals", MatchOperator::Exact),
    ("contém", MatchOperator::Contains),
    ("contem", MatchOperator::Contains),
    ("contendo", MatchOperator::Contains),
    ("contains", MatchOperator::Contains),
    ("começa com", MatchOperator::BeginsWith),
    ("comeca com", MatchOperator::BeginsWith),
    ("starts with", MatchOperator::BeginsWith),
    ("termina com", MatchOperator::EndsWith),
    ("ends with", MatchOperator::EndsWith),
    ("regex", MatchOperator::PartialRegex),
    ("expressão regular", MatchOperator::PartialRegex),
    ("expressao regular", MatchOperator::PartialRegex),
    ("regex completa", MatchOperator::FullRegex),
    ("full regex", MatchOperator::FullRegex),
];

#[test]
fn every_alias_maps_to_its_canonical_operator() {
    for (alias, expected) in ALIAS_TABLE {
        assert_eq!(canonicalize(alias), *expected, "alias {alias:?}");
    }
}

#[test]
fn canonicalization_is_idempotent() {
    for (alias, _) in ALIAS_TABLE {
        let first = canonicalize(alias);
        let second = canonicalize(first.as_str());
        assert_eq!(first, second, "canonicalize not idempotent for {alias:?}");
    }
}

#[test]
fn unknown_strings_resolve_to_exact() {
    for unknown in ["", "   ", "parecido", "similar to", "xyz", "contendo!"] {
        assert_eq!(
            canonicalize(unknown),
            MatchOperator::Exact,
            "unknown {unknown:?} must fall back to EXACT"
        );
    }
}

#[test]
fn uppercase_aliases_map_like_lowercase() {
    for (alias, expected) in ALIAS_TABLE {
        assert_eq!(
            canonicalize(&alias.to_uppercase()),
            *expected,
            "uppercased alias {alias:?}"
        );
    }
}

#[test]
fn serde_names_match_canonical_names() {
    for op in [
        MatchOperator::Exact,
        MatchOperator::Contains,
        MatchOperator::BeginsWith,
        MatchOperator::EndsWith,
        MatchOperator::PartialRegex,
        MatchOperator::FullRegex,
    ] {
        let serialized = serde_json::to_value(op).expect("serializes");
        assert_eq!(serialized, serde_json::json!(op.as_str()));
    }
}
