//! Request-builder and reshaping tests for the search-performance
//! integration.

use serde_json::json;

use oraculo::integrations::search_console::{
    build_query_body, reshape_rows, resolve_date, term_filters,
};

#[test]
fn query_body_without_filters_has_no_filter_groups() {
    let body = build_query_body("2026-01-01", "2026-01-31", &["query".to_owned()], None, 20);
    assert_eq!(body["startDate"], "2026-01-01");
    assert_eq!(body["endDate"], "2026-01-31");
    assert_eq!(body["dimensions"], json!(["query"]));
    assert_eq!(body["rowLimit"], 20);
    assert!(body.get("dimensionFilterGroups").is_none());
}

#[test]
fn query_body_wraps_filters_in_one_group() {
    let filters = json!([
        { "dimension": "query", "operator": "contains", "expression": "mba" }
    ]);
    let body = build_query_body(
        "2026-01-01",
        "2026-01-31",
        &["query".to_owned(), "page".to_owned()],
        Some(&filters),
        50,
    );
    assert_eq!(body["dimensionFilterGroups"][0]["filters"], filters);
}

#[test]
fn empty_filter_list_is_omitted() {
    let filters = json!([]);
    let body = build_query_body("2026-01-01", "2026-01-31", &["query".to_owned()], Some(&filters), 20);
    assert!(body.get("dimensionFilterGroups").is_none());
}

#[test]
fn rows_become_named_records_with_formatted_metrics() {
    let response = json!({
        "rows": [{
            "keys": ["mba em gestão", "2026-02-01"],
            "clicks": 41.0,
            "impressions": 1000.0,
            "ctr": 0.041,
            "position": 3.456
        }]
    });

    let records = reshape_rows(&response, true, 100);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Dimensão 1"], "mba em gestão");
    assert_eq!(records[0]["Dimensão 2"], "2026-02-01");
    assert_eq!(records[0]["Cliques"], 41.0);
    assert_eq!(records[0]["CTR"], "4.10%");
    assert_eq!(records[0]["Posição Média"], "3.46");
}

#[test]
fn metrics_are_omitted_without_metrica_extra() {
    let response = json!({
        "rows": [{ "keys": ["mba"], "clicks": 41.0 }]
    });
    let records = reshape_rows(&response, false, 100);
    assert_eq!(records[0]["Dimensão 1"], "mba");
    assert!(records[0].get("Cliques").is_none());
}

#[test]
fn reshape_caps_records() {
    let row = json!({ "keys": ["x"], "clicks": 1.0 });
    let response = json!({ "rows": [row.clone(), row.clone(), row] });
    assert_eq!(reshape_rows(&response, false, 2).len(), 2);
}

#[test]
fn no_rows_reshapes_to_nothing() {
    assert!(reshape_rows(&json!({}), true, 100).is_empty());
}

#[test]
fn explicit_terms_build_equals_filters() {
    let filters = term_filters(&["mba".to_owned()], "");
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["dimension"], "query");
    assert_eq!(filters[0]["operator"], "equals");
    assert_eq!(filters[0]["expression"], "mba");
}

#[test]
fn pattern_builds_contains_filter() {
    let filters = term_filters(&[], "pós graduação");
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0]["operator"], "contains");
    assert_eq!(filters[0]["expression"], "pós graduação");
}

#[test]
fn relative_dates_resolve_to_iso() {
    // The exact values are time-dependent; shape is what matters here.
    let resolved = resolve_date("30daysAgo");
    assert_eq!(resolved.len(), 10);
    assert_eq!(resolved.chars().filter(|c| *c == '-').count(), 2);

    assert_eq!(resolve_date("2025-12-31"), "2025-12-31");
}
