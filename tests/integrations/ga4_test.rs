//! Request-builder and reshaping tests for the web-analytics integration.

use serde_json::{json, Map, Value};

use oraculo::dispatch::schema::ResolvedQuery;
use oraculo::integrations::ga4::{build_pivot_body, build_report_body, reshape_tabular};
use oraculo::integrations::RawResult;

fn query(intent: &str, params: Value) -> ResolvedQuery {
    let params: Map<String, Value> = params
        .as_object()
        .expect("params must be an object")
        .clone();
    ResolvedQuery {
        intent: intent.to_owned(),
        params,
    }
}

#[test]
fn report_body_splits_dimension_and_metric_lists() {
    let q = query(
        "ga4",
        json!({
            "dimensao": "country, deviceCategory",
            "metrica": "sessions",
            "periodo": "28daysAgo",
            "filtro_campo": "",
            "filtro_valor": "",
            "filtro_condicao": "EXACT",
        }),
    );
    let body = build_report_body(&q);

    assert_eq!(
        body["dimensions"],
        json!([{ "name": "country" }, { "name": "deviceCategory" }])
    );
    assert_eq!(body["metrics"], json!([{ "name": "sessions" }]));
    assert_eq!(body["dateRanges"][0]["startDate"], "28daysAgo");
    assert_eq!(body["dateRanges"][0]["endDate"], "today");
    assert!(body.get("dimensionFilter").is_none());
}

#[test]
fn report_body_builds_filter_only_with_field_and_value() {
    let q = query(
        "ga4",
        json!({
            "dimensao": "pagePath",
            "metrica": "sessions",
            "periodo": "7daysAgo",
            "filtro_campo": "pagePath",
            "filtro_valor": "mba",
            "filtro_condicao": "CONTAINS",
        }),
    );
    let body = build_report_body(&q);

    let filter = &body["dimensionFilter"]["filter"];
    assert_eq!(filter["fieldName"], "pagePath");
    assert_eq!(filter["stringFilter"]["value"], "mba");
    assert_eq!(filter["stringFilter"]["matchType"], "CONTAINS");
}

#[test]
fn report_body_maps_regex_operator_to_wire_spelling() {
    let q = query(
        "ga4",
        json!({
            "dimensao": "pagePath",
            "metrica": "sessions",
            "periodo": "7daysAgo",
            "filtro_campo": "pagePath",
            "filtro_valor": "^/cursos/.*",
            "filtro_condicao": "FULL_REGEX",
        }),
    );
    let body = build_report_body(&q);
    assert_eq!(
        body["dimensionFilter"]["filter"]["stringFilter"]["matchType"],
        "FULL_REGEXP"
    );
}

#[test]
fn pivot_body_combines_dimensions_and_orders_second_pivot() {
    let q = query(
        "ga4_pivot",
        json!({
            "dimensao": "country",
            "dimensao_pivot": "deviceCategory",
            "metrica": "sessions, activeUsers",
            "periodo": "7daysAgo",
            "filtro_campo": "",
            "filtro_valor": "",
            "filtro_condicao": "EXACT",
            "limite_linhas": 30,
        }),
    );
    let body = build_pivot_body(&q, 100);

    assert_eq!(
        body["dimensions"],
        json!([{ "name": "country" }, { "name": "deviceCategory" }])
    );
    assert_eq!(body["pivots"][0]["fieldNames"], json!(["country"]));
    assert_eq!(body["pivots"][0]["limit"], 30);
    assert_eq!(
        body["pivots"][1]["orderBys"][0]["metric"]["metricName"],
        "sessions"
    );
    assert_eq!(body["pivots"][1]["orderBys"][0]["desc"], true);
}

#[test]
fn pivot_limit_is_clamped_to_the_configured_cap() {
    let q = query(
        "ga4_pivot",
        json!({
            "dimensao": "country",
            "dimensao_pivot": "deviceCategory",
            "metrica": "sessions",
            "periodo": "7daysAgo",
            "filtro_campo": "",
            "filtro_valor": "",
            "filtro_condicao": "EXACT",
            "limite_linhas": 500,
        }),
    );
    let body = build_pivot_body(&q, 100);
    assert_eq!(body["pivots"][0]["limit"], 100);
    assert_eq!(body["pivots"][1]["limit"], 100);
}

#[test]
fn reshape_builds_headers_then_rows() {
    let response = json!({
        "dimensionHeaders": [{ "name": "country" }],
        "metricHeaders": [{ "name": "sessions" }],
        "rows": [
            { "dimensionValues": [{ "value": "Brazil" }], "metricValues": [{ "value": "120" }] },
            { "dimensionValues": [{ "value": "Portugal" }], "metricValues": [{ "value": "34" }] }
        ]
    });

    match reshape_tabular(&response, 100) {
        RawResult::Rows { headers, rows } => {
            assert_eq!(headers, vec!["country".to_owned(), "sessions".to_owned()]);
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0], vec!["Brazil".to_owned(), "120".to_owned()]);
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn reshape_caps_rows_at_max() {
    let row = json!({
        "dimensionValues": [{ "value": "x" }],
        "metricValues": [{ "value": "1" }]
    });
    let response = json!({
        "dimensionHeaders": [{ "name": "d" }],
        "metricHeaders": [{ "name": "m" }],
        "rows": [row.clone(), row.clone(), row]
    });

    match reshape_tabular(&response, 2) {
        RawResult::Rows { rows, .. } => assert_eq!(rows.len(), 2),
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn reshape_without_rows_is_empty_not_error() {
    let response = json!({
        "dimensionHeaders": [{ "name": "country" }],
        "metricHeaders": [{ "name": "sessions" }]
    });
    assert_eq!(reshape_tabular(&response, 100), RawResult::Empty);
}
