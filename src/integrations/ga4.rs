//! Web-analytics reporting (GA4 Analytics Data API).
//!
//! Two intents: `ga4` (plain report) and `ga4_pivot` (crosstab against a
//! second dimension). Both build a JSON request against the
//! `properties/*:runReport` / `:runPivotReport` endpoints and reshape the
//! response into a row-capped tabular [`RawResult`].

use std::sync::Arc;

use serde_json::{json, Value};

use super::{read_json_response, AdapterError, IntentHandler, RawResult};
use crate::credentials;
use crate::dispatch::operators::canonicalize;
use crate::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

const API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta";

/// Client for the analytics reporting API.
///
/// Built once at startup with the shared HTTP client; the bearer token is
/// checked per call so a missing credential surfaces as a call failure, not
/// a startup failure.
#[derive(Debug, Clone)]
pub struct Ga4Client {
    client: reqwest::Client,
    token: Option<String>,
    property_id: String,
    max_rows: usize,
}

impl Ga4Client {
    /// Create a client for one analytics property.
    pub fn new(
        client: reqwest::Client,
        token: Option<String>,
        property_id: String,
        max_rows: usize,
    ) -> Self {
        Self {
            client,
            token,
            property_id,
            max_rows,
        }
    }

    /// POST a report request to `{property}:{method}`.
    async fn run(&self, method: &str, body: &Value) -> Result<Value, AdapterError> {
        let token = self
            .token
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::GOOGLE_ACCESS_TOKEN))?;
        let url = format!("{API_BASE}/{}:{method}", self.property_id);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        read_json_response(response).await
    }
}

// ---------------------------------------------------------------------------
// Request builders / response reshaping (pub for integration testing)
// ---------------------------------------------------------------------------

/// Split a comma-separated field list into API name objects.
fn name_objects(list: &str) -> Vec<Value> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| json!({ "name": name }))
        .collect()
}

/// Build the string-filter expression, or `None` when field or value is
/// empty. The condition arrives canonicalized; mapping to the wire enum is
/// the only translation left.
fn dimension_filter(query: &ResolvedQuery) -> Option<Value> {
    let field = query.text("filtro_campo").trim();
    let value = query.text("filtro_valor").trim();
    if field.is_empty() || value.is_empty() {
        return None;
    }
    let match_type = canonicalize(query.text("filtro_condicao")).ga4_match_type();
    Some(json!({
        "filter": {
            "fieldName": field,
            "stringFilter": { "value": value, "matchType": match_type }
        }
    }))
}

/// Build the `runReport` request body.
#[doc(hidden)]
pub fn build_report_body(query: &ResolvedQuery) -> Value {
    let mut body = json!({
        "dateRanges": [{ "startDate": query.text("periodo"), "endDate": "today" }],
        "dimensions": name_objects(query.text("dimensao")),
        "metrics": name_objects(query.text("metrica")),
    });
    if let Some(filter) = dimension_filter(query) {
        body["dimensionFilter"] = filter;
    }
    body
}

/// Build the `runPivotReport` request body.
///
/// The first pivot carries the primary dimensions, the second the crosstab
/// dimensions ordered by the first metric descending. Both limits are the
/// requested row limit clamped to the configured cap.
#[doc(hidden)]
pub fn build_pivot_body(query: &ResolvedQuery, max_rows: usize) -> Value {
    let dimensions = query.text("dimensao");
    let pivot_dimensions = query.text("dimensao_pivot");
    let metrics = name_objects(query.text("metrica"));
    let limit = super::clamp_limit(query.integer("limite_linhas"), max_rows);

    let first_metric = metrics
        .first()
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("sessions")
        .to_owned();

    let mut all_dimensions = name_objects(dimensions);
    all_dimensions.extend(name_objects(pivot_dimensions));

    let field_names = |list: &str| -> Vec<Value> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_owned()))
            .collect()
    };

    let mut body = json!({
        "dateRanges": [{ "startDate": query.text("periodo"), "endDate": "today" }],
        "dimensions": all_dimensions,
        "metrics": metrics,
        "pivots": [
            { "fieldNames": field_names(dimensions), "limit": limit },
            {
                "fieldNames": field_names(pivot_dimensions),
                "limit": limit,
                "orderBys": [{ "metric": { "metricName": first_metric }, "desc": true }]
            }
        ],
    });
    if let Some(filter) = dimension_filter(query) {
        body["dimensionFilter"] = filter;
    }
    body
}

/// Reshape a report or pivot-report response into a tabular result.
///
/// Headers come from the dimension and metric header lists in order; rows
/// are capped at `max_rows`. No rows means [`RawResult::Empty`].
#[doc(hidden)]
pub fn reshape_tabular(response: &Value, max_rows: usize) -> RawResult {
    let header_names = |key: &str, name_key: &str| -> Vec<String> {
        response
            .get(key)
            .and_then(Value::as_array)
            .map(|headers| {
                headers
                    .iter()
                    .filter_map(|h| h.get(name_key))
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut headers = header_names("dimensionHeaders", "name");
    headers.extend(header_names("metricHeaders", "name"));

    let cell_values = |row: &Value, key: &str| -> Vec<String> {
        row.get(key)
            .and_then(Value::as_array)
            .map(|cells| {
                cells
                    .iter()
                    .filter_map(|c| c.get("value"))
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    };

    let rows: Vec<Vec<String>> = response
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .take(max_rows)
                .map(|row| {
                    let mut cells = cell_values(row, "dimensionValues");
                    cells.extend(cell_values(row, "metricValues"));
                    cells
                })
                .collect()
        })
        .unwrap_or_default();

    if rows.is_empty() {
        return RawResult::Empty;
    }
    RawResult::Rows { headers, rows }
}

// ---------------------------------------------------------------------------
// Handlers and registration
// ---------------------------------------------------------------------------

/// Handler for the `ga4` intent.
struct Ga4ReportHandler {
    client: Arc<Ga4Client>,
}

#[async_trait::async_trait]
impl IntentHandler for Ga4ReportHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let body = build_report_body(query);
        let response = self.client.run("runReport", &body).await?;
        Ok(reshape_tabular(&response, self.client.max_rows))
    }
}

/// Handler for the `ga4_pivot` intent.
struct Ga4PivotHandler {
    client: Arc<Ga4Client>,
}

#[async_trait::async_trait]
impl IntentHandler for Ga4PivotHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let body = build_pivot_body(query, self.client.max_rows);
        let response = self.client.run("runPivotReport", &body).await?;
        Ok(reshape_tabular(&response, self.client.max_rows))
    }
}

/// Register the web-analytics intents.
pub fn register(registry: &mut IntentRegistry, client: Arc<Ga4Client>) {
    registry.register(
        IntentSchema::new(
            "ga4",
            "relatório de métricas do site por dimensões (web analytics)",
        )
        .param(ParamSpec::text("dimensao", "country"))
        .param(ParamSpec::text("metrica", "sessions"))
        .param(ParamSpec::text("periodo", "7daysAgo"))
        .param(ParamSpec::text("filtro_campo", ""))
        .param(ParamSpec::text("filtro_valor", ""))
        .param(ParamSpec::operator("filtro_condicao", "igual")),
        Arc::new(Ga4ReportHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new(
            "ga4_pivot",
            "cruzamento de métricas do site entre duas dimensões (web analytics)",
        )
        .param(ParamSpec::text("dimensao", "country"))
        .param(ParamSpec::text("dimensao_pivot", "deviceCategory"))
        .param(ParamSpec::text("metrica", "sessions"))
        .param(ParamSpec::text("periodo", "7daysAgo"))
        .param(ParamSpec::text("filtro_campo", ""))
        .param(ParamSpec::text("filtro_valor", ""))
        .param(ParamSpec::operator("filtro_condicao", "igual"))
        .param(ParamSpec::integer("limite_linhas", 30)),
        Arc::new(Ga4PivotHandler { client }),
    );
}
