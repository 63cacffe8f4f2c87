//! Search-performance reporting (Search Console API).
//!
//! Two intents: `search_console` (free-form report over arbitrary
//! dimensions and filters) and `search_terms` (per-term lookup, either an
//! exact list of terms or a contains-pattern). Dates accept the relative
//! forms the rest of the gateway uses ("30daysAgo", "today") as well as
//! plain ISO dates.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use super::{clamp_limit, read_json_response, AdapterError, IntentHandler, RawResult};
use crate::credentials;
use crate::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

const API_BASE: &str = "https://searchconsole.googleapis.com/webmasters/v3/sites";

/// Client for the search-performance query API.
#[derive(Debug, Clone)]
pub struct SearchConsoleClient {
    client: reqwest::Client,
    token: Option<String>,
    site_url: String,
    max_rows: usize,
}

impl SearchConsoleClient {
    /// Create a client for one verified site.
    pub fn new(
        client: reqwest::Client,
        token: Option<String>,
        site_url: String,
        max_rows: usize,
    ) -> Self {
        Self {
            client,
            token,
            site_url,
            max_rows,
        }
    }

    /// POST a search-analytics query for the configured site.
    async fn query(&self, body: &Value) -> Result<Value, AdapterError> {
        let token = self
            .token
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::GOOGLE_ACCESS_TOKEN))?;
        let site: String = url::form_urlencoded::byte_serialize(self.site_url.as_bytes()).collect();
        let url = format!("{API_BASE}/{site}/searchAnalytics/query");
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
// Date resolution / request building / reshaping (pub for testing)
// ---------------------------------------------------------------------------

/// Resolve a relative date to `YYYY-MM-DD`.
///
/// Accepts `"NdaysAgo"`, `"today"`, or any other string passed through
/// unchanged (assumed to already be an ISO date).
#[doc(hidden)]
pub fn resolve_date(d: &str) -> String {
    let trimmed = d.trim();
    if let Some(days) = trimmed.strip_suffix("daysAgo") {
        if let Ok(n) = days.trim().parse::<i64>() {
            let today = Utc::now().date_naive();
            let date = today.checked_sub_signed(Duration::days(n)).unwrap_or(today);
            return date.format("%Y-%m-%d").to_string();
        }
    }
    if trimmed == "today" {
        return Utc::now().date_naive().format("%Y-%m-%d").to_string();
    }
    trimmed.to_owned()
}

/// Build a search-analytics query body.
#[doc(hidden)]
pub fn build_query_body(
    start_date: &str,
    end_date: &str,
    dimensions: &[String],
    filters: Option<&Value>,
    row_limit: usize,
) -> Value {
    let mut body = json!({
        "startDate": start_date,
        "endDate": end_date,
        "dimensions": dimensions,
        "rowLimit": row_limit,
    });
    if let Some(filters) = filters {
        if filters.as_array().is_some_and(|f| !f.is_empty()) {
            body["dimensionFilterGroups"] = json!([{ "filters": filters }]);
        }
    }
    body
}

/// Reshape response rows into named records.
///
/// Each row's keys become `Dimensão 1..N`; with `with_metrics` the standard
/// click/impression/CTR/position metrics are added with display formatting.
#[doc(hidden)]
pub fn reshape_rows(response: &Value, with_metrics: bool, max_rows: usize) -> Vec<Value> {
    response
        .get("rows")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .take(max_rows)
                .map(|row| {
                    let mut record = serde_json::Map::new();
                    if let Some(keys) = row.get("keys").and_then(Value::as_array) {
                        for (i, key) in keys.iter().enumerate() {
                            let label = format!("Dimensão {}", i.saturating_add(1));
                            record.insert(label, key.clone());
                        }
                    }
                    if with_metrics {
                        let number = |field: &str| {
                            row.get(field).and_then(Value::as_f64).unwrap_or(0.0)
                        };
                        record.insert("Cliques".to_owned(), json!(number("clicks")));
                        record.insert("Impressões".to_owned(), json!(number("impressions")));
                        record.insert(
                            "CTR".to_owned(),
                            json!(format!("{:.2}%", number("ctr") * 100.0)),
                        );
                        record.insert(
                            "Posição Média".to_owned(),
                            json!(format!("{:.2}", number("position"))),
                        );
                    }
                    Value::Object(record)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Build per-term filters: one equals-filter per term, or a single
/// contains-filter for a pattern when no terms are given.
#[doc(hidden)]
pub fn term_filters(terms: &[String], pattern: &str) -> Vec<Value> {
    if !terms.is_empty() {
        return terms
            .iter()
            .map(|term| {
                json!({ "dimension": "query", "operator": "equals", "expression": term })
            })
            .collect();
    }
    if !pattern.trim().is_empty() {
        return vec![json!({
            "dimension": "query",
            "operator": "contains",
            "expression": pattern.trim(),
        })];
    }
    Vec::new()
}

// ---------------------------------------------------------------------------
// Handlers and registration
// ---------------------------------------------------------------------------

/// Handler for the `search_console` intent.
struct SearchReportHandler {
    client: Arc<SearchConsoleClient>,
}

#[async_trait::async_trait]
impl IntentHandler for SearchReportHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let start = resolve_date(query.text("data_inicio"));
        let end = resolve_date(query.text("data_fim"));
        let dimensions = query.text_list("dimensoes");
        let limit = clamp_limit(query.integer("limite"), self.client.max_rows);

        let filters = query.value("filtros").filter(|v| !v.is_null()).cloned();
        let body = build_query_body(&start, &end, &dimensions, filters.as_ref(), limit);
        let response = self.client.query(&body).await?;

        let records = reshape_rows(&response, query.flag("metrica_extra"), limit);
        if records.is_empty() {
            return Ok(RawResult::Empty);
        }
        Ok(RawResult::object(json!({
            "site": self.client.site_url,
            "periodo": format!("{start} a {end}"),
            "dimensoes": dimensions,
            "dados": records,
        })))
    }
}

/// Handler for the `search_terms` intent.
struct SearchTermsHandler {
    client: Arc<SearchConsoleClient>,
}

#[async_trait::async_trait]
impl IntentHandler for SearchTermsHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let start = resolve_date(query.text("data_inicio"));
        let end = resolve_date(query.text("data_fim"));
        let terms = query.text_list("termos");
        let pattern = query.text("padrao").to_owned();
        let limit = clamp_limit(query.integer("limite"), self.client.max_rows);

        let filters = term_filters(&terms, &pattern);
        let filters_value = Value::Array(filters);
        let dimensions = vec!["query".to_owned()];
        let body = build_query_body(&start, &end, &dimensions, Some(&filters_value), limit);
        let response = self.client.query(&body).await?;

        let records = reshape_rows(&response, true, limit);
        if records.is_empty() {
            return Ok(RawResult::Empty);
        }

        let described: Value = if terms.is_empty() {
            json!(format!("contendo '{pattern}'"))
        } else {
            json!(terms)
        };
        Ok(RawResult::object(json!({
            "site": self.client.site_url,
            "periodo": format!("{start} a {end}"),
            "termos": described,
            "dados": records,
        })))
    }
}

/// Register the search-performance intents.
pub fn register(registry: &mut IntentRegistry, client: Arc<SearchConsoleClient>) {
    registry.register(
        IntentSchema::new(
            "search_console",
            "desempenho de busca orgânica por dimensões e filtros",
        )
        .param(ParamSpec::text("data_inicio", "30daysAgo"))
        .param(ParamSpec::text("data_fim", "today"))
        .param(ParamSpec::text_list("dimensoes", &["query"]))
        .param(ParamSpec::flag("metrica_extra", true))
        .param(ParamSpec::object_list("filtros"))
        .param(ParamSpec::integer("limite", 20)),
        Arc::new(SearchReportHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new(
            "search_terms",
            "desempenho de termos de busca específicos ou contendo um padrão",
        )
        .param(ParamSpec::text_list("termos", &[]))
        .param(ParamSpec::text("padrao", ""))
        .param(ParamSpec::text("data_inicio", "7daysAgo"))
        .param(ParamSpec::text("data_fim", "today"))
        .param(ParamSpec::integer("limite", 20)),
        Arc::new(SearchTermsHandler { client }),
    );
}
