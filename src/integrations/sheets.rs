//! Spreadsheet service (Sheets + Drive APIs).
//!
//! Five intents: create a spreadsheet (shared with a configured writer),
//! list accessible spreadsheets, add a worksheet, overwrite a worksheet's
//! values, and append values. All are parameterized HTTP calls returning
//! Object results with the ids, urls and counts a caller needs.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{clamp_limit, read_json_response, AdapterError, IntentHandler, RawResult};
use crate::credentials;
use crate::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_BASE: &str = "https://www.googleapis.com/drive/v3/files";

/// Client for the spreadsheet and file APIs.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    token: Option<String>,
    share_email: String,
    max_rows: usize,
}

impl SheetsClient {
    /// Create a client. `share_email` is the default writer for new
    /// spreadsheets; an empty string disables sharing.
    pub fn new(
        client: reqwest::Client,
        token: Option<String>,
        share_email: String,
        max_rows: usize,
    ) -> Self {
        Self {
            client,
            token,
            share_email,
            max_rows,
        }
    }

    fn token(&self) -> Result<&str, AdapterError> {
        self.token
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::GOOGLE_ACCESS_TOKEN))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, AdapterError> {
        let token = self.token()?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        read_json_response(response).await
    }

    /// Share a file with the configured email as writer. Best-effort data:
    /// failures are reported in the result, not raised.
    async fn share(&self, file_id: &str, email: &str) -> Result<(), AdapterError> {
        let token = self.token()?;
        let url = format!("{DRIVE_BASE}/{file_id}/permissions?sendNotificationEmail=false");
        let body = json!({ "type": "user", "role": "writer", "emailAddress": email });
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        read_json_response(response).await.map(|_| ())
    }
}

// ---------------------------------------------------------------------------
// Request builders / response reshaping (pub for integration testing)
// ---------------------------------------------------------------------------

/// Body for creating a spreadsheet with one initial worksheet.
#[doc(hidden)]
pub fn build_spreadsheet_body(title: &str) -> Value {
    json!({
        "properties": { "title": title },
        "sheets": [{
            "properties": {
                "title": "Principal",
                "gridProperties": { "rowCount": 100, "columnCount": 20 }
            }
        }]
    })
}

/// Body for adding a worksheet via `batchUpdate`.
#[doc(hidden)]
pub fn build_add_sheet_body(title: &str, rows: i64, columns: i64) -> Value {
    json!({
        "requests": [{
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": { "rowCount": rows, "columnCount": columns }
                }
            }
        }]
    })
}

/// Extract the new worksheet id from a `batchUpdate` response.
#[doc(hidden)]
pub fn extract_new_sheet_id(response: &Value) -> Option<i64> {
    response
        .get("replies")?
        .as_array()?
        .first()?
        .get("addSheet")?
        .get("properties")?
        .get("sheetId")?
        .as_i64()
}

/// Reshape a file listing into spreadsheet records.
#[doc(hidden)]
pub fn reshape_file_list(response: &Value) -> Vec<Value> {
    response
        .get("files")
        .and_then(Value::as_array)
        .map(|files| {
            files
                .iter()
                .filter_map(|file| {
                    let id = file.get("id").and_then(Value::as_str)?;
                    let mut record = json!({
                        "id": id,
                        "nome": file.get("name").and_then(Value::as_str).unwrap_or(""),
                        "url": spreadsheet_url(id),
                        "data_criacao": file.get("createdTime").and_then(Value::as_str).unwrap_or(""),
                    });
                    if let Some(owner) = file
                        .get("owners")
                        .and_then(Value::as_array)
                        .and_then(|o| o.first())
                    {
                        record["proprietario"] = json!({
                            "nome": owner.get("displayName").and_then(Value::as_str).unwrap_or(""),
                            "email": owner.get("emailAddress").and_then(Value::as_str).unwrap_or(""),
                        });
                    }
                    Some(record)
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Browser URL for a spreadsheet id.
#[doc(hidden)]
pub fn spreadsheet_url(id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{id}/edit")
}

fn encoded_range(sheet_title: &str) -> String {
    url::form_urlencoded::byte_serialize(sheet_title.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handler for `planilha_criar`.
struct CreateSpreadsheetHandler {
    client: Arc<SheetsClient>,
}

#[async_trait::async_trait]
impl IntentHandler for CreateSpreadsheetHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let title = query.text("nome_planilha");
        let body = build_spreadsheet_body(title);
        let created = self.client.post_json(SHEETS_BASE, &body).await?;

        let id = created
            .get("spreadsheetId")
            .and_then(Value::as_str)
            .ok_or_else(|| AdapterError::Decode("response missing spreadsheetId".to_owned()))?
            .to_owned();

        let requested = query.text("email_compartilhamento").trim().to_owned();
        let email = if requested.is_empty() {
            self.client.share_email.clone()
        } else {
            requested
        };

        let mut value = json!({
            "planilha_id": id,
            "url": spreadsheet_url(&id),
        });
        if !email.is_empty() {
            match self.client.share(&id, &email).await {
                Ok(()) => value["compartilhada_com"] = json!(email),
                // The spreadsheet exists; a failed share is a detail of the
                // result, not a failure of the whole operation.
                Err(e) => value["aviso"] = json!(format!("falha ao compartilhar: {e}")),
            }
        }
        Ok(RawResult::object(value))
    }
}

/// Handler for `planilha_listar`.
struct ListSpreadsheetsHandler {
    client: Arc<SheetsClient>,
}

#[async_trait::async_trait]
impl IntentHandler for ListSpreadsheetsHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let token = self.client.token()?;
        let limit = clamp_limit(query.integer("limite"), self.client.max_rows);
        let response = self
            .client
            .client
            .get(DRIVE_BASE)
            .bearer_auth(token)
            .query(&[
                ("q", "mimeType='application/vnd.google-apps.spreadsheet'"),
                ("pageSize", limit.to_string().as_str()),
                (
                    "fields",
                    "nextPageToken, files(id, name, owners, createdTime)",
                ),
            ])
            .send()
            .await?;
        let body = read_json_response(response).await?;

        let records = reshape_file_list(&body);
        if records.is_empty() {
            return Ok(RawResult::Empty);
        }
        Ok(RawResult::object(json!({ "planilhas": records })))
    }
}

/// Handler for `planilha_nova_aba`.
struct AddSheetHandler {
    client: Arc<SheetsClient>,
}

#[async_trait::async_trait]
impl IntentHandler for AddSheetHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let spreadsheet_id = query.text("planilha_id");
        let title = query.text("nome_aba");
        let body = build_add_sheet_body(title, query.integer("linhas"), query.integer("colunas"));
        let url = format!("{SHEETS_BASE}/{spreadsheet_id}:batchUpdate");

        let response = match self.client.post_json(&url, &body).await {
            Ok(r) => r,
            Err(AdapterError::Status { body, .. }) if body.contains("already exists") => {
                return Err(AdapterError::Invalid(format!(
                    "já existe uma aba com o nome '{title}'"
                )));
            }
            Err(e) => return Err(e),
        };

        let sheet_id = extract_new_sheet_id(&response);
        let mut value = json!({
            "planilha_id": spreadsheet_id,
            "aba_nome": title,
        });
        if let Some(sheet_id) = sheet_id {
            value["aba_id"] = json!(sheet_id);
            value["url"] = json!(format!(
                "{}#gid={sheet_id}",
                spreadsheet_url(spreadsheet_id)
            ));
        }
        Ok(RawResult::object(value))
    }
}

/// Handler for `planilha_sobrescrever`: clear the worksheet, then write.
struct OverwriteValuesHandler {
    client: Arc<SheetsClient>,
}

#[async_trait::async_trait]
impl IntentHandler for OverwriteValuesHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let spreadsheet_id = query.text("planilha_id");
        let title = query.text("nome_aba");
        let range = encoded_range(title);
        let values = query.value("dados").cloned().unwrap_or(Value::Null);

        let clear_url = format!("{SHEETS_BASE}/{spreadsheet_id}/values/{range}:clear");
        self.client.post_json(&clear_url, &json!({})).await?;

        let token = self.client.token()?;
        let update_url =
            format!("{SHEETS_BASE}/{spreadsheet_id}/values/{range}?valueInputOption=RAW");
        let response = self
            .client
            .client
            .put(&update_url)
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        let body = read_json_response(response).await?;

        Ok(RawResult::object(json!({
            "planilha_id": spreadsheet_id,
            "aba_nome": title,
            "celulas_atualizadas": body.get("updatedCells").and_then(Value::as_i64).unwrap_or(0),
            "url": spreadsheet_url(spreadsheet_id),
        })))
    }
}

/// Handler for `planilha_adicionar`: append below existing data.
struct AppendValuesHandler {
    client: Arc<SheetsClient>,
}

#[async_trait::async_trait]
impl IntentHandler for AppendValuesHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let spreadsheet_id = query.text("planilha_id");
        let title = query.text("nome_aba");
        let range = encoded_range(title);
        let values = query.value("dados").cloned().unwrap_or(Value::Null);

        let url = format!(
            "{SHEETS_BASE}/{spreadsheet_id}/values/{range}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"
        );
        let body = self.client.post_json(&url, &json!({ "values": values })).await?;

        let updates = body.get("updates").cloned().unwrap_or(Value::Null);
        Ok(RawResult::object(json!({
            "planilha_id": spreadsheet_id,
            "aba_nome": title,
            "celulas_adicionadas": updates.get("updatedCells").and_then(Value::as_i64).unwrap_or(0),
            "intervalo_atualizado": updates.get("updatedRange").and_then(Value::as_str).unwrap_or(""),
            "url": spreadsheet_url(spreadsheet_id),
        })))
    }
}

/// Register the spreadsheet intents.
pub fn register(registry: &mut IntentRegistry, client: Arc<SheetsClient>) {
    registry.register(
        IntentSchema::new("planilha_criar", "criar uma nova planilha e compartilhá-la")
            .param(ParamSpec::required_text("nome_planilha"))
            .param(ParamSpec::text("email_compartilhamento", "")),
        Arc::new(CreateSpreadsheetHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("planilha_listar", "listar planilhas acessíveis")
            .param(ParamSpec::integer("limite", 20)),
        Arc::new(ListSpreadsheetsHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("planilha_nova_aba", "criar uma nova aba em uma planilha")
            .param(ParamSpec::required_text("planilha_id"))
            .param(ParamSpec::required_text("nome_aba"))
            .param(ParamSpec::integer("linhas", 100))
            .param(ParamSpec::integer("colunas", 20)),
        Arc::new(AddSheetHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new(
            "planilha_sobrescrever",
            "sobrescrever todo o conteúdo de uma aba",
        )
        .param(ParamSpec::required_text("planilha_id"))
        .param(ParamSpec::required_text("nome_aba"))
        .param(ParamSpec::required_matrix("dados")),
        Arc::new(OverwriteValuesHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new(
            "planilha_adicionar",
            "adicionar linhas ao final de uma aba sem sobrescrever",
        )
        .param(ParamSpec::required_text("planilha_id"))
        .param(ParamSpec::required_text("nome_aba"))
        .param(ParamSpec::required_matrix("dados")),
        Arc::new(AppendValuesHandler { client }),
    );
}
