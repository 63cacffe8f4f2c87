//! Task-board service (Trello REST API).
//!
//! Six intents covering the board workflow: list boards, list a board's
//! columns, list a column's cards, create a card, move a card, and a
//! grouped view of every card on a board. Authentication is the API's
//! key/token pair sent as query parameters.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use super::{read_json_response, AdapterError, IntentHandler, RawResult};
use crate::credentials;
use crate::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

const API_BASE: &str = "https://api.trello.com/1";

/// Client for the task-board API.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    client: reqwest::Client,
    api_key: Option<String>,
    token: Option<String>,
    max_rows: usize,
}

impl TrelloClient {
    /// Create a client.
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        token: Option<String>,
        max_rows: usize,
    ) -> Self {
        Self {
            client,
            api_key,
            token,
            max_rows,
        }
    }

    fn auth(&self) -> Result<[(&'static str, &str); 2], AdapterError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::TRELLO_API_KEY))?;
        let token = self
            .token
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::TRELLO_TOKEN))?;
        Ok([("key", key), ("token", token)])
    }

    async fn get(&self, path: &str) -> Result<Value, AdapterError> {
        let auth = self.auth()?;
        let response = self
            .client
            .get(format!("{API_BASE}{path}"))
            .query(&auth)
            .send()
            .await?;
        read_json_response(response).await
    }

    async fn send_with_params(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, AdapterError> {
        let auth = self.auth()?;
        let response = self
            .client
            .request(method, format!("{API_BASE}{path}"))
            .query(&auth)
            .query(params)
            .send()
            .await?;
        read_json_response(response).await
    }
}

// ---------------------------------------------------------------------------
// Response reshaping (pub for integration testing)
// ---------------------------------------------------------------------------

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned()
}

/// Reshape the board listing.
#[doc(hidden)]
pub fn reshape_boards(response: &Value, max: usize) -> Vec<Value> {
    response
        .as_array()
        .map(|boards| {
            boards
                .iter()
                .take(max)
                .map(|board| {
                    json!({
                        "id": str_field(board, "id"),
                        "nome": str_field(board, "name"),
                        "url": str_field(board, "url"),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Reshape the column listing of a board.
#[doc(hidden)]
pub fn reshape_lists(response: &Value, max: usize) -> Vec<Value> {
    response
        .as_array()
        .map(|lists| {
            lists
                .iter()
                .take(max)
                .map(|list| {
                    json!({
                        "id": str_field(list, "id"),
                        "nome": str_field(list, "name"),
                        "posicao": list.get("pos").cloned().unwrap_or(Value::Null),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Reshape the card listing of a column. Unnamed labels are skipped, as the
/// board UI shows them only as color stripes.
#[doc(hidden)]
pub fn reshape_cards(response: &Value, max: usize) -> Vec<Value> {
    response
        .as_array()
        .map(|cards| {
            cards
                .iter()
                .take(max)
                .map(|card| {
                    let labels: Vec<Value> = card
                        .get("labels")
                        .and_then(Value::as_array)
                        .map(|labels| {
                            labels
                                .iter()
                                .filter(|label| {
                                    label
                                        .get("name")
                                        .and_then(Value::as_str)
                                        .is_some_and(|n| !n.is_empty())
                                })
                                .map(|label| {
                                    json!({
                                        "id": str_field(label, "id"),
                                        "nome": str_field(label, "name"),
                                        "cor": str_field(label, "color"),
                                    })
                                })
                                .collect()
                        })
                        .unwrap_or_default();

                    json!({
                        "id": str_field(card, "id"),
                        "nome": str_field(card, "name"),
                        "descricao": str_field(card, "desc"),
                        "url": str_field(card, "url"),
                        "data_vencimento": card.get("due").cloned().unwrap_or(Value::Null),
                        "etiquetas": labels,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Handler for `trello_quadros`.
struct BoardsHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for BoardsHandler {
    async fn execute(&self, _query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let response = self.client.get("/members/me/boards").await?;
        let boards = reshape_boards(&response, self.client.max_rows);
        if boards.is_empty() {
            return Ok(RawResult::Empty);
        }
        Ok(RawResult::object(json!({
            "total": boards.len(),
            "quadros": boards,
        })))
    }
}

/// Handler for `trello_listas`.
struct ListsHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for ListsHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let board_id = query.text("board_id");
        let response = self
            .client
            .get(&format!("/boards/{board_id}/lists"))
            .await?;
        let lists = reshape_lists(&response, self.client.max_rows);
        if lists.is_empty() {
            return Ok(RawResult::Empty);
        }
        Ok(RawResult::object(json!({
            "quadro_id": board_id,
            "listas": lists,
        })))
    }
}

/// Handler for `trello_cartoes`.
struct CardsHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for CardsHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let list_id = query.text("list_id");
        let response = self.client.get(&format!("/lists/{list_id}/cards")).await?;
        let cards = reshape_cards(&response, self.client.max_rows);
        if cards.is_empty() {
            return Ok(RawResult::Empty);
        }
        Ok(RawResult::object(json!({
            "lista_id": list_id,
            "cartoes": cards,
        })))
    }
}

/// Handler for `trello_criar_cartao`.
struct CreateCardHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for CreateCardHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let list_id = query.text("list_id");
        let name = query.text("nome");
        let description = query.text("descricao");

        let card = self
            .client
            .send_with_params(
                reqwest::Method::POST,
                "/cards",
                &[("idList", list_id), ("name", name), ("desc", description)],
            )
            .await?;

        Ok(RawResult::object(json!({
            "cartao": {
                "id": str_field(&card, "id"),
                "nome": str_field(&card, "name"),
                "url": str_field(&card, "url"),
            }
        })))
    }
}

/// Handler for `trello_mover_cartao`.
struct MoveCardHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for MoveCardHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let card_id = query.text("card_id");
        let list_id = query.text("list_id");

        let card = self
            .client
            .send_with_params(
                reqwest::Method::PUT,
                &format!("/cards/{card_id}"),
                &[("idList", list_id)],
            )
            .await?;

        Ok(RawResult::object(json!({
            "cartao": {
                "id": str_field(&card, "id"),
                "nome": str_field(&card, "name"),
                "nova_lista_id": list_id,
            }
        })))
    }
}

/// Handler for `trello_tarefas_quadro`: every card of a board grouped by
/// column. A column whose card fetch fails is skipped with a warning so one
/// bad column does not void the whole report.
struct BoardTasksHandler {
    client: Arc<TrelloClient>,
}

#[async_trait::async_trait]
impl IntentHandler for BoardTasksHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let board_id = query.text("board_id");
        let lists_response = self
            .client
            .get(&format!("/boards/{board_id}/lists"))
            .await?;
        let lists = reshape_lists(&lists_response, self.client.max_rows);
        if lists.is_empty() {
            return Ok(RawResult::Empty);
        }

        let mut grouped = Vec::with_capacity(lists.len());
        for list in &lists {
            let list_id = list.get("id").and_then(Value::as_str).unwrap_or("");
            let list_name = list.get("nome").and_then(Value::as_str).unwrap_or("");

            match self.client.get(&format!("/lists/{list_id}/cards")).await {
                Ok(cards_response) => {
                    grouped.push(json!({
                        "lista_id": list_id,
                        "lista_nome": list_name,
                        "cartoes": reshape_cards(&cards_response, self.client.max_rows),
                    }));
                }
                Err(e) => {
                    warn!(list_id, error = %e, "skipping list whose cards could not be fetched");
                }
            }
        }

        Ok(RawResult::object(json!({
            "quadro_id": board_id,
            "tarefas_por_lista": grouped,
        })))
    }
}

/// Register the task-board intents.
pub fn register(registry: &mut IntentRegistry, client: Arc<TrelloClient>) {
    registry.register(
        IntentSchema::new("trello_quadros", "listar os quadros do usuário"),
        Arc::new(BoardsHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("trello_listas", "listar as colunas de um quadro")
            .param(ParamSpec::required_text("board_id")),
        Arc::new(ListsHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("trello_cartoes", "listar os cartões de uma coluna")
            .param(ParamSpec::required_text("list_id")),
        Arc::new(CardsHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("trello_criar_cartao", "criar um cartão em uma coluna")
            .param(ParamSpec::required_text("list_id"))
            .param(ParamSpec::required_text("nome"))
            .param(ParamSpec::text("descricao", "")),
        Arc::new(CreateCardHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new("trello_mover_cartao", "mover um cartão para outra coluna")
            .param(ParamSpec::required_text("card_id"))
            .param(ParamSpec::required_text("list_id")),
        Arc::new(MoveCardHandler {
            client: Arc::clone(&client),
        }),
    );

    registry.register(
        IntentSchema::new(
            "trello_tarefas_quadro",
            "todas as tarefas de um quadro organizadas por coluna",
        )
        .param(ParamSpec::required_text("board_id")),
        Arc::new(BoardTasksHandler { client }),
    );
}
