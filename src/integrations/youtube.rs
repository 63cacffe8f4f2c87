//! Video-platform comment reports (YouTube Data API).
//!
//! One intent: `youtube`. Resolves a video either directly by id or by a
//! search term, then fetches its top-level comment threads. The adapter
//! returns the comments as data; reading sentiment out of them is the
//! narration phase's job.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{clamp_limit, read_json_response, AdapterError, IntentHandler, RawResult};
use crate::credentials;
use crate::dispatch::schema::{IntentRegistry, IntentSchema, ParamSpec, ResolvedQuery};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the video data API.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: Option<String>,
    max_rows: usize,
}

impl YouTubeClient {
    /// Create a client.
    pub fn new(client: reqwest::Client, api_key: Option<String>, max_rows: usize) -> Self {
        Self {
            client,
            api_key,
            max_rows,
        }
    }

    fn key(&self) -> Result<&str, AdapterError> {
        self.api_key
            .as_deref()
            .ok_or(AdapterError::Credential(credentials::YOUTUBE_API_KEY))
    }

    /// Resolve a search term to the best-matching video id and title.
    async fn search_video(&self, term: &str) -> Result<Option<(String, String)>, AdapterError> {
        let key = self.key()?;
        let response = self
            .client
            .get(format!("{API_BASE}/search"))
            .query(&[
                ("part", "snippet"),
                ("q", term),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", key),
            ])
            .send()
            .await?;
        let body = read_json_response(response).await?;
        Ok(first_video_match(&body))
    }

    /// Fetch top-level comment threads for a video.
    async fn comment_threads(&self, video_id: &str, limit: usize) -> Result<Value, AdapterError> {
        let key = self.key()?;
        let response = self
            .client
            .get(format!("{API_BASE}/commentThreads"))
            .query(&[
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", limit.to_string().as_str()),
                ("order", "relevance"),
                ("textFormat", "plainText"),
                ("key", key),
            ])
            .send()
            .await?;
        read_json_response(response).await
    }
}

// ---------------------------------------------------------------------------
// Response reshaping (pub for integration testing)
// ---------------------------------------------------------------------------

/// Extract `(video_id, title)` from a search response, if any hit.
#[doc(hidden)]
pub fn first_video_match(response: &Value) -> Option<(String, String)> {
    let item = response.get("items")?.as_array()?.first()?;
    let id = item.get("id")?.get("videoId")?.as_str()?.to_owned();
    let title = item
        .get("snippet")
        .and_then(|s| s.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();
    Some((id, title))
}

/// Reshape comment threads into comment records, capped at `max`.
#[doc(hidden)]
pub fn reshape_comments(response: &Value, max: usize) -> Vec<Value> {
    response
        .get("items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(max)
                .filter_map(|item| {
                    let snippet = item
                        .get("snippet")?
                        .get("topLevelComment")?
                        .get("snippet")?;
                    let text_field = |field: &str| {
                        snippet
                            .get(field)
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_owned()
                    };
                    Some(json!({
                        "autor": text_field("authorDisplayName"),
                        "texto": text_field("textDisplay"),
                        "curtidas": snippet.get("likeCount").and_then(Value::as_i64).unwrap_or(0),
                        "publicado_em": text_field("publishedAt"),
                    }))
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Handler and registration
// ---------------------------------------------------------------------------

/// Handler for the `youtube` intent.
struct CommentReportHandler {
    client: Arc<YouTubeClient>,
}

#[async_trait::async_trait]
impl IntentHandler for CommentReportHandler {
    async fn execute(&self, query: &ResolvedQuery) -> Result<RawResult, AdapterError> {
        let limit = clamp_limit(query.integer("limite"), self.client.max_rows);

        let explicit_id = query.text("video_id").trim().to_owned();
        let term = query.text("termo_busca").trim().to_owned();

        let (video_id, title) = if !explicit_id.is_empty() {
            (explicit_id, String::new())
        } else if !term.is_empty() {
            match self.client.search_video(&term).await? {
                Some(hit) => hit,
                None => return Ok(RawResult::Empty),
            }
        } else {
            return Err(AdapterError::Invalid(
                "nenhum vídeo especificado: informe video_id ou termo_busca".to_owned(),
            ));
        };

        let response = self.client.comment_threads(&video_id, limit).await?;
        let comments = reshape_comments(&response, limit);
        if comments.is_empty() {
            return Ok(RawResult::Empty);
        }

        let mut value = json!({
            "video_id": video_id,
            "total_comentarios": comments.len(),
            "comentarios": comments,
        });
        if !title.is_empty() {
            value["titulo"] = json!(title);
        }
        Ok(RawResult::object(value))
    }
}

/// Register the comment-report intent.
pub fn register(registry: &mut IntentRegistry, client: Arc<YouTubeClient>) {
    registry.register(
        IntentSchema::new(
            "youtube",
            "comentários de um vídeo, por id ou termo de busca, para análise de sentimento",
        )
        .param(ParamSpec::text("video_id", ""))
        .param(ParamSpec::text("termo_busca", ""))
        .param(ParamSpec::integer("limite", 20)),
        Arc::new(CommentReportHandler { client }),
    );
}
