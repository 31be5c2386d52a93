//! HTTP client for the Notion database query API.
//!
//! Uses reqwest with Bearer token auth. Every request carries the pinned
//! `Notion-Version` header.

use async_trait::async_trait;
use serde::Deserialize;

use crate::notion::DatabaseIds;
use crate::source::RecordSource;
use crate::types::Collection;

const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// API version header value the property shapes were written against.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Records requested per collection. Notion caps a single page at 100.
pub const PAGE_SIZE: u32 = 100;

/// Longest slice of a non-JSON error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    #[error("Notion API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Notion API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Failed to parse Notion response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No Notion database configured for {0}")]
    MissingDatabase(Collection),
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

pub struct NotionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    databases: DatabaseIds,
}

impl NotionClient {
    pub fn new(api_key: &str, databases: DatabaseIds) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: NOTION_API_URL.to_string(),
            databases,
        }
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn query_url(&self, database_id: &str) -> String {
        format!("{}/databases/{}/query", self.base_url, database_id)
    }

    /// Query one database and return its raw page objects.
    pub async fn query_database(
        &self,
        database_id: &str,
    ) -> Result<Vec<serde_json::Value>, NotionError> {
        let body = serde_json::json!({ "page_size": PAGE_SIZE });
        let resp = self
            .client
            .post(self.query_url(database_id))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(NotionError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let parsed: QueryResponse = serde_json::from_str(&text)?;
        Ok(parsed.results)
    }
}

#[async_trait]
impl RecordSource for NotionClient {
    async fn query_collection(
        &self,
        collection: Collection,
    ) -> Result<Vec<serde_json::Value>, NotionError> {
        let database_id = self
            .databases
            .get(collection)
            .ok_or(NotionError::MissingDatabase(collection))?;

        let records = self.query_database(database_id).await?;
        log::info!("Notion source: fetched {} {}", records.len(), collection);
        Ok(records)
    }
}

/// Pull the human-readable message out of a Notion error body.
///
/// Notion errors look like `{"object":"error","code":"...","message":"..."}`.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect())
}
