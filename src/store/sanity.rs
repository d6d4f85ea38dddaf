//! Hosted content store over its HTTP API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ContentStore, Query, StoreError};
use crate::config::StoreConfig;

/// Query endpoint response
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

/// Mutation endpoint response (`returnDocuments=true`)
#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutationResult>,
}

#[derive(Debug, Deserialize)]
struct MutationResult {
    #[serde(default)]
    document: Option<Value>,
}

/// Client for the hosted document store
pub struct SanityStore {
    client: Client,
    query_url: String,
    mutate_url: String,
    token: Option<String>,
}

impl SanityStore {
    /// Create a client from store configuration
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.project_id.is_empty() {
            return Err(StoreError::Unavailable(
                "store.project_id is not configured".to_string(),
            ));
        }

        let read_host = if config.use_cdn {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };

        Ok(Self {
            client: Client::builder().build()?,
            query_url: endpoint(config, read_host, "query"),
            mutate_url: endpoint(config, "api.sanity.io", "mutate"),
            token: config.token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn endpoint(config: &StoreConfig, host: &str, action: &str) -> String {
    format!(
        "https://{}.{}/v{}/data/{}/{}",
        config.project_id,
        host,
        config.api_version.trim_start_matches('v'),
        action,
        config.dataset
    )
}

/// Query-string pairs: the GROQ text, then each parameter JSON-encoded as `$name`
fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let mut pairs = vec![("query".to_string(), query.groq().to_string())];
    for (name, value) in query.params() {
        pairs.push((format!("${}", name), value.to_string()));
    }
    pairs
}

/// Extract a human readable message from an error response body
fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let candidates = [
            value.pointer("/error/description"),
            value.get("message"),
            value.get("error"),
        ];
        if let Some(message) = candidates.into_iter().flatten().find_map(Value::as_str) {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("Request failed with status {}", status)
    } else {
        body.trim().to_string()
    }
}

async fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status.as_u16(), &body);
    tracing::debug!("Content store rejected request ({}): {}", status, message);
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ContentStore for SanityStore {
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError> {
        let request = self
            .client
            .get(&self.query_url)
            .query(&query_pairs(query));
        let response = check_status(self.authorize(request).send().await?).await?;
        let body: QueryResponse = response.json().await?;
        Ok(body.result)
    }

    async fn create(&self, document: Value) -> Result<Value, StoreError> {
        if self.token.is_none() {
            return Err(StoreError::MissingToken);
        }

        let request = self
            .client
            .post(&self.mutate_url)
            .query(&[("returnDocuments", "true")])
            .json(&json!({ "mutations": [{ "create": document }] }));
        let response = check_status(self.authorize(request).send().await?).await?;
        let body: MutateResponse = response.json().await?;

        body.results
            .into_iter()
            .find_map(|result| result.document)
            .ok_or(StoreError::EmptyMutation)
    }
}
