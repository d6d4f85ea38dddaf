//! `/api/createComment`

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::content::COMMENT_TYPE;
use crate::server::ServerState;

/// Why a comment was not created
#[derive(Debug, Error)]
pub enum CreateCommentError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body absent, unparsable, or not an object; carries the detail
    #[error("Invalid JSON input: {0}")]
    InvalidInput(String),

    #[error("Missing required fields: _id, name, email, comment")]
    MissingFields,

    /// Store write failed; carries the store's message
    #[error("Couldn't submit comment: {0}")]
    Store(String),
}

impl IntoResponse for CreateCommentError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            CreateCommentError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "message": "Method not allowed" }),
            ),
            CreateCommentError::InvalidInput(error) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Invalid JSON input", "error": error }),
            ),
            CreateCommentError::MissingFields => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Missing required fields: _id, name, email, comment" }),
            ),
            CreateCommentError::Store(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Couldn't submit comment", "error": error }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// A validated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
}

impl Submission {
    /// Parse and validate a raw request body
    pub fn parse(body: &[u8]) -> Result<Self, CreateCommentError> {
        if body.is_empty() {
            return Err(CreateCommentError::InvalidInput(
                "Request body is required".to_string(),
            ));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| CreateCommentError::InvalidInput(e.to_string()))?;
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(CreateCommentError::InvalidInput(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        match (
            required(&fields, "_id"),
            required(&fields, "name"),
            required(&fields, "email"),
            required(&fields, "comment"),
        ) {
            (Some(post_id), Some(name), Some(email), Some(comment)) => Ok(Self {
                post_id,
                name,
                email,
                comment,
            }),
            _ => Err(CreateCommentError::MissingFields),
        }
    }

    /// The document to store; `approved` comes from server policy only
    pub fn into_document(self, approved: bool, now: DateTime<Utc>) -> Value {
        json!({
            "_type": COMMENT_TYPE,
            "post": {
                "_type": "reference",
                "_ref": self.post_id,
            },
            "name": self.name,
            "email": self.email,
            "comment": self.comment,
            "approved": approved,
            "publishedAt": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn required(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Create one comment document for an article
pub async fn create_comment(
    State(state): State<Arc<ServerState>>,
    method: Method,
    body: Bytes,
) -> Result<Json<Value>, CreateCommentError> {
    if method != Method::POST {
        return Err(CreateCommentError::MethodNotAllowed);
    }

    let submission = Submission::parse(&body)?;
    let document = submission.into_document(state.comments.auto_approve, Utc::now());

    let created = state.store.create(document).await.map_err(|e| {
        tracing::error!("Error submitting comment: {}", e);
        CreateCommentError::Store(e.to_string())
    })?;

    tracing::info!(
        "Comment submitted: {} on {}",
        created["_id"].as_str().unwrap_or("?"),
        created["post"]["_ref"].as_str().unwrap_or("?")
    );

    Ok(Json(json!({
        "message": "Comment submitted successfully!",
        "comment": created,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::store::MemoryStore;

    fn state() -> (Arc<MemoryStore>, Arc<ServerState>) {
        state_with(SiteConfig::default())
    }

    fn state_with(config: SiteConfig) -> (Arc<MemoryStore>, Arc<ServerState>) {
        let store = Arc::new(MemoryStore::with_documents(vec![json!({
            "_id": "p1", "_type": "post", "title": "Hello", "slug": {"current": "hello"}
        })]));
        let state = ServerState::new(store.clone(), &config).unwrap();
        (store, Arc::new(state))
    }

    async fn call(state: Arc<ServerState>, method: Method, body: &str) -> (StatusCode, Value) {
        let response = create_comment(State(state), method, Bytes::from(body.to_string()))
            .await
            .into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    const VALID: &str = r#"{"_id":"p1","name":"Ann","email":"a@x.com","comment":"hi"}"#;

    #[tokio::test]
    async fn test_rejects_other_methods() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let (_store, state) = state();
            let (status, body) = call(state, method, VALID).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body["message"], "Method not allowed");
        }
    }

    #[tokio::test]
    async fn test_method_checked_before_body() {
        let (_store, state) = state();
        let (status, _) = call(state, Method::GET, "not json").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unparsable_body() {
        for body in ["", "{", "name=Ann", "[1,2"] {
            let (_store, state) = state();
            let (status, json) = call(state, Method::POST, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(json["message"], "Invalid JSON input");
            assert!(!json["error"].as_str().unwrap().is_empty());
        }

        let err = Submission::parse(b"{").unwrap_err();
        let detail = serde_json::from_slice::<Value>(b"{").unwrap_err().to_string();
        assert!(matches!(err, CreateCommentError::InvalidInput(ref e) if *e == detail));
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let bodies = [
            r#"{"name":"Ann","email":"a@x.com","comment":"hi"}"#,
            r#"{"_id":"p1","email":"a@x.com","comment":"hi"}"#,
            r#"{"_id":"p1","name":"Ann","comment":"hi"}"#,
            r#"{"_id":"p1","name":"Ann","email":"a@x.com"}"#,
            r#"{"_id":"p1","name":"","email":"a@x.com","comment":"hi"}"#,
            r#"{"_id":"p1","name":"Ann","email":"a@x.com","comment":null}"#,
        ];
        for body in bodies {
            let (store, state) = state();
            let (status, json) = call(state, Method::POST, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
            assert_eq!(
                json["message"],
                "Missing required fields: _id, name, email, comment"
            );
            assert_eq!(store.documents().await.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_creates_approved_comment() {
        let (store, state) = state();
        let (status, json) = call(state, Method::POST, VALID).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Comment submitted successfully!");
        assert_eq!(json["comment"]["post"]["_ref"], "p1");
        assert_eq!(json["comment"]["approved"], true);
        assert_eq!(json["comment"]["_type"], "comment");
        assert!(json["comment"]["_id"].is_string());
        assert!(json["comment"]["publishedAt"].is_string());
        assert_eq!(store.documents().await.len(), 2);
    }

    #[tokio::test]
    async fn test_client_cannot_choose_approval() {
        let mut config = SiteConfig::default();
        config.comments.auto_approve = false;
        let (_store, state) = state_with(config);
        let body = r#"{"_id":"p1","name":"Ann","email":"a@x.com","comment":"hi","approved":true}"#;
        let (status, json) = call(state, Method::POST, body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["comment"]["approved"], false);
    }

    #[tokio::test]
    async fn test_resubmission_creates_duplicate() {
        let (store, state) = state();
        call(state.clone(), Method::POST, VALID).await;
        call(state, Method::POST, VALID).await;
        assert_eq!(store.documents().await.len(), 3);
    }

    #[tokio::test]
    async fn test_store_failure_passes_message_through() {
        let (store, state) = state();
        store.fail_with("Insufficient permissions; permission \"create\" required").await;
        let (status, json) = call(state, Method::POST, VALID).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Couldn't submit comment");
        assert_eq!(
            json["error"],
            "Insufficient permissions; permission \"create\" required"
        );
    }

    #[tokio::test]
    async fn test_dangling_post_reference_fails_at_store() {
        let (_store, state) = state();
        let body = r#"{"_id":"ghost","name":"Ann","email":"a@x.com","comment":"hi"}"#;
        let (status, json) = call(state, Method::POST, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("ghost"));
    }

    #[test]
    fn test_non_object_body() {
        let err = Submission::parse(b"42").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid JSON input: expected a JSON object, found a number"
        );
    }
}
