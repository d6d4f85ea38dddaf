//! `/api/getComments`

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::content::Comment;
use crate::server::ServerState;
use crate::store;

/// Why approved comments could not be listed
#[derive(Debug, Error)]
pub enum GetCommentsError {
    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),

    #[error("Missing postId query parameter")]
    MissingParameter,

    #[error("Failed to fetch comments")]
    Store,
}

impl IntoResponse for GetCommentsError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        match self {
            GetCommentsError::MethodNotAllowed(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET")],
                body,
            )
                .into_response(),
            GetCommentsError::MissingParameter => (StatusCode::BAD_REQUEST, body).into_response(),
            GetCommentsError::Store => (StatusCode::INTERNAL_SERVER_ERROR, body).into_response(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

/// Approved comments for the article named by `postId`
pub async fn get_comments(
    State(state): State<Arc<ServerState>>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CommentsResponse>, GetCommentsError> {
    if method != Method::GET {
        return Err(GetCommentsError::MethodNotAllowed(method));
    }

    let post_id = params
        .get("postId")
        .filter(|id| !id.is_empty())
        .ok_or(GetCommentsError::MissingParameter)?;

    let comments = store::approved_comments(state.store.as_ref(), post_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch comments for {}: {}", post_id, e);
            GetCommentsError::Store
        })?;

    tracing::debug!("Fetched {} comments for {}", comments.len(), post_id);
    Ok(Json(CommentsResponse { comments }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::store::{ContentStore, MemoryStore};
    use serde_json::Value;

    fn seeded() -> (Arc<MemoryStore>, Arc<ServerState>) {
        let comment = |id: &str, post: &str, approved: bool| {
            json!({"_id": id, "_type": "comment", "post": {"_type": "reference", "_ref": post},
                   "name": "Ann", "email": "a@x.com", "comment": id, "approved": approved})
        };
        let store = Arc::new(MemoryStore::with_documents(vec![
            json!({"_id": "p1", "_type": "post", "slug": {"current": "hello"}}),
            comment("c1", "p1", true),
            comment("c2", "p1", false),
            comment("c3", "p1", true),
            comment("c4", "p2", true),
        ]));
        let state = ServerState::new(store.clone(), &SiteConfig::default()).unwrap();
        (store, Arc::new(state))
    }

    async fn call(
        state: Arc<ServerState>,
        method: Method,
        params: &[(&str, &str)],
    ) -> (StatusCode, Option<String>, Value) {
        let params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let response = get_comments(State(state), method, Query(params))
            .await
            .into_response();
        let status = response.status();
        let allow = response
            .headers()
            .get(header::ALLOW)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, allow, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_returns_only_approved_for_post() {
        let (_store, state) = seeded();
        let (status, _, body) = call(state, Method::GET, &[("postId", "p1")]).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<_> = body["comments"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c1", "c3"]);
    }

    #[tokio::test]
    async fn test_unknown_post_is_empty() {
        let (_store, state) = seeded();
        let (status, _, body) = call(state, Method::GET, &[("postId", "none")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"comments": []}));
    }

    #[tokio::test]
    async fn test_rejects_other_methods_with_allow_header() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let (_store, state) = seeded();
            let (status, allow, body) =
                call(state, method.clone(), &[("postId", "p1")]).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(allow.as_deref(), Some("GET"));
            assert_eq!(body["error"], format!("Method {} Not Allowed", method));
        }
    }

    #[tokio::test]
    async fn test_missing_post_id() {
        for params in [&[][..], &[("postId", "")][..], &[("post", "p1")][..]] {
            let (store, state) = seeded();
            store.fail_with("must not be queried").await;
            let (status, _, body) = call(state, Method::GET, params).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Missing postId query parameter");
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_generic() {
        let (store, state) = seeded();
        store.fail_with("secret internal detail").await;
        let (status, _, body) = call(state, Method::GET, &[("postId", "p1")]).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to fetch comments"}));
    }

    #[tokio::test]
    async fn test_created_comment_visible_when_approved() {
        let (store, state) = seeded();
        store
            .create(json!({"_type": "comment", "post": {"_type": "reference", "_ref": "p1"},
                           "name": "B", "email": "b@x.com", "comment": "new", "approved": true}))
            .await
            .unwrap();
        let (_, _, body) = call(state, Method::GET, &[("postId", "p1")]).await;
        assert_eq!(body["comments"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_partial_comment_does_not_fail_list() {
        let (store, state) = seeded();
        store
            .insert(json!({"_id": "c5", "_type": "comment", "post": {"_type": "reference", "_ref": "p1"},
                           "name": "Bob", "comment": "no email", "approved": true}))
            .await;
        let (status, _, body) = call(state, Method::GET, &[("postId", "p1")]).await;
        assert_eq!(status, StatusCode::OK);
        let comments = body["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[2]["_id"], "c5");
        assert_eq!(comments[2]["comment"], "no email");
    }
}
