//! Client side of the comment endpoints

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::content::Comment;

/// Errors talking to the comment endpoints
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Other(String),
}

/// Values of the article comment form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentForm {
    /// Hidden field carrying the article id
    #[serde(rename = "_id")]
    pub post_id: String,
    pub name: String,
    pub email: String,
    pub comment: String,
}

impl CommentForm {
    /// An empty form for the given article
    pub fn for_post(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            ..Self::default()
        }
    }

    /// Required visible fields left empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.comment.is_empty() {
            missing.push("comment");
        }
        missing
    }

    /// Clear the visible fields, keeping the article id
    pub fn reset(&mut self) {
        *self = Self::for_post(&self.post_id);
    }
}

/// The two comment endpoints as seen from an article page
#[async_trait]
pub trait CommentsApi: Send + Sync {
    /// Submit a new comment; `Err(ClientError::Status)` means the server
    /// answered with a non-success status
    async fn create_comment(&self, form: &CommentForm) -> Result<(), ClientError>;

    /// Approved comments for an article
    async fn approved_comments(&self, post_id: &str) -> Result<Vec<Comment>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct CommentsBody {
    #[serde(default)]
    comments: Option<Vec<Comment>>,
}

/// Comment endpoints of a running site
pub struct HttpCommentsApi {
    client: Client,
    base_url: String,
}

impl HttpCommentsApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"))
        .to_string();
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CommentsApi for HttpCommentsApi {
    async fn create_comment(&self, form: &CommentForm) -> Result<(), ClientError> {
        let body = serde_json::to_string(form).map_err(|e| ClientError::Other(e.to_string()))?;
        let response = self
            .client
            .post(self.url("/api/createComment"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn approved_comments(&self, post_id: &str) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/getComments"))
            .query(&[("postId", post_id)])
            .send()
            .await?;
        let body: CommentsBody = check_status(response).await?.json().await?;
        Ok(body.comments.unwrap_or_default())
    }
}
