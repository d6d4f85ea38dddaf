//! In-process content store

use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::path::Path;
use tokio::sync::RwLock;

use super::{ContentStore, Query, StoreError};

/// Documents kept in insertion order, queried with the same semantics as the
/// hosted store for the queries in [`Query`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Value>>,
    failure: RwLock<Option<String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given documents
    pub fn with_documents(documents: Vec<Value>) -> Self {
        Self {
            documents: RwLock::new(documents),
            failure: RwLock::new(None),
        }
    }

    /// Load a JSON array of documents
    pub async fn load_seed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let documents: Vec<Value> = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} documents from {:?}",
            documents.len(),
            path.as_ref()
        );
        Ok(Self::with_documents(documents))
    }

    /// Insert a document as-is, bypassing validation
    pub async fn insert(&self, document: Value) {
        self.documents.write().await.push(document);
    }

    /// Snapshot of every stored document
    pub async fn documents(&self) -> Vec<Value> {
        self.documents.read().await.clone()
    }

    /// Make every following call fail with `message` until [`recover`](Self::recover)
    pub async fn fail_with(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    async fn check_available(&self) -> Result<(), StoreError> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError> {
        self.check_available().await?;
        let documents = self.documents.read().await;

        let result = match query {
            Query::ApprovedComments { post_id } => {
                Value::Array(approved_comments_for(&documents, post_id))
            }
            Query::ArticleBySlug { slug } => documents
                .iter()
                .find(|doc| {
                    doc_type(doc) == Some("post")
                        && doc["slug"]["current"].as_str() == Some(slug.as_str())
                })
                .map(|post| project_article(&documents, post))
                .unwrap_or(Value::Null),
            Query::ArticleSummaries => Value::Array(
                documents
                    .iter()
                    .filter(|doc| doc_type(doc) == Some("post"))
                    .map(|post| {
                        json!({
                            "_id": attribute(post, "_id"),
                            "title": attribute(post, "title"),
                            "publishedAt": attribute(post, "publishedAt"),
                            "slug": {"current": post["slug"]["current"].clone()},
                        })
                    })
                    .collect(),
            ),
        };

        Ok(result)
    }

    async fn create(&self, document: Value) -> Result<Value, StoreError> {
        self.check_available().await?;

        let mut fields = match document {
            Value::Object(fields) => fields,
            _ => {
                return Err(rejected("Document must be an object"));
            }
        };
        if !fields.get("_type").map(Value::is_string).unwrap_or(false) {
            return Err(rejected("Document is missing required `_type` attribute"));
        }

        let mut documents = self.documents.write().await;

        for value in fields.values() {
            if let Some(target) = strong_reference(value) {
                let exists = documents
                    .iter()
                    .any(|doc| doc["_id"].as_str() == Some(target));
                if !exists {
                    return Err(rejected(&format!(
                        "Document references non-existent document \"{}\"",
                        target
                    )));
                }
            }
        }

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if !fields.contains_key("_id") {
            fields.insert("_id".to_string(), json!(random_token(22)));
        }
        fields.insert("_rev".to_string(), json!(random_token(22)));
        fields.insert("_createdAt".to_string(), json!(now));
        fields.insert("_updatedAt".to_string(), json!(now));

        let id = fields["_id"].as_str().unwrap_or_default();
        if documents.iter().any(|doc| doc["_id"].as_str() == Some(id)) {
            return Err(rejected(&format!("Document by ID \"{}\" already exists", id)));
        }

        let created = Value::Object(fields);
        documents.push(created.clone());
        Ok(created)
    }
}

fn rejected(message: &str) -> StoreError {
    StoreError::Rejected {
        status: 400,
        message: message.to_string(),
    }
}

fn doc_type(doc: &Value) -> Option<&str> {
    doc.get("_type").and_then(Value::as_str)
}

/// Projected attribute, `null` when absent
fn attribute(doc: &Value, key: &str) -> Value {
    doc.get(key).cloned().unwrap_or(Value::Null)
}

/// Target id of a non-weak reference value
fn strong_reference(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    if object.get("_type").and_then(Value::as_str) != Some("reference") {
        return None;
    }
    if object.get("_weak").and_then(Value::as_bool) == Some(true) {
        return None;
    }
    object.get("_ref").and_then(Value::as_str)
}

fn approved_comments_for(documents: &[Value], post_id: &str) -> Vec<Value> {
    documents
        .iter()
        .filter(|doc| {
            doc_type(doc) == Some("comment")
                && doc["post"]["_ref"].as_str() == Some(post_id)
                && doc["approved"] == Value::Bool(true)
        })
        .cloned()
        .collect()
}

fn project_article(documents: &[Value], post: &Value) -> Value {
    let id = post["_id"].as_str().unwrap_or_default();

    let author = post["author"]["_ref"]
        .as_str()
        .and_then(|author_id| {
            documents
                .iter()
                .find(|doc| doc["_id"].as_str() == Some(author_id))
        })
        .map(|author| {
            json!({
                "name": attribute(author, "name"),
                "image": attribute(author, "image"),
            })
        })
        .unwrap_or(Value::Null);

    let mut projected = Map::new();
    projected.insert("_id".to_string(), attribute(post, "_id"));
    projected.insert("publishedAt".to_string(), attribute(post, "publishedAt"));
    projected.insert("title".to_string(), attribute(post, "title"));
    projected.insert("author".to_string(), author);
    projected.insert(
        "comments".to_string(),
        Value::Array(approved_comments_for(documents, id)),
    );
    projected.insert("description".to_string(), attribute(post, "description"));
    projected.insert("mainImage".to_string(), attribute(post, "mainImage"));
    projected.insert("slug".to_string(), attribute(post, "slug"));
    projected.insert("body".to_string(), attribute(post, "body"));
    Value::Object(projected)
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
