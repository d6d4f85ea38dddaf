//! Content store access
//!
//! The content store owns every durable document. This crate only talks to
//! it through [`ContentStore`]: run one of the known [`Query`] shapes, or
//! create a document. The hosted store is reached over HTTP by
//! [`SanityStore`]; [`MemoryStore`] evaluates the same queries in-process for
//! tests and offline development.

mod memory;
mod sanity;

pub use memory::MemoryStore;
pub use sanity::SanityStore;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::content::{Article, ArticleSummary, Comment};

/// Errors raised by a content store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected document shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("mutation returned no document")]
    EmptyMutation,

    #[error("a write token is required to create documents")]
    MissingToken,

    #[error("{0}")]
    Unavailable(String),
}

/// The queries this site issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Approved comments for one article, in store order
    ApprovedComments { post_id: String },
    /// One article with dereferenced author and its approved comments
    ArticleBySlug { slug: String },
    /// Every article, for listings and static paths
    ArticleSummaries,
}

impl Query {
    /// GROQ text sent to the hosted store
    pub fn groq(&self) -> &'static str {
        match self {
            Query::ApprovedComments { .. } => {
                r#"*[_type == "comment" && post._ref == $postId && approved == true]"#
            }
            Query::ArticleBySlug { .. } => {
                r#"*[_type == "post" && slug.current == $slug][0]{
  _id,
  publishedAt,
  title,
  author->{
    name,
    image
  },
  "comments": *[_type == "comment" && post._ref == ^._id && approved == true],
  description,
  mainImage,
  slug,
  body[]
}"#
            }
            Query::ArticleSummaries => {
                r#"*[_type == "post"]{
  _id,
  title,
  publishedAt,
  slug {
    current
  }
}"#
            }
        }
    }

    /// Bound parameters, keyed without the `$` prefix
    pub fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        match self {
            Query::ApprovedComments { post_id } => {
                params.insert("postId".to_string(), json!(post_id));
            }
            Query::ArticleBySlug { slug } => {
                params.insert("slug".to_string(), json!(slug));
            }
            Query::ArticleSummaries => {}
        }
        params
    }
}

/// A remote document store
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Run a query and return its raw result
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError>;

    /// Create one document and return it as stored
    async fn create(&self, document: Value) -> Result<Value, StoreError>;
}

/// Shared handle to the configured store
pub type SharedStore = Arc<dyn ContentStore>;

/// Approved comments for an article
pub async fn approved_comments(
    store: &dyn ContentStore,
    post_id: &str,
) -> Result<Vec<Comment>, StoreError> {
    let result = store
        .fetch(&Query::ApprovedComments {
            post_id: post_id.to_string(),
        })
        .await?;
    if result.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(result)?)
}

/// Look up an article by slug; `None` when no article has it
pub async fn article_by_slug(
    store: &dyn ContentStore,
    slug: &str,
) -> Result<Option<Article>, StoreError> {
    let result = store
        .fetch(&Query::ArticleBySlug {
            slug: slug.to_string(),
        })
        .await?;
    if result.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(result)?))
}

/// All articles
pub async fn article_summaries(
    store: &dyn ContentStore,
) -> Result<Vec<ArticleSummary>, StoreError> {
    let result = store.fetch(&Query::ArticleSummaries).await?;
    if result.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(result)?)
}

/// Build the store selected by configuration
pub async fn open(config: &StoreConfig, base_dir: &std::path::Path) -> anyhow::Result<SharedStore> {
    match config.backend {
        StoreBackend::Sanity => {
            tracing::info!(
                "Using content store {}/{}",
                config.project_id,
                config.dataset
            );
            let store: SharedStore = Arc::new(SanityStore::new(config)?);
            Ok(store)
        }
        StoreBackend::Memory => {
            let store = match &config.seed {
                Some(seed) if base_dir.join(seed).exists() => {
                    MemoryStore::load_seed(base_dir.join(seed)).await?
                }
                Some(seed) => {
                    tracing::warn!("Seed file {} not found, starting empty", seed);
                    MemoryStore::new()
                }
                None => MemoryStore::new(),
            };
            let store: SharedStore = Arc::new(store);
            Ok(store)
        }
    }
}
