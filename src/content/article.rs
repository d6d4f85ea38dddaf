//! Article documents (read only)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::Comment;

/// Projections yield `null` for absent attributes
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// URL slug wrapper as stored (`{current: "..."}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Dereferenced article author
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Image asset, passed through untouched
    #[serde(default)]
    pub image: Option<Value>,
}

/// A published article as returned by the article-by-slug projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Cover image asset
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<Value>,

    pub slug: Slug,

    #[serde(default)]
    pub author: Option<Author>,

    /// Portable-text blocks
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<Value>,

    /// Approved comments at load time
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
}

/// A lightweight entry for listings and static paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    pub slug: Slug,

    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<DateTime<Utc>>,
}
