//! Comment documents

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::article::null_as_default;

/// Document type of stored comments
pub const COMMENT_TYPE: &str = "comment";

/// Length of client-side placeholder ids
const PLACEHOLDER_ID_LEN: usize = 9;

/// A reference to another document (`{_type: "reference", _ref: ...}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref", default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(rename = "_type", default = "reference_type")]
    pub kind: String,
}

fn reference_type() -> String {
    "reference".to_string()
}

impl Default for Reference {
    fn default() -> Self {
        Self::to("")
    }
}

impl Reference {
    /// Reference the document with the given id
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: reference_type(),
        }
    }
}

/// A reader comment attached to one article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned id, or a client placeholder before confirmation
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_type", default = "comment_type")]
    pub kind: String,

    /// The article this comment belongs to
    #[serde(default, deserialize_with = "null_as_default")]
    pub post: Reference,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    /// Comment body text
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,

    /// Visibility gate for the read path
    #[serde(default, deserialize_with = "null_as_default")]
    pub approved: bool,

    #[serde(
        rename = "publishedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    #[serde(rename = "_createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Fields this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn comment_type() -> String {
    COMMENT_TYPE.to_string()
}

impl Comment {
    /// Build a not-yet-confirmed comment with a random placeholder id
    pub fn optimistic(post_id: &str, name: &str, email: &str, comment: &str) -> Self {
        Self {
            id: placeholder_id(),
            kind: comment_type(),
            post: Reference::to(post_id),
            name: name.to_string(),
            email: email.to_string(),
            comment: comment.to_string(),
            approved: false,
            published_at: Some(Utc::now()),
            rev: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// Whether two comments carry the same submission, ignoring ids and timestamps
    pub fn same_submission(&self, other: &Comment) -> bool {
        self.post.id == other.post.id
            && self.name == other.name
            && self.email == other.email
            && self.comment == other.comment
    }
}

/// Random base-36 id, never persisted
pub fn placeholder_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..PLACEHOLDER_ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
