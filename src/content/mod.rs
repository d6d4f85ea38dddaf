//! Content module - article and comment documents from the content store

mod article;
mod comment;
pub mod portable_text;

pub use article::{Article, ArticleSummary, Author, Slug};
pub use comment::{placeholder_id, Comment, Reference, COMMENT_TYPE};
