//! Displayed comment list and its transitions
//!
//! The article page owns exactly one [`CommentThread`]. It changes only
//! through the transitions below, each a plain function of the previous list
//! and an incoming value, so the reconciliation races of the page can be
//! replayed without a server.

use serde::{Deserialize, Serialize};

use crate::content::Comment;

/// How refetched comments are matched against the ones already displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Match on `_id`; an optimistic placeholder never matches its stored copy
    ById,
    /// Match on `_id`, or on post reference, name, email and comment text
    ByContent,
}

impl MergeStrategy {
    /// Whether `fetched` supersedes the displayed `local` comment
    fn supersedes(self, fetched: &Comment, local: &Comment) -> bool {
        match self {
            MergeStrategy::ById => fetched.id == local.id,
            MergeStrategy::ByContent => fetched.id == local.id || fetched.same_submission(local),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::ById => "by_id",
            MergeStrategy::ByContent => "by_content",
        }
    }
}

/// Server comments first, then every displayed comment no server comment supersedes
pub fn merge(previous: &[Comment], fetched: Vec<Comment>, strategy: MergeStrategy) -> Vec<Comment> {
    let kept: Vec<Comment> = previous
        .iter()
        .filter(|local| !fetched.iter().any(|remote| strategy.supersedes(remote, local)))
        .cloned()
        .collect();

    let mut merged = fetched;
    merged.extend(kept);
    merged
}

/// The comment list shown under an article
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
}

impl CommentThread {
    /// Start from the server-rendered comments
    pub fn new(initial: Vec<Comment>) -> Self {
        Self { comments: initial }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Comments shown but not (yet) confirmed as approved
    pub fn pending(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.approved)
    }

    /// Replace the list with a fetch result
    pub fn replace(&mut self, fetched: Vec<Comment>) {
        self.comments = fetched;
    }

    /// Show a comment before the server confirms it
    pub fn append_optimistic(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Reconcile with a refetched list
    pub fn merge_fetched(&mut self, fetched: Vec<Comment>, strategy: MergeStrategy) {
        self.comments = merge(&self.comments, fetched, strategy);
    }
}
