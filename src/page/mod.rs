//! Article pages: server-side rendering and the interactive comment thread

mod cache;
mod client;
mod controller;
mod thread;

pub use cache::{PageCache, PageError};
pub use client::{ClientError, CommentForm, CommentsApi, HttpCommentsApi};
pub use controller::{PageController, SubmitOutcome};
pub use thread::{merge, CommentThread, MergeStrategy};
