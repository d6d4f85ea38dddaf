//! Interactive side of an article page

use crate::content::{Article, Comment};

use super::client::{ClientError, CommentForm, CommentsApi};
use super::thread::{CommentThread, MergeStrategy};

/// Result of one form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Required fields were empty; nothing was displayed or sent
    Invalid(Vec<&'static str>),
    /// Answered, refetched and merged; the form was reset
    Reconciled,
    /// The write request never got an answer; the optimistic comment stays displayed
    WriteFailed,
    /// The write went through but the refetch failed
    RefetchFailed,
}

/// Drives one article page: initial comments, mount fetch, and submissions
pub struct PageController<A: CommentsApi> {
    api: A,
    post_id: String,
    thread: CommentThread,
    form: CommentForm,
    strategy: MergeStrategy,
}

impl<A: CommentsApi> PageController<A> {
    /// Start from a server-rendered article
    pub fn new(api: A, article: &Article, strategy: MergeStrategy) -> Self {
        Self::for_post(api, &article.id, article.comments.clone(), strategy)
    }

    /// Start from an article id and its already known comments
    pub fn for_post(
        api: A,
        post_id: &str,
        initial: Vec<Comment>,
        strategy: MergeStrategy,
    ) -> Self {
        Self {
            api,
            post_id: post_id.to_string(),
            thread: CommentThread::new(initial),
            form: CommentForm::for_post(post_id),
            strategy,
        }
    }

    pub fn thread(&self) -> &CommentThread {
        &self.thread
    }

    pub fn form(&self) -> &CommentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CommentForm {
        &mut self.form
    }

    /// Replace the server-rendered comments with the current approved list
    pub async fn mount(&mut self) {
        match self.api.approved_comments(&self.post_id).await {
            Ok(comments) => {
                tracing::debug!("Fetched {} comments for {}", comments.len(), self.post_id);
                self.thread.replace(comments);
            }
            Err(e) => {
                tracing::warn!("Failed to fetch comments for {}: {}", self.post_id, e);
            }
        }
    }

    /// Submit the form: show the comment at once, write it, then reconcile
    pub async fn submit(&mut self) -> SubmitOutcome {
        let missing = self.form.missing_fields();
        if !missing.is_empty() {
            return SubmitOutcome::Invalid(missing);
        }

        let optimistic = Comment::optimistic(
            &self.post_id,
            &self.form.name,
            &self.form.email,
            &self.form.comment,
        );
        self.thread.append_optimistic(optimistic);

        match self.api.create_comment(&self.form).await {
            Ok(()) => {}
            // The server answered; the reconcile still runs against its list
            Err(ClientError::Status { status, message }) => {
                tracing::warn!("Comment write answered {}: {}", status, message);
            }
            Err(e) => {
                tracing::error!("Error submitting comment: {}", e);
                return SubmitOutcome::WriteFailed;
            }
        }

        let fetched = match self.api.approved_comments(&self.post_id).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::error!("Error submitting comment: {}", e);
                return SubmitOutcome::RefetchFailed;
            }
        };

        self.thread.merge_fetched(fetched, self.strategy);
        self.form.reset();
        SubmitOutcome::Reconciled
    }
}
