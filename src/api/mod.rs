//! Comment endpoints

mod create_comment;
mod get_comments;

pub use create_comment::{create_comment, CreateCommentError, Submission};
pub use get_comments::{get_comments, CommentsResponse, GetCommentsError};
