//! Comment service
//!
//! Visitor submissions land unapproved; only approved comments are listed
//! publicly. Moderation (approve, reject, delete) is admin-only and enforced
//! by the API layer.

use std::sync::Arc;

use crate::db::repositories::{CommentRepository, NewsRepository};
use crate::models::{Comment, CommentWithNews, CreateCommentInput, PendingNotice};
use crate::services::validation::{validate_comment, ValidationError};

/// Error types for comment operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Input rejected before any write
    #[error("{0}")]
    ValidationError(String),

    /// Target article does not exist or is unpublished
    #[error("News article not found: {0}")]
    NewsNotFound(i64),

    #[error("Comment not found: {0}")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationError> for CommentServiceError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err.0)
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone)]
pub struct SubmittedComment {
    pub comment: Comment,
    /// Pending count for the current visit, including this comment
    pub notice: PendingNotice,
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    news: Arc<dyn NewsRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, news: Arc<dyn NewsRepository>) -> Self {
        Self { comments, news }
    }

    /// Approved comments of an article, newest first
    pub async fn list_approved(&self, news_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self.comments.list_approved_by_news(news_id).await?)
    }

    /// Validate and store a comment awaiting approval.
    ///
    /// `notice` is the visit's pending counter before this submission.
    pub async fn submit(
        &self,
        input: CreateCommentInput,
        notice: PendingNotice,
    ) -> Result<SubmittedComment, CommentServiceError> {
        let input = validate_comment(&input)?;

        if self.news.get_published_by_id(input.news_id).await?.is_none() {
            return Err(CommentServiceError::NewsNotFound(input.news_id));
        }

        let comment = self.comments.create(&input).await?;
        tracing::info!(
            comment_id = comment.id,
            news_id = comment.news_id,
            "Comment submitted for moderation"
        );

        Ok(SubmittedComment {
            comment,
            notice: notice.increment(),
        })
    }

    /// Every comment with its article, newest first
    pub async fn list_all(&self) -> Result<Vec<CommentWithNews>, CommentServiceError> {
        Ok(self.comments.list_all_with_news().await?)
    }

    /// Approve or reject a comment, returning the updated row
    pub async fn set_approval(
        &self,
        id: i64,
        approved: bool,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self
            .comments
            .set_approved(id, approved)
            .await?
            .ok_or(CommentServiceError::NotFound(id))?;

        tracing::info!(comment_id = id, approved, "Comment approval changed");
        Ok(comment)
    }

    pub async fn delete(&self, id: i64) -> Result<(), CommentServiceError> {
        if !self.comments.delete(id).await? {
            return Err(CommentServiceError::NotFound(id));
        }
        tracing::info!(comment_id = id, "Comment deleted");
        Ok(())
    }
}
