//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reader comment on a news article.
///
/// Only `is_approved` ever changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub news_id: i64,
    pub author_name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Title and slug of the article a comment belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRef {
    pub title: String,
    pub slug: String,
}

/// Comment joined with its article, as the moderation list shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentWithNews {
    #[serde(flatten)]
    pub comment: Comment,
    /// `None` when the article is gone
    pub news: Option<NewsRef>,
}

/// Input for submitting a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    pub news_id: i64,
    pub author_name: String,
    pub content: String,
}

impl CreateCommentInput {
    pub fn new(news_id: i64, author_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            news_id,
            author_name: author_name.into(),
            content: content.into(),
        }
    }
}

/// Per-visit count of comments awaiting approval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotice {
    pub count: u32,
}

impl PendingNotice {
    pub fn new(count: u32) -> Self {
        Self { count }
    }

    /// Count after one more successful submission
    pub fn increment(self) -> Self {
        Self {
            count: self.count.saturating_add(1),
        }
    }

    /// Notice text, `None` while nothing is pending
    pub fn message(&self) -> Option<String> {
        (self.count > 0).then(|| format!("{} komentar Anda menunggu persetujuan", self.count))
    }
}
