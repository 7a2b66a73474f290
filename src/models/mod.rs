//! Data models
//!
//! Entities persisted by the repositories (news, comments, contact
//! submissions, users, sessions) and the inputs that create them.

mod comment;
mod contact;
mod news;
mod session;
mod user;

pub use comment::{Comment, CommentWithNews, CreateCommentInput, NewsRef, PendingNotice};
pub use contact::{ContactSubmission, CreateContactInput};
pub use news::{categories, CreateNewsInput, NewsArticle, NewsFilter};
pub use session::Session;
pub use user::{Role, User};
