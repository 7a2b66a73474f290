//! Services layer
//!
//! Business rules over the repositories: validation, moderation, the
//! contact inbox, news reads and authentication.

pub mod admin;
pub mod auth;
pub mod comment;
pub mod contact;
pub mod format;
pub mod news;
pub mod password;
pub mod validation;

pub use admin::{AdminBoard, BoardCounts, GateDecision, GateState};
pub use auth::{AuthService, AuthServiceError, Identity, SignInInput, SignUpInput};
pub use comment::{CommentService, CommentServiceError, SubmittedComment};
pub use contact::{ContactService, ContactServiceError};
pub use format::{DateFormatter, ShareLinks};
pub use news::{NewsDetail, NewsListing, NewsService, NewsServiceError};
pub use password::{hash_password, verify_password};
pub use validation::ValidationError;
