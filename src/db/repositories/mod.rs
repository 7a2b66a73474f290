//! Database repositories
//!
//! One repository per table. Each trait has a single SQLx implementation
//! that dispatches on the pool's driver.

pub mod comment;
pub mod contact;
pub mod news;
pub mod role;
pub mod session;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use contact::{ContactRepository, SqlxContactRepository};
pub use news::{NewsRepository, SqlxNewsRepository};
pub use role::{RoleRepository, SqlxRoleRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
