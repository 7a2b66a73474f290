//! Admin panel state
//!
//! The session gate decides what the admin page does for a visitor, and
//! [`AdminBoard`] holds the moderation lists. The board is rebuilt from
//! the store on every dashboard load.

use serde::Serialize;

use crate::models::{CommentWithNews, ContactSubmission};
use crate::services::auth::Identity;

/// Where unauthorized visitors are sent
pub const SIGN_IN_PATH: &str = "/auth";

/// Where the admin lands after signing out
pub const SIGNED_OUT_PATH: &str = "/";

/// Resolution state of the admin gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Authentication has not resolved yet
    Unknown,
    Authorized,
    Unauthorized,
}

/// What the admin page should do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GateDecision {
    Loading,
    Redirect { to: String },
    /// Show the panel and load comments and contacts
    Render,
}

impl GateState {
    /// Resolve from the auth result. `None` means auth is still loading.
    pub fn resolve(identity: Option<Option<&Identity>>) -> Self {
        match identity {
            None => GateState::Unknown,
            Some(Some(identity)) if identity.is_admin => GateState::Authorized,
            Some(_) => GateState::Unauthorized,
        }
    }

    pub fn decision(self) -> GateDecision {
        match self {
            GateState::Unknown => GateDecision::Loading,
            GateState::Authorized => GateDecision::Render,
            GateState::Unauthorized => GateDecision::Redirect {
                to: SIGN_IN_PATH.to_string(),
            },
        }
    }

    /// State after sign-out, with the page to navigate to
    pub fn sign_out(self) -> (GateState, &'static str) {
        (GateState::Unauthorized, SIGNED_OUT_PATH)
    }
}

/// Moderation lists as the admin panel holds them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminBoard {
    pub comments: Vec<CommentWithNews>,
    pub contacts: Vec<ContactSubmission>,
}

/// Counts shown in the panel header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCounts {
    pub pending_comments: usize,
    pub approved_comments: usize,
    pub unread_contacts: usize,
}

impl AdminBoard {
    pub fn new(comments: Vec<CommentWithNews>, contacts: Vec<ContactSubmission>) -> Self {
        Self { comments, contacts }
    }

    pub fn pending(&self) -> Vec<&CommentWithNews> {
        self.comments
            .iter()
            .filter(|c| !c.comment.is_approved)
            .collect()
    }

    pub fn approved(&self) -> Vec<&CommentWithNews> {
        self.comments
            .iter()
            .filter(|c| c.comment.is_approved)
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.contacts.iter().filter(|c| !c.is_read).count()
    }

    pub fn counts(&self) -> BoardCounts {
        BoardCounts {
            pending_comments: self.pending().len(),
            approved_comments: self.approved().len(),
            unread_contacts: self.unread_count(),
        }
    }
}
