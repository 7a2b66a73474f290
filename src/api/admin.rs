//! Admin panel endpoints
//!
//! - GET /api/v1/admin/gate - What the admin page should do for this visitor
//! - GET /api/v1/admin/dashboard - Moderation board (admin)
//!
//! Comment and contact moderation live in `comments` and `contact`.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::api::comments::AdminCommentResponse;
use crate::api::contact::ContactResponse;
use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedUser};
use crate::services::{AdminBoard, BoardCounts, GateDecision, GateState};

#[derive(Debug, Serialize)]
pub struct GateResponse {
    pub state: GateState,
    pub decision: GateDecision,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub counts: BoardCounts,
    pub pending: Vec<AdminCommentResponse>,
    pub approved: Vec<AdminCommentResponse>,
    pub contacts: Vec<ContactResponse>,
}

/// GET /api/v1/admin/gate
///
/// Public; signed-out and non-admin visitors get a redirect decision.
pub async fn gate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<GateResponse>, ApiError> {
    let token = extract_session_token(&headers);
    let identity = state
        .auth_service
        .current_session(token.as_deref())
        .await
        .map_err(|e| ApiError::store_failure(e, "Gagal memeriksa sesi"))?;

    let gate = GateState::resolve(Some(identity.as_ref()));
    Ok(Json(GateResponse {
        state: gate,
        decision: gate.decision(),
    }))
}

/// GET /api/v1/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let (comments, contacts) = tokio::try_join!(
        async {
            state
                .comment_service
                .list_all()
                .await
                .map_err(|e| ApiError::store_failure(e, "Gagal memuat komentar"))
        },
        async {
            state
                .contact_service
                .list()
                .await
                .map_err(|e| ApiError::store_failure(e, "Gagal memuat pesan"))
        },
    )?;

    let board = AdminBoard::new(comments, contacts);
    let dates = state.date_formatter();

    Ok(Json(DashboardResponse {
        counts: board.counts(),
        pending: board
            .pending()
            .into_iter()
            .map(|c| AdminCommentResponse::build(c, &dates))
            .collect(),
        approved: board
            .approved()
            .into_iter()
            .map(|c| AdminCommentResponse::build(c, &dates))
            .collect(),
        contacts: board
            .contacts
            .iter()
            .map(|c| ContactResponse::build(c, &dates))
            .collect(),
    }))
}
