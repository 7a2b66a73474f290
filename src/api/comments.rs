//! Comment API endpoints
//!
//! Public:
//! - GET /api/v1/comments/{news_id} - Approved comments of an article
//! - POST /api/v1/comments - Submit a comment for moderation
//!
//! Admin:
//! - GET /api/v1/admin/comments - Every comment with its article
//! - PUT /api/v1/admin/comments/{id}/approval - Approve or reject
//! - DELETE /api/v1/admin/comments/{id} - Delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, CommentWithNews, CreateCommentInput, NewsRef, PendingNotice};
use crate::services::news::NOT_FOUND_MESSAGE;
use crate::services::{CommentServiceError, DateFormatter};

const SUBMIT_FAILED: &str = "Gagal mengirim komentar. Silakan coba lagi.";
const LOAD_FAILED: &str = "Gagal memuat komentar";
const APPROVAL_FAILED: &str = "Gagal mengubah status komentar";
const DELETE_FAILED: &str = "Gagal menghapus komentar";

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub news_id: i64,
    pub author_name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: String,
    /// Display date, e.g. "5 Januari 2025 pukul 14.30"
    pub created_label: String,
}

impl CommentResponse {
    fn build(comment: &Comment, dates: &DateFormatter) -> Self {
        Self {
            id: comment.id,
            news_id: comment.news_id,
            author_name: comment.author_name.clone(),
            content: comment.content.clone(),
            is_approved: comment.is_approved,
            created_at: comment.created_at.to_rfc3339(),
            created_label: dates.date_time(comment.created_at),
        }
    }
}

/// Moderation list entry
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminCommentResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub news: Option<NewsRef>,
}

impl AdminCommentResponse {
    pub fn build(item: &CommentWithNews, dates: &DateFormatter) -> Self {
        Self {
            comment: CommentResponse::build(&item.comment, dates),
            news: item.news.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitCommentRequest {
    pub news_id: i64,
    pub author_name: String,
    pub content: String,
    /// Comments already pending in this visit
    #[serde(default)]
    pub pending_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitCommentResponse {
    pub comment: CommentResponse,
    pub pending_count: u32,
    pub notice: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModerationResponse {
    pub comment: CommentResponse,
    pub message: String,
}

/// GET /api/v1/comments/{news_id}
pub async fn list_approved(
    State(state): State<AppState>,
    Path(news_id): Path<i64>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = state
        .comment_service
        .list_approved(news_id)
        .await
        .map_err(|e| comment_error(e, LOAD_FAILED))?;

    let dates = state.date_formatter();
    Ok(Json(CommentListResponse {
        comments: comments
            .iter()
            .map(|c| CommentResponse::build(c, &dates))
            .collect(),
    }))
}

/// POST /api/v1/comments
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateCommentInput::new(body.news_id, body.author_name, body.content);
    let submitted = state
        .comment_service
        .submit(input, PendingNotice::new(body.pending_count))
        .await
        .map_err(|e| comment_error(e, SUBMIT_FAILED))?;

    let dates = state.date_formatter();
    Ok((
        StatusCode::CREATED,
        Json(SubmitCommentResponse {
            comment: CommentResponse::build(&submitted.comment, &dates),
            pending_count: submitted.notice.count,
            notice: submitted.notice.message(),
            message: "Komentar berhasil dikirim dan menunggu persetujuan admin".to_string(),
        }),
    ))
}

/// GET /api/v1/admin/comments
pub async fn list_all(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<AdminCommentResponse>>, ApiError> {
    let comments = state
        .comment_service
        .list_all()
        .await
        .map_err(|e| comment_error(e, LOAD_FAILED))?;

    let dates = state.date_formatter();
    Ok(Json(
        comments
            .iter()
            .map(|c| AdminCommentResponse::build(c, &dates))
            .collect(),
    ))
}

/// PUT /api/v1/admin/comments/{id}/approval
pub async fn set_approval(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<ApprovalRequest>,
) -> Result<Json<ModerationResponse>, ApiError> {
    let comment = state
        .comment_service
        .set_approval(id, body.approved)
        .await
        .map_err(|e| comment_error(e, APPROVAL_FAILED))?;

    tracing::debug!(admin_id = user.identity.user.id, comment_id = id, "Moderated comment");
    let message = if comment.is_approved {
        "Komentar disetujui"
    } else {
        "Komentar ditolak"
    };

    Ok(Json(ModerationResponse {
        comment: CommentResponse::build(&comment, &state.date_formatter()),
        message: message.to_string(),
    }))
}

/// DELETE /api/v1/admin/comments/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .comment_service
        .delete(id)
        .await
        .map_err(|e| comment_error(e, DELETE_FAILED))?;

    Ok(Json(serde_json::json!({ "id": id, "message": "Komentar dihapus" })))
}

/// Map a service error; `failure` is the localized message for this action
fn comment_error(err: CommentServiceError, failure: &str) -> ApiError {
    match err {
        CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CommentServiceError::NewsNotFound(_) => ApiError::not_found(NOT_FOUND_MESSAGE),
        CommentServiceError::NotFound(id) => {
            ApiError::with_details("NOT_FOUND", failure, serde_json::json!({ "id": id }))
        }
        CommentServiceError::InternalError(e) => ApiError::store_failure(e, failure),
    }
}
