//! Contact API endpoints
//!
//! - POST /api/v1/contact - Submit the contact / recruitment form
//! - GET /api/v1/admin/contacts - Inbox (admin)
//! - PUT /api/v1/admin/contacts/{id}/read - Mark read or unread (admin)
//! - DELETE /api/v1/admin/contacts/{id} - Delete (admin)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{ContactSubmission, CreateContactInput};
use crate::services::{ContactServiceError, DateFormatter};

const SUBMIT_FAILED: &str = "Gagal mengirim pesan. Silakan coba lagi.";
const SUBMIT_OK: &str = "Pesan berhasil dikirim! Kami akan segera menghubungi Anda.";
const LOAD_FAILED: &str = "Gagal memuat pesan";
const READ_FAILED: &str = "Gagal mengubah status pesan";
const DELETE_FAILED: &str = "Gagal menghapus pesan";

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub created_label: String,
}

impl ContactResponse {
    pub fn build(s: &ContactSubmission, dates: &DateFormatter) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            email: s.email.clone(),
            subject: s.subject.clone(),
            message: s.message.clone(),
            is_read: s.is_read,
            created_at: s.created_at.to_rfc3339(),
            created_label: dates.date_time(s.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub read: bool,
}

/// POST /api/v1/contact
///
/// The stored submission is not echoed back; visitors have no read access.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<CreateContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .contact_service
        .submit(body)
        .await
        .map_err(|e| contact_error(e, SUBMIT_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": SUBMIT_OK })),
    ))
}

/// GET /api/v1/admin/contacts
pub async fn list(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<ContactResponse>>, ApiError> {
    let submissions = state
        .contact_service
        .list()
        .await
        .map_err(|e| contact_error(e, LOAD_FAILED))?;

    let dates = state.date_formatter();
    Ok(Json(
        submissions
            .iter()
            .map(|s| ContactResponse::build(s, &dates))
            .collect(),
    ))
}

/// PUT /api/v1/admin/contacts/{id}/read
pub async fn set_read(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<ReadRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let submission = state
        .contact_service
        .set_read(id, body.read)
        .await
        .map_err(|e| contact_error(e, READ_FAILED))?;

    Ok(Json(ContactResponse::build(
        &submission,
        &state.date_formatter(),
    )))
}

/// DELETE /api/v1/admin/contacts/{id}
pub async fn delete(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .contact_service
        .delete(id)
        .await
        .map_err(|e| contact_error(e, DELETE_FAILED))?;

    Ok(Json(serde_json::json!({ "id": id, "message": "Pesan dihapus" })))
}

fn contact_error(err: ContactServiceError, failure: &str) -> ApiError {
    match err {
        ContactServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        ContactServiceError::NotFound(id) => {
            ApiError::with_details("NOT_FOUND", failure, serde_json::json!({ "id": id }))
        }
        ContactServiceError::InternalError(e) => ApiError::store_failure(e, failure),
    }
}
