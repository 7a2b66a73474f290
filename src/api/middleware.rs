//! API middleware
//!
//! Shared state, the error envelope, and session authentication:
//! - `require_auth` resolves the session token into an [`AuthenticatedUser`]
//! - `require_admin` rejects identities without the admin role

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{AuthConfig, SiteConfig};
use crate::db::repositories::{
    SqlxCommentRepository, SqlxContactRepository, SqlxNewsRepository, SqlxRoleRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    AuthService, AuthServiceError, CommentService, ContactService, DateFormatter, Identity,
    NewsService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub auth_service: Arc<AuthService>,
    pub news_service: Arc<NewsService>,
    pub comment_service: Arc<CommentService>,
    pub contact_service: Arc<ContactService>,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Wire repositories and services over one pool
    pub fn new(pool: DynDatabasePool, auth: AuthConfig, site: SiteConfig) -> Self {
        let news_repo = SqlxNewsRepository::boxed(pool.clone());
        let comment_repo = SqlxCommentRepository::boxed(pool.clone());
        let contact_repo = SqlxContactRepository::boxed(pool.clone());

        let auth_service = AuthService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            SqlxRoleRepository::boxed(pool.clone()),
            auth,
        );

        Self {
            pool,
            auth_service: Arc::new(auth_service),
            news_service: Arc::new(NewsService::new(news_repo.clone())),
            comment_service: Arc::new(CommentService::new(comment_repo, news_repo)),
            contact_service: Arc::new(ContactService::new(contact_repo)),
            site: Arc::new(site),
        }
    }

    pub fn date_formatter(&self) -> DateFormatter {
        DateFormatter::new(self.site.utc_offset_hours)
    }
}

/// Signed-in caller, inserted by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
    /// Session token the request came with
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Silakan login terlebih dahulu"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    /// Log the underlying failure and answer with a generic message
    pub fn store_failure(err: impl std::fmt::Display, message: impl Into<String>) -> Self {
        tracing::warn!(error = %err, "Store operation failed");
        Self::internal_error(message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Session token from `Authorization: Bearer` or the `session` cookie.
///
/// The header wins when both are present.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|c| c.trim().strip_prefix("session="))
                .map(str::to_string)
        })
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Silakan login terlebih dahulu"))?;

    let identity = state.auth_service.identify(&token).await.map_err(|e| match e {
        AuthServiceError::SessionNotFound | AuthServiceError::SessionExpired => {
            ApiError::unauthorized("Sesi berakhir, silakan login kembali")
        }
        other => ApiError::store_failure(other, "Gagal memeriksa sesi"),
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { identity, token });
    Ok(next.run(request).await)
}

/// Admin authorization middleware; must run after [`require_auth`]
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Silakan login terlebih dahulu"))?;

    if !user.identity.is_admin {
        tracing::warn!(user_id = user.identity.user.id, "Non-admin tried an admin route");
        return Err(ApiError::forbidden("Anda tidak memiliki akses admin"));
    }

    Ok(next.run(request).await)
}
