//! Authentication API endpoints
//!
//! - POST /api/v1/auth/signup - Register an account
//! - POST /api/v1/auth/login - Sign in, sets the `session` cookie
//! - GET /api/v1/auth/session - Current identity, `null` when signed out
//! - POST /api/v1/auth/logout - Sign out (requires auth)

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedUser};
use crate::models::User;
use crate::services::auth::{EMAIL_TAKEN_MESSAGE, INVALID_CREDENTIALS_MESSAGE};
use crate::services::{AuthServiceError, GateState, Identity, SignInInput, SignUpInput};

const CLEAR_COOKIE: &str = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// User response (without the password hash)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub is_admin: bool,
}

impl From<&Identity> for SessionResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            user: (&identity.user).into(),
            is_admin: identity.is_admin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub token: String,
    pub message: String,
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignUpInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .auth_service
        .sign_up(body)
        .await
        .map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": UserResponse::from(&user),
            "message": "Registrasi berhasil! Silakan login.",
        })),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<SignInInput>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth_service
        .sign_in(body)
        .await
        .map_err(auth_error)?;
    let identity = state
        .auth_service
        .identify(&session.id)
        .await
        .map_err(auth_error)?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        session.max_age_secs()
    );
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::store_failure(e, "Gagal membuat sesi"))?,
    );

    Ok((
        response_headers,
        Json(LoginResponse {
            session: (&identity).into(),
            token: session.id,
            message: "Login berhasil!".to_string(),
        }),
    ))
}

/// GET /api/v1/auth/session
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<SessionResponse>>, ApiError> {
    let token = extract_session_token(&headers);
    let identity = state
        .auth_service
        .current_session(token.as_deref())
        .await
        .map_err(auth_error)?;

    Ok(Json(identity.as_ref().map(SessionResponse::from)))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth_service
        .sign_out(&user.token)
        .await
        .map_err(auth_error)?;

    let (gate, redirect) = GateState::Authorized.sign_out();
    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE));

    Ok((
        response_headers,
        Json(serde_json::json!({ "state": gate, "redirect": redirect })),
    ))
}

fn auth_error(err: AuthServiceError) -> ApiError {
    match err {
        AuthServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        AuthServiceError::InvalidCredentials => ApiError::unauthorized(INVALID_CREDENTIALS_MESSAGE),
        AuthServiceError::EmailTaken(_) => ApiError::conflict(EMAIL_TAKEN_MESSAGE),
        AuthServiceError::SessionExpired | AuthServiceError::SessionNotFound => {
            ApiError::unauthorized("Sesi berakhir, silakan login kembali")
        }
        AuthServiceError::InternalError(e) => ApiError::store_failure(e, "Terjadi kesalahan"),
    }
}
