//! API layer - HTTP handlers and routing
//!
//! JSON endpoints for the Mutiara site:
//! - News listing and detail
//! - Comment submission and public listing
//! - Contact / recruitment form
//! - Sign-up, sign-in and sessions
//! - Admin gate, dashboard and moderation

pub mod admin;
pub mod auth;
pub mod comments;
pub mod contact;
pub mod middleware;
pub mod news;

#[cfg(test)]
mod tests;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/comments", get(comments::list_all))
        .route("/admin/comments/{id}/approval", put(comments::set_approval))
        .route("/admin/comments/{id}", delete(comments::delete))
        .route("/admin/contacts", get(contact::list))
        .route("/admin/contacts/{id}/read", put(contact::set_read))
        .route("/admin/contacts/{id}", delete(contact::delete))
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but not admin)
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/news", get(news::list_news))
        .route("/news/{slug}", get(news::get_news))
        .route("/comments", post(comments::submit))
        .route("/comments/{news_id}", get(comments::list_approved))
        .route("/contact", post(contact::submit))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/session", get(auth::session))
        .route("/admin/gate", get(admin::gate))
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    // Cookie auth needs credentials, so the origin must be explicit
    let origin = cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        tracing::warn!(cors_origin, "Invalid CORS origin, falling back to localhost");
        HeaderValue::from_static("http://localhost:5173")
    });
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
