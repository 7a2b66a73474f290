use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::{AuthConfig, SiteConfig};
use crate::db::repositories::{NewsRepository, SqlxNewsRepository};
use crate::db::{create_test_pool, migrations};
use crate::models::{CreateNewsInput, NewsArticle};

const ADMIN_EMAIL: &str = "admin@mitramutiara.co.id";

async fn setup() -> (Router, AppState) {
    let pool = create_test_pool().await.unwrap();
    migrations::run_migrations(&pool).await.unwrap();

    let state = AppState::new(
        pool,
        AuthConfig {
            session_expiration_days: 7,
            admin_emails: vec![ADMIN_EMAIL.to_string()],
        },
        SiteConfig::default(),
    );
    let app = build_router(state.clone(), "http://localhost:5173");
    (app, state)
}

async fn seed_news(
    state: &AppState,
    title: &str,
    slug: &str,
    category: &str,
    days_ago: i64,
) -> NewsArticle {
    SqlxNewsRepository::new(state.pool.clone())
        .create(&CreateNewsInput::published(
            title,
            slug,
            category,
            Utc::now() - Duration::days(days_ago),
        ))
        .await
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign up and sign in, returning the session token
async fn sign_in(app: &Router, email: &str) -> String {
    let resp = send(
        app,
        with_json(
            "POST",
            "/api/v1/auth/signup",
            json!({ "full_name": "Pengguna", "email": email, "password": "rahasia" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
        app,
        with_json(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": email, "password": "rahasia" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_news_list_filters_and_categories() {
    let (app, state) = setup().await;
    seed_news(&state, "Panen Raya Sawit", "panen-raya", "Perkebunan", 2).await;
    seed_news(&state, "Pelatihan Karyawan", "pelatihan", "SDM", 1).await;

    let resp = send(&app, get("/api/v1/news", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 2);
    assert_eq!(body["articles"][0]["slug"], "pelatihan");
    assert_eq!(body["categories"], json!(["SDM", "Perkebunan"]));
    assert_eq!(
        body["articles"][0]["image_url"],
        SiteConfig::default().fallback_image
    );

    let resp = send(&app, get("/api/v1/news?q=SAWIT", None)).await;
    let body = body_json(resp).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    assert_eq!(body["articles"][0]["slug"], "panen-raya");

    let resp = send(&app, get("/api/v1/news?category=SDM&limit=1", None)).await;
    let body = body_json(resp).await;
    assert_eq!(body["articles"].as_array().unwrap().len(), 1);
    assert_eq!(body["articles"][0]["category"], "SDM");

    let resp = send(&app, get("/api/v1/news?limit=0", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_news_detail_and_not_found() {
    let (app, state) = setup().await;
    seed_news(&state, "Panen Raya", "panen-raya", "Perkebunan", 3).await;
    seed_news(&state, "Bibit Unggul", "bibit-unggul", "Perkebunan", 2).await;

    let resp = send(&app, get("/api/v1/news/panen-raya", None)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["title"], "Panen Raya");
    assert_eq!(body["paragraphs"].as_array().unwrap().len(), 2);
    assert_eq!(body["related"][0]["slug"], "bibit-unggul");
    assert!(body["share"]["page_url"]
        .as_str()
        .unwrap()
        .ends_with("/news/panen-raya"));
    assert!(body["share"]["facebook"]
        .as_str()
        .unwrap()
        .contains("sharer.php?u="));

    let resp = send(&app, get("/api/v1/news/tidak-ada", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "Artikel Tidak Ditemukan");
}

#[tokio::test]
async fn test_comment_waits_for_approval() {
    let (app, state) = setup().await;
    let article = seed_news(&state, "Panen Raya", "panen-raya", "Perkebunan", 1).await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/comments",
            json!({
                "news_id": article.id,
                "author_name": "Sari",
                "content": "Berita yang sangat bermanfaat",
                "pending_count": 1,
            }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["pending_count"], 2);
    assert_eq!(body["notice"], "2 komentar Anda menunggu persetujuan");
    assert_eq!(body["comment"]["is_approved"], false);
    let comment_id = body["comment"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/comments/{}", article.id);
    let body = body_json(send(&app, get(&uri, None)).await).await;
    assert!(body["comments"].as_array().unwrap().is_empty());

    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let resp = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/admin/comments/{}/approval", comment_id),
            json!({ "approved": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Komentar disetujui");

    let body = body_json(send(&app, get(&uri, None)).await).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["author_name"], "Sari");
}

#[tokio::test]
async fn test_comment_rejections() {
    let (app, state) = setup().await;
    let article = seed_news(&state, "Panen Raya", "panen-raya", "Perkebunan", 1).await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/comments",
            json!({ "news_id": article.id, "author_name": "S", "content": "Berita bagus sekali" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["message"], "Nama minimal 2 karakter");

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/comments",
            json!({ "news_id": 9999, "author_name": "Sari", "content": "Berita bagus sekali" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_submit_and_admin_inbox() {
    let (app, _state) = setup().await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/contact",
            json!({
                "name": "Rina",
                "email": "rina@example.com",
                "subject": "Lamaran Kerja",
                "message": "Saya ingin melamar posisi staf kebun.",
            }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await["message"],
        "Pesan berhasil dikirim! Kami akan segera menghubungi Anda."
    );

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/contact",
            json!({ "name": "Rina", "email": "bukan-email", "subject": "Halo", "message": "pendek" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let body = body_json(send(&app, get("/api/v1/admin/contacts", Some(&admin))).await).await;
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    let id = contacts[0]["id"].as_i64().unwrap();

    let resp = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/admin/contacts/{}/read", id),
            json!({ "read": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(body_json(resp).await["is_read"], true);

    let body = body_json(send(&app, get("/api/v1/admin/dashboard", Some(&admin))).await).await;
    assert_eq!(body["counts"]["unread_contacts"], 0);

    let delete = Request::delete(format!("/api/v1/admin/contacts/{}", id))
        .header("Authorization", format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, delete).await;
    assert_eq!(body_json(resp).await["message"], "Pesan dihapus");

    let delete_again = Request::delete(format!("/api/v1/admin/contacts/{}", id))
        .header("Authorization", format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, delete_again).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"]["message"], "Gagal menghapus pesan");
}

#[tokio::test]
async fn test_login_sets_cookie_and_session_resolves() {
    let (app, _state) = setup().await;
    sign_in(&app, "dewi@example.com").await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "dewi@example.com", "password": "rahasia" }),
            None,
        ),
    )
    .await;
    let cookie = resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    let pair = cookie.split(';').next().unwrap().to_string();

    let request = Request::get("/api/v1/auth/session")
        .header("Cookie", pair.as_str())
        .body(Body::empty())
        .unwrap();
    let body = body_json(send(&app, request).await).await;
    assert_eq!(body["user"]["email"], "dewi@example.com");
    assert_eq!(body["is_admin"], false);
    assert!(body["user"].get("password_hash").is_none());

    let body = body_json(send(&app, get("/api/v1/auth/session", None)).await).await;
    assert!(body.is_null());
}

#[tokio::test]
async fn test_auth_error_messages() {
    let (app, _state) = setup().await;
    sign_in(&app, "dewi@example.com").await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/auth/signup",
            json!({ "full_name": "Dewi", "email": "DEWI@example.com", "password": "rahasia" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"]["message"], "Email sudah terdaftar");

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "dewi@example.com", "password": "salah123" }),
            None,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(resp).await["error"]["message"],
        "Email atau password salah"
    );
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let (app, _state) = setup().await;

    let resp = send(&app, get("/api/v1/admin/comments", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(&app, get("/api/v1/admin/comments", Some("bogus-token"))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let visitor = sign_in(&app, "dewi@example.com").await;
    let resp = send(&app, get("/api/v1/admin/comments", Some(&visitor))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let resp = send(&app, get("/api/v1/admin/comments", Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_gate_decisions() {
    let (app, _state) = setup().await;

    let body = body_json(send(&app, get("/api/v1/admin/gate", None)).await).await;
    assert_eq!(body["state"], "unauthorized");
    assert_eq!(body["decision"], json!({ "action": "redirect", "to": "/auth" }));

    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let body = body_json(send(&app, get("/api/v1/admin/gate", Some(&admin))).await).await;
    assert_eq!(body["state"], "authorized");
    assert_eq!(body["decision"]["action"], "render");
}

#[tokio::test]
async fn test_moderation_delete_and_logout() {
    let (app, state) = setup().await;
    let article = seed_news(&state, "Panen Raya", "panen-raya", "Perkebunan", 1).await;

    let resp = send(
        &app,
        with_json(
            "POST",
            "/api/v1/comments",
            json!({ "news_id": article.id, "author_name": "Sari", "content": "Berita yang sangat bermanfaat" }),
            None,
        ),
    )
    .await;
    let comment_id = body_json(resp).await["comment"]["id"].as_i64().unwrap();

    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let body = body_json(send(&app, get("/api/v1/admin/dashboard", Some(&admin))).await).await;
    assert_eq!(body["counts"]["pending_comments"], 1);
    assert_eq!(body["pending"][0]["news"]["slug"], "panen-raya");

    let delete = Request::delete(format!("/api/v1/admin/comments/{}", comment_id))
        .header("Authorization", format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, delete).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "Komentar dihapus");

    let resp = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/admin/comments/{}/approval", comment_id),
            json!({ "approved": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await["error"]["message"],
        "Gagal mengubah status komentar"
    );

    let logout = Request::post("/api/v1/auth/logout")
        .header("Authorization", format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let resp = send(&app, logout).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
    let body = body_json(resp).await;
    assert_eq!(body["redirect"], "/");
    assert_eq!(body["state"], "unauthorized");

    let resp = send(&app, get("/api/v1/admin/dashboard", Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
