//! News API endpoints
//!
//! - GET /api/v1/news - Published list, filtered, with categories
//! - GET /api/v1/news/{slug} - Article detail with related articles

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{NewsArticle, NewsFilter};
use crate::services::news::NOT_FOUND_MESSAGE;
use crate::services::{DateFormatter, NewsServiceError, ShareLinks};

const LOAD_FAILED_MESSAGE: &str = "Gagal memuat berita";

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

/// Article as shown on cards and lists
#[derive(Debug, Serialize, Deserialize)]
pub struct NewsSummaryResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub image_url: String,
    pub author: String,
    pub category: String,
    pub published_at: String,
    /// Display date, e.g. "5 Januari 2025"
    pub published_date: String,
}

impl NewsSummaryResponse {
    fn build(article: &NewsArticle, dates: &DateFormatter, fallback_image: &str) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            slug: article.slug.clone(),
            excerpt: article.excerpt.clone(),
            image_url: article.image_or(fallback_image).to_string(),
            author: article.author.clone(),
            category: article.category.clone(),
            published_at: article.published_at.to_rfc3339(),
            published_date: dates.date(article.published_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewsListResponse {
    pub articles: Vec<NewsSummaryResponse>,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsDetailResponse {
    #[serde(flatten)]
    pub summary: NewsSummaryResponse,
    pub content: String,
    pub paragraphs: Vec<String>,
    pub related: Vec<NewsSummaryResponse>,
    pub share: ShareLinks,
}

/// GET /api/v1/news
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<NewsListResponse>, ApiError> {
    if matches!(query.limit, Some(limit) if limit <= 0) {
        return Err(ApiError::validation_error("limit harus lebih dari 0"));
    }

    let filter = NewsFilter::new(query.q.unwrap_or_default(), query.category);
    let listing = state
        .news_service
        .browse(&filter, query.limit)
        .await
        .map_err(news_error)?;

    let dates = state.date_formatter();
    Ok(Json(NewsListResponse {
        articles: listing
            .articles
            .iter()
            .map(|a| NewsSummaryResponse::build(a, &dates, &state.site.fallback_image))
            .collect(),
        categories: listing.categories,
    }))
}

/// GET /api/v1/news/{slug}
pub async fn get_news(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<NewsDetailResponse>, ApiError> {
    let detail = state
        .news_service
        .get_by_slug(&slug)
        .await
        .map_err(news_error)?;

    let dates = state.date_formatter();
    let fallback = &state.site.fallback_image;
    let article = &detail.article;

    Ok(Json(NewsDetailResponse {
        summary: NewsSummaryResponse::build(article, &dates, fallback),
        content: article.content.clone(),
        paragraphs: article.paragraphs().into_iter().map(str::to_string).collect(),
        related: detail
            .related
            .iter()
            .map(|a| NewsSummaryResponse::build(a, &dates, fallback))
            .collect(),
        share: ShareLinks::new(&state.site.base_url, &article.slug, &article.title),
    }))
}

fn news_error(err: NewsServiceError) -> ApiError {
    match err {
        NewsServiceError::NotFound(_) => ApiError::not_found(NOT_FOUND_MESSAGE),
        NewsServiceError::InternalError(e) => ApiError::store_failure(e, LOAD_FAILED_MESSAGE),
    }
}
