//! News service
//!
//! Published-article reads: the full list with in-memory filtering, the
//! homepage preview and the detail page with related articles.

use std::sync::Arc;

use serde::Serialize;

use crate::db::repositories::NewsRepository;
use crate::models::{categories, NewsArticle, NewsFilter};

/// Articles shown in the homepage preview
pub const PREVIEW_LIMIT: i64 = 3;

/// Related articles shown under a detail page
pub const RELATED_LIMIT: i64 = 3;

/// Shown when a slug does not resolve to a published article
pub const NOT_FOUND_MESSAGE: &str = "Artikel Tidak Ditemukan";

#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    #[error("News article not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Filtered list plus the categories of the loaded list
#[derive(Debug, Clone, Serialize)]
pub struct NewsListing {
    pub articles: Vec<NewsArticle>,
    pub categories: Vec<String>,
}

/// A detail page: the article and up to three related ones
#[derive(Debug, Clone)]
pub struct NewsDetail {
    pub article: NewsArticle,
    pub related: Vec<NewsArticle>,
}

pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }

    /// Published articles, newest first, optionally capped
    pub async fn list_published(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<NewsArticle>, NewsServiceError> {
        Ok(self.repo.list_published(limit).await?)
    }

    /// Load the published list, then narrow it with `filter`.
    ///
    /// Categories come from the loaded list, not the filtered one, so the
    /// category picker keeps every option while a filter is active.
    pub async fn browse(
        &self,
        filter: &NewsFilter,
        limit: Option<i64>,
    ) -> Result<NewsListing, NewsServiceError> {
        let loaded = self.repo.list_published(limit).await?;
        let categories = categories(&loaded);
        let articles = filter.apply(&loaded).into_iter().cloned().collect();

        Ok(NewsListing {
            articles,
            categories,
        })
    }

    /// Published article by slug with its related articles.
    ///
    /// Related articles are only queried once the article is found.
    pub async fn get_by_slug(&self, slug: &str) -> Result<NewsDetail, NewsServiceError> {
        let article = self
            .repo
            .get_published_by_slug(slug)
            .await?
            .ok_or_else(|| NewsServiceError::NotFound(slug.to_string()))?;

        let related = self
            .repo
            .list_related(&article.category, article.id, RELATED_LIMIT)
            .await?;

        Ok(NewsDetail { article, related })
    }
}
