//! News repository
//!
//! Read access to published articles. Articles are written by an external
//! editorial process; `create` exists for seeding and tests.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{CreateNewsInput, NewsArticle};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const NEWS_COLUMNS: &str = "id, title, slug, excerpt, content, image_url, author, category, \
                            published_at, is_published, created_at";

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert an article
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsArticle>;

    /// Published articles, newest `published_at` first, optionally capped
    async fn list_published(&self, limit: Option<i64>) -> Result<Vec<NewsArticle>>;

    /// A published article by slug
    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<NewsArticle>>;

    /// A published article by id
    async fn get_published_by_id(&self, id: i64) -> Result<Option<NewsArticle>>;

    /// Other published articles in `category`, newest first
    async fn list_related(
        &self,
        category: &str,
        exclude_id: i64,
        limit: i64,
    ) -> Result<Vec<NewsArticle>>;
}

/// SQLx-based news repository
pub struct SqlxNewsRepository {
    pool: DynDatabasePool,
}

impl SqlxNewsRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput) -> Result<NewsArticle> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_news_sqlite(sqlite(&self.pool)?, input).await,
            DatabaseDriver::Mysql => create_news_mysql(mysql(&self.pool)?, input).await,
        }
    }

    async fn list_published(&self, limit: Option<i64>) -> Result<Vec<NewsArticle>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_published_sqlite(sqlite(&self.pool)?, limit).await,
            DatabaseDriver::Mysql => list_published_mysql(mysql(&self.pool)?, limit).await,
        }
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<NewsArticle>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_slug_sqlite(sqlite(&self.pool)?, slug).await,
            DatabaseDriver::Mysql => get_by_slug_mysql(mysql(&self.pool)?, slug).await,
        }
    }

    async fn get_published_by_id(&self, id: i64) -> Result<Option<NewsArticle>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(mysql(&self.pool)?, id).await,
        }
    }

    async fn list_related(
        &self,
        category: &str,
        exclude_id: i64,
        limit: i64,
    ) -> Result<Vec<NewsArticle>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_related_sqlite(sqlite(&self.pool)?, category, exclude_id, limit).await
            }
            DatabaseDriver::Mysql => {
                list_related_mysql(mysql(&self.pool)?, category, exclude_id, limit).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_news_sqlite(pool: &SqlitePool, input: &CreateNewsInput) -> Result<NewsArticle> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO news (title, slug, excerpt, content, image_url, author, category,
                          published_at, is_published, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.image_url)
    .bind(&input.author)
    .bind(&input.category)
    .bind(input.published_at)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to create news article: {}", input.slug))?;

    Ok(news_from_input(result.last_insert_rowid(), input, now))
}

async fn list_published_sqlite(pool: &SqlitePool, limit: Option<i64>) -> Result<Vec<NewsArticle>> {
    // SQLite treats a negative LIMIT as unbounded
    let sql = format!(
        "SELECT {} FROM news WHERE is_published = 1 \
         ORDER BY published_at DESC, id DESC LIMIT ?",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await
        .context("Failed to list published news")?;

    rows.iter().map(row_to_news_sqlite).collect()
}

async fn get_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE slug = ? AND is_published = 1",
        NEWS_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by slug")?;

    row.as_ref().map(row_to_news_sqlite).transpose()
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE id = ? AND is_published = 1",
        NEWS_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by id")?;

    row.as_ref().map(row_to_news_sqlite).transpose()
}

async fn list_related_sqlite(
    pool: &SqlitePool,
    category: &str,
    exclude_id: i64,
    limit: i64,
) -> Result<Vec<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE is_published = 1 AND category = ? AND id <> ? \
         ORDER BY published_at DESC, id DESC LIMIT ?",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(category)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list related news")?;

    rows.iter().map(row_to_news_sqlite).collect()
}

fn row_to_news_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<NewsArticle> {
    Ok(NewsArticle {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        author: row.get("author"),
        category: row.get("category"),
        published_at: row.get("published_at"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_news_mysql(pool: &MySqlPool, input: &CreateNewsInput) -> Result<NewsArticle> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO news (title, slug, excerpt, content, image_url, author, category,
                          published_at, is_published, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.excerpt)
    .bind(&input.content)
    .bind(&input.image_url)
    .bind(&input.author)
    .bind(&input.category)
    .bind(input.published_at)
    .bind(input.is_published)
    .bind(now)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to create news article: {}", input.slug))?;

    Ok(news_from_input(result.last_insert_id() as i64, input, now))
}

async fn list_published_mysql(pool: &MySqlPool, limit: Option<i64>) -> Result<Vec<NewsArticle>> {
    let base = format!(
        "SELECT {} FROM news WHERE is_published = TRUE ORDER BY published_at DESC, id DESC",
        NEWS_COLUMNS
    );
    let rows = match limit {
        Some(limit) => {
            sqlx::query(&format!("{} LIMIT ?", base))
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        None => sqlx::query(&base).fetch_all(pool).await,
    }
    .context("Failed to list published news")?;

    rows.iter().map(row_to_news_mysql).collect()
}

async fn get_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE slug = ? AND is_published = TRUE",
        NEWS_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by slug")?;

    row.as_ref().map(row_to_news_mysql).transpose()
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE id = ? AND is_published = TRUE",
        NEWS_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get news by id")?;

    row.as_ref().map(row_to_news_mysql).transpose()
}

async fn list_related_mysql(
    pool: &MySqlPool,
    category: &str,
    exclude_id: i64,
    limit: i64,
) -> Result<Vec<NewsArticle>> {
    let sql = format!(
        "SELECT {} FROM news WHERE is_published = TRUE AND category = ? AND id <> ? \
         ORDER BY published_at DESC, id DESC LIMIT ?",
        NEWS_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(category)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list related news")?;

    rows.iter().map(row_to_news_mysql).collect()
}

fn row_to_news_mysql(row: &sqlx::mysql::MySqlRow) -> Result<NewsArticle> {
    Ok(NewsArticle {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        image_url: row.get("image_url"),
        author: row.get("author"),
        category: row.get("category"),
        published_at: row.get("published_at"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    })
}

fn news_from_input(id: i64, input: &CreateNewsInput, now: chrono::DateTime<Utc>) -> NewsArticle {
    NewsArticle {
        id,
        title: input.title.clone(),
        slug: input.slug.clone(),
        excerpt: input.excerpt.clone(),
        content: input.content.clone(),
        image_url: input.image_url.clone(),
        author: input.author.clone(),
        category: input.category.clone(),
        published_at: input.published_at,
        is_published: input.is_published,
        created_at: now,
    }
}
