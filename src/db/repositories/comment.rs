//! Comment repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithNews, CreateCommentInput, NewsRef};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment awaiting approval
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Approved comments of one article, newest first
    async fn list_approved_by_news(&self, news_id: i64) -> Result<Vec<Comment>>;

    /// Every comment with its article title and slug, newest first
    async fn list_all_with_news(&self) -> Result<Vec<CommentWithNews>>;

    /// Set the approval flag. Returns the updated row, `None` if it is gone.
    async fn set_approved(&self, id: i64, approved: bool) -> Result<Option<Comment>>;

    /// Delete a comment. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based comment repository
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(sqlite(&self.pool)?, input).await,
            DatabaseDriver::Mysql => create_mysql(mysql(&self.pool)?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(mysql(&self.pool)?, id).await,
        }
    }

    async fn list_approved_by_news(&self, news_id: i64) -> Result<Vec<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_approved_sqlite(sqlite(&self.pool)?, news_id).await,
            DatabaseDriver::Mysql => list_approved_mysql(mysql(&self.pool)?, news_id).await,
        }
    }

    async fn list_all_with_news(&self) -> Result<Vec<CommentWithNews>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_all_sqlite(sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_all_mysql(mysql(&self.pool)?).await,
        }
    }

    async fn set_approved(&self, id: i64, approved: bool) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => set_approved_sqlite(sqlite(&self.pool)?, id, approved).await?,
            DatabaseDriver::Mysql => set_approved_mysql(mysql(&self.pool)?, id, approved).await?,
        }
        // MySQL reports 0 affected rows for an unchanged value, so read back
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => delete_mysql(mysql(&self.pool)?, id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateCommentInput) -> Result<Comment> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO comments (news_id, author_name, content, is_approved, created_at)
        VALUES (?, ?, ?, 0, ?)
        "#,
    )
    .bind(input.news_id)
    .bind(&input.author_name)
    .bind(&input.content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        news_id: input.news_id,
        author_name: input.author_name.clone(),
        content: input.content.clone(),
        is_approved: false,
        created_at: now,
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, news_id, author_name, content, is_approved, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.as_ref().map(row_to_comment_sqlite))
}

async fn list_approved_sqlite(pool: &SqlitePool, news_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, news_id, author_name, content, is_approved, created_at
        FROM comments
        WHERE news_id = ? AND is_approved = 1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list approved comments")?;

    Ok(rows.iter().map(row_to_comment_sqlite).collect())
}

async fn list_all_sqlite(pool: &SqlitePool) -> Result<Vec<CommentWithNews>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_name, c.content, c.is_approved, c.created_at,
               n.title AS news_title, n.slug AS news_slug
        FROM comments c
        LEFT JOIN news n ON n.id = c.news_id
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithNews {
            comment: row_to_comment_sqlite(row),
            news: news_ref(row.get("news_title"), row.get("news_slug")),
        })
        .collect())
}

async fn set_approved_sqlite(pool: &SqlitePool, id: i64, approved: bool) -> Result<()> {
    sqlx::query("UPDATE comments SET is_approved = ? WHERE id = ?")
        .bind(approved)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment approval")?;

    Ok(())
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_name: row.get("author_name"),
        content: row.get("content"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateCommentInput) -> Result<Comment> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO comments (news_id, author_name, content, is_approved, created_at)
        VALUES (?, ?, ?, FALSE, ?)
        "#,
    )
    .bind(input.news_id)
    .bind(&input.author_name)
    .bind(&input.content)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        news_id: input.news_id,
        author_name: input.author_name.clone(),
        content: input.content.clone(),
        is_approved: false,
        created_at: now,
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, news_id, author_name, content, is_approved, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment")?;

    Ok(row.as_ref().map(row_to_comment_mysql))
}

async fn list_approved_mysql(pool: &MySqlPool, news_id: i64) -> Result<Vec<Comment>> {
    let rows = sqlx::query(
        r#"
        SELECT id, news_id, author_name, content, is_approved, created_at
        FROM comments
        WHERE news_id = ? AND is_approved = TRUE
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(news_id)
    .fetch_all(pool)
    .await
    .context("Failed to list approved comments")?;

    Ok(rows.iter().map(row_to_comment_mysql).collect())
}

async fn list_all_mysql(pool: &MySqlPool) -> Result<Vec<CommentWithNews>> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.news_id, c.author_name, c.content, c.is_approved, c.created_at,
               n.title AS news_title, n.slug AS news_slug
        FROM comments c
        LEFT JOIN news n ON n.id = c.news_id
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithNews {
            comment: row_to_comment_mysql(row),
            news: news_ref(row.get("news_title"), row.get("news_slug")),
        })
        .collect())
}

async fn set_approved_mysql(pool: &MySqlPool, id: i64, approved: bool) -> Result<()> {
    sqlx::query("UPDATE comments SET is_approved = ? WHERE id = ?")
        .bind(approved)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment approval")?;

    Ok(())
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author_name: row.get("author_name"),
        content: row.get("content"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
    }
}

fn news_ref(title: Option<String>, slug: Option<String>) -> Option<NewsRef> {
    match (title, slug) {
        (Some(title), Some(slug)) => Some(NewsRef { title, slug }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{NewsRepository, SqlxNewsRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateNewsInput;

    async fn setup() -> (SqlxCommentRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let news = SqlxNewsRepository::new(pool.clone())
            .create(&CreateNewsInput::published(
                "Panen Raya",
                "panen-raya",
                "Agribisnis",
                Utc::now(),
            ))
            .await
            .unwrap();
        (SqlxCommentRepository::new(pool), news.id)
    }

    #[tokio::test]
    async fn test_new_comment_is_pending_and_hidden() {
        let (repo, news_id) = setup().await;
        let comment = repo
            .create(&CreateCommentInput::new(news_id, "Sari", "Artikel yang bagus sekali"))
            .await
            .unwrap();

        assert!(!comment.is_approved);
        assert!(repo.list_approved_by_news(news_id).await.unwrap().is_empty());

        let stored = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert_eq!(stored.author_name, "Sari");
        assert!(!stored.is_approved);
    }

    #[tokio::test]
    async fn test_approve_makes_visible() {
        let (repo, news_id) = setup().await;
        let comment = repo
            .create(&CreateCommentInput::new(news_id, "Sari", "Artikel yang bagus sekali"))
            .await
            .unwrap();

        let updated = repo.set_approved(comment.id, true).await.unwrap().unwrap();
        assert!(updated.is_approved);

        let visible = repo.list_approved_by_news(news_id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, comment.id);
    }

    #[tokio::test]
    async fn test_set_approved_missing_row() {
        let (repo, _) = setup().await;
        assert!(repo.set_approved(999, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_joins_news_newest_first() {
        let (repo, news_id) = setup().await;
        let first = repo
            .create(&CreateCommentInput::new(news_id, "Andi", "Komentar pertama di sini"))
            .await
            .unwrap();
        let second = repo
            .create(&CreateCommentInput::new(news_id, "Budi", "Komentar kedua di sini"))
            .await
            .unwrap();

        let all = repo.list_all_with_news().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].comment.id, second.id);
        assert_eq!(all[1].comment.id, first.id);
        assert_eq!(
            all[0].news,
            Some(NewsRef {
                title: "Panen Raya".to_string(),
                slug: "panen-raya".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, news_id) = setup().await;
        let comment = repo
            .create(&CreateCommentInput::new(news_id, "Sari", "Artikel yang bagus sekali"))
            .await
            .unwrap();

        assert!(repo.delete(comment.id).await.unwrap());
        assert!(!repo.delete(comment.id).await.unwrap());
        assert!(repo.get_by_id(comment.id).await.unwrap().is_none());
    }
}
