//! Contact submission repository

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::{ContactSubmission, CreateContactInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Contact submission repository trait
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert an unread submission
    async fn create(&self, input: &CreateContactInput) -> Result<ContactSubmission>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>>;

    /// All submissions, newest first
    async fn list_all(&self) -> Result<Vec<ContactSubmission>>;

    /// Set the read flag. Returns the updated row, `None` if it is gone.
    async fn set_read(&self, id: i64, read: bool) -> Result<Option<ContactSubmission>>;

    /// Delete a submission. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based contact repository
pub struct SqlxContactRepository {
    pool: DynDatabasePool,
}

impl SqlxContactRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContactRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContactRepository for SqlxContactRepository {
    async fn create(&self, input: &CreateContactInput) -> Result<ContactSubmission> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(sqlite(&self.pool)?, input).await,
            DatabaseDriver::Mysql => create_mysql(mysql(&self.pool)?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContactSubmission>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(sqlite(&self.pool)?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(mysql(&self.pool)?, id).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<ContactSubmission>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_all_sqlite(sqlite(&self.pool)?).await,
            DatabaseDriver::Mysql => list_all_mysql(mysql(&self.pool)?).await,
        }
    }

    async fn set_read(&self, id: i64, read: bool) -> Result<Option<ContactSubmission>> {
        let sql = "UPDATE contact_submissions SET is_read = ? WHERE id = ?";
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(read)
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(read)
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|_| ()),
        }
        .context("Failed to update contact read flag")?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let sql = "DELETE FROM contact_submissions WHERE id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .execute(sqlite(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .execute(mysql(&self.pool)?)
                .await
                .map(|r| r.rows_affected()),
        }
        .context("Failed to delete contact submission")?;

        Ok(affected > 0)
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, input: &CreateContactInput) -> Result<ContactSubmission> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO contact_submissions (name, email, subject, message, is_read, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.subject)
    .bind(&input.message)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create contact submission")?;

    Ok(submission_from_input(result.last_insert_rowid(), input, now))
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ContactSubmission>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, subject, message, is_read, created_at
        FROM contact_submissions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get contact submission")?;

    Ok(row.as_ref().map(row_to_submission_sqlite))
}

async fn list_all_sqlite(pool: &SqlitePool) -> Result<Vec<ContactSubmission>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, email, subject, message, is_read, created_at
        FROM contact_submissions
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list contact submissions")?;

    Ok(rows.iter().map(row_to_submission_sqlite).collect())
}

fn row_to_submission_sqlite(row: &sqlx::sqlite::SqliteRow) -> ContactSubmission {
    ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        subject: row.get("subject"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, input: &CreateContactInput) -> Result<ContactSubmission> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO contact_submissions (name, email, subject, message, is_read, created_at)
        VALUES (?, ?, ?, ?, FALSE, ?)
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.subject)
    .bind(&input.message)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create contact submission")?;

    Ok(submission_from_input(result.last_insert_id() as i64, input, now))
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<ContactSubmission>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, subject, message, is_read, created_at
        FROM contact_submissions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get contact submission")?;

    Ok(row.as_ref().map(row_to_submission_mysql))
}

async fn list_all_mysql(pool: &MySqlPool) -> Result<Vec<ContactSubmission>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, email, subject, message, is_read, created_at
        FROM contact_submissions
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list contact submissions")?;

    Ok(rows.iter().map(row_to_submission_mysql).collect())
}

fn row_to_submission_mysql(row: &sqlx::mysql::MySqlRow) -> ContactSubmission {
    ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        subject: row.get("subject"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

fn submission_from_input(
    id: i64,
    input: &CreateContactInput,
    now: chrono::DateTime<Utc>,
) -> ContactSubmission {
    ContactSubmission {
        id,
        name: input.name.clone(),
        email: input.email.clone(),
        subject: input.subject.clone(),
        message: input.message.clone(),
        is_read: false,
        created_at: now,
    }
}
