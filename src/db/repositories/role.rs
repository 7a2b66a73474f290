//! Role repository
//!
//! The `user_roles` table is the authorization lookup: a user is an admin
//! exactly when it holds the `admin` row.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::Role;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Role repository trait
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Grant a role. Granting an already held role is a no-op.
    async fn grant(&self, user_id: i64, role: Role) -> Result<()>;

    async fn has_role(&self, user_id: i64, role: Role) -> Result<bool>;
}

/// SQLx-based role repository
pub struct SqlxRoleRepository {
    pool: DynDatabasePool,
}

impl SqlxRoleRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn RoleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RoleRepository for SqlxRoleRepository {
    async fn grant(&self, user_id: i64, role: Role) -> Result<()> {
        let role = role.to_string();
        let now = Utc::now();
        match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(
                "INSERT OR IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(&role)
            .bind(now)
            .execute(sqlite(&self.pool)?)
            .await
            .map(|_| ()),
            DatabaseDriver::Mysql => sqlx::query(
                "INSERT IGNORE INTO user_roles (user_id, role, created_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(&role)
            .bind(now)
            .execute(mysql(&self.pool)?)
            .await
            .map(|_| ()),
        }
        .with_context(|| format!("Failed to grant role {} to user {}", role, user_id))
    }

    async fn has_role(&self, user_id: i64, role: Role) -> Result<bool> {
        let sql = "SELECT COUNT(*) FROM user_roles WHERE user_id = ? AND role = ?";
        let role = role.to_string();
        let count: i64 = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                sqlx::query_scalar(sql)
                    .bind(user_id)
                    .bind(&role)
                    .fetch_one(sqlite(&self.pool)?)
                    .await
            }
            DatabaseDriver::Mysql => {
                sqlx::query_scalar(sql)
                    .bind(user_id)
                    .bind(&role)
                    .fetch_one(mysql(&self.pool)?)
                    .await
            }
        }
        .context("Failed to look up user role")?;

        Ok(count > 0)
    }
}
