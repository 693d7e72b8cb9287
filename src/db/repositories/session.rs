//! Session repository
//!
//! Database operations for authentication sessions.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Session;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    async fn create(&self, session: &Session) -> Result<Session>;

    /// Get session by token id
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session by token id
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete all sessions for an account
    async fn delete_by_account(&self, account_uid: &str) -> Result<u64>;

    /// Delete all expired sessions, returning the number removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<Session> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_session_sqlite(self.pool.as_sqlite().unwrap(), session).await
            }
            DatabaseDriver::Mysql => {
                create_session_mysql(self.pool.as_mysql().unwrap(), session).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_session_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_session_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_session_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => delete_session_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn delete_by_account(&self, account_uid: &str) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_by_account_sqlite(self.pool.as_sqlite().unwrap(), account_uid).await
            }
            DatabaseDriver::Mysql => {
                delete_by_account_mysql(self.pool.as_mysql().unwrap(), account_uid).await
            }
        }
    }

    async fn delete_expired(&self) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_expired_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => delete_expired_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_session_sqlite(pool: &SqlitePool, session: &Session) -> Result<Session> {
    sqlx::query(
        "INSERT INTO sessions (id, account_uid, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&session.id)
    .bind(&session.account_uid)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        "SELECT id, account_uid, expires_at, created_at FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        account_uid: row.get("account_uid"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

async fn delete_session_sqlite(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete session")?;

    Ok(())
}

async fn delete_by_account_sqlite(pool: &SqlitePool, account_uid: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE account_uid = ?")
        .bind(account_uid)
        .execute(pool)
        .await
        .context("Failed to delete account sessions")?;

    Ok(result.rows_affected())
}

async fn delete_expired_sqlite(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(Utc::now())
        .execute(pool)
        .await
        .context("Failed to delete expired sessions")?;

    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_session_mysql(pool: &MySqlPool, session: &Session) -> Result<Session> {
    sqlx::query(
        "INSERT INTO sessions (id, account_uid, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&session.id)
    .bind(&session.account_uid)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await
    .context("Failed to create session")?;

    Ok(session.clone())
}

async fn get_session_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        "SELECT id, account_uid, expires_at, created_at FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get session")?;

    Ok(row.map(|row| Session {
        id: row.get("id"),
        account_uid: row.get("account_uid"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }))
}

async fn delete_session_mysql(pool: &MySqlPool, id: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete session")?;

    Ok(())
}

async fn delete_by_account_mysql(pool: &MySqlPool, account_uid: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE account_uid = ?")
        .bind(account_uid)
        .execute(pool)
        .await
        .context("Failed to delete account sessions")?;

    Ok(result.rows_affected())
}

async fn delete_expired_mysql(pool: &MySqlPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(Utc::now())
        .execute(pool)
        .await
        .context("Failed to delete expired sessions")?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::account::{AccountRepository, SqlxAccountRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{Account, RoleProfile};
    use chrono::Duration;

    async fn setup() -> (DynDatabasePool, SqlxSessionRepository, String) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let accounts = SqlxAccountRepository::new(pool.clone());
        let account = accounts
            .create(&Account::new(
                "Pat".to_string(),
                "pat@example.com".to_string(),
                "hash".to_string(),
                RoleProfile::Patient,
            ))
            .await
            .expect("Failed to create account");

        let repo = SqlxSessionRepository::new(pool.clone());
        (pool, repo, account.uid)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (_pool, repo, uid) = setup().await;
        let session = Session::new(uid.clone());

        repo.create(&session).await.expect("Failed to create");

        let found = repo
            .get_by_id(&session.id)
            .await
            .expect("Failed to get")
            .expect("Session not found");

        assert_eq!(found.account_uid, uid);
        assert!(!found.is_expired());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (_pool, repo, uid) = setup().await;
        let session = Session::new(uid);
        repo.create(&session).await.expect("Failed to create");

        repo.delete(&session.id).await.expect("Failed to delete");

        let found = repo.get_by_id(&session.id).await.expect("Failed to get");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_account() {
        let (_pool, repo, uid) = setup().await;
        repo.create(&Session::new(uid.clone()))
            .await
            .expect("Failed to create");
        repo.create(&Session::new(uid.clone()))
            .await
            .expect("Failed to create");

        let removed = repo
            .delete_by_account(&uid)
            .await
            .expect("Failed to delete by account");
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (_pool, repo, uid) = setup().await;

        let live = Session::new(uid.clone());
        let stale = Session::with_duration(uid, Duration::seconds(-60));
        repo.create(&live).await.expect("Failed to create");
        repo.create(&stale).await.expect("Failed to create");

        let removed = repo.delete_expired().await.expect("Failed to sweep");
        assert_eq!(removed, 1);

        assert!(repo
            .get_by_id(&live.id)
            .await
            .expect("Failed to get")
            .is_some());
        assert!(repo
            .get_by_id(&stale.id)
            .await
            .expect("Failed to get")
            .is_none());
    }
}
