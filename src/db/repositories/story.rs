//! Story repository
//!
//! Database operations for feed stories. Stories have no delete path; the
//! table is insert-and-list only.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Story;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Story repository trait
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Create a new story
    async fn create(&self, story: &Story) -> Result<Story>;

    /// Get story by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Story>>;

    /// List all stories, newest first
    async fn list(&self) -> Result<Vec<Story>>;

    /// Count total stories
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based story repository implementation
pub struct SqlxStoryRepository {
    pool: DynDatabasePool,
}

impl SqlxStoryRepository {
    /// Create a new SQLx story repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn StoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl StoryRepository for SqlxStoryRepository {
    async fn create(&self, story: &Story) -> Result<Story> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_story_sqlite(self.pool.as_sqlite().unwrap(), story).await
            }
            DatabaseDriver::Mysql => {
                create_story_mysql(self.pool.as_mysql().unwrap(), story).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Story>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_story_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_story_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list(&self) -> Result<Vec<Story>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_stories_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_stories_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_stories_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_stories_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_story_sqlite(pool: &SqlitePool, story: &Story) -> Result<Story> {
    sqlx::query("INSERT INTO stories (id, label, author, created_at) VALUES (?, ?, ?, ?)")
        .bind(&story.id)
        .bind(&story.label)
        .bind(&story.author)
        .bind(story.created_at)
        .execute(pool)
        .await
        .context("Failed to create story")?;

    Ok(story.clone())
}

async fn get_story_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Story>> {
    let row = sqlx::query("SELECT id, label, author, created_at FROM stories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get story")?;

    Ok(row.map(|row| Story {
        id: row.get("id"),
        label: row.get("label"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }))
}

async fn list_stories_sqlite(pool: &SqlitePool) -> Result<Vec<Story>> {
    let rows =
        sqlx::query("SELECT id, label, author, created_at FROM stories ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("Failed to list stories")?;

    Ok(rows
        .into_iter()
        .map(|row| Story {
            id: row.get("id"),
            label: row.get("label"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn count_stories_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM stories")
        .fetch_one(pool)
        .await
        .context("Failed to count stories")?;

    Ok(row.get("count"))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_story_mysql(pool: &MySqlPool, story: &Story) -> Result<Story> {
    sqlx::query("INSERT INTO stories (id, label, author, created_at) VALUES (?, ?, ?, ?)")
        .bind(&story.id)
        .bind(&story.label)
        .bind(&story.author)
        .bind(story.created_at)
        .execute(pool)
        .await
        .context("Failed to create story")?;

    Ok(story.clone())
}

async fn get_story_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Story>> {
    let row = sqlx::query("SELECT id, label, author, created_at FROM stories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get story")?;

    Ok(row.map(|row| Story {
        id: row.get("id"),
        label: row.get("label"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }))
}

async fn list_stories_mysql(pool: &MySqlPool) -> Result<Vec<Story>> {
    let rows =
        sqlx::query("SELECT id, label, author, created_at FROM stories ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("Failed to list stories")?;

    Ok(rows
        .into_iter()
        .map(|row| Story {
            id: row.get("id"),
            label: row.get("label"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn count_stories_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM stories")
        .fetch_one(pool)
        .await
        .context("Failed to count stories")?;

    Ok(row.get("count"))
}
