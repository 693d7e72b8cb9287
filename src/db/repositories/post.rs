//! Post repository
//!
//! Database operations for feed posts. Posts have their own table; story
//! rows are never visible through this repository.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Post;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get post by id
    async fn get_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// List all posts, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// Delete a post. Returns false if no such post.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Count total posts
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_post_sqlite(self.pool.as_sqlite().unwrap(), post).await
            }
            DatabaseDriver::Mysql => create_post_mysql(self.pool.as_mysql().unwrap(), post).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_post_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn list(&self) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.as_sqlite().unwrap(), id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_posts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    sqlx::query("INSERT INTO posts (id, content, author, created_at) VALUES (?, ?, ?, ?)")
        .bind(&post.id)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.created_at)
        .execute(pool)
        .await
        .context("Failed to create post")?;

    Ok(post.clone())
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT id, content, author, created_at FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;

    Ok(row.map(|row| Post {
        id: row.get("id"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }))
}

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<Post>> {
    let rows =
        sqlx::query("SELECT id, content, author, created_at FROM posts ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("Failed to list posts")?;

    Ok(rows
        .into_iter()
        .map(|row| Post {
            id: row.get("id"),
            content: row.get("content"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn delete_post_sqlite(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn count_posts_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    sqlx::query("INSERT INTO posts (id, content, author, created_at) VALUES (?, ?, ?, ?)")
        .bind(&post.id)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.created_at)
        .execute(pool)
        .await
        .context("Failed to create post")?;

    Ok(post.clone())
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query("SELECT id, content, author, created_at FROM posts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;

    Ok(row.map(|row| Post {
        id: row.get("id"),
        content: row.get("content"),
        author: row.get("author"),
        created_at: row.get("created_at"),
    }))
}

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<Post>> {
    let rows =
        sqlx::query("SELECT id, content, author, created_at FROM posts ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .context("Failed to list posts")?;

    Ok(rows
        .into_iter()
        .map(|row| Post {
            id: row.get("id"),
            content: row.get("content"),
            author: row.get("author"),
            created_at: row.get("created_at"),
        })
        .collect())
}

async fn delete_post_mysql(pool: &MySqlPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn count_posts_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxPostRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxPostRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let repo = setup().await;
        let post = Post::new("Flossing myths".to_string(), "Dr. Perez".to_string());

        repo.create(&post).await.expect("Failed to create");

        let found = repo
            .get_by_id(&post.id)
            .await
            .expect("Failed to get")
            .expect("Post not found");

        assert_eq!(found.content, "Flossing myths");
        assert_eq!(found.author, "Dr. Perez");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = setup().await;

        let mut older = Post::new("older".to_string(), "a".to_string());
        older.created_at = older.created_at - chrono::Duration::minutes(5);
        let newer = Post::new("newer".to_string(), "a".to_string());

        repo.create(&older).await.expect("Failed to create");
        repo.create(&newer).await.expect("Failed to create");

        let posts = repo.list().await.expect("Failed to list");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].content, "newer");
        assert_eq!(posts[1].content, "older");
    }

    #[tokio::test]
    async fn test_delete_post() {
        let repo = setup().await;
        let post = Post::new("bye".to_string(), "a".to_string());
        repo.create(&post).await.expect("Failed to create");

        assert!(repo.delete(&post.id).await.expect("Failed to delete"));
        assert!(repo
            .get_by_id(&post.id)
            .await
            .expect("Failed to get")
            .is_none());

        // Unknown id deletes nothing
        assert!(!repo.delete(&post.id).await.expect("Failed to delete"));
    }

    #[tokio::test]
    async fn test_count_posts() {
        let repo = setup().await;
        assert_eq!(repo.count().await.expect("count"), 0);

        repo.create(&Post::new("a".to_string(), "x".to_string()))
            .await
            .expect("Failed to create");
        repo.create(&Post::new("b".to_string(), "x".to_string()))
            .await
            .expect("Failed to create");

        assert_eq!(repo.count().await.expect("count"), 2);
    }
}
