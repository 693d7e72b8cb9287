//! Feed service
//!
//! Business logic for the two feed content kinds, Post and Story. The kinds
//! are structurally separated: separate tables, separate repositories,
//! separate id spaces. A listing of one kind can never contain the other,
//! and deleting through the post path can never touch a story.
//!
//! Listings are cached with a short TTL and invalidated on every mutation;
//! staleness within the TTL is acceptable.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::{PostRepository, StoryRepository};
use crate::models::{Post, Story};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

const POSTS_CACHE_KEY: &str = "feed:posts";
const STORIES_CACHE_KEY: &str = "feed:stories";

/// Error types for feed operations
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// No post with the given id (story ids land here too)
    #[error("Post not found: {0}")]
    PostNotFound(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Feed service for posts and stories
pub struct FeedService {
    post_repo: Arc<dyn PostRepository>,
    story_repo: Arc<dyn StoryRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
}

impl FeedService {
    /// Create a new feed service
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        story_repo: Arc<dyn StoryRepository>,
        cache: Arc<MemoryCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            post_repo,
            story_repo,
            cache,
            cache_ttl,
        }
    }

    /// Create a new post
    pub async fn create_post(&self, content: &str, author: &str) -> Result<Post, FeedError> {
        if content.trim().is_empty() {
            return Err(FeedError::ValidationError(
                "Post content cannot be empty".to_string(),
            ));
        }
        if author.trim().is_empty() {
            return Err(FeedError::ValidationError(
                "Post author cannot be empty".to_string(),
            ));
        }

        let post = Post::new(content.to_string(), author.to_string());
        let created = self
            .post_repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        self.invalidate_posts().await;

        Ok(created)
    }

    /// List all posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<Post>, FeedError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Post>>(POSTS_CACHE_KEY).await {
            return Ok(cached);
        }

        let posts = self
            .post_repo
            .list()
            .await
            .context("Failed to list posts")?;

        if let Err(e) = self.cache.set(POSTS_CACHE_KEY, &posts, self.cache_ttl).await {
            tracing::warn!("Failed to cache post listing: {}", e);
        }

        Ok(posts)
    }

    /// Delete a post by id
    ///
    /// Fails with `PostNotFound` for unknown ids, including story ids:
    /// the stories table is never consulted, let alone touched.
    pub async fn delete_post(&self, id: &str) -> Result<(), FeedError> {
        let deleted = self
            .post_repo
            .delete(id)
            .await
            .context("Failed to delete post")?;

        if !deleted {
            return Err(FeedError::PostNotFound(id.to_string()));
        }

        self.invalidate_posts().await;

        Ok(())
    }

    /// Create a new story
    pub async fn create_story(&self, label: &str, author: &str) -> Result<Story, FeedError> {
        if label.trim().is_empty() {
            return Err(FeedError::ValidationError(
                "Story label cannot be empty".to_string(),
            ));
        }
        if author.trim().is_empty() {
            return Err(FeedError::ValidationError(
                "Story author cannot be empty".to_string(),
            ));
        }

        let story = Story::new(label.to_string(), author.to_string());
        let created = self
            .story_repo
            .create(&story)
            .await
            .context("Failed to create story")?;

        self.invalidate_stories().await;

        Ok(created)
    }

    /// List all stories, newest first
    pub async fn list_stories(&self) -> Result<Vec<Story>, FeedError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Story>>(STORIES_CACHE_KEY).await {
            return Ok(cached);
        }

        let stories = self
            .story_repo
            .list()
            .await
            .context("Failed to list stories")?;

        if let Err(e) = self
            .cache
            .set(STORIES_CACHE_KEY, &stories, self.cache_ttl)
            .await
        {
            tracing::warn!("Failed to cache story listing: {}", e);
        }

        Ok(stories)
    }

    /// Count posts and stories (for the admin dashboard)
    pub async fn counts(&self) -> Result<(i64, i64), FeedError> {
        let posts = self
            .post_repo
            .count()
            .await
            .context("Failed to count posts")?;
        let stories = self
            .story_repo
            .count()
            .await
            .context("Failed to count stories")?;
        Ok((posts, stories))
    }

    async fn invalidate_posts(&self) {
        if let Err(e) = self.cache.delete(POSTS_CACHE_KEY).await {
            tracing::warn!("Failed to invalidate post listing cache: {}", e);
        }
    }

    async fn invalidate_stories(&self) {
        if let Err(e) = self.cache.delete(STORIES_CACHE_KEY).await {
            tracing::warn!("Failed to invalidate story listing cache: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxPostRepository, SqlxStoryRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_with_ttl(ttl: Duration) -> (FeedService, Arc<dyn PostRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let service = FeedService::new(
            post_repo.clone(),
            SqlxStoryRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
            ttl,
        );
        (service, post_repo)
    }

    async fn setup() -> FeedService {
        setup_with_ttl(Duration::from_secs(60)).await.0
    }

    #[tokio::test]
    async fn test_create_and_list_posts() {
        let service = setup().await;

        let post = service
            .create_post("Flossing myths", "Dr. Perez")
            .await
            .expect("Failed to create post");

        let posts = service.list_posts().await.expect("Failed to list posts");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, post.id);
    }

    #[tokio::test]
    async fn test_posts_and_stories_never_mix() {
        let service = setup().await;

        let post = service
            .create_post("A post", "Author")
            .await
            .expect("Failed to create post");
        let story = service
            .create_story("A story", "Author")
            .await
            .expect("Failed to create story");

        let posts = service.list_posts().await.expect("Failed to list posts");
        let stories = service.list_stories().await.expect("Failed to list stories");

        assert!(posts.iter().all(|p| p.id != story.id));
        assert!(stories.iter().all(|s| s.id != post.id));
        assert_eq!(posts.len(), 1);
        assert_eq!(stories.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_post() {
        let service = setup().await;

        let post = service
            .create_post("Temporary", "Author")
            .await
            .expect("Failed to create post");

        service.delete_post(&post.id).await.expect("Delete failed");

        let posts = service.list_posts().await.expect("Failed to list posts");
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_post_fails() {
        let service = setup().await;

        let result = service.delete_post("no-such-id").await;
        assert!(matches!(result, Err(FeedError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_post_with_story_id_fails_and_story_survives() {
        let service = setup().await;

        let story = service
            .create_story("Survivor", "Author")
            .await
            .expect("Failed to create story");

        let result = service.delete_post(&story.id).await;
        assert!(matches!(result, Err(FeedError::PostNotFound(_))));

        let stories = service.list_stories().await.expect("Failed to list stories");
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].id, story.id);
    }

    #[tokio::test]
    async fn test_listing_cache_invalidated_on_mutation() {
        let service = setup().await;

        // Prime the cache with an empty listing
        assert!(service.list_posts().await.expect("list").is_empty());

        service
            .create_post("Fresh", "Author")
            .await
            .expect("Failed to create post");

        // The new post is visible immediately, not after the TTL
        let posts = service.list_posts().await.expect("list");
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_configured_ttl_expires_cached_listing() {
        let (service, post_repo) = setup_with_ttl(Duration::from_millis(50)).await;

        service
            .create_post("First", "Author")
            .await
            .expect("Failed to create post");
        assert_eq!(service.list_posts().await.expect("list").len(), 1);

        // Written behind the service's back, so only cache expiry reveals it
        post_repo
            .create(&Post::new("Second".to_string(), "Author".to_string()))
            .await
            .expect("Failed to create post directly");
        assert_eq!(service.list_posts().await.expect("list").len(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(service.list_posts().await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn test_create_post_validation() {
        let service = setup().await;

        assert!(matches!(
            service.create_post("", "Author").await,
            Err(FeedError::ValidationError(_))
        ));
        assert!(matches!(
            service.create_post("Content", "  ").await,
            Err(FeedError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_story_validation() {
        let service = setup().await;

        assert!(matches!(
            service.create_story("", "Author").await,
            Err(FeedError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_counts() {
        let service = setup().await;

        service
            .create_post("a", "x")
            .await
            .expect("Failed to create post");
        service
            .create_post("b", "x")
            .await
            .expect("Failed to create post");
        service
            .create_story("c", "x")
            .await
            .expect("Failed to create story");

        let (posts, stories) = service.counts().await.expect("counts");
        assert_eq!(posts, 2);
        assert_eq!(stories, 1);
    }
}
