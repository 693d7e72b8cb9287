//! Post model
//!
//! A Post is a long-form feed item. Posts and stories live in separate
//! tables with separate identity spaces, so a listing of one kind can never
//! contain the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feed post entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier (UUID string)
    pub id: String,
    /// Post body
    pub content: String,
    /// Author display name
    pub author: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post with a fresh id.
    pub fn new(content: String, author: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            author,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    /// Post body
    pub content: String,
    /// Author display name
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new() {
        let post = Post::new("Flossing myths".to_string(), "Dr. Perez".to_string());

        assert!(!post.id.is_empty());
        assert_eq!(post.content, "Flossing myths");
        assert_eq!(post.author, "Dr. Perez");
    }

    #[test]
    fn test_post_ids_unique() {
        let a = Post::new("a".to_string(), "x".to_string());
        let b = Post::new("a".to_string(), "x".to_string());
        assert_ne!(a.id, b.id);
    }
}
