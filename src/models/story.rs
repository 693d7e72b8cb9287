//! Story model
//!
//! A Story is a short ephemeral feed item, structurally distinct from a
//! Post: its own table, its own id space, and no delete surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Feed story entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier (UUID string)
    pub id: String,
    /// Short label shown on the story
    pub label: String,
    /// Author display name
    pub author: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Create a new Story with a fresh id.
    pub fn new(label: String, author: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label,
            author,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a story
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoryInput {
    /// Short label shown on the story
    pub label: String,
    /// Author display name
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_new() {
        let story = Story::new("Clinic day".to_string(), "Dr. Perez".to_string());

        assert!(!story.id.is_empty());
        assert_eq!(story.label, "Clinic day");
        assert_eq!(story.author, "Dr. Perez");
    }
}
