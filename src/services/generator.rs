//! Daily post generation
//!
//! Creates the day's three feed posts from a rotating topic pool. Topic
//! selection is deterministic by date, so re-running the trigger on the
//! same day picks the same topics. Generated posts are ordinary posts:
//! they appear in the post listing and never in the story listing.

use crate::models::Post;
use crate::services::feed::{FeedError, FeedService};
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;

/// Number of posts generated per day
const POSTS_PER_DAY: usize = 3;

/// Rotating topic pool for generated content
const TOPICS: &[&str] = &[
    "Five flossing myths your patients still believe",
    "What a first orthodontic consultation actually covers",
    "Reading a panoramic radiograph: a quick refresher",
    "Fluoride varnish: when and for whom",
    "Managing dental anxiety in adult patients",
    "The case for interdental brushes over floss picks",
    "Early signs of periodontal disease worth flagging",
    "Whitening treatments: separating fact from marketing",
    "Night guards and bruxism: what the evidence says",
    "Pediatric first visits: setting the tone early",
    "Sugar substitutes and caries risk, briefly",
    "When a cracked tooth can wait and when it cannot",
    "Post-extraction care instructions patients forget",
    "Electric versus manual brushing, revisited",
    "Dry mouth: causes, consequences, and quick wins",
    "Wisdom teeth: monitoring versus removal",
    "Dental implants: candidacy basics for referrals",
    "Oral cancer screening in routine checkups",
    "Diet counseling that fits a six-minute slot",
    "Sensitivity after whitening: what to tell patients",
    "Retention after braces: the long game",
];

/// Daily post generator
pub struct DailyPostGenerator {
    feed: Arc<FeedService>,
    author: String,
}

impl DailyPostGenerator {
    /// Create a new generator writing posts under the given author name
    pub fn new(feed: Arc<FeedService>, author: String) -> Self {
        Self { feed, author }
    }

    /// Topics selected for a given date
    ///
    /// Consecutive pool entries starting at an offset derived from the
    /// date, so every day gets a distinct, stable window of topics.
    pub fn topics_for(date: NaiveDate) -> Vec<&'static str> {
        let seed = date.num_days_from_ce() as usize;
        (0..POSTS_PER_DAY)
            .map(|i| TOPICS[(seed * POSTS_PER_DAY + i) % TOPICS.len()])
            .collect()
    }

    /// Create the three posts for a given date
    pub async fn generate_for(&self, date: NaiveDate) -> Result<Vec<Post>, FeedError> {
        let mut posts = Vec::with_capacity(POSTS_PER_DAY);

        for topic in Self::topics_for(date) {
            let post = self.feed.create_post(topic, &self.author).await?;
            posts.push(post);
        }

        tracing::info!(count = posts.len(), date = %date, "Generated daily posts");

        Ok(posts)
    }

    /// Create the three posts for today
    pub async fn generate_today(&self) -> Result<Vec<Post>, FeedError> {
        self.generate_for(Utc::now().date_naive()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::db::repositories::{SqlxPostRepository, SqlxStoryRepository};
    use crate::db::{create_test_pool, migrations};
    use std::time::Duration;

    async fn setup() -> (Arc<FeedService>, DailyPostGenerator) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let feed = Arc::new(FeedService::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxStoryRepository::boxed(pool),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
        ));

        let generator = DailyPostGenerator::new(feed.clone(), "Dentora Daily".to_string());
        (feed, generator)
    }

    #[tokio::test]
    async fn test_generates_exactly_three_posts() {
        let (feed, generator) = setup().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        let posts = generator.generate_for(date).await.expect("Generate failed");

        assert_eq!(posts.len(), 3);
        assert!(posts.iter().all(|p| p.author == "Dentora Daily"));

        let listed = feed.list_posts().await.expect("Failed to list posts");
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_generated_posts_never_appear_as_stories() {
        let (feed, generator) = setup().await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        generator.generate_for(date).await.expect("Generate failed");

        let stories = feed.list_stories().await.expect("Failed to list stories");
        assert!(stories.is_empty());
    }

    #[test]
    fn test_topics_deterministic_by_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        let first = DailyPostGenerator::topics_for(date);
        let second = DailyPostGenerator::topics_for(date);

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_consecutive_days_get_different_topics() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();

        assert_ne!(
            DailyPostGenerator::topics_for(today),
            DailyPostGenerator::topics_for(tomorrow)
        );
    }

    #[test]
    fn test_topics_within_a_day_are_distinct() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let topics = DailyPostGenerator::topics_for(date);

        assert_ne!(topics[0], topics[1]);
        assert_ne!(topics[1], topics[2]);
        assert_ne!(topics[0], topics[2]);
    }
}
