//! Feed separation smoke test against a running server
//!
//! Creates a post and a story, checks that each shows up only in its own
//! listing, deletes the post, and checks it is gone while the story
//! survives. Exits non-zero on the first failed check.
//!
//! Target URL comes from DENTORA_VERIFY_URL (default http://localhost:5555).

use anyhow::{bail, Context, Result};
use dentora::client::ApiClient;

const TEST_AUTHOR: &str = "TestUser";
const TEST_POST_CONTENT: &str = "Test Post Content";
const TEST_STORY_LABEL: &str = "Test Story";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dentora=info".into()),
        )
        .init();

    let base_url = std::env::var("DENTORA_VERIFY_URL")
        .unwrap_or_else(|_| "http://localhost:5555".to_string());
    tracing::info!("Running feed checks against {}", base_url);

    let mut client = ApiClient::new(&base_url)?;

    // Creating feed content needs a session; register a throwaway patient
    let email = format!("verify-{}@example.com", uuid::Uuid::new_v4());
    client
        .register(&serde_json::json!({
            "display_name": TEST_AUTHOR,
            "email": email,
            "password": "verify-run-password",
            "role": "patient"
        }))
        .await
        .context("Failed to register verification account")?;

    // A new post appears in the post listing and nowhere else
    let post = client
        .create_post(TEST_POST_CONTENT, TEST_AUTHOR)
        .await
        .context("Failed to create post")?;
    tracing::info!(id = %post.id, "Created post");

    let posts = client.list_posts().await.context("Failed to list posts")?;
    if !posts.posts.iter().any(|p| p.id == post.id) {
        bail!("Created post {} missing from post listing", post.id);
    }

    let stories = client
        .list_stories()
        .await
        .context("Failed to list stories")?;
    if stories.stories.iter().any(|s| s.id == post.id) {
        bail!("Post {} leaked into story listing", post.id);
    }

    // The symmetric check for a story
    let story = client
        .create_story(TEST_STORY_LABEL, TEST_AUTHOR)
        .await
        .context("Failed to create story")?;
    tracing::info!(id = %story.id, "Created story");

    let stories = client
        .list_stories()
        .await
        .context("Failed to list stories")?;
    if !stories.stories.iter().any(|s| s.id == story.id) {
        bail!("Created story {} missing from story listing", story.id);
    }

    let posts = client.list_posts().await.context("Failed to list posts")?;
    if posts.posts.iter().any(|p| p.id == story.id) {
        bail!("Story {} leaked into post listing", story.id);
    }

    // Deleting the post removes it; the story is untouched
    client
        .delete_post(&post.id)
        .await
        .context("Failed to delete post")?;

    let posts = client.list_posts().await.context("Failed to list posts")?;
    if posts.posts.iter().any(|p| p.id == post.id) {
        bail!("Post {} still listed after deletion", post.id);
    }

    let stories = client
        .list_stories()
        .await
        .context("Failed to list stories")?;
    if !stories.stories.iter().any(|s| s.id == story.id) {
        bail!("Story {} disappeared after a post deletion", story.id);
    }

    tracing::info!("All feed separation checks passed");
    Ok(())
}
