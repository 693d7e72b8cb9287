//! Story API endpoints
//!
//! - POST /stories - Create a story
//! - GET /stories - List stories, newest first
//!
//! There is deliberately no delete route: stories age out of relevance on
//! the client side and are never removed through the post path.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::posts::map_feed_error;
use crate::api::responses::StoryResponse;
use crate::models::CreateStoryInput;

/// Listing wrapper for stories
#[derive(Debug, Serialize, Deserialize)]
pub struct StoriesResponse {
    pub stories: Vec<StoryResponse>,
}

/// POST /stories - Create a story
pub async fn create_story(
    State(state): State<AppState>,
    Json(body): Json<CreateStoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let story = state
        .feed_service
        .create_story(&body.label, &body.author)
        .await
        .map_err(map_feed_error)?;

    Ok((StatusCode::CREATED, Json(StoryResponse::from(story))))
}

/// GET /stories - List stories, newest first
pub async fn list_stories(
    State(state): State<AppState>,
) -> Result<Json<StoriesResponse>, ApiError> {
    let stories = state
        .feed_service
        .list_stories()
        .await
        .map_err(map_feed_error)?;

    Ok(Json(StoriesResponse {
        stories: stories.into_iter().map(StoryResponse::from).collect(),
    }))
}
