//! Post API endpoints
//!
//! - POST /posts - Create a post
//! - GET /posts - List posts, newest first
//! - DELETE /posts/{id} - Delete a post
//!
//! Posts and stories live in separate tables with separate id spaces;
//! a story id handed to the delete endpoint is simply not found here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PostResponse;
use crate::models::CreatePostInput;
use crate::services::FeedError;

pub(crate) fn map_feed_error(e: FeedError) -> ApiError {
    match e {
        FeedError::PostNotFound(id) => ApiError::not_found(format!("Post not found: {}", id)),
        FeedError::ValidationError(msg) => ApiError::validation_error(msg),
        other => ApiError::internal_error(other.to_string()),
    }
}

/// Listing wrapper for posts
#[derive(Debug, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<PostResponse>,
}

/// POST /posts - Create a post
pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .feed_service
        .create_post(&body.content, &body.author)
        .await
        .map_err(map_feed_error)?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// GET /posts - List posts, newest first
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<PostsResponse>, ApiError> {
    let posts = state
        .feed_service
        .list_posts()
        .await
        .map_err(map_feed_error)?;

    Ok(Json(PostsResponse {
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

/// DELETE /posts/{id} - Delete a post
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .feed_service
        .delete_post(&id)
        .await
        .map_err(map_feed_error)?;

    Ok(StatusCode::NO_CONTENT)
}
