//! Admin API endpoints
//!
//! Review queue and dashboard, all gated behind the admin middleware:
//! - GET /admin/users/pending - Accounts awaiting credential review
//! - PUT /admin/users/{uid}/verify - Approve a pending account
//! - DELETE /admin/users/{uid}?confirm=true - Reject (permanently delete)
//! - GET /admin/dashboard - Platform counters
//! - POST /api/admin/generate-daily-posts - Trigger the daily post batch

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{
    AccountResponse, DashboardResponse, PendingAccountsResponse, PostResponse, VerifyResponse,
};
use crate::services::{ApprovalOutcome, VerificationError};

fn map_verification_error(e: VerificationError) -> ApiError {
    match e {
        VerificationError::NotFound(uid) => {
            ApiError::not_found(format!("Account not found: {}", uid))
        }
        VerificationError::NotReviewable(uid) => ApiError::validation_error(format!(
            "Account does not go through review: {}",
            uid
        )),
        other => ApiError::internal_error(other.to_string()),
    }
}

/// GET /admin/users/pending - List accounts awaiting review, oldest first
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<PendingAccountsResponse>, ApiError> {
    let pending = state
        .verification_service
        .list_pending()
        .await
        .map_err(map_verification_error)?;

    let total = pending.len() as i64;
    Ok(Json(PendingAccountsResponse {
        accounts: pending.into_iter().map(AccountResponse::from).collect(),
        total,
    }))
}

/// PUT /admin/users/{uid}/verify - Approve a pending account
///
/// Approving an account someone already approved is reported as success
/// with `already_verified` set, not as an error.
pub async fn verify_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let outcome = state
        .verification_service
        .approve(&uid)
        .await
        .map_err(map_verification_error)?;

    Ok(Json(VerifyResponse {
        uid,
        is_verified: true,
        already_verified: outcome == ApprovalOutcome::AlreadyVerified,
    }))
}

/// Query parameters for the reject endpoint
#[derive(Debug, Deserialize)]
pub struct RejectQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// DELETE /admin/users/{uid}?confirm=true - Reject a pending account
///
/// Rejection permanently deletes the record. Without `confirm=true` the
/// request is refused with 428 so no client can delete by accident.
pub async fn reject_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Query(query): Query<RejectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !query.confirm {
        return Err(ApiError::confirmation_required(
            "Rejection is permanent; repeat the request with confirm=true",
        ));
    }

    state
        .verification_service
        .reject(&uid)
        .await
        .map_err(map_verification_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/dashboard - Platform counters
pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let accounts = state
        .account_service
        .count_accounts()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let pending_review = state
        .verification_service
        .pending_count()
        .await
        .map_err(map_verification_error)?;

    let (posts, stories) = state
        .feed_service
        .counts()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(DashboardResponse {
        accounts,
        pending_review,
        posts,
        stories,
    }))
}

/// Response for the daily generation trigger
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub generated: usize,
    pub posts: Vec<PostResponse>,
}

/// POST /api/admin/generate-daily-posts - Create today's post batch
pub async fn generate_daily_posts(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let posts = state
        .generator
        .generate_today()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(GenerateResponse {
        generated: posts.len(),
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}
