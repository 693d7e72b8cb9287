//! Authentication API endpoints
//!
//! - POST /auth/register - Account registration
//! - POST /auth/login - Login, issues a session token
//! - POST /auth/logout - Invalidates the current session
//! - GET /auth/me - Current account
//!
//! Successful register and login both set an HttpOnly session cookie and
//! return the token in the body for clients that prefer a Bearer header.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedAccount};
use crate::api::responses::AccountResponse;
use crate::models::session::SESSION_DURATION_DAYS;
use crate::models::{RegisterAccountInput, RoleProfile};
use crate::services::{AccountServiceError, LoginInput};

/// Request body for account registration
///
/// Role-specific fields ride at the top level next to `role`, mirroring
/// how accounts are serialized back out.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: RoleProfile,
    pub document_url: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub token: String,
}

fn session_cookie(token: &str) -> HeaderValue {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token,
        SESSION_DURATION_DAYS * 24 * 60 * 60
    );
    // Token is a UUID and the rest is static, so this cannot fail
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("session="))
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn map_account_error(e: AccountServiceError) -> ApiError {
    match e {
        AccountServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        AccountServiceError::AccountExists(msg) => ApiError::conflict(msg),
        AccountServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
        AccountServiceError::RateLimited => {
            ApiError::rate_limited("Too many failed login attempts, try again later")
        }
        AccountServiceError::SessionExpired | AccountServiceError::SessionNotFound => {
            ApiError::unauthorized("Invalid or expired session")
        }
        other => ApiError::internal_error(other.to_string()),
    }
}

/// POST /auth/register - Account registration
///
/// The first account ever registered becomes the admin. Dentist and student
/// accounts start unverified and enter the review queue.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let input = RegisterAccountInput {
        display_name: body.display_name,
        email: body.email.clone(),
        password: body.password,
        profile: body.profile,
        document_url: body.document_url,
    };

    let account = state
        .account_service
        .register(input)
        .await
        .map_err(map_account_error)?;

    // Log the fresh account straight in
    let session = state
        .account_service
        .login(LoginInput {
            email: body.email,
            password,
        })
        .await
        .map_err(map_account_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie(&session.id));

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            account: AccountResponse::from(account),
            token: session.id,
        }),
    ))
}

/// POST /auth/login - Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .account_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(map_account_error)?;

    let account = state
        .account_service
        .validate_session(&session.id)
        .await
        .map_err(map_account_error)?;

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie(&session.id));

    Ok((
        headers,
        Json(AuthResponse {
            account: AccountResponse::from(account),
            token: session.id,
        }),
    ))
}

/// POST /auth/logout - Invalidate the current session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = extract_session_token(&headers) {
        state
            .account_service
            .logout(&token)
            .await
            .map_err(map_account_error)?;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::SET_COOKIE, clear_session_cookie());

    Ok((response_headers, StatusCode::NO_CONTENT))
}

/// GET /auth/me - Current account
pub async fn me(
    AuthenticatedAccount(account): AuthenticatedAccount,
) -> Json<AccountResponse> {
    Json(AccountResponse::from(account))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserializes_dentist_fields() {
        let json = serde_json::json!({
            "display_name": "Dr. Perez",
            "email": "perez@example.com",
            "password": "hunter2hunter2",
            "role": "dentist",
            "qualification": "BDS",
            "specialization": "Periodontics",
            "years_experience": 9,
            "clinic_address": "4 Enamel Lane",
            "document_url": "/uploads/credentials/abc.pdf"
        });

        let request: RegisterRequest = serde_json::from_value(json).unwrap();
        assert!(matches!(request.profile, RoleProfile::Dentist { .. }));
        assert_eq!(
            request.document_url.as_deref(),
            Some("/uploads/credentials/abc.pdf")
        );
    }

    #[test]
    fn test_register_request_patient_needs_no_extra_fields() {
        let json = serde_json::json!({
            "display_name": "Pat",
            "email": "pat@example.com",
            "password": "hunter2hunter2",
            "role": "patient"
        });

        let request: RegisterRequest = serde_json::from_value(json).unwrap();
        assert!(matches!(request.profile, RoleProfile::Patient));
    }

    #[test]
    fn test_register_request_rejects_unknown_role() {
        let json = serde_json::json!({
            "display_name": "X",
            "email": "x@example.com",
            "password": "hunter2hunter2",
            "role": "hygienist"
        });

        assert!(serde_json::from_value::<RegisterRequest>(json).is_err());
    }

    #[test]
    fn test_session_cookie_is_http_only() {
        let cookie = session_cookie("abc123");
        let value = cookie.to_str().unwrap();
        assert!(value.contains("session=abc123"));
        assert!(value.contains("HttpOnly"));
    }
}
