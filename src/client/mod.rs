//! HTTP client for the Dentora API
//!
//! A thin typed wrapper over reqwest, one method per endpoint, plus a
//! `ReviewQueue` that keeps a local snapshot of the pending accounts and
//! only drops an entry once the server has actually resolved it.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::api::admin::GenerateResponse;
use crate::api::auth::AuthResponse;
use crate::api::middleware::ApiError;
use crate::api::posts::PostsResponse;
use crate::api::responses::{
    AccountResponse, DashboardResponse, PendingAccountsResponse, PostResponse, StoryResponse,
    VerifyResponse,
};
use crate::api::stories::StoriesResponse;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error types for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status
    #[error("Request failed with status {code}: {message}")]
    Status { code: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Explicit confirmation for irreversible rejection
///
/// Rejecting an account deletes it permanently, so the call signature
/// forces the caller to spell the decision out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectConfirmation {
    Confirmed,
}

/// Typed API client
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// The session token used for authenticated requests, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            Err(Self::status_error(status, response).await)
        }
    }

    async fn expect_success(response: reqwest::Response) -> Result<(), ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::status_error(status, response).await)
        }
    }

    async fn status_error(status: StatusCode, response: reqwest::Response) -> ClientError {
        let message = match response.json::<ApiError>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        ClientError::Status {
            code: status.as_u16(),
            message,
        }
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .authorized(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.authorized(self.http.get(self.url(path))).send().await?;
        Self::decode(response).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Register an account; keeps the returned session token for later calls
    pub async fn register(
        &mut self,
        body: &serde_json::Value,
    ) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self.post_json("/auth/register", body).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Log in; keeps the returned session token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let auth: AuthResponse = self.post_json("/auth/login", &body).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Log out and drop the stored token
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let response = self
            .authorized(self.http.post(self.url("/auth/logout")))
            .send()
            .await?;
        Self::expect_success(response).await?;
        self.token = None;
        Ok(())
    }

    /// Fetch the account behind the current session
    pub async fn me(&self) -> Result<AccountResponse, ClientError> {
        self.get_json("/auth/me").await
    }

    // ========================================================================
    // Admin
    // ========================================================================

    /// List accounts awaiting review
    pub async fn list_pending(&self) -> Result<PendingAccountsResponse, ClientError> {
        self.get_json("/admin/users/pending").await
    }

    /// Approve a pending account
    pub async fn approve(&self, uid: &str) -> Result<VerifyResponse, ClientError> {
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/admin/users/{}/verify", uid))),
            )
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Reject a pending account, deleting it permanently
    pub async fn reject(
        &self,
        uid: &str,
        _confirmation: RejectConfirmation,
    ) -> Result<(), ClientError> {
        let response = self
            .authorized(
                self.http
                    .delete(self.url(&format!("/admin/users/{}?confirm=true", uid))),
            )
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Fetch the admin dashboard counters
    pub async fn dashboard(&self) -> Result<DashboardResponse, ClientError> {
        self.get_json("/admin/dashboard").await
    }

    /// Trigger today's daily post batch
    pub async fn generate_daily_posts(&self) -> Result<GenerateResponse, ClientError> {
        let response = self
            .authorized(self.http.post(self.url("/api/admin/generate-daily-posts")))
            .send()
            .await?;
        Self::decode(response).await
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Create a post
    pub async fn create_post(&self, content: &str, author: &str) -> Result<PostResponse, ClientError> {
        let body = serde_json::json!({ "content": content, "author": author });
        self.post_json("/posts", &body).await
    }

    /// List posts, newest first
    pub async fn list_posts(&self) -> Result<PostsResponse, ClientError> {
        self.get_json("/posts").await
    }

    /// Delete a post
    pub async fn delete_post(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/posts/{}", id))))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    /// Create a story
    pub async fn create_story(&self, label: &str, author: &str) -> Result<StoryResponse, ClientError> {
        let body = serde_json::json!({ "label": label, "author": author });
        self.post_json("/stories", &body).await
    }

    /// List stories, newest first
    pub async fn list_stories(&self) -> Result<StoriesResponse, ClientError> {
        self.get_json("/stories").await
    }
}

// ============================================================================
// Review Queue
// ============================================================================

/// Whether a review call settled the entry on the server side
///
/// A 404 means another reviewer already resolved the account, which is as
/// final as resolving it ourselves. Anything else leaves the entry alone.
fn resolves_entry(result: &Result<(), ClientError>) -> bool {
    match result {
        Ok(()) => true,
        Err(ClientError::Status { code: 404, .. }) => true,
        Err(_) => false,
    }
}

/// Local snapshot of the pending review queue
///
/// Entries are evicted only after the server confirms the account is
/// resolved; a transport failure leaves the snapshot untouched, so a
/// reviewer never loses sight of an account that is still pending.
pub struct ReviewQueue {
    client: ApiClient,
    pending: Vec<AccountResponse>,
}

impl ReviewQueue {
    /// Wrap an authenticated client
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            pending: Vec::new(),
        }
    }

    /// Current snapshot
    pub fn pending(&self) -> &[AccountResponse] {
        &self.pending
    }

    /// Replace the snapshot with the server's current queue
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let response = self.client.list_pending().await?;
        self.pending = response.accounts;
        Ok(())
    }

    /// Approve an account, evicting it from the snapshot on success
    ///
    /// An already-verified answer counts as success here.
    pub async fn approve(&mut self, uid: &str) -> Result<(), ClientError> {
        let result = self.client.approve(uid).await.map(|_| ());
        if resolves_entry(&result) {
            self.evict(uid);
            return Ok(());
        }
        result
    }

    /// Reject an account, evicting it from the snapshot on success
    pub async fn reject(
        &mut self,
        uid: &str,
        confirmation: RejectConfirmation,
    ) -> Result<(), ClientError> {
        let result = self.client.reject(uid, confirmation).await;
        if resolves_entry(&result) {
            self.evict(uid);
            return Ok(());
        }
        result
    }

    fn evict(&mut self, uid: &str) {
        self.pending.retain(|account| account.uid != uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_entry_on_success() {
        assert!(resolves_entry(&Ok(())));
    }

    #[test]
    fn test_resolves_entry_on_not_found() {
        let result = Err(ClientError::Status {
            code: 404,
            message: "Account not found".to_string(),
        });
        assert!(resolves_entry(&result));
    }

    #[test]
    fn test_server_error_does_not_resolve_entry() {
        let result = Err(ClientError::Status {
            code: 500,
            message: "boom".to_string(),
        });
        assert!(!resolves_entry(&result));
    }

    #[test]
    fn test_decode_error_does_not_resolve_entry() {
        let result = Err(ClientError::Decode("bad json".to_string()));
        assert!(!resolves_entry(&result));
    }

    #[test]
    fn test_client_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:5555/").expect("client");
        assert_eq!(client.url("/posts"), "http://localhost:5555/posts");
    }
}
