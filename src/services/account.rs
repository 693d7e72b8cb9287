//! Account service
//!
//! Business logic for registration, login, and session management:
//! - Registration with role-specific profiles; the first account in the
//!   system becomes admin, the role is otherwise not self-assignable
//! - Login by email + password with per-email rate limiting
//! - Session create/validate/delete with a 7-day token lifetime

use crate::db::repositories::{AccountRepository, SessionRepository};
use crate::models::{Account, RegisterAccountInput, RoleProfile, Session};
use crate::services::password::{hash_password, verify_password};
use crate::services::rate_limiter::LoginRateLimiter;
use anyhow::Context;
use std::sync::Arc;

/// Error types for account service operations
#[derive(Debug, thiserror::Error)]
pub enum AccountServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Account already exists
    #[error("Account already exists: {0}")]
    AccountExists(String),

    /// Too many failed login attempts
    #[error("Too many failed login attempts, try again later")]
    RateLimited,

    /// Session expired
    #[error("Session expired")]
    SessionExpired,

    /// Session not found
    #[error("Session not found")]
    SessionNotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for logging in
#[derive(Debug, Clone)]
pub struct LoginInput {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Account service for registration and authentication
pub struct AccountService {
    account_repo: Arc<dyn AccountRepository>,
    session_repo: Arc<dyn SessionRepository>,
    rate_limiter: Arc<LoginRateLimiter>,
}

impl AccountService {
    /// Create a new account service
    pub fn new(
        account_repo: Arc<dyn AccountRepository>,
        session_repo: Arc<dyn SessionRepository>,
        rate_limiter: Arc<LoginRateLimiter>,
    ) -> Self {
        Self {
            account_repo,
            session_repo,
            rate_limiter,
        }
    }

    /// Register a new account
    ///
    /// The first account in the system is promoted to admin regardless of the
    /// requested profile; dentists and students start unverified and enter
    /// the review queue.
    pub async fn register(
        &self,
        input: RegisterAccountInput,
    ) -> Result<Account, AccountServiceError> {
        self.validate_register_input(&input)?;

        if self
            .account_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(AccountServiceError::AccountExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let is_first = self
            .account_repo
            .count()
            .await
            .context("Failed to count accounts")?
            == 0;

        let profile = if is_first {
            RoleProfile::Admin
        } else if matches!(input.profile, RoleProfile::Admin) {
            // Admin is bootstrap-only; a later request for it is refused
            return Err(AccountServiceError::ValidationError(
                "Admin accounts cannot be self-registered".to_string(),
            ));
        } else {
            input.profile
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        let mut account = Account::new(input.display_name, input.email, password_hash, profile);
        account.document_url = input.document_url;
        // Admins bypass review; keeps the bootstrap account out of the queue
        if account.is_admin() {
            account.is_verified = true;
        }

        let created = self
            .account_repo
            .create(&account)
            .await
            .context("Failed to create account")?;

        tracing::info!(uid = %created.uid, role = %created.role(), "Account registered");

        Ok(created)
    }

    /// Login with email and password
    ///
    /// Returns a fresh session on success. Invalid credentials report the
    /// same error whether the email is unknown or the password wrong.
    pub async fn login(&self, input: LoginInput) -> Result<Session, AccountServiceError> {
        if self.rate_limiter.is_limited(&input.email).await {
            return Err(AccountServiceError::RateLimited);
        }

        let account = match self
            .account_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to look up account")?
        {
            Some(account) => account,
            None => {
                self.rate_limiter.record_failed_attempt(&input.email).await;
                return Err(AccountServiceError::AuthenticationError(
                    "Invalid email or password".to_string(),
                ));
            }
        };

        let valid = verify_password(&input.password, &account.password_hash)
            .context("Failed to verify password")?;

        if !valid {
            self.rate_limiter.record_failed_attempt(&input.email).await;
            return Err(AccountServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        self.rate_limiter.clear_attempts(&input.email).await;

        let session = Session::new(account.uid.clone());
        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// Delete the session behind a token (logout)
    pub async fn logout(&self, token: &str) -> Result<(), AccountServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its account
    ///
    /// Expired sessions are removed on sight and reported as expired.
    pub async fn validate_session(&self, token: &str) -> Result<Account, AccountServiceError> {
        let session = self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
            .ok_or(AccountServiceError::SessionNotFound)?;

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Err(AccountServiceError::SessionExpired);
        }

        self.account_repo
            .get_by_uid(&session.account_uid)
            .await
            .context("Failed to look up account")?
            .ok_or(AccountServiceError::SessionNotFound)
    }

    /// Get an account by uid
    pub async fn find_by_uid(&self, uid: &str) -> Result<Option<Account>, AccountServiceError> {
        Ok(self
            .account_repo
            .get_by_uid(uid)
            .await
            .context("Failed to look up account")?)
    }

    /// Sweep expired sessions; called periodically from a background task
    pub async fn sweep_expired_sessions(&self) -> Result<u64, AccountServiceError> {
        Ok(self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to sweep expired sessions")?)
    }

    /// Count all accounts
    pub async fn count_accounts(&self) -> Result<i64, AccountServiceError> {
        Ok(self
            .account_repo
            .count()
            .await
            .context("Failed to count accounts")?)
    }

    fn validate_register_input(
        &self,
        input: &RegisterAccountInput,
    ) -> Result<(), AccountServiceError> {
        if input.display_name.trim().is_empty() {
            return Err(AccountServiceError::ValidationError(
                "Display name cannot be empty".to_string(),
            ));
        }

        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(AccountServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }

        if input.password.len() < 8 {
            return Err(AccountServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }
}
