//! Rate limiter for login attempts
//!
//! Brute-force protection: 5 failed attempts per email in a 15-minute
//! window locks further logins for that email until the window slides.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Max failed attempts per email within the window
const MAX_ATTEMPTS: usize = 5;

/// Sliding window length in minutes
const WINDOW_MINUTES: i64 = 15;

/// Login rate limiter keyed by email
pub struct LoginRateLimiter {
    attempts: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
}

impl LoginRateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if an email is currently rate limited
    pub async fn is_limited(&self, email: &str) -> bool {
        let mut attempts = self.attempts.write().await;
        let cutoff = Utc::now() - Duration::minutes(WINDOW_MINUTES);

        let email_attempts = attempts.entry(email.to_lowercase()).or_default();
        email_attempts.retain(|time| *time > cutoff);

        email_attempts.len() >= MAX_ATTEMPTS
    }

    /// Record a failed login attempt
    pub async fn record_failed_attempt(&self, email: &str) {
        let mut attempts = self.attempts.write().await;
        attempts
            .entry(email.to_lowercase())
            .or_default()
            .push(Utc::now());
    }

    /// Clear failed attempts (on successful login)
    pub async fn clear_attempts(&self, email: &str) {
        let mut attempts = self.attempts.write().await;
        attempts.remove(&email.to_lowercase());
    }

    /// Drop stale entries; called periodically from a background task
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - Duration::minutes(WINDOW_MINUTES);

        let mut attempts = self.attempts.write().await;
        attempts.retain(|_, times| {
            times.retain(|time| *time > cutoff);
            !times.is_empty()
        });
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limit_after_five_failures() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..4 {
            assert!(!limiter.is_limited("user@example.com").await);
            limiter.record_failed_attempt("user@example.com").await;
        }

        limiter.record_failed_attempt("user@example.com").await;

        assert!(limiter.is_limited("user@example.com").await);

        limiter.clear_attempts("user@example.com").await;
        assert!(!limiter.is_limited("user@example.com").await);
    }

    #[tokio::test]
    async fn test_case_insensitive_email() {
        let limiter = LoginRateLimiter::new();

        limiter.record_failed_attempt("User@Example.com").await;
        limiter.record_failed_attempt("user@example.com").await;
        limiter.record_failed_attempt("USER@EXAMPLE.COM").await;
        limiter.record_failed_attempt("user@example.com").await;
        limiter.record_failed_attempt("user@example.com").await;

        assert!(limiter.is_limited("User@Example.com").await);
    }

    #[tokio::test]
    async fn test_emails_limited_independently() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..5 {
            limiter.record_failed_attempt("a@example.com").await;
        }

        assert!(limiter.is_limited("a@example.com").await);
        assert!(!limiter.is_limited("b@example.com").await);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_entries() {
        let limiter = LoginRateLimiter::new();

        limiter.record_failed_attempt("a@example.com").await;
        limiter.cleanup().await;

        // Recent attempt survives cleanup
        let attempts = limiter.attempts.read().await;
        assert!(attempts.contains_key("a@example.com"));
    }
}
