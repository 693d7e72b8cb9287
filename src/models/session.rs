//! Session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default session lifetime in days
pub const SESSION_DURATION_DAYS: i64 = 7;

/// Authenticated session backed by an opaque token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session token (UUID)
    pub id: String,
    /// Owning account uid
    pub account_uid: String,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for an account with the default lifetime.
    pub fn new(account_uid: String) -> Self {
        Self::with_duration(account_uid, Duration::days(SESSION_DURATION_DAYS))
    }

    /// Create a new session with an explicit lifetime.
    pub fn with_duration(account_uid: String, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            account_uid,
            expires_at: now + duration,
            created_at: now,
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new("acc-1".to_string());

        assert!(!session.id.is_empty());
        assert_eq!(session.account_uid, "acc-1");
        assert!(!session.is_expired());
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn test_session_expired() {
        let session = Session::with_duration("acc-1".to_string(), Duration::seconds(-1));
        assert!(session.is_expired());
    }
}
