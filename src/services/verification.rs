//! Verification review workflow
//!
//! Admin-side review of professional accounts. A dentist or student account
//! starts pending; a reviewer either approves it (sets the verified flag)
//! or rejects it, which permanently deletes the record. Both edges are
//! one-way: there is no un-verify and no undelete.

use crate::db::repositories::AccountRepository;
use crate::models::Account;
use anyhow::Context;
use std::sync::Arc;

/// Error types for review operations
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// No account with the given uid
    #[error("Account not found: {0}")]
    NotFound(String),

    /// The account's role never goes through review
    #[error("Account is not reviewable: {0}")]
    NotReviewable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Outcome of an approval
///
/// `AlreadyVerified` is success-equivalent; it covers a double-click and a
/// concurrent reviewer landing first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The account transitioned from pending to verified
    Approved,
    /// The account was verified before this call
    AlreadyVerified,
}

/// Verification service for the admin review queue
pub struct VerificationService {
    account_repo: Arc<dyn AccountRepository>,
}

impl VerificationService {
    /// Create a new verification service
    pub fn new(account_repo: Arc<dyn AccountRepository>) -> Self {
        Self { account_repo }
    }

    /// List all accounts awaiting review, oldest first
    ///
    /// Only unverified dentists and students qualify; the filter lives in
    /// SQL, so patients and admins can never leak into the queue.
    pub async fn list_pending(&self) -> Result<Vec<Account>, VerificationError> {
        Ok(self
            .account_repo
            .list_pending()
            .await
            .context("Failed to list pending accounts")?)
    }

    /// Number of accounts awaiting review
    pub async fn pending_count(&self) -> Result<i64, VerificationError> {
        Ok(self
            .account_repo
            .count_pending()
            .await
            .context("Failed to count pending accounts")?)
    }

    /// Approve a pending account
    ///
    /// Sets `is_verified = true`. Approving an already-verified account
    /// reports `AlreadyVerified` rather than failing.
    pub async fn approve(&self, uid: &str) -> Result<ApprovalOutcome, VerificationError> {
        let account = self
            .account_repo
            .get_by_uid(uid)
            .await
            .context("Failed to look up account")?
            .ok_or_else(|| VerificationError::NotFound(uid.to_string()))?;

        if !account.requires_review() {
            return Err(VerificationError::NotReviewable(uid.to_string()));
        }

        let transitioned = self
            .account_repo
            .mark_verified(uid)
            .await
            .context("Failed to mark account verified")?;

        if transitioned {
            tracing::info!(uid = %uid, "Account approved");
            Ok(ApprovalOutcome::Approved)
        } else {
            Ok(ApprovalOutcome::AlreadyVerified)
        }
    }

    /// Reject a pending account, permanently deleting it
    ///
    /// Deletion is irreversible; the HTTP layer gates this behind an
    /// explicit confirmation flag. Rejecting an account someone else
    /// already resolved reports `NotFound`.
    pub async fn reject(&self, uid: &str) -> Result<(), VerificationError> {
        let account = self
            .account_repo
            .get_by_uid(uid)
            .await
            .context("Failed to look up account")?
            .ok_or_else(|| VerificationError::NotFound(uid.to_string()))?;

        if !account.requires_review() {
            return Err(VerificationError::NotReviewable(uid.to_string()));
        }

        let deleted = self
            .account_repo
            .delete(uid)
            .await
            .context("Failed to delete account")?;

        if !deleted {
            // Raced with another reviewer between lookup and delete
            return Err(VerificationError::NotFound(uid.to_string()));
        }

        tracing::info!(uid = %uid, "Account rejected and deleted");
        Ok(())
    }
}
