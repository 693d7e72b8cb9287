//! Shared API response types
//!
//! Common response structures used across multiple endpoints. Timestamps
//! are serialized as RFC 3339 strings; profile fields appear only for the
//! roles that carry them.

use serde::{Deserialize, Serialize};

use crate::models::{Account, Post, RoleProfile, Story};

// ============================================================================
// Account Response Types
// ============================================================================

/// Public view of an account
///
/// Never exposes the password hash. Professional detail fields are present
/// only for the role that owns them.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_url: Option<String>,
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let mut response = Self {
            uid: account.uid,
            display_name: account.display_name,
            email: account.email,
            role: account.profile.role().to_string(),
            is_verified: account.is_verified,
            qualification: None,
            specialization: None,
            years_experience: None,
            clinic_address: None,
            college: None,
            year_of_study: None,
            document_url: account.document_url,
            created_at: account.created_at.to_rfc3339(),
        };

        match account.profile {
            RoleProfile::Dentist {
                qualification,
                specialization,
                years_experience,
                clinic_address,
            } => {
                response.qualification = Some(qualification);
                response.specialization = Some(specialization);
                response.years_experience = Some(years_experience);
                response.clinic_address = Some(clinic_address);
            }
            RoleProfile::Student {
                college,
                year_of_study,
            } => {
                response.college = Some(college);
                response.year_of_study = Some(year_of_study);
            }
            RoleProfile::Patient | RoleProfile::Admin => {}
        }

        response
    }
}

// ============================================================================
// Feed Response Types
// ============================================================================

/// Post in feed listings and creation responses
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            content: post.content,
            author: post.author,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Story in feed listings and creation responses
#[derive(Debug, Serialize, Deserialize)]
pub struct StoryResponse {
    pub id: String,
    pub label: String,
    pub author: String,
    pub created_at: String,
}

impl From<Story> for StoryResponse {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            label: story.label,
            author: story.author,
            created_at: story.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Admin Response Types
// ============================================================================

/// Result of an approval
///
/// `already_verified` distinguishes a fresh approval from a repeat of one;
/// both are reported as success.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub uid: String,
    pub is_verified: bool,
    pub already_verified: bool,
}

/// Review queue listing
#[derive(Debug, Serialize, Deserialize)]
pub struct PendingAccountsResponse {
    pub accounts: Vec<AccountResponse>,
    pub total: i64,
}

/// Admin dashboard counters
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub accounts: i64,
    pub pending_review: i64,
    pub posts: i64,
    pub stories: i64,
}
