//! Account model
//!
//! Defines the Account entity for the Dentora platform. Every participant
//! (patient, dentist, student, admin) is an Account; dentists and students
//! additionally carry professional details and go through credential review
//! before their profile is marked verified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account entity representing a registered platform participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (UUID string)
    pub uid: String,
    /// Public display name
    pub display_name: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role-conditional professional details, tagged by role
    #[serde(flatten)]
    pub profile: RoleProfile,
    /// Whether the account passed credential review
    pub is_verified: bool,
    /// Uploaded credential document, if any
    pub document_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new Account with a fresh uid.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`.
    pub fn new(
        display_name: String,
        email: String,
        password_hash: String,
        profile: RoleProfile,
    ) -> Self {
        let now = Utc::now();
        Self {
            uid: Uuid::new_v4().to_string(),
            display_name,
            email,
            password_hash,
            profile,
            is_verified: false,
            document_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The role this account's profile is tagged with
    pub fn role(&self) -> AccountRole {
        self.profile.role()
    }

    /// Check if the account is an administrator
    pub fn is_admin(&self) -> bool {
        self.role() == AccountRole::Admin
    }

    /// Whether this account's role goes through credential review at all.
    ///
    /// Patients and admins never do, whatever their `is_verified` flag says.
    pub fn requires_review(&self) -> bool {
        matches!(self.role(), AccountRole::Dentist | AccountRole::Student)
    }

    /// Whether this account is currently awaiting review
    pub fn awaiting_review(&self) -> bool {
        self.requires_review() && !self.is_verified
    }
}

/// Platform role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Patient - regular consumer account
    Patient,
    /// Dentist - practicing professional, reviewed before verification
    Dentist,
    /// Student - dental student, reviewed before verification
    Student,
    /// Admin - reviewer with full access
    Admin,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRole::Patient => write!(f, "patient"),
            AccountRole::Dentist => write!(f, "dentist"),
            AccountRole::Student => write!(f, "student"),
            AccountRole::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for AccountRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patient" => Ok(AccountRole::Patient),
            "dentist" => Ok(AccountRole::Dentist),
            "student" => Ok(AccountRole::Student),
            "admin" => Ok(AccountRole::Admin),
            _ => Err(anyhow::anyhow!("Invalid account role: {}", s)),
        }
    }
}

/// Role-conditional profile details.
///
/// A tagged union keyed by role: each variant carries only the fields that
/// role actually has, instead of one struct with many optional columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    /// Patient - no professional details
    Patient,
    /// Practicing dentist
    Dentist {
        qualification: String,
        specialization: String,
        years_experience: i32,
        clinic_address: String,
    },
    /// Dental student
    Student { college: String, year_of_study: i32 },
    /// Administrator / reviewer
    Admin,
}

impl RoleProfile {
    /// The role tag of this profile
    pub fn role(&self) -> AccountRole {
        match self {
            RoleProfile::Patient => AccountRole::Patient,
            RoleProfile::Dentist { .. } => AccountRole::Dentist,
            RoleProfile::Student { .. } => AccountRole::Student,
            RoleProfile::Admin => AccountRole::Admin,
        }
    }
}

/// Input for registering a new account (before password hashing)
#[derive(Debug, Clone)]
pub struct RegisterAccountInput {
    /// Public display name
    pub display_name: String,
    /// Email address
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// Role-conditional details
    pub profile: RoleProfile,
    /// Uploaded credential document, if any
    pub document_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dentist_profile() -> RoleProfile {
        RoleProfile::Dentist {
            qualification: "BDS".to_string(),
            specialization: "Orthodontics".to_string(),
            years_experience: 6,
            clinic_address: "12 Molar Street".to_string(),
        }
    }

    #[test]
    fn test_account_new() {
        let account = Account::new(
            "Dr. Perez".to_string(),
            "perez@example.com".to_string(),
            "hashed_password".to_string(),
            dentist_profile(),
        );

        assert!(!account.uid.is_empty());
        assert_eq!(account.display_name, "Dr. Perez");
        assert_eq!(account.role(), AccountRole::Dentist);
        assert!(!account.is_verified);
        assert!(account.document_url.is_none());
    }

    #[test]
    fn test_requires_review_by_role() {
        let mk = |profile| {
            Account::new(
                "x".to_string(),
                "x@example.com".to_string(),
                "hash".to_string(),
                profile,
            )
        };

        assert!(mk(dentist_profile()).requires_review());
        assert!(mk(RoleProfile::Student {
            college: "State Dental College".to_string(),
            year_of_study: 3,
        })
        .requires_review());
        assert!(!mk(RoleProfile::Patient).requires_review());
        assert!(!mk(RoleProfile::Admin).requires_review());
    }

    #[test]
    fn test_awaiting_review_tracks_verified_flag() {
        let mut account = Account::new(
            "Dr. Perez".to_string(),
            "perez@example.com".to_string(),
            "hash".to_string(),
            dentist_profile(),
        );

        assert!(account.awaiting_review());
        account.is_verified = true;
        assert!(!account.awaiting_review());
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(AccountRole::Patient.to_string(), "patient");
        assert_eq!(AccountRole::Dentist.to_string(), "dentist");
        assert_eq!(AccountRole::Student.to_string(), "student");
        assert_eq!(AccountRole::Admin.to_string(), "admin");

        assert_eq!(
            AccountRole::from_str("DENTIST").unwrap(),
            AccountRole::Dentist
        );
        assert_eq!(
            AccountRole::from_str("student").unwrap(),
            AccountRole::Student
        );
        assert!(AccountRole::from_str("hygienist").is_err());
    }

    #[test]
    fn test_profile_serde_roundtrip() {
        let profile = dentist_profile();
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["role"], "dentist");
        assert_eq!(json["qualification"], "BDS");

        let back: RoleProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let account = Account::new(
            "Dr. Perez".to_string(),
            "perez@example.com".to_string(),
            "super_secret_hash".to_string(),
            RoleProfile::Patient,
        );

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("super_secret_hash"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn profile_strategy() -> impl Strategy<Value = RoleProfile> {
        prop_oneof![
            Just(RoleProfile::Patient),
            Just(RoleProfile::Admin),
            ("[A-Z][a-z]{2,8}", "[A-Z][a-z]{2,8}", 0i32..50, "[a-z ]{5,30}").prop_map(
                |(q, s, y, a)| RoleProfile::Dentist {
                    qualification: q,
                    specialization: s,
                    years_experience: y,
                    clinic_address: a,
                }
            ),
            ("[A-Z][a-z]{2,12}", 1i32..6).prop_map(|(c, y)| RoleProfile::Student {
                college: c,
                year_of_study: y,
            }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Patients and admins are never review candidates, whatever the
        /// verified flag says; unverified dentists and students always are.
        #[test]
        fn awaiting_review_depends_only_on_role_and_flag(
            profile in profile_strategy(),
            is_verified in any::<bool>(),
        ) {
            let mut account = Account::new(
                "name".to_string(),
                "a@example.com".to_string(),
                "hash".to_string(),
                profile,
            );
            account.is_verified = is_verified;

            match account.role() {
                AccountRole::Patient | AccountRole::Admin => {
                    prop_assert!(!account.awaiting_review());
                }
                AccountRole::Dentist | AccountRole::Student => {
                    prop_assert_eq!(account.awaiting_review(), !is_verified);
                }
            }
        }

        /// Profile JSON always carries the matching role tag and survives a
        /// roundtrip.
        #[test]
        fn profile_roundtrip(profile in profile_strategy()) {
            let json = serde_json::to_value(&profile).unwrap();
            prop_assert_eq!(
                json["role"].as_str().unwrap(),
                profile.role().to_string()
            );

            let back: RoleProfile = serde_json::from_value(json).unwrap();
            prop_assert_eq!(back, profile);
        }
    }
}
