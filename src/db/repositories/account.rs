//! Account repository
//!
//! Database operations for accounts.
//!
//! This module provides:
//! - `AccountRepository` trait defining the interface for account data access
//! - `SqlxAccountRepository` implementing the trait for SQLite and MySQL
//!
//! The role-conditional profile is stored in nullable columns; only the
//! columns matching the row's role are populated, and `row_to_account_*`
//! reassembles the tagged `RoleProfile` from them.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Account, AccountRole, RoleProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// Account repository trait
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create a new account
    async fn create(&self, account: &Account) -> Result<Account>;

    /// Get account by uid
    async fn get_by_uid(&self, uid: &str) -> Result<Option<Account>>;

    /// Get account by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// List unverified dentist and student accounts, oldest first
    async fn list_pending(&self) -> Result<Vec<Account>>;

    /// Mark an account verified. Returns false if it already was.
    async fn mark_verified(&self, uid: &str) -> Result<bool>;

    /// Permanently delete an account. Returns false if no such account.
    async fn delete(&self, uid: &str) -> Result<bool>;

    /// Count total accounts
    async fn count(&self) -> Result<i64>;

    /// Count unverified dentist and student accounts
    async fn count_pending(&self) -> Result<i64>;
}

/// SQLx-based account repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxAccountRepository {
    pool: DynDatabasePool,
}

impl SqlxAccountRepository {
    /// Create a new SQLx account repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn AccountRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn create(&self, account: &Account) -> Result<Account> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_account_sqlite(self.pool.as_sqlite().unwrap(), account).await
            }
            DatabaseDriver::Mysql => {
                create_account_mysql(self.pool.as_mysql().unwrap(), account).await
            }
        }
    }

    async fn get_by_uid(&self, uid: &str) -> Result<Option<Account>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_account_by_uid_sqlite(self.pool.as_sqlite().unwrap(), uid).await
            }
            DatabaseDriver::Mysql => {
                get_account_by_uid_mysql(self.pool.as_mysql().unwrap(), uid).await
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_account_by_email_sqlite(self.pool.as_sqlite().unwrap(), email).await
            }
            DatabaseDriver::Mysql => {
                get_account_by_email_mysql(self.pool.as_mysql().unwrap(), email).await
            }
        }
    }

    async fn list_pending(&self) -> Result<Vec<Account>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_pending_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_pending_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn mark_verified(&self, uid: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_verified_sqlite(self.pool.as_sqlite().unwrap(), uid).await
            }
            DatabaseDriver::Mysql => mark_verified_mysql(self.pool.as_mysql().unwrap(), uid).await,
        }
    }

    async fn delete(&self, uid: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                delete_account_sqlite(self.pool.as_sqlite().unwrap(), uid).await
            }
            DatabaseDriver::Mysql => delete_account_mysql(self.pool.as_mysql().unwrap(), uid).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_accounts_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_accounts_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn count_pending(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_pending_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => count_pending_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }
}

const ACCOUNT_COLUMNS: &str = "uid, display_name, email, password_hash, role, qualification, \
     specialization, years_experience, clinic_address, college, year_of_study, \
     is_verified, document_url, created_at, updated_at";

/// Nullable profile columns for one account row
struct ProfileColumns {
    qualification: Option<String>,
    specialization: Option<String>,
    years_experience: Option<i32>,
    clinic_address: Option<String>,
    college: Option<String>,
    year_of_study: Option<i32>,
}

fn profile_columns(profile: &RoleProfile) -> ProfileColumns {
    match profile {
        RoleProfile::Patient | RoleProfile::Admin => ProfileColumns {
            qualification: None,
            specialization: None,
            years_experience: None,
            clinic_address: None,
            college: None,
            year_of_study: None,
        },
        RoleProfile::Dentist {
            qualification,
            specialization,
            years_experience,
            clinic_address,
        } => ProfileColumns {
            qualification: Some(qualification.clone()),
            specialization: Some(specialization.clone()),
            years_experience: Some(*years_experience),
            clinic_address: Some(clinic_address.clone()),
            college: None,
            year_of_study: None,
        },
        RoleProfile::Student {
            college,
            year_of_study,
        } => ProfileColumns {
            qualification: None,
            specialization: None,
            years_experience: None,
            clinic_address: None,
            college: Some(college.clone()),
            year_of_study: Some(*year_of_study),
        },
    }
}

fn assemble_profile(
    role: AccountRole,
    columns: ProfileColumns,
) -> Result<RoleProfile> {
    match role {
        AccountRole::Patient => Ok(RoleProfile::Patient),
        AccountRole::Admin => Ok(RoleProfile::Admin),
        AccountRole::Dentist => Ok(RoleProfile::Dentist {
            qualification: columns.qualification.unwrap_or_default(),
            specialization: columns.specialization.unwrap_or_default(),
            years_experience: columns.years_experience.unwrap_or_default(),
            clinic_address: columns.clinic_address.unwrap_or_default(),
        }),
        AccountRole::Student => Ok(RoleProfile::Student {
            college: columns.college.unwrap_or_default(),
            year_of_study: columns.year_of_study.unwrap_or_default(),
        }),
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_account_sqlite(pool: &SqlitePool, account: &Account) -> Result<Account> {
    let now = Utc::now();
    let role_str = account.role().to_string();
    let p = profile_columns(&account.profile);

    sqlx::query(
        r#"
        INSERT INTO accounts (uid, display_name, email, password_hash, role,
            qualification, specialization, years_experience, clinic_address,
            college, year_of_study, is_verified, document_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.uid)
    .bind(&account.display_name)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&role_str)
    .bind(&p.qualification)
    .bind(&p.specialization)
    .bind(p.years_experience)
    .bind(&p.clinic_address)
    .bind(&p.college)
    .bind(p.year_of_study)
    .bind(account.is_verified)
    .bind(&account.document_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create account")?;

    let mut created = account.clone();
    created.created_at = now;
    created.updated_at = now;
    Ok(created)
}

async fn get_account_by_uid_sqlite(pool: &SqlitePool, uid: &str) -> Result<Option<Account>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM accounts WHERE uid = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(uid)
    .fetch_optional(pool)
    .await
    .context("Failed to get account by uid")?;

    match row {
        Some(row) => Ok(Some(row_to_account_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_account_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<Account>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM accounts WHERE email = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get account by email")?;

    match row {
        Some(row) => Ok(Some(row_to_account_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_pending_sqlite(pool: &SqlitePool) -> Result<Vec<Account>> {
    // The pending filter lives in SQL: only unverified professionals,
    // patients and admins never appear whatever their flag says.
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM accounts
        WHERE is_verified = 0 AND role IN ('dentist', 'student')
        ORDER BY created_at ASC
        "#,
        ACCOUNT_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list pending accounts")?;

    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row_to_account_sqlite(&row)?);
    }

    Ok(accounts)
}

async fn mark_verified_sqlite(pool: &SqlitePool, uid: &str) -> Result<bool> {
    // Guarded transition: rows_affected = 0 means it was already verified,
    // which keeps concurrent approvals from double-reporting.
    let result = sqlx::query(
        "UPDATE accounts SET is_verified = 1, updated_at = ? WHERE uid = ? AND is_verified = 0",
    )
    .bind(Utc::now())
    .bind(uid)
    .execute(pool)
    .await
    .context("Failed to mark account verified")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_account_sqlite(pool: &SqlitePool, uid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM accounts WHERE uid = ?")
        .bind(uid)
        .execute(pool)
        .await
        .context("Failed to delete account")?;

    Ok(result.rows_affected() > 0)
}

async fn count_accounts_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM accounts")
        .fetch_one(pool)
        .await
        .context("Failed to count accounts")?;

    Ok(row.get("count"))
}

async fn count_pending_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM accounts WHERE is_verified = 0 AND role IN ('dentist', 'student')",
    )
    .fetch_one(pool)
    .await
    .context("Failed to count pending accounts")?;

    Ok(row.get("count"))
}

fn row_to_account_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
    let role_str: String = row.get("role");
    let role = AccountRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    let profile = assemble_profile(
        role,
        ProfileColumns {
            qualification: row.get("qualification"),
            specialization: row.get("specialization"),
            years_experience: row.get("years_experience"),
            clinic_address: row.get("clinic_address"),
            college: row.get("college"),
            year_of_study: row.get("year_of_study"),
        },
    )?;

    Ok(Account {
        uid: row.get("uid"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        profile,
        is_verified: row.get("is_verified"),
        document_url: row.get("document_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_account_mysql(pool: &MySqlPool, account: &Account) -> Result<Account> {
    let now = Utc::now();
    let role_str = account.role().to_string();
    let p = profile_columns(&account.profile);

    sqlx::query(
        r#"
        INSERT INTO accounts (uid, display_name, email, password_hash, role,
            qualification, specialization, years_experience, clinic_address,
            college, year_of_study, is_verified, document_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&account.uid)
    .bind(&account.display_name)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(&role_str)
    .bind(&p.qualification)
    .bind(&p.specialization)
    .bind(p.years_experience)
    .bind(&p.clinic_address)
    .bind(&p.college)
    .bind(p.year_of_study)
    .bind(account.is_verified)
    .bind(&account.document_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create account")?;

    let mut created = account.clone();
    created.created_at = now;
    created.updated_at = now;
    Ok(created)
}

async fn get_account_by_uid_mysql(pool: &MySqlPool, uid: &str) -> Result<Option<Account>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM accounts WHERE uid = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(uid)
    .fetch_optional(pool)
    .await
    .context("Failed to get account by uid")?;

    match row {
        Some(row) => Ok(Some(row_to_account_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_account_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<Account>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM accounts WHERE email = ?",
        ACCOUNT_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to get account by email")?;

    match row {
        Some(row) => Ok(Some(row_to_account_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_pending_mysql(pool: &MySqlPool) -> Result<Vec<Account>> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {} FROM accounts
        WHERE is_verified = 0 AND role IN ('dentist', 'student')
        ORDER BY created_at ASC
        "#,
        ACCOUNT_COLUMNS
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list pending accounts")?;

    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row_to_account_mysql(&row)?);
    }

    Ok(accounts)
}

async fn mark_verified_mysql(pool: &MySqlPool, uid: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE accounts SET is_verified = 1, updated_at = ? WHERE uid = ? AND is_verified = 0",
    )
    .bind(Utc::now())
    .bind(uid)
    .execute(pool)
    .await
    .context("Failed to mark account verified")?;

    Ok(result.rows_affected() > 0)
}

async fn delete_account_mysql(pool: &MySqlPool, uid: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM accounts WHERE uid = ?")
        .bind(uid)
        .execute(pool)
        .await
        .context("Failed to delete account")?;

    Ok(result.rows_affected() > 0)
}

async fn count_accounts_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM accounts")
        .fetch_one(pool)
        .await
        .context("Failed to count accounts")?;

    Ok(row.get("count"))
}

async fn count_pending_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM accounts WHERE is_verified = 0 AND role IN ('dentist', 'student')",
    )
    .fetch_one(pool)
    .await
    .context("Failed to count pending accounts")?;

    Ok(row.get("count"))
}

fn row_to_account_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Account> {
    let role_str: String = row.get("role");
    let role = AccountRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    let profile = assemble_profile(
        role,
        ProfileColumns {
            qualification: row.get("qualification"),
            specialization: row.get("specialization"),
            years_experience: row.get("years_experience"),
            clinic_address: row.get("clinic_address"),
            college: row.get("college"),
            year_of_study: row.get("year_of_study"),
        },
    )?;

    Ok(Account {
        uid: row.get("uid"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        profile,
        is_verified: row.get("is_verified"),
        document_url: row.get("document_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
