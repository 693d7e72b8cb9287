//! Service layer
//!
//! Business logic on top of the repository layer. Each service holds its
//! repositories behind trait objects so tests can swap in an in-memory
//! SQLite database.

pub mod account;
pub mod feed;
pub mod generator;
pub mod password;
pub mod rate_limiter;
pub mod verification;

pub use account::{AccountService, AccountServiceError, LoginInput};
pub use feed::{FeedError, FeedService};
pub use generator::DailyPostGenerator;
pub use rate_limiter::LoginRateLimiter;
pub use verification::{ApprovalOutcome, VerificationError, VerificationService};
