//! Repository layer
//!
//! Trait-based data access objects backed by SQLx, one per aggregate.

pub mod account;
pub mod post;
pub mod session;
pub mod story;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use story::{SqlxStoryRepository, StoryRepository};
