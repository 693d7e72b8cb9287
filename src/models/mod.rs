//! Data models

pub mod account;
pub mod post;
pub mod session;
pub mod story;

pub use account::{Account, AccountRole, RegisterAccountInput, RoleProfile};
pub use post::{CreatePostInput, Post};
pub use session::Session;
pub use story::{CreateStoryInput, Story};
