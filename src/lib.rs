//! Dentora - backend for a dental community platform
//!
//! Accounts with role-specific profiles, an admin review queue for
//! professional credentials, a post/story feed, and daily generated
//! content.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
