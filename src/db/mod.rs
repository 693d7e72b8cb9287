//! Database layer
//!
//! Database abstraction for the Dentora backend. It supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL (for larger deployments)
//!
//! The driver is selected from configuration; repositories go through the
//! `DatabasePool` trait and never know the concrete backend.
//!
//! # Usage
//!
//! ```ignore
//! use dentora::config::DatabaseConfig;
//! use dentora::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
