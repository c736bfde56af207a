//! Database layer
//!
//! SQLite via sqlx: a pool factory, code-embedded migrations, and
//! trait-based repositories for users and news articles.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
