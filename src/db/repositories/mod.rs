//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod news;
pub mod user;

pub use news::{NewsRepository, SqlxNewsRepository};
pub use user::{SqlxUserRepository, UserRepository};
