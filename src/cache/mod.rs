//! Cache layer
//!
//! In-process caching for hot read paths, backed by moka. Values are
//! stored as serialized JSON so any serde type can be cached.
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsroom::cache::{CacheLayer, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! cache.set("key", &"value", Duration::from_secs(60)).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cache layer trait
///
/// Note: due to Rust's object safety rules, this trait cannot be used
/// as a trait object (`dyn CacheLayer`). Hold the concrete cache type
/// and share it behind an `Arc`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration)
        -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values whose key starts with the given prefix
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

pub use memory::MemoryCache;
