//! Key-value cache port.
//!
//! Values are opaque serialized strings so any KV backend can implement the
//! trait. The cache is advisory: callers treat every failure as a miss.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, or `None` on a miss or expiry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
