//! Key-value and counter stores backing the cache and the admission gate.
//!
//! Both are traits so the pipeline never depends on Redis directly:
//! `RedisStore` implements them in production, `MemoryStore` in tests.

use async_trait::async_trait;
use thiserror::Error;

pub mod redis;

#[cfg(test)]
pub mod memory;

pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("store operation timed out")]
    Timeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Ephemeral, TTL-bounded key-value tier.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;
}

/// Result of one atomic increment on a windowed counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Counter value after this increment.
    pub count: u64,
    /// Seconds until the window (and the counter) expires.
    pub resets_in_secs: u64,
}

/// Durable counter store with atomic increment-with-expiry.
///
/// The window starts at the first increment for `key` and lasts `window_secs`.
/// Implementations MUST make increment + expiry a single atomic step.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment(&self, key: &str, window_secs: u64) -> Result<CounterSnapshot, StoreError>;
}
