use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::store::{CounterSnapshot, CounterStore, EphemeralStore, StoreError};

/// Upper bound on every Redis round trip, connection included.
const OP_TIMEOUT: Duration = Duration::from_secs(2);

/// INCR, arm the expiry on the first hit of a window, report the remaining TTL.
/// Runs server-side as one script, so concurrent callers never interleave.
const INCREMENT_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Redis-backed ephemeral tier and counter store.
///
/// One `ConnectionManager` is shared by every operation and reconnects on its
/// own. It is created on first use, so an unavailable Redis at startup never
/// prevents the service from booting.
pub struct RedisStore {
    client: Client,
    manager: OnceCell<ConnectionManager>,
    increment: Script,
}

impl RedisStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            manager: OnceCell::new(),
            increment: Script::new(INCREMENT_SCRIPT),
        }
    }

    /// Handle onto the shared connection. Cloning is cheap.
    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                let manager = self.client.get_connection_manager().await?;
                info!("Redis connection established");
                Ok::<_, StoreError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }

    /// Runs `op` under [`OP_TIMEOUT`].
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(OP_TIMEOUT, op)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

#[async_trait]
impl EphemeralStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok(value)
        })
        .await
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
            debug!("SET {key} EX {ttl_secs}");
            Ok(())
        })
        .await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        self.bounded(async {
            let mut conn = self.connection().await?;
            let removed: u64 = conn.del(keys).await?;
            debug!("DEL {} keys, {} removed", keys.len(), removed);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment(&self, key: &str, window_secs: u64) -> Result<CounterSnapshot, StoreError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let (count, ttl): (u64, i64) = self
                .increment
                .key(key)
                .arg(window_secs)
                .invoke_async(&mut conn)
                .await?;
            Ok(CounterSnapshot {
                count,
                resets_in_secs: ttl.max(0) as u64,
            })
        })
        .await
    }
}
