//! In-process stand-in for Redis, used by tests.
//!
//! Expiry uses `tokio::time::Instant` so paused-clock tests can advance time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::store::{CounterSnapshot, CounterStore, EphemeralStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, (String, Instant)>>,
    counters: Mutex<HashMap<String, (u64, Instant)>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Raw access for tests that need to plant or inspect payloads.
    pub async fn raw_get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).map(|(v, _)| v.clone())
    }

    pub async fn raw_put(&self, key: &str, value: &str, ttl: Duration) {
        self.values
            .lock()
            .await
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store set to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        let mut values = self.values.lock().await;
        match values.get(key) {
            Some((_, expires)) if *expires <= Instant::now() => {
                values.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        self.check()?;
        self.raw_put(key, value, Duration::from_secs(ttl_secs)).await;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        self.check()?;
        let mut values = self.values.lock().await;
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn increment(&self, key: &str, window_secs: u64) -> Result<CounterSnapshot, StoreError> {
        self.check()?;
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        let entry = counters
            .entry(key.to_string())
            .or_insert((0, now + Duration::from_secs(window_secs)));
        if entry.1 <= now {
            *entry = (0, now + Duration::from_secs(window_secs));
        }
        entry.0 += 1;
        Ok(CounterSnapshot {
            count: entry.0,
            resets_in_secs: entry.1.saturating_duration_since(now).as_secs(),
        })
    }
}
