//! Compatibility Cache — ephemeral key-value tier plus durable audit ledger.
//!
//! Reads hit the ephemeral tier only. A miss (or an entry past `expires_at`)
//! returns `None` and the caller recomputes; the durable tier is never read
//! back, so an analysis is never served past its original TTL.
//!
//! Writes go to both tiers as two independent operations, each with its own
//! error channel:
//! - ephemeral: `SET EX`, failure logged and dropped
//! - durable: append-only audit row on a background task, bounded retry, then
//!   dead-lettered to the `dead_letter` log target
//!
//! Neither failure ever reaches the caller, and the caller never waits on the
//! durable tier.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::analysis::models::CompatibilityAnalysis;
use crate::records::AnalysisLedger;
use crate::store::EphemeralStore;

/// Fixed lifetime of an ephemeral entry.
pub const ANALYSIS_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
const KEY_PREFIX: &str = "job-analysis";

/// Attempts per audit row before it is dead-lettered.
const AUDIT_ATTEMPTS: u32 = 3;
const AUDIT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
const AUDIT_BACKOFF_BASE: Duration = Duration::from_millis(100);

/// Which tier served an entry. Observability only, never persisted.
/// The durable tier is write-only, so reads are always ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub analysis: CompatibilityAnalysis,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub source_tier: SourceTier,
}

/// What actually sits in the ephemeral tier.
#[derive(Debug, Serialize, Deserialize)]
struct CachedPayload {
    analysis: CompatibilityAnalysis,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

pub fn cache_key(candidate_id: &str, job_id: &str) -> String {
    format!("{KEY_PREFIX}:{candidate_id}:{job_id}")
}

pub struct CompatibilityCache {
    ephemeral: Arc<dyn EphemeralStore>,
    ledger: Arc<dyn AnalysisLedger>,
    ttl: Duration,
}

impl CompatibilityCache {
    pub fn new(ephemeral: Arc<dyn EphemeralStore>, ledger: Arc<dyn AnalysisLedger>) -> Self {
        Self {
            ephemeral,
            ledger,
            ttl: ANALYSIS_TTL,
        }
    }

    /// Ephemeral-tier lookup. Store errors and undecodable payloads read as a miss.
    pub async fn get(&self, candidate_id: &str, job_id: &str) -> Option<CacheEntry> {
        let key = cache_key(candidate_id, job_id);

        let raw = match self.ephemeral.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss for {key}");
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {key}, treating as miss: {e}");
                return None;
            }
        };

        let payload: CachedPayload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Undecodable cache payload for {key}, treating as miss: {e}");
                return None;
            }
        };

        if payload.expires_at <= Utc::now() {
            debug!("Cache entry for {key} expired at {}", payload.expires_at);
            return None;
        }

        debug!("Cache hit for {key}");
        Some(CacheEntry {
            analysis: payload.analysis,
            cached_at: payload.cached_at,
            expires_at: payload.expires_at,
            source_tier: SourceTier::Ephemeral,
        })
    }

    /// Writes `analysis` to both tiers. Never fails.
    ///
    /// Only the ephemeral write is awaited. The audit append runs on its own
    /// task; the returned handle resolves once the row is stored or
    /// dead-lettered and may be dropped.
    pub async fn put(
        &self,
        candidate_id: &str,
        job_id: &str,
        analysis: &CompatibilityAnalysis,
    ) -> JoinHandle<()> {
        let cached_at = Utc::now();
        let expires_at = cached_at
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(7));
        let payload = CachedPayload {
            analysis: analysis.clone(),
            cached_at,
            expires_at,
        };

        let audit = tokio::spawn(append_audit(
            self.ledger.clone(),
            candidate_id.to_string(),
            job_id.to_string(),
            analysis.clone(),
        ));
        self.write_ephemeral(candidate_id, job_id, &payload).await;
        audit
    }

    /// Drops the ephemeral entries for `job_ids`. Failures are logged only.
    pub async fn invalidate(&self, candidate_id: &str, job_ids: &[String]) {
        let keys: Vec<String> = job_ids
            .iter()
            .map(|job_id| cache_key(candidate_id, job_id))
            .collect();

        match self.ephemeral.delete(&keys).await {
            Ok(()) => debug!(
                "Invalidated {} cached analyses for candidate {candidate_id}",
                keys.len()
            ),
            Err(e) => warn!(
                "Failed to invalidate {} cached analyses for candidate {candidate_id}: {e}",
                keys.len()
            ),
        }
    }

    async fn write_ephemeral(&self, candidate_id: &str, job_id: &str, payload: &CachedPayload) {
        let key = cache_key(candidate_id, job_id);
        let raw = match serde_json::to_string(payload) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize analysis for {key}: {e}");
                return;
            }
        };
        if let Err(e) = self.ephemeral.put(&key, &raw, self.ttl.as_secs()).await {
            warn!("Cache write failed for {key}: {e}");
        }
    }
}

/// Appends one audit row with bounded retry, then dead-letters it.
async fn append_audit(
    ledger: Arc<dyn AnalysisLedger>,
    candidate_id: String,
    job_id: String,
    analysis: CompatibilityAnalysis,
) {
    for attempt in 1..=AUDIT_ATTEMPTS {
        let result = tokio::time::timeout(
            AUDIT_ATTEMPT_TIMEOUT,
            ledger.append_analysis(&candidate_id, &job_id, &analysis),
        )
        .await;

        match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => warn!(
                "Audit write {attempt}/{AUDIT_ATTEMPTS} failed for candidate {candidate_id}, job {job_id}: {e}"
            ),
            Err(_) => warn!(
                "Audit write {attempt}/{AUDIT_ATTEMPTS} timed out for candidate {candidate_id}, job {job_id}"
            ),
        }

        if attempt < AUDIT_ATTEMPTS {
            tokio::time::sleep(AUDIT_BACKOFF_BASE * 2u32.pow(attempt - 1)).await;
        }
    }

    let row = serde_json::to_string(&analysis).unwrap_or_default();
    error!(
        target: "dead_letter",
        candidate_id = candidate_id.as_str(),
        job_id = job_id.as_str(),
        analysis = %row,
        "Dropping compatibility audit row after {AUDIT_ATTEMPTS} attempts"
    );
}
