//! Record store boundary — profiles, job postings, analysis audit rows, variants.
//!
//! The pipeline only talks to these traits. `PgRecordStore` is the production
//! implementation; tests use an in-memory store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::analysis::models::CompatibilityAnalysis;
use crate::generation::models::ApplicationVariant;
use crate::models::{CandidateProfile, JobPosting};

pub mod postgres;

pub use postgres::PgRecordStore;

/// Upper bound on a single record-store call, queries included.
pub const RECORD_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Record store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Runs a record-store call under [`RECORD_TIMEOUT`].
pub async fn bounded<T, F>(call: F) -> Result<T, RecordError>
where
    F: Future<Output = Result<T, RecordError>>,
{
    tokio::time::timeout(RECORD_TIMEOUT, call)
        .await
        .map_err(|_| RecordError::Timeout(RECORD_TIMEOUT))?
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_profile(&self, candidate_id: &str)
        -> Result<Option<CandidateProfile>, RecordError>;

    async fn load_job(&self, job_id: &str) -> Result<Option<JobPosting>, RecordError>;

    /// Stores one generation run's variants. Append-only.
    async fn save_variants(
        &self,
        candidate_id: &str,
        job_id: &str,
        variants: &[ApplicationVariant],
    ) -> Result<(), RecordError>;
}

/// Durable tier of the compatibility cache: an append-only audit ledger.
#[async_trait]
pub trait AnalysisLedger: Send + Sync {
    /// Appends a new audit row. Never updates an existing one.
    async fn append_analysis(
        &self,
        candidate_id: &str,
        job_id: &str,
        analysis: &CompatibilityAnalysis,
    ) -> Result<(), RecordError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_call_times_out() {
        let result: Result<(), RecordError> = bounded(std::future::pending()).await;
        assert!(matches!(result, Err(RecordError::Timeout(t)) if t == RECORD_TIMEOUT));
    }

    #[tokio::test]
    async fn test_bounded_call_passes_result_through() {
        let result = bounded(async { Ok::<_, RecordError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
