//! Admission Gate — windowed request counters guarding the expensive endpoints.
//!
//! Each scope (an IP, or an identity + action class) owns one counter per
//! window. The window opens on the first request and lasts `RateLimit::window`;
//! the next request after it closes starts a fresh counter.
//!
//! The increment-and-compare is a single atomic store operation
//! (`CounterStore::increment`), so concurrent requests sharing a scope can never
//! both take the last slot.
//!
//! Counter store failures fail OPEN: the request is admitted and a warning is logged.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::store::CounterStore;

pub mod middleware;

/// Expensive operations with their own per-identity budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionClass {
    Generate,
    Analyze,
}

impl ActionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionClass::Generate => "generate",
            ActionClass::Analyze => "analyze",
        }
    }
}

/// Who a counter belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Ip(IpAddr),
    Identity {
        user_id: String,
        action: ActionClass,
    },
}

impl Scope {
    /// Counter store key for this scope.
    pub fn key(&self) -> String {
        match self {
            Scope::Ip(ip) => format!("ratelimit:ip:{ip}"),
            Scope::Identity { user_id, action } => {
                format!("ratelimit:user:{user_id}:{}", action.as_str())
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Ip(ip) => write!(f, "ip {ip}"),
            Scope::Identity { user_id, action } => {
                write!(f, "user {user_id} ({})", action.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u64,
    pub window: Duration,
}

impl RateLimit {
    pub const fn per_minute(max_requests: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }

    pub const fn per_hour(max_requests: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(3600),
        }
    }
}

/// The full limit table, one entry per scope kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub ip: RateLimit,
    pub generate: RateLimit,
    pub analyze: RateLimit,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            ip: RateLimit::per_minute(100),
            generate: RateLimit::per_hour(20),
            analyze: RateLimit::per_hour(60),
        }
    }
}

impl RateLimits {
    pub fn for_scope(&self, scope: &Scope) -> RateLimit {
        match scope {
            Scope::Ip(_) => self.ip,
            Scope::Identity { action, .. } => match action {
                ActionClass::Generate => self.generate,
                ActionClass::Analyze => self.analyze,
            },
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { remaining: u64 },
    Rejected { retry_after_secs: u64 },
}

pub struct AdmissionGate {
    store: Arc<dyn CounterStore>,
    limits: RateLimits,
}

impl AdmissionGate {
    pub fn new(store: Arc<dyn CounterStore>, limits: RateLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &RateLimits {
        &self.limits
    }

    /// Counts this request against `scope` and decides whether it may proceed.
    pub async fn check(&self, scope: &Scope) -> Admission {
        let limit = self.limits.for_scope(scope);
        let snapshot = match self
            .store
            .increment(&scope.key(), limit.window.as_secs())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Rate limit store unavailable for {scope}, admitting request: {e}");
                return Admission::Admitted {
                    remaining: limit.max_requests,
                };
            }
        };

        if snapshot.count <= limit.max_requests {
            debug!(
                "Admitted {scope}: {}/{} in window",
                snapshot.count, limit.max_requests
            );
            Admission::Admitted {
                remaining: limit.max_requests - snapshot.count,
            }
        } else {
            // A zero TTL means the window closes this second; never advertise 0.
            let retry_after_secs = snapshot.resets_in_secs.max(1);
            warn!(
                "Rate limited {scope}: {} requests, limit {}, resets in {retry_after_secs}s",
                snapshot.count, limit.max_requests
            );
            Admission::Rejected { retry_after_secs }
        }
    }

    /// `check`, mapped onto the HTTP error surface.
    pub async fn admit(&self, scope: &Scope) -> Result<(), AppError> {
        match self.check(scope).await {
            Admission::Admitted { .. } => Ok(()),
            Admission::Rejected { retry_after_secs } => {
                Err(AppError::RateLimited { retry_after_secs })
            }
        }
    }
}
