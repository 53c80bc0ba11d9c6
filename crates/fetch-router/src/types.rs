//! Core types for the fetch router

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A data-fetch request, identified by an opaque key.
///
/// Duplicate keys within a batch are expected; they are what the cache
/// exists to absorb.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    pub key: String,
}

impl Request {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl From<&str> for Request {
    fn from(key: &str) -> Self {
        Request::new(key)
    }
}

impl From<String> for Request {
    fn from(key: String) -> Self {
        Request::new(key)
    }
}

/// How a resolved value was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    CacheHit,
    PrimarySuccess,
    FallbackRecovered,
}

impl Provenance {
    /// Stable name used on resolution log events
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::CacheHit => "cache-hit",
            Provenance::PrimarySuccess => "primary-success",
            Provenance::FallbackRecovered => "fallback-recovered",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of servicing a single request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum RouteOutcome {
    /// The request produced a value
    Resolved {
        value: String,
        provenance: Provenance,
    },
    /// Both the primary and the backup fetch failed
    Failed { reason: String },
}

impl RouteOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RouteOutcome::Resolved { .. })
    }

    pub fn provenance(&self) -> Option<Provenance> {
        match self {
            RouteOutcome::Resolved { provenance, .. } => Some(*provenance),
            RouteOutcome::Failed { .. } => None,
        }
    }

    /// Stable name for resolution log events
    pub fn event(&self) -> &'static str {
        match self {
            RouteOutcome::Resolved { provenance, .. } => provenance.as_str(),
            RouteOutcome::Failed { .. } => "fetch-failed",
        }
    }
}

/// One entry on the result channel.
///
/// Exactly one is produced per submitted request, in completion order.
/// The worker id and timings are observability data, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    pub request: String,
    pub outcome: RouteOutcome,
    pub worker: usize,
    pub elapsed: Duration,
    pub completed_at: DateTime<Utc>,
}
