//! Primary/fallback fetch strategy
//!
//! Encapsulates the order in which sources are tried so the worker loop
//! stays free of retry policy. A primary failure is an expected branch,
//! handled as a value rather than an error crossing the worker boundary.

use crate::source::{FetchSource, SourceError};
use crate::types::Provenance;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Both the primary and the backup fetch failed for a request
#[derive(Debug, Clone)]
pub struct SourceUnavailable {
    pub primary: SourceError,
    pub backup: SourceError,
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "primary and backup fetch failed (primary: {}; backup: {})",
            self.primary, self.backup
        )
    }
}

impl std::error::Error for SourceUnavailable {}

/// Resolves a request by trying the primary fetch first and falling
/// back to the backup fetch when it fails.
#[derive(Clone)]
pub struct FetchStrategy {
    source: Arc<dyn FetchSource>,
}

impl FetchStrategy {
    pub fn new(source: Arc<dyn FetchSource>) -> Self {
        Self { source }
    }

    /// Resolve a value for `request`, reporting how it was obtained.
    pub async fn resolve(
        &self,
        worker: usize,
        request: &str,
    ) -> Result<(String, Provenance), SourceUnavailable> {
        let primary_err = match self.source.fetch_primary(worker, request).await {
            Ok(value) => return Ok((value, Provenance::PrimarySuccess)),
            Err(err) => err,
        };

        warn!(
            request = %request,
            worker,
            error = %primary_err,
            "primary fetch failed, switching to backup"
        );

        match self.source.fetch_backup(worker, request).await {
            Ok(value) => {
                let recovered = format!("recovered from backup: {}", value);
                Ok((recovered, Provenance::FallbackRecovered))
            }
            Err(backup_err) => Err(SourceUnavailable {
                primary: primary_err,
                backup: backup_err,
            }),
        }
    }
}
