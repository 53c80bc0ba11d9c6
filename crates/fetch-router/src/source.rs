//! The upstream source capability
//!
//! The router core does not own how values are fetched. It only assumes
//! a source that can be asked for a primary fetch and, independently, a
//! backup fetch; latency and failure behavior belong to the implementor.

use async_trait::async_trait;
use std::fmt;

/// Error returned by a fetch source
#[derive(Debug, Clone)]
pub struct SourceError(pub String);

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SourceError {}

/// A data source with a primary fetch path and a higher-availability
/// backup path.
///
/// Both fetches must terminate, either with a value or a classified
/// error; the `worker` id is observability context only.
#[async_trait]
pub trait FetchSource: Send + Sync {
    async fn fetch_primary(&self, worker: usize, request: &str) -> Result<String, SourceError>;

    async fn fetch_backup(&self, worker: usize, request: &str) -> Result<String, SourceError>;
}
