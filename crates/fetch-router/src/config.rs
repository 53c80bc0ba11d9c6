//! Router configuration

use crate::error::{Result, RouterError};
use std::time::Duration;

/// Tunables for a router instance
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum number of cached entries
    pub cache_capacity: usize,
    /// How long a cached value stays valid after insertion
    pub cache_ttl: Duration,
    /// Number of concurrent workers
    pub worker_count: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            cache_ttl: Duration::from_secs(10),
            worker_count: 4,
        }
    }
}

impl RouterConfig {
    /// Check that every field is in its valid range.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(RouterError::Config(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(RouterError::Config(
                "cache_ttl must be greater than zero".to_string(),
            ));
        }
        if self.worker_count == 0 {
            return Err(RouterError::Config(
                "worker_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
