//! Simulated upstream source for demos and scenario tests

use crate::source::{FetchSource, SourceError};
use async_trait::async_trait;
use rand::Rng;
use std::ops::Range;
use std::time::Duration;
use tokio::time::sleep;

/// A source with injected latency and failure behavior.
///
/// The primary path fails at a configurable rate; the backup path is
/// faster and, by default, always available.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    pub primary_failure_rate: f64,
    pub backup_failure_rate: f64,
    pub primary_latency_ms: Range<u64>,
    pub backup_latency_ms: Range<u64>,
}

impl SimulatedSource {
    /// Latency profile of the demo feed: a slow primary that fails at
    /// `primary_failure_rate`, backed by a faster, always-available
    /// backup.
    pub fn new(primary_failure_rate: f64) -> Self {
        Self {
            primary_failure_rate,
            backup_failure_rate: 0.0,
            primary_latency_ms: 200..400,
            backup_latency_ms: 100..200,
        }
    }

    /// Zero-latency profile for tests; rates of 0.0 and 1.0 make the
    /// source fully deterministic.
    pub fn instant(primary_failure_rate: f64, backup_failure_rate: f64) -> Self {
        Self {
            primary_failure_rate,
            backup_failure_rate,
            primary_latency_ms: 0..0,
            backup_latency_ms: 0..0,
        }
    }
}

fn roll(rate: f64) -> bool {
    rand::thread_rng().gen::<f64>() < rate
}

async fn simulate_delay(latency_ms: &Range<u64>) {
    if latency_ms.is_empty() {
        return;
    }
    let ms = rand::thread_rng().gen_range(latency_ms.clone());
    sleep(Duration::from_millis(ms)).await;
}

#[async_trait]
impl FetchSource for SimulatedSource {
    async fn fetch_primary(&self, worker: usize, request: &str) -> Result<String, SourceError> {
        if roll(self.primary_failure_rate) {
            return Err(SourceError(format!(
                "simulated primary failure for {}",
                request
            )));
        }
        simulate_delay(&self.primary_latency_ms).await;
        Ok(format!("primary result from source-{} for {}", worker, request))
    }

    async fn fetch_backup(&self, worker: usize, request: &str) -> Result<String, SourceError> {
        if roll(self.backup_failure_rate) {
            return Err(SourceError(format!(
                "simulated backup failure for {}",
                request
            )));
        }
        simulate_delay(&self.backup_latency_ms).await;
        Ok(format!("backup result from source-{} for {}", worker, request))
    }
}
