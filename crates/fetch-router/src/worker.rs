//! Worker loop: drain the shared queue, consult the cache, fetch on miss

use crate::strategy::FetchStrategy;
use crate::types::{Provenance, Request, RouteOutcome, RouteResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use ttl_lru_cache::TtlLruCache;

/// Receiver end of the work queue, shared by the worker pool
pub type SharedWorkQueue = Arc<Mutex<UnboundedReceiver<Request>>>;

/// A single unit of the worker pool.
///
/// Runs until the work queue is closed and drained. One request's fetch
/// failure fails only that request, never the loop.
pub struct Worker {
    id: usize,
    cache: Arc<TtlLruCache<String>>,
    strategy: FetchStrategy,
    queue: SharedWorkQueue,
    results: UnboundedSender<RouteResult>,
}

impl Worker {
    pub fn new(
        id: usize,
        cache: Arc<TtlLruCache<String>>,
        strategy: FetchStrategy,
        queue: SharedWorkQueue,
        results: UnboundedSender<RouteResult>,
    ) -> Self {
        Self {
            id,
            cache,
            strategy,
            queue,
            results,
        }
    }

    /// Run the dequeue/resolve/publish loop to completion.
    pub async fn run(self) {
        loop {
            // Hold the queue lock for the dequeue only
            let request = {
                let mut queue = self.queue.lock().await;
                queue.recv().await
            };

            let Some(request) = request else {
                debug!(worker = self.id, "work queue closed and drained");
                break;
            };

            let result = self.service(request).await;
            if self.results.send(result).is_err() {
                warn!(worker = self.id, "result channel closed, stopping");
                break;
            }
        }
    }

    /// Service one request: cache hit, or primary/fallback fetch on miss.
    pub async fn service(&self, request: Request) -> RouteResult {
        let start = Instant::now();

        let outcome = match self.cache.get(&request.key).await {
            Some(value) => {
                debug!(request = %request.key, worker = self.id, "cache hit");
                RouteOutcome::Resolved {
                    value,
                    provenance: Provenance::CacheHit,
                }
            }
            None => {
                debug!(request = %request.key, worker = self.id, "cache miss, fetching");
                // The fetch runs outside any cache lock; two workers may
                // race to fetch the same key, and the later put wins.
                match self.strategy.resolve(self.id, &request.key).await {
                    Ok((value, provenance)) => {
                        self.cache.put(&request.key, value.clone()).await;
                        RouteOutcome::Resolved { value, provenance }
                    }
                    Err(err) => {
                        warn!(
                            request = %request.key,
                            worker = self.id,
                            error = %err,
                            "request failed on both sources"
                        );
                        RouteOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                }
            }
        };

        let elapsed = start.elapsed();
        info!(
            event = outcome.event(),
            request = %request.key,
            worker = self.id,
            elapsed_ms = elapsed.as_millis() as u64,
            "request serviced"
        );

        RouteResult {
            request: request.key,
            outcome,
            worker: self.id,
            elapsed,
            completed_at: Utc::now(),
        }
    }
}
