//! Router: owns the cache, queue, and worker pool lifecycle for a run

use crate::config::RouterConfig;
use crate::error::{Result, RouterError};
use crate::source::FetchSource;
use crate::strategy::FetchStrategy;
use crate::types::{Request, RouteResult};
use crate::worker::Worker;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};
use ttl_lru_cache::{CacheStats, TtlLruCache};

/// Dispatches request batches across a pool of workers sharing one cache.
///
/// The cache lives as long as the router, so consecutive runs share it;
/// independent routers share nothing. Queue and result channels are
/// built fresh for every run.
pub struct Router {
    config: RouterConfig,
    source: Arc<dyn FetchSource>,
    cache: Arc<TtlLruCache<String>>,
}

impl Router {
    pub fn new(config: RouterConfig, source: Arc<dyn FetchSource>) -> Result<Self> {
        config.validate()?;
        let cache = Arc::new(TtlLruCache::new(config.cache_capacity, config.cache_ttl));
        Ok(Self {
            config,
            source,
            cache,
        })
    }

    /// Snapshot of the shared cache's statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Route a batch of requests, returning one result per request in
    /// completion order.
    ///
    /// The queue is seeded up front and then closed for new work;
    /// workers stop once it is drained, so slow fetches are never
    /// dropped. A worker panic aborts the run.
    pub async fn run(&self, requests: Vec<Request>) -> Result<Vec<RouteResult>> {
        let total = requests.len();

        let (work_tx, work_rx) = mpsc::unbounded_channel();
        for request in requests {
            // The receiver is still in scope, so seeding cannot fail
            let _ = work_tx.send(request);
        }
        // Closing the sender is the "no more work" signal
        drop(work_tx);

        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let strategy = FetchStrategy::new(Arc::clone(&self.source));

        debug!(
            requests = total,
            workers = self.config.worker_count,
            "starting run"
        );

        let mut handles = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&self.cache),
                strategy.clone(),
                Arc::clone(&work_rx),
                result_tx.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }
        // Workers hold the only senders now; the result channel closes
        // when the last worker exits.
        drop(result_tx);

        let mut results = Vec::with_capacity(total);
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        for handle in handles {
            handle.await?;
        }

        if results.len() != total {
            return Err(RouterError::IncompleteRun {
                expected: total,
                received: results.len(),
            });
        }

        info!(requests = total, results = results.len(), "run complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedSource;
    use crate::source::SourceError;
    use crate::types::Provenance;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;

    fn test_config(worker_count: usize, cache_capacity: usize) -> RouterConfig {
        RouterConfig {
            cache_capacity,
            cache_ttl: Duration::from_secs(60),
            worker_count,
        }
    }

    fn requests(keys: &[&str]) -> Vec<Request> {
        keys.iter().map(|k| Request::from(*k)).collect()
    }

    #[tokio::test]
    async fn test_one_result_per_request_including_duplicates() {
        let source = Arc::new(SimulatedSource::instant(0.0, 0.0));
        let router = Router::new(test_config(2, 8), source).unwrap();

        let results = router
            .run(requests(&["r1", "r1", "r2"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.outcome.is_resolved()));

        let mut keys: Vec<&str> = results.iter().map(|r| r.request.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["r1", "r1", "r2"]);
    }

    #[tokio::test]
    async fn test_duplicates_hit_the_cache_with_one_worker() {
        let source = Arc::new(SimulatedSource::instant(0.0, 0.0));
        let router = Router::new(test_config(1, 8), source).unwrap();

        let results = router
            .run(requests(&["k", "k", "k"]))
            .await
            .unwrap();

        // Single worker, so completion order follows submission order
        assert_eq!(
            results[0].outcome.provenance(),
            Some(Provenance::PrimarySuccess)
        );
        assert_eq!(results[1].outcome.provenance(), Some(Provenance::CacheHit));
        assert_eq!(results[2].outcome.provenance(), Some(Provenance::CacheHit));

        let stats = router.cache_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_forced_fallback_recovers_every_request() {
        let source = Arc::new(SimulatedSource::instant(1.0, 0.0));
        let router = Router::new(test_config(3, 8), source).unwrap();

        let results = router
            .run(requests(&["a", "b", "c", "d"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        for result in &results {
            assert_eq!(
                result.outcome.provenance(),
                Some(Provenance::FallbackRecovered),
                "request {} was not recovered",
                result.request
            );
        }
    }

    /// Fails both paths for a chosen set of keys, serves the rest.
    struct KeyedFailSource {
        fail_keys: HashSet<String>,
    }

    #[async_trait]
    impl FetchSource for KeyedFailSource {
        async fn fetch_primary(
            &self,
            _worker: usize,
            request: &str,
        ) -> std::result::Result<String, SourceError> {
            if self.fail_keys.contains(request) {
                Err(SourceError(format!("primary refused {}", request)))
            } else {
                Ok(format!("primary:{}", request))
            }
        }

        async fn fetch_backup(
            &self,
            _worker: usize,
            request: &str,
        ) -> std::result::Result<String, SourceError> {
            if self.fail_keys.contains(request) {
                Err(SourceError(format!("backup refused {}", request)))
            } else {
                Ok(format!("backup:{}", request))
            }
        }
    }

    #[tokio::test]
    async fn test_total_failure_fails_only_that_request() {
        let source = Arc::new(KeyedFailSource {
            fail_keys: HashSet::from(["bad".to_string()]),
        });
        let router = Router::new(test_config(2, 8), source).unwrap();

        let results = router
            .run(requests(&["good1", "bad", "good2"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        for result in &results {
            if result.request == "bad" {
                assert!(!result.outcome.is_resolved());
            } else {
                assert!(result.outcome.is_resolved());
            }
        }

        // The failure must not be cached
        let retry = router.run(requests(&["bad"])).await.unwrap();
        assert!(!retry[0].outcome.is_resolved());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let source = Arc::new(SimulatedSource::instant(0.0, 0.0));
        let router = Router::new(test_config(2, 8), source).unwrap();

        let results = router.run(Vec::new()).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let source = Arc::new(SimulatedSource::instant(0.0, 0.0));
        let err = Router::new(test_config(0, 8), source).err().unwrap();
        assert!(err.to_string().contains("worker_count"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stress_many_workers_shared_cache() {
        let source = Arc::new(SimulatedSource::instant(0.3, 0.0));
        let router = Router::new(test_config(8, 32), source).unwrap();

        let batch: Vec<Request> = (0..500)
            .map(|i| Request::new(format!("key-{}", i % 50)))
            .collect();

        let results = router.run(batch).await.unwrap();

        assert_eq!(results.len(), 500);
        // Backup is always available, so nothing may fail outright
        assert!(results.iter().all(|r| r.outcome.is_resolved()));

        let stats = router.cache_stats().await;
        assert!(stats.entries <= 32);
    }
}
