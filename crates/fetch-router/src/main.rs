//! Fetch Router demo
//!
//! Routes a batch of deliberately duplicated requests against a
//! simulated flaky source and reports how each request was resolved.

use fetch_router::error::Result;
use fetch_router::{Provenance, Request, Router, RouterConfig, SimulatedSource};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("fetch_router=info".parse()?);

    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    info!("Starting fetch router demo...");

    let (config, demo) = load_config();
    info!("Workers: {}", config.worker_count);
    info!("Cache capacity: {}", config.cache_capacity);
    info!("Cache TTL: {:?}", config.cache_ttl);
    info!(
        "Requests: {} over {} distinct keys, primary failure rate {}",
        demo.request_count, demo.distinct_keys, demo.primary_failure_rate
    );

    let source = Arc::new(SimulatedSource::new(demo.primary_failure_rate));
    let router = Router::new(config, source)?;

    // Repeated keys exercise the cache, as the fetch would otherwise
    // dominate every request
    let batch: Vec<Request> = (0..demo.request_count)
        .map(|i| Request::new(format!("DataRequest-{}", i % demo.distinct_keys)))
        .collect();

    let results = router.run(batch).await?;

    let mut cache_hits = 0u64;
    let mut primary_success = 0u64;
    let mut fallback_recovered = 0u64;
    let mut failed = 0u64;
    for result in &results {
        match result.outcome.provenance() {
            Some(Provenance::CacheHit) => cache_hits += 1,
            Some(Provenance::PrimarySuccess) => primary_success += 1,
            Some(Provenance::FallbackRecovered) => fallback_recovered += 1,
            None => failed += 1,
        }
    }

    info!(
        requests = results.len(),
        cache_hits, primary_success, fallback_recovered, failed, "run summary"
    );

    let stats = router.cache_stats().await;
    info!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        expirations = stats.expirations,
        "cache stats"
    );

    Ok(())
}

struct DemoConfig {
    request_count: usize,
    distinct_keys: usize,
    primary_failure_rate: f64,
}

fn load_config() -> (RouterConfig, DemoConfig) {
    let worker_count = std::env::var("WORKER_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(4);

    let cache_capacity = std::env::var("CACHE_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(64);

    let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);

    let request_count = std::env::var("REQUEST_COUNT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(20);

    let distinct_keys = std::env::var("DISTINCT_KEYS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(5)
        .max(1);

    let primary_failure_rate = std::env::var("PRIMARY_FAILURE_RATE")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.3);

    (
        RouterConfig {
            cache_capacity,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            worker_count,
        },
        DemoConfig {
            request_count,
            distinct_keys,
            primary_failure_rate,
        },
    )
}
