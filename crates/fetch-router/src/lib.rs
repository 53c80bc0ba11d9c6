//! Fetch Router Library
//!
//! Provides the core components for the concurrent request router: a
//! bounded worker pool draining a shared queue, a TTL-LRU request cache,
//! and a primary/fallback fetch strategy over an abstract source.

pub mod config;
pub mod error;
pub mod router;
pub mod sim;
pub mod source;
pub mod strategy;
pub mod types;
pub mod worker;

pub use config::RouterConfig;
pub use error::{Result, RouterError};
pub use router::Router;
pub use sim::SimulatedSource;
pub use source::{FetchSource, SourceError};
pub use strategy::{FetchStrategy, SourceUnavailable};
pub use types::*;
