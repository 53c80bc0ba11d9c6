//! Error types for the fetch router
//!
//! Per-request fetch failures never appear here: they are reported as
//! failed route outcomes so a run always yields one result per request.
//! Only configuration faults and structural faults abort a run.

use std::fmt;

#[derive(Debug)]
pub enum RouterError {
    Config(String),
    /// A worker task panicked or was cancelled mid-run
    WorkerPanic(String),
    /// Fewer results than submitted requests were collected
    IncompleteRun { expected: usize, received: usize },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Config(msg) => write!(f, "Configuration error: {}", msg),
            RouterError::WorkerPanic(msg) => write!(f, "Worker task failed: {}", msg),
            RouterError::IncompleteRun { expected, received } => {
                write!(f, "Run produced {} of {} results", received, expected)
            }
        }
    }
}

impl std::error::Error for RouterError {}

impl From<tokio::task::JoinError> for RouterError {
    fn from(err: tokio::task::JoinError) -> Self {
        RouterError::WorkerPanic(err.to_string())
    }
}

impl From<tracing_subscriber::filter::ParseError> for RouterError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        RouterError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
