//! Error types for the render pipeline.

use thiserror::Error;

/// Errors that can occur while rendering.
///
/// The transforms themselves are total functions; the only failure modes
/// live in task orchestration.
#[derive(Debug, Error)]
pub enum Error {
    /// The background render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A coalesced render was abandoned before producing a result.
    #[error("in-flight render abandoned")]
    Abandoned,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
