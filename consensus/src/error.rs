//! Error types for the etchash engine.

use thiserror::Error;

/// Errors returned by the public etchash surface.
#[derive(Debug, Error)]
pub enum EtchashError {
    /// A cache or DAG size failed its divisibility invariant.
    #[error("invalid size {size} for {what}: must be a multiple of {unit}")]
    InvalidSize {
        what: &'static str,
        size: u64,
        unit: u64,
    },

    /// Filesystem or memory-mapping failure while preparing a full DAG.
    #[error("I/O error preparing DAG file: {0}")]
    Io(#[from] std::io::Error),

    /// The progress callback requested cancellation.
    #[error("DAG build cancelled by caller")]
    Cancelled,

    /// The on-disk DAG file could not be reused or recreated.
    #[error("DAG file at {path} is unusable: {reason}")]
    DagFile { path: String, reason: String },
}
