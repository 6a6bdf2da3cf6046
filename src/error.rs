use std::path::PathBuf;

use thiserror::Error;

/// Fatal batch-level conditions. Everything below this level is recovered
/// in place: bad numeric tokens are skipped, unknown grades are dropped,
/// unreadable documents become `Failed` outcomes next to their siblings.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no documents supplied")]
    EmptyBatch,
}

/// Why a single document could not be turned into lines. Carried as a value
/// alongside successful documents; never aborts the batch.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure inside an optional post-processing enhancer. The deterministic
/// result is kept whenever one of these surfaces.
#[derive(Debug, Error)]
#[error("enhancement failed: {0}")]
pub struct EnhanceError(pub String);
