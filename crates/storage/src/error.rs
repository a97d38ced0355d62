//! Content store error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Content store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store directory {path:?} unusable: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("couldn't create temporary file in {dir:?}: {source}")]
    TempFileCreateFailed {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("copying content failed: {0}")]
    CopyFailed(#[source] io::Error),

    #[error("publishing {filename} failed: rename: {rename}; copy fallback: {fallback}")]
    PublishFailed {
        filename: String,
        rename: io::Error,
        #[source]
        fallback: io::Error,
    },
}

/// Result type for content store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
