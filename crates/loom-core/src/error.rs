//! Error taxonomy (spec §7). Per-file failures are data (collected into
//! [`ParseStats::errors`]), never panics or aborted runs; only store-connection and
//! invalid-root failures are fatal to the whole pipeline run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileErrorKind {
    /// Content did not form a valid concrete-syntax tree.
    Parse,
    /// An extractor raised on an otherwise well-formed tree.
    Extractor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: PathBuf,
    pub kind: FileErrorKind,
    pub message: String,
}

/// Failures from the graph store (C4). `ConnectionFailed` and `QueryFailed` are
/// retried idempotently by the coordinator; `IndexFailed` is tolerated when the
/// underlying store reports "already exists".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    ConnectionFailed(String),
    #[error("store query failed: {0}")]
    QueryFailed(String),
    #[error("index creation failed: {0}")]
    IndexFailed(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::ConnectionFailed(_) => "CONNECTION_FAILED",
            StoreError::QueryFailed(_) => "QUERY_FAILED",
            StoreError::IndexFailed(_) => "INDEX_FAILED",
        }
    }
}

/// Fatal, project-wide failure (store unreachable, invalid `projectRoot`). Aborts
/// the run and yields a single error `ParseResult` rather than per-file errors.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("invalid project root: {0}")]
    InvalidProjectRoot(PathBuf),
    #[error(transparent)]
    Store(#[from] StoreError),
}
