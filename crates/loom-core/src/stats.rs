//! `ParseResult` is what the HTTP/RPC collaborator receives from `parseProject` /
//! `parseFile` (spec §6). It is assembled by the pipeline coordinator, not by any
//! single component.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::FileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseStatus {
    Complete,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    pub files: usize,
    pub entities_by_kind: HashMap<String, usize>,
    pub edges_by_kind: HashMap<String, usize>,
    pub duration_ms: u64,
    pub errors: Vec<FileError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub status: ParseStatus,
    pub stats: ParseStats,
    /// Set only when `status == Error` (a project-wide fatal failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<String>,
}

impl ParseResult {
    pub fn complete(stats: ParseStats) -> Self {
        ParseResult {
            status: ParseStatus::Complete,
            stats,
            fatal_error: None,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ParseResult {
            status: ParseStatus::Error,
            stats: ParseStats::default(),
            fatal_error: Some(message.into()),
        }
    }
}
