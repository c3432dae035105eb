//! REST handlers implementing the spec §6 HTTP/RPC contract: `parseProject`,
//! `parseFile`, `deleteFile`, and the read-side query contracts served
//! directly from the store.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use loom_core::entity::EntityKind;
use loom_core::ParseResult;

use crate::ServerState;

#[derive(Debug, Deserialize)]
pub struct ParseProjectBody {
    /// Accepted for API-contract compatibility with spec §6's
    /// `parseProject(rootPath, ignorePatterns?)`; the server's pipeline is
    /// bound to a single project root at `serve` startup, so a mismatched
    /// `root_path` is rejected rather than silently reparsing a different
    /// tree.
    #[serde(default)]
    pub root_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct FilePathBody {
    pub path: PathBuf,
}

pub async fn parse_project(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<ParseProjectBody>,
) -> Result<Json<ParseResult>, StatusCode> {
    if let Some(root) = &body.root_path {
        if root != state.pipeline.project_root() {
            return Err(StatusCode::BAD_REQUEST);
        }
    }
    let result = state.pipeline.parse_project().await;
    state.publish(result.clone());
    Ok(Json(result))
}

pub async fn parse_file(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<FilePathBody>,
) -> Json<ParseResult> {
    let result = state.pipeline.parse_file(&body.path).await;
    state.publish(result.clone());
    Json(result)
}

pub async fn delete_file(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<FilePathBody>,
) -> Json<ParseResult> {
    let result = state.pipeline.delete_file(&body.path).await;
    state.publish(result.clone());
    Json(result)
}

pub async fn file_subgraph(
    State(state): State<Arc<ServerState>>,
    AxumPath(path): AxumPath<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let file_path = PathBuf::from(path);
    match state.store.file_subgraph(&file_path).await {
        Ok(Some(subgraph)) => Ok(Json(subgraph).into_response()),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("file_subgraph query failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "q")]
    pub term: String,
    pub types: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    50
}

fn parse_kind(s: &str) -> Option<EntityKind> {
    match s {
        "File" => Some(EntityKind::File),
        "Function" => Some(EntityKind::Function),
        "Class" => Some(EntityKind::Class),
        "Interface" => Some(EntityKind::Interface),
        "Variable" => Some(EntityKind::Variable),
        "Type" => Some(EntityKind::Type),
        "Component" => Some(EntityKind::Component),
        "Import" => Some(EntityKind::Import),
        _ => None,
    }
}

pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, StatusCode> {
    let kinds: Option<Vec<EntityKind>> = params
        .types
        .as_deref()
        .map(|s| s.split(',').filter_map(parse_kind).collect());

    match state.store.search(&params.term, kinds.as_deref(), params.limit).await {
        Ok(hits) => Ok(Json(hits)),
        Err(e) => {
            tracing::error!("search query failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn stats(State(state): State<Arc<ServerState>>) -> Result<impl IntoResponse, StatusCode> {
    match state.store.stats().await {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => {
            tracing::error!("stats query failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_is_case_sensitive_and_total() {
        assert_eq!(parse_kind("Function"), Some(EntityKind::Function));
        assert_eq!(parse_kind("function"), None);
        assert_eq!(parse_kind("Nonsense"), None);
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let _ = health_check().await;
    }
}
