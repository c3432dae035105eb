//! Axum router setup: exactly the endpoints spec §6 imposes, no static
//! asset serving (§1 Non-goal: web UI).

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{handlers, websocket::ws_handler, ServerState};

pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/parse-project", post(handlers::parse_project))
        .route("/api/parse-file", post(handlers::parse_file))
        .route("/api/file", delete(handlers::delete_file))
        .route("/api/graph/file/*path", get(handlers::file_subgraph))
        .route("/api/search", get(handlers::search))
        .route("/api/stats", get(handlers::stats))
        .route("/api/health", get(handlers::health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::PipelineConfig;
    use loom_graph::GraphStore;
    use loom_lang::languages::default_registry;
    use loom_lang::parser_pool::create_parser_pool;

    #[test]
    fn router_builds_with_in_memory_store() {
        let pool = create_parser_pool();
        let registry = Arc::new(default_registry(pool).unwrap());
        let config = PipelineConfig::new(std::env::temp_dir());
        let store = Arc::new(GraphStore::open_in_memory(2).unwrap());
        let pipeline = Arc::new(loom_pipeline::Pipeline::new(config, registry, store.clone()));
        let state = Arc::new(ServerState::new(pipeline, store));
        let _router = create_router(state);
    }
}
