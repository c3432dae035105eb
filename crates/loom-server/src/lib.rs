//! Loom Server — the out-of-scope HTTP/RPC collaborator (spec §6), reduced to
//! exactly the contracts §6 imposes: `parseProject`/`parseFile`/`deleteFile`,
//! the read-side query contracts, and a websocket push of `ParseResult`s as
//! the watcher drives incremental reparses.

pub mod handlers;
pub mod router;
pub mod websocket;

use std::sync::Arc;

use loom_core::ParseResult;
use loom_graph::GraphStore;
use loom_pipeline::Pipeline;
use tokio::sync::broadcast;

/// Shared state handed to every axum handler. `events` is the channel the
/// watcher (when running alongside the server) publishes `ParseResult`s on;
/// websocket clients subscribe to it directly.
pub struct ServerState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<GraphStore>,
    pub events: broadcast::Sender<ParseResult>,
}

impl ServerState {
    pub fn new(pipeline: Arc<Pipeline>, store: Arc<GraphStore>) -> Self {
        let (events, _rx) = broadcast::channel(256);
        ServerState { pipeline, store, events }
    }

    pub fn publish(&self, result: ParseResult) {
        // No receivers yet (no websocket clients connected) is not an error.
        let _ = self.events.send(result);
    }
}

pub use router::create_router;
