//! Filesystem watcher (spec §6 "Collaborator: Filesystem watcher"): emits
//! `{type: add|change|unlink, path}` and maps each to `parseFile`/`deleteFile`.
//! Debouncing happens here — the core assumes events are already coalesced
//! per path (spec §6).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use loom_core::ParseResult;
use loom_pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Add,
    Change,
    Unlink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    #[serde(rename = "type")]
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Drives `Pipeline::parse_file`/`delete_file` from debounced filesystem
/// events under the pipeline's configured project root.
pub struct WatcherService {
    pipeline: Arc<Pipeline>,
}

impl WatcherService {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        WatcherService { pipeline }
    }

    /// Watches `project_root()` until the returned future is dropped or a
    /// fatal watch error occurs. `on_result` is called with every
    /// `ParseResult` a watched event produces, letting a caller (e.g.
    /// `loom-server`) push live updates without this crate knowing anything
    /// about websockets.
    pub async fn run(&self, on_result: impl Fn(ParseResult) + Send + Sync + 'static) -> Result<()> {
        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<WatchEvent>();
        let root = self.pipeline.project_root().to_path_buf();

        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            let events = match result {
                Ok(events) => events,
                Err(e) => {
                    error!("watch error: {e}");
                    return;
                }
            };
            for event in events {
                let path = event.path;
                if is_ignored(&path) {
                    continue;
                }
                let kind = if path.exists() {
                    if path.is_dir() { WatchEventKind::Add } else { WatchEventKind::Change }
                } else {
                    WatchEventKind::Unlink
                };
                if raw_tx.send(WatchEvent { kind, path }).is_err() {
                    debug!("watch event dropped, receiver closed");
                }
            }
        })?;

        debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;
        info!("watching {} for changes", root.display());

        while let Some(event) = raw_rx.recv().await {
            if let Some(result) = self.handle_event(&event).await {
                on_result(result);
            }
        }

        Ok(())
    }

    async fn handle_event(&self, event: &WatchEvent) -> Option<ParseResult> {
        match event.kind {
            WatchEventKind::Unlink => {
                info!("removed: {}", event.path.display());
                Some(self.pipeline.delete_file(&event.path).await)
            }
            WatchEventKind::Add if event.path.is_dir() => {
                // A new directory: every file under it is effectively new to
                // the pipeline, so drive each through parse_file individually
                // rather than a full-project reparse.
                for file in files_under(&event.path) {
                    let result = self.pipeline.parse_file(&file).await;
                    if result.fatal_error.is_some() {
                        warn!("parse_file failed for {}: {:?}", file.display(), result.fatal_error);
                    }
                }
                None
            }
            WatchEventKind::Add | WatchEventKind::Change => {
                info!("{:?}: {}", event.kind, event.path.display());
                Some(self.pipeline.parse_file(&event.path).await)
            }
        }
    }
}

fn is_ignored(path: &Path) -> bool {
    for component in path.components() {
        if let Some(name) = component.as_os_str().to_str() {
            if matches!(name, ".git" | "node_modules" | "target" | ".next" | ".turbo" | "__pycache__") {
                return true;
            }
        }
    }
    false
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(dir)
        .standard_filters(false)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path().to_path_buf())
        .filter(|p| !is_ignored(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_vcs_and_dependency_directories() {
        assert!(is_ignored(Path::new("/repo/node_modules/pkg/index.js")));
        assert!(is_ignored(Path::new("/repo/.git/HEAD")));
        assert!(!is_ignored(Path::new("/repo/src/main.ts")));
    }

    #[test]
    fn watch_event_serializes_with_lowercase_type() {
        let event = WatchEvent { kind: WatchEventKind::Change, path: PathBuf::from("/a.ts") };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"change\""));
    }
}
