//! CLI command implementations: each wires a [`PipelineConfig`] and a
//! [`GraphStore`] into the pipeline coordinator (spec §2), then drives
//! `parseProject`/`parseFile`/`deleteFile` or hands the pair to
//! `loom-server`/`loom-watcher`.

use std::path::PathBuf;
use std::sync::Arc;

use loom_core::{ParseResult, PipelineConfig};
use loom_graph::GraphStore;
use loom_lang::{create_parser_pool, default_registry};
use loom_pipeline::Pipeline;
use loom_server::ServerState;
use loom_watcher::WatcherService;

const STORE_POOL_SIZE: usize = 4;

fn store_path(root: &std::path::Path) -> PathBuf {
    root.join(".loom").join("graph.sqlite3")
}

/// Loads a [`PipelineConfig`] from `--config` (a `loom.json`-shaped file) when
/// given, falling back to the compiled-in defaults for `root` otherwise (spec
/// §6 "Configuration" — the CLI's own flags are the only other recognised
/// source, and `root` already covers `projectRoot`). A config file's own
/// `project_root`, if present, is overridden by `--root` so the two flags
/// never disagree silently.
fn load_config(root: PathBuf, config_path: Option<&std::path::Path>) -> anyhow::Result<PipelineConfig> {
    let mut config = match config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
            serde_json::from_str::<PipelineConfig>(&raw)
                .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?
        }
        None => PipelineConfig::new(root.clone()),
    };
    config.project_root = root;
    Ok(config)
}

fn build_pipeline(
    root: PathBuf,
    config_path: Option<&std::path::Path>,
    store_path: &std::path::Path,
) -> anyhow::Result<(Arc<Pipeline>, Arc<GraphStore>)> {
    let pool = create_parser_pool();
    let registry = Arc::new(default_registry(pool)?);
    let store = Arc::new(GraphStore::open(store_path, STORE_POOL_SIZE)?);
    let config = load_config(root, config_path)?;
    let pipeline = Arc::new(Pipeline::new(config, registry, store.clone()));
    Ok((pipeline, store))
}

fn log_result(result: &ParseResult) {
    if let Some(err) = &result.fatal_error {
        tracing::error!("parse failed: {err}");
        return;
    }
    let entities: usize = result.stats.entities_by_kind.values().sum();
    let edges: usize = result.stats.edges_by_kind.values().sum();
    tracing::info!(
        "parsed {} files, {} entities, {} edges in {}ms ({} file errors)",
        result.stats.files,
        entities,
        edges,
        result.stats.duration_ms,
        result.stats.errors.len(),
    );
    for file_error in &result.stats.errors {
        tracing::warn!("{}: {}", file_error.file.display(), file_error.message);
    }
}

pub async fn parse(root: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = store_path(&root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let (pipeline, _store) = build_pipeline(root, config_path.as_deref(), &path)?;
    let result = pipeline.parse_project().await;
    log_result(&result);
    if result.fatal_error.is_some() {
        anyhow::bail!("parse-project failed");
    }
    Ok(())
}

pub async fn serve(
    root: PathBuf,
    config_path: Option<PathBuf>,
    host: String,
    port: u16,
    watch: bool,
) -> anyhow::Result<()> {
    let path = store_path(&root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let (pipeline, store) = build_pipeline(root, config_path.as_deref(), &path)?;
    tracing::info!("indexing {} before serving", pipeline.project_root().display());
    let result = pipeline.parse_project().await;
    log_result(&result);

    let state = Arc::new(ServerState::new(pipeline.clone(), store));

    if watch {
        let watcher_state = state.clone();
        let watcher_pipeline = pipeline.clone();
        tokio::spawn(async move {
            let watcher = WatcherService::new(watcher_pipeline);
            let published = watcher_state.clone();
            if let Err(e) = watcher.run(move |result| published.publish(result)).await {
                tracing::error!("file watcher stopped: {e}");
            }
        });
    }

    let router = loom_server::create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    let path = store_path(&root);
    if path.exists() {
        std::fs::remove_file(&path)?;
        tracing::info!("removed {}", path.display());
    }
    // Recreate schema eagerly so a subsequent `parse` starts from a known-empty store.
    let store = GraphStore::open(&path, 1)?;
    drop(store);
    tracing::info!("cleared graph store for {}", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_falls_back_to_defaults_without_a_path() {
        let config = load_config(PathBuf::from("/repo"), None).unwrap();
        assert_eq!(config.project_root, PathBuf::from("/repo"));
        assert_eq!(config.ignore, loom_core::DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn load_config_reads_a_loom_json_file_and_applies_root_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("loom.json");
        std::fs::write(&config_path, r#"{"project_root": "/ignored", "worker_count": 2}"#).unwrap();

        let config = load_config(PathBuf::from("/repo"), Some(&config_path)).unwrap();
        assert_eq!(config.project_root, PathBuf::from("/repo"));
        assert_eq!(config.worker_count, Some(2));
    }
}
