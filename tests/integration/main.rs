//! Integration tests exercising the full pipeline: walk a small on-disk
//! TypeScript project, run `parseProject`, and inspect what landed in the
//! graph store, then apply a single-file incremental reparse.

use std::fs;
use std::sync::Arc;

use loom_core::PipelineConfig;
use loom_graph::GraphStore;
use loom_lang::{create_parser_pool, default_registry};
use loom_pipeline::Pipeline;
use tempfile::TempDir;

fn write(dir: &TempDir, rel: &str, contents: &str) {
    let path = dir.path().join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn build_pipeline(project_root: std::path::PathBuf) -> (Arc<Pipeline>, Arc<GraphStore>) {
    let pool = create_parser_pool();
    let registry = Arc::new(default_registry(pool).unwrap());
    let store = Arc::new(GraphStore::open_in_memory(2).unwrap());
    let config = PipelineConfig::new(project_root);
    let pipeline = Arc::new(Pipeline::new(config, registry, store.clone()));
    (pipeline, store)
}

#[tokio::test]
async fn parse_project_indexes_a_small_typescript_tree() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/math.ts",
        r#"
export function add(a: number, b: number): number {
  return a + b;
}

export class Calculator {
  total: number = 0;

  accumulate(value: number): void {
    this.total = add(this.total, value);
  }
}
"#,
    );
    write(
        &dir,
        "src/main.ts",
        r#"
import { Calculator } from "./math";

const calc = new Calculator();
calc.accumulate(5);
"#,
    );
    // Ignored per the default config.
    write(&dir, "node_modules/dep/index.js", "module.exports = {};");

    let (pipeline, store) = build_pipeline(dir.path().to_path_buf());
    let result = pipeline.parse_project().await;

    assert!(result.fatal_error.is_none(), "{:?}", result.fatal_error);
    assert_eq!(result.stats.files, 2);
    assert!(result.stats.errors.is_empty());

    let stats = store.stats().await.unwrap();
    assert!(stats.nodes_by_label.get("Function").copied().unwrap_or(0) >= 1);
    assert!(stats.nodes_by_label.get("Class").copied().unwrap_or(0) >= 1);
    assert!(stats.edges_by_label.contains_key("CONTAINS"));
}

#[tokio::test]
async fn incremental_reparse_drops_removed_entities() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "src/util.ts",
        r#"
export function first(): number { return 1; }
export function second(): number { return 2; }
"#,
    );

    let (pipeline, store) = build_pipeline(dir.path().to_path_buf());
    pipeline.parse_project().await;

    let before = store.stats().await.unwrap();
    assert_eq!(before.nodes_by_label.get("Function").copied().unwrap_or(0), 2);

    write(&dir, "src/util.ts", "export function first(): number { return 1; }\n");
    let result = pipeline.parse_file(&dir.path().join("src/util.ts")).await;
    assert!(result.fatal_error.is_none());

    let after = store.stats().await.unwrap();
    assert_eq!(after.nodes_by_label.get("Function").copied().unwrap_or(0), 1);
}

#[tokio::test]
async fn delete_file_cascades_entities_and_edges() {
    let dir = TempDir::new().unwrap();
    write(&dir, "src/only.ts", "export function solo(): void {}\n");

    let (pipeline, store) = build_pipeline(dir.path().to_path_buf());
    pipeline.parse_project().await;
    assert!(store.stats().await.unwrap().nodes_by_label.get("Function").copied().unwrap_or(0) >= 1);

    pipeline.delete_file(&dir.path().join("src/only.ts")).await;

    let after = store.stats().await.unwrap();
    assert_eq!(after.nodes_by_label.get("Function").copied().unwrap_or(0), 0);
}
