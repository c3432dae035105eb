//! The Pipeline Coordinator (spec §2 "a thin Pipeline Coordinator"): sequences
//! C1 → C2 → C3 → C4 for a full-project parse and for a single-file incremental
//! reparse, and maps filesystem-watcher events onto the two.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::Semaphore;

use loom_core::entity::Entity;
use loom_core::identity::EntityId;
use loom_core::{
    FatalError, FileError, FileErrorKind, ParseResult, ParseStats, PipelineConfig,
};
use loom_core::parsed::ParsedFileEntities;
use loom_graph::GraphStore;
use loom_lang::PluginRegistry;
use loom_resolve::SymbolRegistry;

use crate::walk::enumerate_files;

/// Holds the plugin registry, the store handle, and — purely as a resolution
/// input, never as the system of record — the last parse of every file, so an
/// incremental reparse can rebuild a project-wide Symbol Registry without
/// re-reading every file on disk (spec §4.3 "for an incremental reparse,
/// rebuilt from the full project's current entity set").
pub struct Pipeline {
    config: PipelineConfig,
    registry: Arc<PluginRegistry>,
    store: Arc<GraphStore>,
    cache: DashMap<PathBuf, ParsedFileEntities>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, registry: Arc<PluginRegistry>, store: Arc<GraphStore>) -> Self {
        Pipeline { config, registry, store, cache: DashMap::new() }
    }

    pub fn project_root(&self) -> &Path {
        &self.config.project_root
    }

    /// A full-project parse (spec §6 `parseProject`): walks the project, runs C2
    /// over every eligible file with bounded concurrency, then the two-pass
    /// resolver as a single barrier, then commits everything to the store.
    pub async fn parse_project(&self) -> ParseResult {
        let start = Instant::now();

        if !self.config.project_root.is_dir() {
            return ParseResult::fatal(FatalError::InvalidProjectRoot(self.config.project_root.clone()).to_string());
        }

        if let Err(e) = self.store.ensure_indexes().await {
            return ParseResult::fatal(e.to_string());
        }

        let files = match enumerate_files(&self.config, &self.registry) {
            Ok(f) => f,
            Err(e) => return ParseResult::fatal(format!("failed to enumerate project files: {e}")),
        };

        let (parsed, errors) = self.extract_all(&files).await;

        self.cache.clear();
        for p in &parsed {
            if let Some(path) = p.file_path() {
                self.cache.insert(path.clone(), p.clone());
            }
        }

        let mut parsed = parsed;
        let registry = SymbolRegistry::build(&parsed);
        let resolution = loom_resolve::resolve(&mut parsed, &registry, &self.config.project_root);

        if let Err(e) = self.commit(&parsed, &resolution.edges).await {
            return ParseResult::fatal(e.to_string());
        }

        let stats = self.build_stats(parsed.len(), &parsed, &resolution.edges, errors, start);
        ParseResult::complete(stats)
    }

    /// A single-file incremental reparse (spec §4.4 "Incremental reparse").
    pub async fn parse_file(&self, path: &Path) -> ParseResult {
        let start = Instant::now();

        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) => {
                let stats = ParseStats {
                    files: 0,
                    errors: vec![FileError { file: path.to_path_buf(), kind: FileErrorKind::Parse, message: e.to_string() }],
                    duration_ms: elapsed_ms(start),
                    ..Default::default()
                };
                return ParseResult::complete(stats);
            }
        };

        let extraction = self.registry.extract_all_entities(&self.config.project_root, path, &content);
        let parsed = match extraction {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                let stats = ParseStats {
                    files: 0,
                    errors: vec![FileError { file: path.to_path_buf(), kind: FileErrorKind::Extractor, message: e.to_string() }],
                    duration_ms: elapsed_ms(start),
                    ..Default::default()
                };
                return ParseResult::complete(stats);
            }
            None => {
                // No plugin claims this extension; nothing to do.
                return ParseResult::complete(ParseStats { duration_ms: elapsed_ms(start), ..Default::default() });
            }
        };

        // Step 2: identity set currently stored for this file.
        let old_ids = match self.store.stored_identity_set(path).await {
            Ok(ids) => ids,
            Err(e) => return ParseResult::fatal(e.to_string()),
        };

        // Capture cross-file referencers before step 4's cascade delete removes
        // the very edges that identify them (spec §4.4 step 5 "re-run the
        // resolver scoped to references whose source or target is in the
        // touched file" — this set has to be read while the old edges, and the
        // old node they point at, still exist).
        let referencing = match self.store.file_paths_referencing(path).await {
            Ok(set) => set,
            Err(e) => return ParseResult::fatal(e.to_string()),
        };

        // Step 3: write new/changed entities.
        if let Err(e) = self.store.upsert_file_entities(&parsed).await {
            return ParseResult::fatal(e.to_string());
        }

        // Step 4: cascade-delete entities whose identity dropped out.
        let new_ids: HashSet<EntityId> = parsed.entity_ids();
        let removed: Vec<EntityId> = old_ids.difference(&new_ids).cloned().collect();
        if let Err(e) = self.store.delete_entities(path, &removed).await {
            return ParseResult::fatal(e.to_string());
        }

        self.cache.insert(path.to_path_buf(), parsed.clone());

        // Step 5: re-run the resolver scoped to references whose source or
        // target is in the touched file.
        let mut affected: HashSet<PathBuf> = referencing;
        affected.insert(path.to_path_buf());

        let mut affected_entities: Vec<ParsedFileEntities> = Vec::new();
        let mut affected_paths: Vec<PathBuf> = Vec::new();
        for p in &affected {
            if let Some(entry) = self.cache.get(p) {
                affected_paths.push(p.clone());
                affected_entities.push(entry.value().clone());
            }
        }

        let full_registry = SymbolRegistry::build(&self.cache.iter().map(|e| e.value().clone()).collect::<Vec<_>>());
        let resolution = loom_resolve::resolve(&mut affected_entities, &full_registry, &self.config.project_root);

        if let Err(e) = self.store.delete_outgoing_edges_from_files(&affected_paths).await {
            return ParseResult::fatal(e.to_string());
        }
        if let Err(e) = self.store.upsert_edges(&resolution.edges).await {
            return ParseResult::fatal(e.to_string());
        }

        let stats = self.build_stats(1, std::slice::from_ref(&parsed), &resolution.edges, Vec::new(), start);
        ParseResult::complete(stats)
    }

    /// `deleteFile` (spec §6): cascade-deletes the file's node set; the same
    /// transaction already removes every edge touching those nodes; no
    /// downstream file's cache entry needs rewriting because nothing of theirs
    /// survives pointing at an id that no longer exists.
    pub async fn delete_file(&self, path: &Path) -> ParseResult {
        let start = Instant::now();
        if let Err(e) = self.store.delete_file_entities(path).await {
            return ParseResult::fatal(e.to_string());
        }
        self.cache.remove(path);
        ParseResult::complete(ParseStats { files: 1, duration_ms: elapsed_ms(start), ..Default::default() })
    }

    async fn extract_all(&self, files: &[PathBuf]) -> (Vec<ParsedFileEntities>, Vec<FileError>) {
        let permits = self.config.effective_worker_count();
        let semaphore = Arc::new(Semaphore::new(permits.max(1)));
        let mut join_set = tokio::task::JoinSet::new();

        for path in files.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let project_root = self.config.project_root.clone();
            let registry = Arc::clone(&self.registry);

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closes");
                let content = match tokio::fs::read_to_string(&path).await {
                    Ok(c) => c,
                    Err(e) => {
                        return Err(FileError { file: path, kind: FileErrorKind::Parse, message: e.to_string() });
                    }
                };
                match registry.extract_all_entities(&project_root, &path, &content) {
                    Some(Ok(parsed)) => Ok(parsed),
                    Some(Err(e)) => Err(FileError { file: path, kind: FileErrorKind::Extractor, message: e.to_string() }),
                    None => Err(FileError { file: path, kind: FileErrorKind::Parse, message: "no plugin claims this extension".into() }),
                }
            });
        }

        let mut parsed = Vec::new();
        let mut errors = Vec::new();
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(Ok(p)) => parsed.push(p),
                Ok(Err(e)) => errors.push(e),
                Err(join_err) => tracing::error!("extraction task panicked: {join_err}"),
            }
        }

        (parsed, errors)
    }

    async fn commit(&self, parsed: &[ParsedFileEntities], edges: &[loom_core::Edge]) -> Result<(), loom_core::StoreError> {
        let permits = self.config.effective_worker_count().max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut join_set = tokio::task::JoinSet::new();

        for p in parsed.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let store = Arc::clone(&self.store);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closes");
                store.upsert_file_entities(&p).await
            });
        }

        while let Some(result) = join_set.join_next().await {
            result.expect("upsert task panicked")?;
        }

        self.store.upsert_edges(edges).await
    }

    fn build_stats(
        &self,
        files: usize,
        parsed: &[ParsedFileEntities],
        edges: &[loom_core::Edge],
        errors: Vec<FileError>,
        start: Instant,
    ) -> ParseStats {
        let mut entities_by_kind = std::collections::HashMap::new();
        let mut contains_count = 0usize;
        for p in parsed {
            for e in p.all_entities() {
                *entities_by_kind.entry(e.kind().label().to_string()).or_insert(0) += 1;
                if !matches!(e, Entity::File(_)) {
                    contains_count += 1;
                }
            }
        }

        let mut edges_by_kind = std::collections::HashMap::new();
        edges_by_kind.insert("CONTAINS".to_string(), contains_count);
        for edge in edges {
            *edges_by_kind.entry(edge.kind().label().to_string()).or_insert(0) += 1;
        }

        ParseStats { files, entities_by_kind, edges_by_kind, duration_ms: elapsed_ms(start), errors }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
