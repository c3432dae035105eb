//! Pass A: builds the Symbol Registry the whole project's references are
//! resolved against. Concurrent builders shard by symbol name and merge at a
//! barrier — the registry itself is a `DashMap`, so the merge is just inserting
//! each builder's entries; no locking beyond what `DashMap` already does per shard.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use rayon::prelude::*;

use loom_core::parsed::ParsedFileEntities;
use loom_core::symbol::{SymbolInfo, SymbolKind};

/// Read-only once Pass B starts; built once per project parse (or, for an
/// incremental reparse, rebuilt from the full project's current entity set).
pub struct SymbolRegistry {
    by_name: DashMap<String, Vec<SymbolInfo>>,
    by_file: DashMap<PathBuf, Vec<SymbolInfo>>,
    exports_by_file: DashMap<PathBuf, HashMap<String, SymbolInfo>>,
}

impl SymbolRegistry {
    /// Builds the registry from every file's parsed entities. Per-file symbol
    /// collection runs in parallel; each file only ever writes its own
    /// `by_file`/`exports_by_file` entries, so the only shared contention is
    /// `by_name`, which `DashMap` already shards internally.
    pub fn build(files: &[ParsedFileEntities]) -> Self {
        let by_name: DashMap<String, Vec<SymbolInfo>> = DashMap::new();
        let by_file: DashMap<PathBuf, Vec<SymbolInfo>> = DashMap::new();
        let exports_by_file: DashMap<PathBuf, HashMap<String, SymbolInfo>> = DashMap::new();

        files.par_iter().for_each(|parsed| {
            let Some(path) = parsed.file_path() else { return };
            let symbols = collect_symbols(parsed);

            let mut exports = HashMap::new();
            for sym in &symbols {
                by_name.entry(sym.name.clone()).or_default().push(sym.clone());
                if sym.is_exported {
                    exports.insert(sym.name.clone(), sym.clone());
                }
            }
            by_file.insert(path.clone(), symbols);
            exports_by_file.insert(path.clone(), exports);
        });

        SymbolRegistry { by_name, by_file, exports_by_file }
    }

    pub fn total_symbols(&self) -> usize {
        self.by_file.iter().map(|e| e.value().len()).sum()
    }

    pub fn candidates(&self, name: &str) -> Vec<SymbolInfo> {
        self.by_name.get(name).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn symbols_in_file(&self, file: &Path) -> Vec<SymbolInfo> {
        self.by_file.get(file).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn is_exported_from(&self, file: &Path, name: &str) -> bool {
        self.exports_by_file.get(file).map(|m| m.contains_key(name)).unwrap_or(false)
    }

    pub fn symbols_by_file(&self) -> HashMap<PathBuf, usize> {
        self.by_file.iter().map(|e| (e.key().clone(), e.value().len())).collect()
    }
}

fn collect_symbols(parsed: &ParsedFileEntities) -> Vec<SymbolInfo> {
    let Some(file) = parsed.file_path() else { return Vec::new() };
    let mut out = Vec::new();

    for f in &parsed.functions {
        out.push(SymbolInfo {
            name: f.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Function,
            is_exported: f.is_exported,
            start_line: f.start_line,
            entity_id: f.id(),
        });
    }
    for c in &parsed.classes {
        out.push(SymbolInfo {
            name: c.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Class,
            is_exported: c.is_exported,
            start_line: c.start_line,
            entity_id: c.id(),
        });
    }
    for i in &parsed.interfaces {
        out.push(SymbolInfo {
            name: i.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Interface,
            is_exported: i.is_exported,
            start_line: i.start_line,
            entity_id: i.id(),
        });
    }
    for v in &parsed.variables {
        out.push(SymbolInfo {
            name: v.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Variable,
            is_exported: v.is_exported,
            start_line: v.line,
            entity_id: v.id(),
        });
    }
    for t in &parsed.types {
        out.push(SymbolInfo {
            name: t.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Type,
            is_exported: t.is_exported,
            start_line: t.start_line,
            entity_id: t.id(),
        });
    }
    for comp in &parsed.components {
        out.push(SymbolInfo {
            name: comp.name.clone(),
            file: file.clone(),
            kind: SymbolKind::Component,
            is_exported: comp.is_exported,
            start_line: comp.start_line,
            entity_id: comp.id(),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_core::{FileEntity, FunctionEntity};
    use chrono::Utc;

    fn file_entities(path: &str, functions: Vec<FunctionEntity>) -> ParsedFileEntities {
        ParsedFileEntities {
            file: Some(FileEntity {
                path: PathBuf::from(path),
                name: path.to_string(),
                extension: "ts".to_string(),
                loc: 10,
                last_modified: Utc::now(),
                hash: "h".to_string(),
            }),
            functions,
            ..Default::default()
        }
    }

    fn func(name: &str, file: &str, exported: bool, line: u32) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            file_path: PathBuf::from(file),
            start_line: line,
            end_line: line + 5,
            is_exported: exported,
            is_async: false,
            is_arrow: false,
            is_generator: None,
            params: vec![],
            return_type: None,
            docstring: None,
            complexity: None,
        }
    }

    #[test]
    fn duplicate_names_across_files_are_preserved() {
        let files = vec![
            file_entities("/a.ts", vec![func("helper", "/a.ts", true, 1)]),
            file_entities("/b.ts", vec![func("helper", "/b.ts", true, 1)]),
        ];
        let registry = SymbolRegistry::build(&files);
        assert_eq!(registry.candidates("helper").len(), 2);
        assert_eq!(registry.total_symbols(), 2);
    }

    #[test]
    fn per_file_export_index_only_contains_exported_names() {
        let files = vec![file_entities("/a.ts", vec![func("pub", "/a.ts", true, 1), func("priv", "/a.ts", false, 10)])];
        let registry = SymbolRegistry::build(&files);
        assert!(registry.is_exported_from(Path::new("/a.ts"), "pub"));
        assert!(!registry.is_exported_from(Path::new("/a.ts"), "priv"));
    }
}
