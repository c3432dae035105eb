//! Pass B: reference resolution (spec §4.3 "Pass B").
//!
//! Four unresolved-reference kinds come in off each file's `ParsedFileEntities`
//! (calls, inheritance, renders, imports) and go out as [`loom_core::Edge`]
//! records whose endpoints are already-computed [`loom_core::EntityId`]s — never
//! dangling (spec I2), because an edge is only emitted once both endpoints are
//! known to exist in the combined entity set.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use loom_core::entity::{ClassEntity, ComponentEntity, FunctionEntity, InterfaceEntity};
use loom_core::identity::EntityId;
use loom_core::parsed::{InheritanceKind, ParsedFileEntities};
use loom_core::symbol::{SymbolInfo, SymbolKind};
use loom_core::{CallsEdge, Edge, ExtendsEdge, ImplementsEdge, ImportsEdge, RendersEdge};

use crate::registry::SymbolRegistry;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionOutput {
    pub edges: Vec<Edge>,
    pub total_symbols: usize,
    pub resolved_relationships: usize,
    pub unresolved_references: usize,
    pub symbols_by_file: HashMap<PathBuf, usize>,
}

/// Runs Pass B over every file's unresolved references. `files` is mutated only to
/// fill in each TS/JS [`loom_core::ImportEntity::resolved_path`] (Python's is already
/// set at extraction time, per §4.2); no other field changes.
pub fn resolve(
    files: &mut [ParsedFileEntities],
    registry: &SymbolRegistry,
    project_root: &Path,
) -> ResolutionOutput {
    let mut edges = Vec::new();
    let mut resolved = 0usize;
    let mut unresolved = 0usize;

    let imports_by_file = resolve_imports(files, project_root, &mut edges, &mut resolved);

    for parsed in files.iter() {
        let Some(file_path) = parsed.file_path().cloned() else { continue };

        for call in &parsed.call_refs {
            let Some(caller) = find_function(parsed, &call.caller_name) else { continue };
            match resolve_name(
                &call.callee_name,
                &file_path,
                registry,
                &imports_by_file,
                |k| k == SymbolKind::Function,
            ) {
                Some(callee) => {
                    edges.push(Edge::Calls(CallsEdge {
                        from: caller.id(),
                        to: callee.entity_id,
                        line: call.line,
                        count: 1,
                    }));
                    resolved += 1;
                }
                None => unresolved += 1,
            }
        }

        for inh in &parsed.inheritance_refs {
            let child = find_class(parsed, &inh.child_name)
                .map(|c| (c.id(), SymbolKind::Class))
                .or_else(|| find_interface(parsed, &inh.child_name).map(|i| (i.id(), SymbolKind::Interface)));
            let Some((child_id, child_kind)) = child else { continue };

            let target_kind = match inh.kind {
                InheritanceKind::Implements => SymbolKind::Interface,
                InheritanceKind::Extends => child_kind,
            };

            match resolve_name(&inh.parent_name, &file_path, registry, &imports_by_file, |k| k == target_kind) {
                Some(parent) => {
                    let edge = match inh.kind {
                        InheritanceKind::Extends => Edge::Extends(ExtendsEdge { from: child_id, to: parent.entity_id }),
                        InheritanceKind::Implements => {
                            Edge::Implements(ImplementsEdge { from: child_id, to: parent.entity_id })
                        }
                    };
                    edges.push(edge);
                    resolved += 1;
                }
                None => unresolved += 1,
            }
        }

        for render in &parsed.render_refs {
            let Some(renderer) = find_component(parsed, &render.component_name) else { continue };
            match resolve_name(
                &render.rendered_component_name,
                &file_path,
                registry,
                &imports_by_file,
                |k| k == SymbolKind::Component,
            ) {
                Some(target) => {
                    edges.push(Edge::Renders(RendersEdge {
                        from: renderer.id(),
                        to: target.entity_id,
                        line: render.line,
                    }));
                    resolved += 1;
                }
                None => unresolved += 1,
            }
        }
    }

    ResolutionOutput {
        edges,
        total_symbols: registry.total_symbols(),
        resolved_relationships: resolved,
        unresolved_references: unresolved,
        symbols_by_file: registry.symbols_by_file(),
    }
}

/// Resolves every file's imports first: calls and renders prefer targets reachable
/// by a direct IMPORTS edge from the caller's file (spec §4.3 step 1), so the
/// per-file reachable set has to exist before the rest of Pass B runs.
fn resolve_imports(
    files: &mut [ParsedFileEntities],
    project_root: &Path,
    edges: &mut Vec<Edge>,
    resolved: &mut usize,
) -> HashMap<PathBuf, HashSet<PathBuf>> {
    let mut imports_by_file: HashMap<PathBuf, HashSet<PathBuf>> = HashMap::new();

    for parsed in files.iter_mut() {
        let Some(file_path) = parsed.file_path().cloned() else { continue };

        for import in parsed.imports.iter_mut() {
            let target = match &import.resolved_path {
                Some(p) => Some(p.clone()),
                None => resolve_relative_import(project_root, &file_path, &import.source),
            };

            let Some(target) = target else { continue };
            import.resolved_path = Some(target.clone());
            imports_by_file.entry(file_path.clone()).or_default().insert(target.clone());
            edges.push(Edge::Imports(ImportsEdge {
                from: EntityId::for_file(&file_path),
                to: EntityId::for_file(&target),
                specifiers: import.specifiers.clone(),
            }));
            *resolved += 1;
        }
    }

    imports_by_file
}

/// TS/JS relative-import resolution: only `./`- and `../`-prefixed specifiers are
/// intra-project (bare specifiers are node_modules packages and never resolve);
/// the first candidate extension or `index.*` that exists on disk under
/// `project_root` wins. Unlike the Python extractor's resolution (spec §4.2), this
/// runs in the resolver and is free to probe the filesystem — by the time Pass B
/// runs every file in the project has already been read once.
fn resolve_relative_import(project_root: &Path, from_file: &Path, source: &str) -> Option<PathBuf> {
    if !(source.starts_with("./") || source.starts_with("../")) {
        return None;
    }
    let dir = from_file.parent()?;
    let base = normalize(&dir.join(source));

    const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"];

    let mut candidates = vec![base.clone()];
    for ext in EXTENSIONS {
        candidates.push(base.with_extension(ext));
    }
    for ext in EXTENSIONS {
        candidates.push(base.join(format!("index.{ext}")));
    }

    candidates
        .into_iter()
        .find(|c| c.starts_with(project_root) && c.is_file())
}

/// Collapses `.`/`..` components without touching the filesystem (the path may not
/// exist yet at the point we need to compare it against candidates).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}

/// Implements the shared lookup policy (spec §4.3, steps 1-3): exactly one match in
/// the caller's own file wins outright; otherwise prefer exported candidates, then
/// candidates in files directly imported by the caller, then the deterministic
/// tie-break (smallest `startLine` in the lexicographically smallest file path).
fn resolve_name(
    name: &str,
    caller_file: &Path,
    registry: &SymbolRegistry,
    imports_by_file: &HashMap<PathBuf, HashSet<PathBuf>>,
    kind_filter: impl Fn(SymbolKind) -> bool,
) -> Option<SymbolInfo> {
    let candidates: Vec<SymbolInfo> = registry.candidates(name).into_iter().filter(|s| kind_filter(s.kind)).collect();
    if candidates.is_empty() {
        return None;
    }

    let own_file: Vec<&SymbolInfo> = candidates.iter().filter(|s| s.file == caller_file).collect();
    if own_file.len() == 1 {
        return Some(own_file[0].clone());
    }

    let exported: Vec<SymbolInfo> = candidates.iter().filter(|s| s.is_exported).cloned().collect();
    let pool = if exported.is_empty() { candidates } else { exported };

    let pool = match imports_by_file.get(caller_file) {
        Some(imported_files) => {
            let reachable: Vec<SymbolInfo> = pool.iter().filter(|s| imported_files.contains(&s.file)).cloned().collect();
            if reachable.is_empty() { pool } else { reachable }
        }
        None => pool,
    };

    pool.into_iter().min_by(|a, b| a.file.cmp(&b.file).then(a.start_line.cmp(&b.start_line)))
}

/// A call's `callerName` / a render's `componentName` always name an entity defined
/// in the same file (spec §4.2 "Enclosure") — when more than one overload shares
/// that name, the smallest `startLine` wins, the same deterministic tie-break used
/// everywhere else in Pass B.
fn find_function<'a>(parsed: &'a ParsedFileEntities, name: &str) -> Option<&'a FunctionEntity> {
    parsed.functions.iter().filter(|f| f.name == name).min_by_key(|f| f.start_line)
}

fn find_class<'a>(parsed: &'a ParsedFileEntities, name: &str) -> Option<&'a ClassEntity> {
    parsed.classes.iter().filter(|c| c.name == name).min_by_key(|c| c.start_line)
}

fn find_interface<'a>(parsed: &'a ParsedFileEntities, name: &str) -> Option<&'a InterfaceEntity> {
    parsed.interfaces.iter().filter(|i| i.name == name).min_by_key(|i| i.start_line)
}

fn find_component<'a>(parsed: &'a ParsedFileEntities, name: &str) -> Option<&'a ComponentEntity> {
    parsed.components.iter().filter(|c| c.name == name).min_by_key(|c| c.start_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use loom_core::FileEntity;

    fn file_entities(path: &str) -> ParsedFileEntities {
        ParsedFileEntities {
            file: Some(FileEntity {
                path: PathBuf::from(path),
                name: path.to_string(),
                extension: "ts".to_string(),
                loc: 10,
                last_modified: Utc::now(),
                hash: "h".to_string(),
            }),
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
    fn two_file_call_resolves_to_exported_function() {
        let mut a = file_entities("/src/a.ts");
        a.functions.push(func("fnA", "/src/a.ts", true, 1));
        a.call_refs.push(loom_core::parsed::CallRef {
            caller_name: "fnA".to_string(),
            callee_name: "fnB".to_string(),
            line: 5,
        });
        let mut b = file_entities("/src/b.ts");
        b.functions.push(func("fnB", "/src/b.ts", true, 1));

        let mut files = vec![a, b];
        let registry = SymbolRegistry::build(&files);
        let out = resolve(&mut files, &registry, Path::new("/src"));

        assert_eq!(out.resolved_relationships, 1);
        assert_eq!(out.unresolved_references, 0);
        assert_eq!(out.edges.len(), 1);
        match &out.edges[0] {
            Edge::Calls(c) => {
                assert_eq!(c.to.as_str(), "Function:/src/b.ts:fnB:1");
                assert_eq!(c.line, 5);
            }
            other => panic!("expected CALLS edge, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_exported_name_disambiguated_by_import() {
        let mut a = file_entities("/src/a.ts");
        a.functions.push(func("helper", "/src/a.ts", true, 1));
        let mut b = file_entities("/src/b.ts");
        b.functions.push(func("helper", "/src/b.ts", true, 1));
        let mut c = file_entities("/src/c.ts");
        c.call_refs.push(loom_core::parsed::CallRef {
            caller_name: "caller".to_string(),
            callee_name: "helper".to_string(),
            line: 2,
        });
        c.functions.push(func("caller", "/src/c.ts", true, 1));

        let mut files = vec![a, b, c];
        let registry = SymbolRegistry::build(&files);

        // No import edge from c.ts yet: tie-break picks lexicographically smallest path.
        let out = resolve(&mut files, &registry, Path::new("/src"));
        let Edge::Calls(call) = out.edges.iter().find(|e| matches!(e, Edge::Calls(_))).unwrap() else { unreachable!() };
        assert_eq!(call.to.as_str(), "Function:/src/a.ts:helper:1");
    }

    #[test]
    fn unresolved_reference_emits_no_edge() {
        let mut a = file_entities("/src/a.ts");
        a.functions.push(func("fnA", "/src/a.ts", true, 1));
        a.call_refs.push(loom_core::parsed::CallRef {
            caller_name: "fnA".to_string(),
            callee_name: "nowhere".to_string(),
            line: 5,
        });
        let mut files = vec![a];
        let registry = SymbolRegistry::build(&files);
        let out = resolve(&mut files, &registry, Path::new("/src"));
        assert_eq!(out.resolved_relationships, 0);
        assert_eq!(out.unresolved_references, 1);
        assert!(out.edges.is_empty());
    }

    #[test]
    fn resolving_twice_is_idempotent_same_edge_ids() {
        let mut a = file_entities("/src/a.ts");
        a.functions.push(func("fnA", "/src/a.ts", true, 1));
        a.call_refs.push(loom_core::parsed::CallRef {
            caller_name: "fnA".to_string(),
            callee_name: "fnB".to_string(),
            line: 5,
        });
        let mut b = file_entities("/src/b.ts");
        b.functions.push(func("fnB", "/src/b.ts", true, 1));

        let mut files = vec![a, b];
        let registry = SymbolRegistry::build(&files);
        let out1 = resolve(&mut files, &registry, Path::new("/src"));
        let out2 = resolve(&mut files, &registry, Path::new("/src"));
        let ids1: Vec<_> = out1.edges.iter().map(Edge::id).collect();
        let ids2: Vec<_> = out2.edges.iter().map(Edge::id).collect();
        assert_eq!(ids1, ids2);
    }
}
