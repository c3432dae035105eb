//! The Graph Upsert Layer (spec §4.4): translates entity and edge records into
//! idempotent writes against a SQLite-backed property-graph store.
//!
//! Every write method takes the calling task off the async executor via
//! `spawn_blocking`, since `rusqlite` is synchronous; the per-file `tokio::Mutex`
//! serializes writers of the same file path while leaving different files free to
//! run concurrently (spec §5 "Ordering guarantees").

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex as AsyncMutex;

use loom_core::entity::{Entity, EntityKind, FileEntity};
use loom_core::identity::EntityId;
use loom_core::{CallsEdge, ContainsEdge, Edge, ParsedFileEntities, StoreError};

use crate::pool::ConnectionPool;

fn sqlite_err(e: rusqlite::Error) -> StoreError {
    StoreError::QueryFailed(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> StoreError {
    StoreError::QueryFailed(format!("store task panicked: {e}"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GraphStats {
    pub nodes_by_label: HashMap<String, usize>,
    pub edges_by_label: HashMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub id: EntityId,
    pub name: String,
    pub kind: String,
    pub file_path: PathBuf,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileSubgraph {
    pub file: Entity,
    pub entities: Vec<Entity>,
    pub related: Vec<Entity>,
    pub edges: Vec<Edge>,
}

/// External property-graph store, reached only through this struct (spec
/// GLOSSARY "Property-graph store" — accessed only through the C4 contract).
pub struct GraphStore {
    pool: ConnectionPool,
    file_locks: DashMap<PathBuf, Arc<AsyncMutex<()>>>,
}

impl GraphStore {
    pub fn open(path: &Path, pool_size: usize) -> Result<Self, StoreError> {
        let pool = ConnectionPool::open(path, pool_size).map_err(sqlite_err)?;
        Ok(GraphStore { pool, file_locks: DashMap::new() })
    }

    pub fn open_in_memory(pool_size: usize) -> Result<Self, StoreError> {
        let pool = ConnectionPool::open_in_memory(pool_size).map_err(sqlite_err)?;
        Ok(GraphStore { pool, file_locks: DashMap::new() })
    }

    fn file_lock(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        self.file_locks.entry(path.to_path_buf()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Idempotent; every slot already ran [`crate::schema::ensure_schema`] at
    /// open time, so this just re-runs the same `IF NOT EXISTS` statements —
    /// cheap, and tolerant of being called any number of times (spec
    /// `ensureIndexes`).
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let conn = self.pool.acquire();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.lock().unwrap();
            crate::schema::ensure_schema(&conn).map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    pub async fn upsert_file(&self, file: &FileEntity) -> Result<(), StoreError> {
        let lock = self.file_lock(&file.path);
        let _guard = lock.lock().await;
        let conn = self.pool.acquire();
        let file = file.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.lock().unwrap();
            upsert_file_row(&conn, &file).map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Merges a non-File entity by identity and ensures the CONTAINS edge from
    /// its File exists (spec I1: exactly one CONTAINS edge per non-File node).
    pub async fn upsert_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        if matches!(entity, Entity::File(_)) {
            return Err(StoreError::QueryFailed("upsert_entity called with a File entity; use upsert_file".into()));
        }
        let file_path = entity.file_path().to_path_buf();
        let lock = self.file_lock(&file_path);
        let _guard = lock.lock().await;
        let conn = self.pool.acquire();
        let entity = entity.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.lock().unwrap();
            upsert_entity_row(&conn, &entity).map_err(sqlite_err)?;
            ensure_contains_edge(&conn, &entity).map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Upserts a File and every entity it directly contains in one pass (spec
    /// §4.4 `batchUpsert`'s first two steps; the edge phase is
    /// [`GraphStore::upsert_edges`], run separately once every file in the batch
    /// has committed its entities).
    pub async fn upsert_file_entities(&self, parsed: &ParsedFileEntities) -> Result<(), StoreError> {
        let Some(file) = parsed.file.clone() else { return Ok(()) };
        let lock = self.file_lock(&file.path);
        let _guard = lock.lock().await;
        let conn = self.pool.acquire();
        let entities: Vec<Entity> =
            parsed.all_entities().into_iter().filter(|e| !matches!(e, Entity::File(_))).collect();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = conn.lock().unwrap();
            let tx = conn.transaction().map_err(sqlite_err)?;
            upsert_file_row(&tx, &file).map_err(sqlite_err)?;
            for entity in &entities {
                upsert_entity_row(&tx, entity).map_err(sqlite_err)?;
                ensure_contains_edge(&tx, entity).map_err(sqlite_err)?;
            }
            tx.commit().map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Writes every edge in `edges`, routing CALLS edges through the
    /// count-coalescing merge (spec I5 / P7) and every other kind through a plain
    /// identity merge. Callers must only invoke this once both edges' endpoints
    /// are already committed (spec "ordering is a contract, not an implementation
    /// choice").
    pub async fn upsert_edges(&self, edges: &[Edge]) -> Result<(), StoreError> {
        if edges.is_empty() {
            return Ok(());
        }
        let conn = self.pool.acquire();
        let edges = edges.to_vec();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = conn.lock().unwrap();
            let tx = conn.transaction().map_err(sqlite_err)?;
            for edge in &edges {
                match edge {
                    Edge::Calls(c) => upsert_call_edge(&tx, &c.from, &c.to, c.line).map_err(sqlite_err)?,
                    other => upsert_plain_edge(&tx, other).map_err(sqlite_err)?,
                }
            }
            tx.commit().map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Cascade delete (spec I4 / S5): the File node, every node whose identity's
    /// file path is this one, and every edge touching any of them — one atomic
    /// transaction.
    pub async fn delete_file_entities(&self, path: &Path) -> Result<(), StoreError> {
        let lock = self.file_lock(path);
        let _guard = lock.lock().await;
        let conn = self.pool.acquire();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = conn.lock().unwrap();
            let tx = conn.transaction().map_err(sqlite_err)?;
            let file_path_str = path.to_string_lossy().into_owned();
            let mut ids: Vec<String> = {
                let mut stmt = tx.prepare("SELECT id FROM nodes WHERE file_path = ?1").map_err(sqlite_err)?;
                let rows = stmt.query_map([&file_path_str], |r| r.get::<_, String>(0)).map_err(sqlite_err)?;
                rows.collect::<Result<_, _>>().map_err(sqlite_err)?
            };
            ids.push(EntityId::for_file(&path).as_str().to_string());
            ids.sort();
            ids.dedup();
            delete_ids(&tx, &ids).map_err(sqlite_err)?;
            tx.commit().map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Deletes specific nodes (and every edge touching them) without touching the
    /// rest of their file — the finer-grained half of incremental reparse's step 4
    /// (spec §4.4): only entities whose identity dropped out of the newly parsed
    /// set are removed, not the whole file.
    pub async fn delete_entities(&self, file_path: &Path, ids: &[EntityId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let lock = self.file_lock(file_path);
        let _guard = lock.lock().await;
        let conn = self.pool.acquire();
        let ids: Vec<String> = ids.iter().map(|i| i.as_str().to_string()).collect();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut conn = conn.lock().unwrap();
            let tx = conn.transaction().map_err(sqlite_err)?;
            delete_ids(&tx, &ids).map_err(sqlite_err)?;
            tx.commit().map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// Removes every non-CONTAINS edge originating from an entity in any of
    /// `files`, in preparation for the incremental reparse's scoped re-resolution
    /// (spec §4.4 step 5 "rewriting affected edges"). CONTAINS is excluded: it is
    /// re-established by the entity upsert that already ran earlier in the same
    /// reparse, not by the resolver.
    pub async fn delete_outgoing_edges_from_files(&self, files: &[PathBuf]) -> Result<(), StoreError> {
        if files.is_empty() {
            return Ok(());
        }
        let conn = self.pool.acquire();
        let files: Vec<String> = files.iter().map(|f| f.to_string_lossy().into_owned()).collect();
        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.lock().unwrap();
            let placeholders = files.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "DELETE FROM edges WHERE label != 'CONTAINS' AND from_id IN (SELECT id FROM nodes WHERE file_path IN ({placeholders}))"
            );
            conn.execute(&sql, rusqlite::params_from_iter(files.iter())).map_err(sqlite_err)?;
            Ok(())
        })
        .await
        .map_err(join_err)?
    }

    /// Distinct file paths with at least one edge pointing at a node inside
    /// `path` — the "references whose target is in the touched file" half of the
    /// incremental reparse's scoping (spec §4.4 step 5).
    pub async fn file_paths_referencing(&self, path: &Path) -> Result<HashSet<PathBuf>, StoreError> {
        let conn = self.pool.acquire();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<HashSet<PathBuf>, StoreError> {
            let conn = conn.lock().unwrap();
            let file_path_str = path.to_string_lossy().into_owned();
            let mut stmt = conn
                .prepare(
                    "SELECT DISTINCT src.file_path FROM edges e
                     JOIN nodes dst ON dst.id = e.to_id
                     JOIN nodes src ON src.id = e.from_id
                     WHERE dst.file_path = ?1 AND src.file_path != ?1",
                )
                .map_err(sqlite_err)?;
            let rows = stmt.query_map([&file_path_str], |r| r.get::<_, String>(0)).map_err(sqlite_err)?;
            let mut out = HashSet::new();
            for row in rows {
                out.insert(PathBuf::from(row.map_err(sqlite_err)?));
            }
            Ok(out)
        })
        .await
        .map_err(join_err)?
    }

    /// The identity set currently stored for `path`, excluding the File node
    /// itself — what incremental reparse (spec §4.4) diffs the freshly parsed
    /// set against to decide what to cascade-delete.
    pub async fn stored_identity_set(&self, path: &Path) -> Result<HashSet<EntityId>, StoreError> {
        let conn = self.pool.acquire();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<HashSet<EntityId>, StoreError> {
            let conn = conn.lock().unwrap();
            let file_path_str = path.to_string_lossy().into_owned();
            let mut stmt = conn
                .prepare("SELECT id FROM nodes WHERE file_path = ?1 AND label != 'File'")
                .map_err(sqlite_err)?;
            let rows = stmt
                .query_map([&file_path_str], |r| r.get::<_, String>(0))
                .map_err(sqlite_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(sqlite_err)?;
            Ok(rows.into_iter().map(EntityId::from_raw).collect())
        })
        .await
        .map_err(join_err)?
    }

    pub async fn stats(&self) -> Result<GraphStats, StoreError> {
        let conn = self.pool.acquire();
        tokio::task::spawn_blocking(move || -> Result<GraphStats, StoreError> {
            let conn = conn.lock().unwrap();
            let mut nodes_by_label = HashMap::new();
            {
                let mut stmt = conn.prepare("SELECT label, COUNT(*) FROM nodes GROUP BY label").map_err(sqlite_err)?;
                let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)? as usize))).map_err(sqlite_err)?;
                for row in rows {
                    let (label, count) = row.map_err(sqlite_err)?;
                    nodes_by_label.insert(label, count);
                }
            }
            let mut edges_by_label = HashMap::new();
            {
                let mut stmt = conn.prepare("SELECT label, COUNT(*) FROM edges GROUP BY label").map_err(sqlite_err)?;
                let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)? as usize))).map_err(sqlite_err)?;
                for row in rows {
                    let (label, count) = row.map_err(sqlite_err)?;
                    edges_by_label.insert(label, count);
                }
            }
            Ok(GraphStats { nodes_by_label, edges_by_label })
        })
        .await
        .map_err(join_err)?
    }

    /// Case-insensitive substring match on `name` over the requested node labels
    /// (spec §6 "search(term, types?, limit)").
    pub async fn search(&self, term: &str, kinds: Option<&[EntityKind]>, limit: usize) -> Result<Vec<SearchHit>, StoreError> {
        let conn = self.pool.acquire();
        let term = format!("%{}%", term.to_lowercase());
        let labels: Option<Vec<&'static str>> = kinds.map(|ks| ks.iter().map(|k| k.label()).collect());
        tokio::task::spawn_blocking(move || -> Result<Vec<SearchHit>, StoreError> {
            let conn = conn.lock().unwrap();
            let sql = match &labels {
                Some(ls) => format!(
                    "SELECT id, label, name, file_path, line FROM nodes WHERE LOWER(name) LIKE ?1 AND label IN ({}) LIMIT ?2",
                    ls.iter().map(|l| format!("'{l}'")).collect::<Vec<_>>().join(",")
                ),
                None => "SELECT id, label, name, file_path, line FROM nodes WHERE LOWER(name) LIKE ?1 LIMIT ?2".to_string(),
            };
            let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
            let rows = stmt
                .query_map(params![term, limit as i64], |r| {
                    Ok(SearchHit {
                        id: EntityId::from_raw(r.get::<_, String>(0)?),
                        kind: r.get::<_, String>(1)?,
                        name: r.get::<_, String>(2)?,
                        file_path: PathBuf::from(r.get::<_, String>(3)?),
                        line: r.get::<_, Option<i64>>(4)?.map(|n| n as u32),
                    })
                })
                .map_err(sqlite_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
        })
        .await
        .map_err(join_err)?
    }

    /// The File plus all CONTAINS children and their direct related nodes/edges
    /// (spec §6 query contract).
    pub async fn file_subgraph(&self, path: &Path) -> Result<Option<FileSubgraph>, StoreError> {
        let conn = self.pool.acquire();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<Option<FileSubgraph>, StoreError> {
            let conn = conn.lock().unwrap();
            let file_id = EntityId::for_file(&path);
            let Some(file_json) = fetch_node_properties(&conn, file_id.as_str()).map_err(sqlite_err)? else {
                return Ok(None);
            };
            let file: Entity = serde_json::from_str(&file_json).map_err(json_err)?;

            let file_path_str = path.to_string_lossy().into_owned();
            let mut own_ids = HashSet::new();
            own_ids.insert(file_id.as_str().to_string());
            let mut entities = Vec::new();
            {
                let mut stmt = conn
                    .prepare("SELECT id, properties FROM nodes WHERE file_path = ?1 AND label != 'File'")
                    .map_err(sqlite_err)?;
                let rows = stmt
                    .query_map([&file_path_str], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))
                    .map_err(sqlite_err)?;
                for row in rows {
                    let (id, json) = row.map_err(sqlite_err)?;
                    own_ids.insert(id);
                    entities.push(serde_json::from_str::<Entity>(&json).map_err(json_err)?);
                }
            }

            let placeholders = own_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let sql = format!(
                "SELECT id, label, from_id, to_id, properties FROM edges WHERE from_id IN ({placeholders}) OR to_id IN ({placeholders})"
            );
            let own_ids_vec: Vec<String> = own_ids.iter().cloned().collect();
            let id_params: Vec<String> = own_ids_vec.iter().chain(own_ids_vec.iter()).cloned().collect();
            let mut edges = Vec::new();
            let mut related_ids = HashSet::new();
            {
                let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(id_params), |r| {
                        Ok((r.get::<_, String>(2)?, r.get::<_, String>(3)?, r.get::<_, String>(4)?))
                    })
                    .map_err(sqlite_err)?;
                for row in rows {
                    let (from_id, to_id, json) = row.map_err(sqlite_err)?;
                    edges.push(serde_json::from_str::<Edge>(&json).map_err(json_err)?);
                    if !own_ids.contains(&from_id) {
                        related_ids.insert(from_id);
                    }
                    if !own_ids.contains(&to_id) {
                        related_ids.insert(to_id);
                    }
                }
            }

            let mut related = Vec::new();
            for id in &related_ids {
                if let Some(json) = fetch_node_properties(&conn, id).map_err(sqlite_err)? {
                    related.push(serde_json::from_str::<Entity>(&json).map_err(json_err)?);
                }
            }

            Ok(Some(FileSubgraph { file, entities, related, edges }))
        })
        .await
        .map_err(join_err)?
    }
}

/// Shared by `delete_file_entities` and `delete_entities`: delete every edge
/// touching any id in the set, then the nodes themselves.
fn delete_ids(conn: &Connection, ids: &[String]) -> rusqlite::Result<()> {
    for id in ids {
        conn.execute("DELETE FROM edges WHERE from_id = ?1 OR to_id = ?1", [id])?;
    }
    for id in ids {
        conn.execute("DELETE FROM nodes WHERE id = ?1", [id])?;
    }
    Ok(())
}

fn json_err(e: serde_json::Error) -> StoreError {
    StoreError::QueryFailed(format!("corrupt stored properties: {e}"))
}

fn fetch_node_properties(conn: &Connection, id: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT properties FROM nodes WHERE id = ?1", [id], |r| r.get(0)).optional()
}

fn upsert_file_row(conn: &Connection, file: &FileEntity) -> rusqlite::Result<()> {
    let entity = Entity::File(file.clone());
    let id = entity.id();
    let json = serde_json::to_string(&entity).expect("FileEntity always serializes");
    conn.execute(
        "INSERT INTO nodes (id, label, name, file_path, line, properties) VALUES (?1, 'File', ?2, ?3, NULL, ?4)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, file_path = excluded.file_path, properties = excluded.properties",
        params![id.as_str(), file.name, file.path.to_string_lossy(), json],
    )?;
    Ok(())
}

fn upsert_entity_row(conn: &Connection, entity: &Entity) -> rusqlite::Result<()> {
    let id = entity.id();
    let json = serde_json::to_string(entity).expect("Entity always serializes");
    conn.execute(
        "INSERT INTO nodes (id, label, name, file_path, line, properties) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, file_path = excluded.file_path, line = excluded.line, properties = excluded.properties",
        params![
            id.as_str(),
            entity.kind().label(),
            entity.name(),
            entity.file_path().to_string_lossy(),
            entity.start_line(),
            json
        ],
    )?;
    Ok(())
}

fn ensure_contains_edge(conn: &Connection, entity: &Entity) -> rusqlite::Result<()> {
    let from = EntityId::for_file(entity.file_path());
    let to = entity.id();
    let edge = Edge::Contains(ContainsEdge { from: from.clone(), to: to.clone() });
    upsert_plain_edge(conn, &edge)
}

fn upsert_plain_edge(conn: &Connection, edge: &Edge) -> rusqlite::Result<()> {
    let id = edge.id();
    let json = serde_json::to_string(edge).expect("Edge always serializes");
    conn.execute(
        "INSERT INTO edges (id, label, from_id, to_id, properties) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET properties = excluded.properties",
        params![id.as_str(), edge.kind().label(), edge.from().as_str(), edge.to().as_str(), json],
    )?;
    Ok(())
}

fn upsert_call_edge(conn: &Connection, from: &EntityId, to: &EntityId, line: u32) -> rusqlite::Result<()> {
    let id = loom_core::identity::EdgeId::new("CALLS", from, to);
    let existing: Option<String> =
        conn.query_row("SELECT properties FROM edges WHERE id = ?1", [id.as_str()], |r| r.get(0)).optional()?;

    let call = match existing {
        Some(json) => {
            let Edge::Calls(mut c) = serde_json::from_str::<Edge>(&json).expect("stored CALLS edge is well-formed") else {
                unreachable!("id namespaced by label CALLS")
            };
            c.count += 1;
            c
        }
        None => CallsEdge { from: from.clone(), to: to.clone(), line, count: 1 },
    };

    let json = serde_json::to_string(&Edge::Calls(call)).expect("Edge always serializes");
    conn.execute(
        "INSERT INTO edges (id, label, from_id, to_id, properties) VALUES (?1, 'CALLS', ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET properties = excluded.properties",
        params![id.as_str(), from.as_str(), to.as_str(), json],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use loom_core::entity::{ClassEntity, FunctionEntity};

    fn file(path: &str) -> FileEntity {
        FileEntity {
            path: PathBuf::from(path),
            name: path.to_string(),
            extension: "ts".to_string(),
            loc: 10,
            last_modified: Utc::now(),
            hash: "h".to_string(),
        }
    }

    fn func(name: &str, path: &str, line: u32) -> FunctionEntity {
        FunctionEntity {
            name: name.to_string(),
            file_path: PathBuf::from(path),
            start_line: line,
            end_line: line + 2,
            is_exported: true,
            is_async: false,
            is_arrow: false,
            is_generator: None,
            params: vec![],
            return_type: None,
            docstring: None,
            complexity: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_delete_leaves_nothing_for_file() {
        let store = GraphStore::open_in_memory(2).unwrap();
        let mut parsed = ParsedFileEntities { file: Some(file("/src/x.ts")), ..Default::default() };
        parsed.functions.push(func("a", "/src/x.ts", 1));
        parsed.classes.push(ClassEntity {
            name: "C".into(),
            file_path: PathBuf::from("/src/x.ts"),
            start_line: 5,
            end_line: 10,
            is_exported: true,
            is_abstract: false,
            extends: None,
            implements: None,
            docstring: None,
        });

        store.upsert_file_entities(&parsed).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.nodes_by_label.get("Function"), Some(&1));
        assert_eq!(stats.edges_by_label.get("CONTAINS"), Some(&2));

        store.delete_file_entities(Path::new("/src/x.ts")).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert!(stats.nodes_by_label.is_empty());
        assert!(stats.edges_by_label.is_empty());
    }

    #[tokio::test]
    async fn repeated_call_edge_upsert_increments_count() {
        let store = GraphStore::open_in_memory(2).unwrap();
        let mut a = ParsedFileEntities { file: Some(file("/a.ts")), ..Default::default() };
        a.functions.push(func("fnA", "/a.ts", 1));
        let mut b = ParsedFileEntities { file: Some(file("/b.ts")), ..Default::default() };
        b.functions.push(func("fnB", "/b.ts", 1));
        store.upsert_file_entities(&a).await.unwrap();
        store.upsert_file_entities(&b).await.unwrap();

        let from = EntityId::for_ranged("Function", Path::new("/a.ts"), "fnA", 1);
        let to = EntityId::for_ranged("Function", Path::new("/b.ts"), "fnB", 1);
        let edge = Edge::Calls(CallsEdge { from: from.clone(), to: to.clone(), line: 3, count: 1 });

        store.upsert_edges(&[edge.clone()]).await.unwrap();
        store.upsert_edges(&[edge]).await.unwrap();
        store.upsert_edges(&[Edge::Calls(CallsEdge { from, to, line: 3, count: 1 })]).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.edges_by_label.get("CALLS"), Some(&1));
    }

    #[tokio::test]
    async fn reparsing_unchanged_content_is_a_no_op() {
        let store = GraphStore::open_in_memory(2).unwrap();
        let mut parsed = ParsedFileEntities { file: Some(file("/a.ts")), ..Default::default() };
        parsed.functions.push(func("fnA", "/a.ts", 1));

        store.upsert_file_entities(&parsed).await.unwrap();
        let first = store.stats().await.unwrap();
        store.upsert_file_entities(&parsed).await.unwrap();
        let second = store.stats().await.unwrap();
        assert_eq!(first, second);
    }
}
