//! DDL and index definitions (spec §4.4 `ensureIndexes`, §6 "Required indexes").
//!
//! Nodes and edges are stored as two tables; the full typed record
//! (`loom_core::Entity` / `loom_core::Edge`) round-trips through a JSON
//! `properties` column, while the columns the store itself needs to filter and
//! index on — label, name, file path, line — are hoisted out alongside it.

use rusqlite::Connection;

const CREATE_NODES: &str = "
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    name TEXT NOT NULL,
    file_path TEXT NOT NULL,
    line INTEGER,
    properties TEXT NOT NULL
)";

const CREATE_EDGES: &str = "
CREATE TABLE IF NOT EXISTS edges (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    properties TEXT NOT NULL
)";

const CREATE_META: &str = "
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

/// One statement per spec requirement: a range index on `File.path` (the `nodes`
/// table's `file_path` column doubles as this for every entity kind, File
/// included) and partial name indexes scoped to the three labels the spec names.
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_nodes_file_path ON nodes(file_path)",
    "CREATE INDEX IF NOT EXISTS idx_nodes_function_name ON nodes(name) WHERE label = 'Function'",
    "CREATE INDEX IF NOT EXISTS idx_nodes_class_name ON nodes(name) WHERE label = 'Class'",
    "CREATE INDEX IF NOT EXISTS idx_nodes_component_name ON nodes(name) WHERE label = 'Component'",
    "CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id)",
];

/// Idempotent by construction (`IF NOT EXISTS`); SQLite never raises a
/// duplicate-index error here, so the "tolerate already-exists" clause of the
/// spec's `ensureIndexes` contract is satisfied trivially rather than by
/// catching a specific error code.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = OFF; PRAGMA busy_timeout = 5000;")?;
    conn.execute(CREATE_NODES, [])?;
    conn.execute(CREATE_EDGES, [])?;
    conn.execute(CREATE_META, [])?;
    for stmt in INDEXES {
        conn.execute(stmt, [])?;
    }
    Ok(())
}
