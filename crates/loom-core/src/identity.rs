//! Deterministic identity strings for graph nodes and edges (spec §3.3).
//!
//! Identities are plain strings so the graph store can merge on them directly;
//! nothing here is a hash. Two parses of unchanged content must produce byte-identical
//! identities, which is what makes the upsert layer idempotent.

use std::fmt;
use std::path::Path;

/// Identity of a node (File or any ranged entity). Wraps the formatted string so
/// callers can't accidentally compare raw label/name/line tuples instead of the
/// canonical key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// `File:<absolutePath>`
    pub fn for_file(path: &Path) -> Self {
        EntityId(format!("File:{}", path.display()))
    }

    /// `<Label>:<filePath>:<name>:<startLine>` — used for every ranged entity.
    /// Variable entities pass their single `line` field as `start_line`.
    pub fn for_ranged(label: &str, file_path: &Path, name: &str, start_line: u32) -> Self {
        EntityId(format!("{}:{}:{}:{}", label, file_path.display(), name, start_line))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps an identity string already known to be well-formed — used when
    /// reading an `id` column back out of the graph store, where the string was
    /// produced by `for_file`/`for_ranged` on a previous write.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        EntityId(raw.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of an edge: `<Label>:<fromId>-><toId>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn new(label: &str, from: &EntityId, to: &EntityId) -> Self {
        EdgeId(format!("{}:{}->{}", label, from, to))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn file_identity_is_stable() {
        let p = PathBuf::from("/src/a.ts");
        assert_eq!(EntityId::for_file(&p).as_str(), "File:/src/a.ts");
    }

    #[test]
    fn ranged_identity_matches_spec_shape() {
        let p = PathBuf::from("/src/a.ts");
        let id = EntityId::for_ranged("Function", &p, "fnA", 1);
        assert_eq!(id.as_str(), "Function:/src/a.ts:fnA:1");
    }

    #[test]
    fn edge_identity_does_not_change_across_reparses() {
        let p = PathBuf::from("/src/a.ts");
        let from = EntityId::for_ranged("Function", &p, "fnA", 1);
        let to = EntityId::for_ranged("Function", &p, "fnB", 1);
        let e1 = EdgeId::new("CALLS", &from, &to);
        let e2 = EdgeId::new("CALLS", &from, &to);
        assert_eq!(e1, e2);
    }
}
