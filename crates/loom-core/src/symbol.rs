//! `SymbolInfo` is the unit the two-pass resolver indexes in Pass A and matches
//! against in Pass B (spec §4.3). It is deliberately a flat, cheap-to-clone record
//! rather than a reference into `ParsedFileEntities`, so the registry can be built
//! and shared without borrowing the original entity lists.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::identity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    Variable,
    Type,
    Component,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub file: PathBuf,
    pub kind: SymbolKind,
    pub is_exported: bool,
    pub start_line: u32,
    pub entity_id: EntityId,
}
