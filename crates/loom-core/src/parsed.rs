//! Output of a single-file extraction (spec §4.2): the typed entities plus the
//! four lists of unresolved references that Pass B of the resolver consumes.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entity::{
    ClassEntity, ComponentEntity, Entity, FileEntity, FunctionEntity, ImportEntity,
    InterfaceEntity, TypeEntity, VariableEntity,
};
use crate::identity::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRef {
    /// Name of the innermost enclosing function/method. Calls with no enclosing
    /// function are dropped at extraction time (spec §4.2 "Enclosure") and never
    /// reach this struct.
    pub caller_name: String,
    pub callee_name: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InheritanceKind {
    Extends,
    Implements,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceRef {
    pub child_name: String,
    pub parent_name: String,
    pub kind: InheritanceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRef {
    pub component_name: String,
    pub rendered_component_name: String,
    pub line: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedFileEntities {
    /// `None` only while a file is mid-construction in tests; a real extraction
    /// always produces a `File` record before anything else.
    pub file: Option<FileEntity>,
    pub functions: Vec<FunctionEntity>,
    pub classes: Vec<ClassEntity>,
    pub interfaces: Vec<InterfaceEntity>,
    pub variables: Vec<VariableEntity>,
    pub types: Vec<TypeEntity>,
    pub components: Vec<ComponentEntity>,
    pub imports: Vec<ImportEntity>,
    pub call_refs: Vec<CallRef>,
    pub inheritance_refs: Vec<InheritanceRef>,
    pub render_refs: Vec<RenderRef>,
}

impl ParsedFileEntities {
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().map(|f| &f.path)
    }

    /// Every entity this file currently defines, `File` included. Consumed by C4's
    /// `batchUpsert` and by the incremental reparse's identity-set diff (spec §4.4).
    pub fn all_entities(&self) -> Vec<Entity> {
        let mut out = Vec::new();
        if let Some(f) = &self.file {
            out.push(Entity::File(f.clone()));
        }
        out.extend(self.functions.iter().cloned().map(Entity::Function));
        out.extend(self.classes.iter().cloned().map(Entity::Class));
        out.extend(self.interfaces.iter().cloned().map(Entity::Interface));
        out.extend(self.variables.iter().cloned().map(Entity::Variable));
        out.extend(self.types.iter().cloned().map(Entity::Type));
        out.extend(self.components.iter().cloned().map(Entity::Component));
        out.extend(self.imports.iter().cloned().map(Entity::Import));
        out
    }

    /// The non-File identity set for this file — what incremental reparse diffs
    /// against the previously stored set to decide what to cascade-delete.
    pub fn entity_ids(&self) -> HashSet<EntityId> {
        self.all_entities()
            .into_iter()
            .filter(|e| !matches!(e, Entity::File(_)))
            .map(|e| e.id())
            .collect()
    }
}
