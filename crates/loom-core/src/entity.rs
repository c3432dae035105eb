//! Typed entity records (spec §3.1). Every non-`File` entity carries enough of its
//! own identity (`file_path`, `name`, `start_line`/`line`) to derive an [`EntityId`]
//! without consulting anything else — that's what makes Pass A of the resolver a
//! pure fold over these structs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    File,
    Function,
    Class,
    Interface,
    Variable,
    Type,
    Component,
    Import,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::File => "File",
            EntityKind::Function => "Function",
            EntityKind::Class => "Class",
            EntityKind::Interface => "Interface",
            EntityKind::Variable => "Variable",
            EntityKind::Type => "Type",
            EntityKind::Component => "Component",
            EntityKind::Import => "Import",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_rest: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeEntityKind {
    Type,
    Enum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    pub cyclomatic: u32,
    pub params: u32,
    pub lines: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntity {
    pub path: PathBuf,
    pub name: String,
    pub extension: String,
    pub loc: u32,
    /// ISO-8601.
    pub last_modified: DateTime<Utc>,
    /// Content digest, used by the incremental reparse path to skip unchanged files.
    pub hash: String,
}

impl FileEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_file(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub is_async: bool,
    pub is_arrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_generator: Option<bool>,
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<ComplexityMetrics>,
}

impl FunctionEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Function", &self.file_path, &self.name, self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl ClassEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Class", &self.file_path, &self.name, self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl InterfaceEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Interface", &self.file_path, &self.name, self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub line: u32,
    pub kind: VariableKind,
    pub is_exported: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl VariableEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Variable", &self.file_path, &self.name, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    pub kind: TypeEntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl TypeEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Type", &self.file_path, &self.name, self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntity {
    pub name: String,
    pub file_path: PathBuf,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<PropSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props_type: Option<String>,
}

impl ComponentEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Component", &self.file_path, &self.name, self.start_line)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// Imports don't have a stable `name`/`start_line` pair in the same sense as other
/// ranged entities — the spec identifies them by `source` instead. We key them the
/// same way as a ranged entity, using `source` as the "name" component, so cascade
/// delete and re-upsert still work uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportEntity {
    pub source: String,
    pub file_path: PathBuf,
    pub line: u32,
    pub is_default: bool,
    pub is_namespace: bool,
    pub specifiers: Vec<ImportSpecifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
}

impl ImportEntity {
    pub fn id(&self) -> EntityId {
        EntityId::for_ranged("Import", &self.file_path, &self.source, self.line)
    }
}

/// A type-erased view over any entity, used where the pipeline needs to treat all
/// kinds uniformly (batch upsert, identity-set diffing, search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Entity {
    File(FileEntity),
    Function(FunctionEntity),
    Class(ClassEntity),
    Interface(InterfaceEntity),
    Variable(VariableEntity),
    Type(TypeEntity),
    Component(ComponentEntity),
    Import(ImportEntity),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::File(e) => e.id(),
            Entity::Function(e) => e.id(),
            Entity::Class(e) => e.id(),
            Entity::Interface(e) => e.id(),
            Entity::Variable(e) => e.id(),
            Entity::Type(e) => e.id(),
            Entity::Component(e) => e.id(),
            Entity::Import(e) => e.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::File(_) => EntityKind::File,
            Entity::Function(_) => EntityKind::Function,
            Entity::Class(_) => EntityKind::Class,
            Entity::Interface(_) => EntityKind::Interface,
            Entity::Variable(_) => EntityKind::Variable,
            Entity::Type(_) => EntityKind::Type,
            Entity::Component(_) => EntityKind::Component,
            Entity::Import(_) => EntityKind::Import,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::File(e) => &e.name,
            Entity::Function(e) => &e.name,
            Entity::Class(e) => &e.name,
            Entity::Interface(e) => &e.name,
            Entity::Variable(e) => &e.name,
            Entity::Type(e) => &e.name,
            Entity::Component(e) => &e.name,
            Entity::Import(e) => &e.source,
        }
    }

    pub fn file_path(&self) -> &Path {
        match self {
            Entity::File(e) => &e.path,
            Entity::Function(e) => &e.file_path,
            Entity::Class(e) => &e.file_path,
            Entity::Interface(e) => &e.file_path,
            Entity::Variable(e) => &e.file_path,
            Entity::Type(e) => &e.file_path,
            Entity::Component(e) => &e.file_path,
            Entity::Import(e) => &e.file_path,
        }
    }

    /// Line used for serialization-stable ordering/display; `File` has none.
    pub fn start_line(&self) -> Option<u32> {
        match self {
            Entity::File(_) => None,
            Entity::Function(e) => Some(e.start_line),
            Entity::Class(e) => Some(e.start_line),
            Entity::Interface(e) => Some(e.start_line),
            Entity::Variable(e) => Some(e.line),
            Entity::Type(e) => Some(e.start_line),
            Entity::Component(e) => Some(e.start_line),
            Entity::Import(e) => Some(e.line),
        }
    }
}
