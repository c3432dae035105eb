//! Typed edge records (spec §3.2).

use serde::{Deserialize, Serialize};

use crate::entity::ImportSpecifier;
use crate::identity::{EdgeId, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Imports,
    Calls,
    Extends,
    Implements,
    Renders,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            EdgeKind::Contains => "CONTAINS",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::Calls => "CALLS",
            EdgeKind::Extends => "EXTENDS",
            EdgeKind::Implements => "IMPLEMENTS",
            EdgeKind::Renders => "RENDERS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainsEdge {
    pub from: EntityId,
    pub to: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportsEdge {
    pub from: EntityId,
    pub to: EntityId,
    pub specifiers: Vec<ImportSpecifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallsEdge {
    pub from: EntityId,
    pub to: EntityId,
    pub line: u32,
    /// Incremented, never reset, each time this exact (from, to) pair is upserted
    /// again (spec I5 / P7).
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendsEdge {
    pub from: EntityId,
    pub to: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementsEdge {
    pub from: EntityId,
    pub to: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendersEdge {
    pub from: EntityId,
    pub to: EntityId,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Edge {
    Contains(ContainsEdge),
    Imports(ImportsEdge),
    Calls(CallsEdge),
    Extends(ExtendsEdge),
    Implements(ImplementsEdge),
    Renders(RendersEdge),
}

impl Edge {
    pub fn kind(&self) -> EdgeKind {
        match self {
            Edge::Contains(_) => EdgeKind::Contains,
            Edge::Imports(_) => EdgeKind::Imports,
            Edge::Calls(_) => EdgeKind::Calls,
            Edge::Extends(_) => EdgeKind::Extends,
            Edge::Implements(_) => EdgeKind::Implements,
            Edge::Renders(_) => EdgeKind::Renders,
        }
    }

    pub fn from(&self) -> &EntityId {
        match self {
            Edge::Contains(e) => &e.from,
            Edge::Imports(e) => &e.from,
            Edge::Calls(e) => &e.from,
            Edge::Extends(e) => &e.from,
            Edge::Implements(e) => &e.from,
            Edge::Renders(e) => &e.from,
        }
    }

    pub fn to(&self) -> &EntityId {
        match self {
            Edge::Contains(e) => &e.to,
            Edge::Imports(e) => &e.to,
            Edge::Calls(e) => &e.to,
            Edge::Extends(e) => &e.to,
            Edge::Implements(e) => &e.to,
            Edge::Renders(e) => &e.to,
        }
    }

    pub fn id(&self) -> EdgeId {
        EdgeId::new(self.kind().label(), self.from(), self.to())
    }
}
