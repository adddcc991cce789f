//! Entity graph: items, their kinds and the status lattice.

use crate::topo::EntityId;
use crate::variables::Variable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Determinacy of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unknown,
    Known,
    Fixed,
    Derived,
}

impl Status {
    pub fn is_determined(&self) -> bool {
        !matches!(self, Status::Unknown)
    }

    /// Asserted by the caller rather than computed.
    pub fn is_asserted(&self) -> bool {
        matches!(self, Status::Known | Status::Fixed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Unknown => "unknown",
            Status::Known => "known",
            Status::Fixed => "fixed",
            Status::Derived => "derived",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Status::Unknown),
            "known" => Ok(Status::Known),
            "fixed" => Ok(Status::Fixed),
            "derived" => Ok(Status::Derived),
            other => Err(format!("Unknown status '{}'", other)),
        }
    }
}

/// Display category tags used by table and label collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shape,
    Point,
    Line,
    Vertex,
    Triangle,
    Coordinate,
    Delta,
    Length,
    Angle,
    Midpoint,
    Centroid,
    Side,
}

#[derive(Debug, Clone)]
pub struct PointItem {
    pub x: EntityId,
    pub y: EntityId,
    pub draggable: bool,
    /// Dragging a transpose point translates its owning shape
    pub transpose: bool,
}

#[derive(Debug, Clone)]
pub struct LineItem {
    pub from: EntityId,
    pub to: EntityId,
    pub midpoint: EntityId,
    pub dx: EntityId,
    pub dy: EntityId,
    pub length: EntityId,
    pub angle: EntityId,
    pub vertices: Vec<EntityId>,
}

#[derive(Debug, Clone)]
pub struct VertexItem {
    /// The line whose recalculation discovered the vertex
    pub line_a: EntityId,
    pub line_b: EntityId,
    pub position: EntityId,
    pub angle: EntityId,
    pub triangles: Vec<EntityId>,
}

/// `sides[i]` is opposite `vertices[i]`; `angles[i]` is the interior angle at `vertices[i]`.
#[derive(Debug, Clone)]
pub struct TriangleItem {
    pub vertices: [EntityId; 3],
    pub sides: [EntityId; 3],
    pub angles: [EntityId; 3],
    pub centroid: EntityId,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Variable(Variable),
    Point(PointItem),
    Line(LineItem),
    Vertex(VertexItem),
    Triangle(TriangleItem),
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Variable(_) => "variable",
            ItemKind::Point(_) => "point",
            ItemKind::Line(_) => "line",
            ItemKind::Vertex(_) => "vertex",
            ItemKind::Triangle(_) => "triangle",
        }
    }
}

/// A node of the entity tree.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    pub owner: Option<EntityId>,
    pub children: Vec<EntityId>,
    pub status: Status,
    pub reason: Option<String>,
    pub categories: Vec<Category>,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(id: EntityId, name: String, kind: ItemKind, categories: Vec<Category>) -> Self {
        Self {
            id,
            name,
            owner: None,
            children: Vec::new(),
            status: Status::Unknown,
            reason: None,
            categories,
            kind,
        }
    }

    pub fn is_determined(&self) -> bool {
        self.status.is_determined()
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            ItemKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&PointItem> {
        match &self.kind {
            ItemKind::Point(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&LineItem> {
        match &self.kind {
            ItemKind::Line(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_vertex(&self) -> Option<&VertexItem> {
        match &self.kind {
            ItemKind::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_triangle(&self) -> Option<&TriangleItem> {
        match &self.kind {
            ItemKind::Triangle(t) => Some(t),
            _ => None,
        }
    }
}

/// Context menu capabilities of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_set_known: bool,
    pub can_set_fixed: bool,
    pub can_set_unknown: bool,
    pub can_set_value: bool,
    pub can_show_derivation: bool,
}
