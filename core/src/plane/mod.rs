//! The plane: entity graph, local solve rules and the propagation loop.

pub mod types;
pub mod events;
pub mod container;
pub mod point;
pub mod line;
pub mod vertex;
pub mod triangle;
pub mod attributes;
pub mod snap;
pub mod report;

pub use types::{Capabilities, Category, Item, ItemKind, LineItem, PointItem, Status, TriangleItem, VertexItem};
pub use events::{Observer, PlaneEvent};
pub use container::Plane;
pub use triangle::TriangleMetrics;
pub use attributes::{Attributes, PendingReference};
pub use snap::{SnapPoint, SnapType};
pub use report::{format_literal, DerivationStep, Inconsistency, Row};

#[cfg(test)]
mod tests_status;
#[cfg(test)]
mod tests_line;
#[cfg(test)]
mod tests_vertex;
#[cfg(test)]
mod tests_attributes;
