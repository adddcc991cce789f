//! Snap point detection for the interaction layer.
//!
//! Every point in the plane is a snap candidate; its type follows from what owns it.

use super::container::Plane;
use super::types::ItemKind;
use crate::geometry::utils_2d::distance;
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapType {
    /// Line endpoint
    Endpoint,
    /// Intersection of two lines
    Vertex,
    /// Free standing point
    Point,
    /// Line midpoint
    Midpoint,
    /// Triangle centroid
    Centroid,
}

impl SnapType {
    /// Priority for snap types (lower = higher priority).
    /// Breaks ties between candidates at the same distance.
    pub fn priority(&self) -> u8 {
        match self {
            SnapType::Endpoint => 1,
            SnapType::Vertex => 2,
            SnapType::Point => 3,
            SnapType::Midpoint => 4,
            SnapType::Centroid => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapPoint {
    pub position: [f64; 2],
    pub snap_type: SnapType,
    /// The point item snapped to
    pub entity_id: EntityId,
    /// Distance from cursor (for sorting)
    pub distance: f64,
}

impl Plane {
    fn snap_type_of(&self, point: EntityId) -> Option<SnapType> {
        let item = self.get(point)?;
        let p = item.as_point()?;
        let Some(owner) = item.owner.and_then(|o| self.get(o)) else {
            return Some(SnapType::Point);
        };
        Some(match &owner.kind {
            ItemKind::Line(_) if p.transpose => SnapType::Midpoint,
            ItemKind::Line(_) => SnapType::Endpoint,
            ItemKind::Vertex(_) => SnapType::Vertex,
            ItemKind::Triangle(_) => SnapType::Centroid,
            _ => SnapType::Point,
        })
    }

    /// All points within `radius` of the cursor.
    pub fn find_snap_points(&self, cursor: [f64; 2], radius: f64) -> Vec<SnapPoint> {
        self.items()
            .filter(|i| i.as_point().is_some())
            .filter_map(|i| {
                let position = self.coords(i.id);
                let d = distance(cursor, position);
                if d <= radius {
                    Some(SnapPoint {
                        position,
                        snap_type: self.snap_type_of(i.id)?,
                        entity_id: i.id,
                        distance: d,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// Closest snap point; `radius` defaults to the configured snap radius.
    pub fn nearest_snap_point(&self, cursor: [f64; 2], radius: Option<f64>) -> Option<SnapPoint> {
        let radius = radius.unwrap_or(self.config.snap_radius);
        closest(self.find_snap_points(cursor, radius))
    }

    /// Closest point a drag could start from.
    pub fn nearest_draggable_point(&self, cursor: [f64; 2], radius: Option<f64>) -> Option<SnapPoint> {
        let radius = radius.unwrap_or(self.config.snap_radius);
        let snaps = self
            .find_snap_points(cursor, radius)
            .into_iter()
            .filter(|s| self.point(s.entity_id).map_or(false, |p| p.draggable))
            .collect();
        closest(snaps)
    }
}

fn closest(mut snaps: Vec<SnapPoint>) -> Option<SnapPoint> {
    snaps.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.snap_type.priority().cmp(&b.snap_type.priority()))
    });
    snaps.into_iter().next()
}
