use serde::{Deserialize, Serialize};

/// Tolerances and naming seed for a `Plane`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    /// Namespace of the id generator; equal seeds replay equal ids
    pub id_seed: String,
    /// Two points closer than this on both axes occupy the same position
    pub coincidence_epsilon: f64,
    /// Tolerance of the vertex angle / interior angle relations
    pub correspondence_epsilon: f64,
    /// Tolerance of the formula consistency diagnostic
    pub consistency_epsilon: f64,
    /// Intersection denominators at or below this are treated as parallel
    pub parallel_epsilon: f64,
    /// Slack on the segment parameters so shared endpoints still intersect
    pub segment_tolerance: f64,
    /// Triangles with a smaller absolute signed area are collinear
    pub area_epsilon: f64,
    /// Default search radius for snapping
    pub snap_radius: f64,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            id_seed: "Plane".to_string(),
            coincidence_epsilon: 1e-6,
            correspondence_epsilon: 1e-6,
            consistency_epsilon: 1e-4,
            parallel_epsilon: 1e-10,
            segment_tolerance: 1e-9,
            area_epsilon: 1e-9,
            snap_radius: 8.0,
        }
    }
}

impl PlaneConfig {
    /// Parse a config from JSON; missing fields keep their defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
