use nalgebra as na;

pub type Point2 = na::Point2<f64>;
pub type Vector2 = na::Vector2<f64>;

/// Shortest side length still treated as a real side.
pub const EPSILON: f64 = 1e-6;

pub mod intersection;
pub use intersection::*;

pub mod utils_2d;

pub fn to_point(p: [f64; 2]) -> Point2 {
    Point2::new(p[0], p[1])
}

pub fn from_point(p: &Point2) -> [f64; 2] {
    [p.x, p.y]
}
