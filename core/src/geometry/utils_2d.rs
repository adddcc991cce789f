//! 2D geometry utilities shared by the line, vertex and triangle rules.
//!
//! Angles are in degrees. "Polar" angles are measured from the +Y axis
//! towards +X, matching `atan2(dx, dy)`.

use super::{from_point, to_point, Point2, Vector2};
use nalgebra as na;

/// Compute distance between two 2D points.
#[inline]
pub fn distance(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    na::distance(&to_point(p1), &to_point(p2))
}

/// Midpoint between two 2D points.
#[inline]
pub fn midpoint(p1: [f64; 2], p2: [f64; 2]) -> [f64; 2] {
    from_point(&na::center(&to_point(p1), &to_point(p2)))
}

/// Check if two 2D points coincide within `epsilon` on both axes.
#[inline]
pub fn points_equal(p1: [f64; 2], p2: [f64; 2], epsilon: f64) -> bool {
    (p1[0] - p2[0]).abs() < epsilon && (p1[1] - p2[1]).abs() < epsilon
}

/// Angle of the vector `(dx, dy)` from the +Y axis, in (-180, 180].
#[inline]
pub fn angle_from_y_axis(dx: f64, dy: f64) -> f64 {
    dx.atan2(dy).to_degrees()
}

/// Polar angle of `p` around `origin`, normalized to [0, 360).
pub fn polar_angle(origin: [f64; 2], p: [f64; 2]) -> f64 {
    let a = angle_from_y_axis(p[0] - origin[0], p[1] - origin[1]);
    if a < 0.0 { a + 360.0 } else { a }
}

/// Arithmetic mean of the given points.
pub fn centroid(points: &[[f64; 2]]) -> [f64; 2] {
    if points.is_empty() {
        return [0.0, 0.0];
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + to_point(*p).coords);
    from_point(&Point2::from(sum / points.len() as f64))
}

/// Signed area of a triangle (shoelace formula). Zero when collinear.
pub fn signed_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

/// Area from three side lengths (Heron's formula).
pub fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let s = (a + b + c) / 2.0;
    (s * (s - a) * (s - b) * (s - c)).max(0.0).sqrt()
}

/// Altitude onto `base` for a triangle of the given area.
pub fn altitude(area: f64, base: f64) -> f64 {
    2.0 * area / base
}

/// Interior angle opposite side `c`, given legs `a` and `b` (law of cosines), in degrees.
pub fn angle_from_sides(a: f64, b: f64, c: f64) -> f64 {
    ((a * a + b * b - c * c) / (2.0 * a * b)).clamp(-1.0, 1.0).acos().to_degrees()
}
