//! Segment intersection used by vertex discovery.

/// Intersection of the two infinite lines through the given segments.
///
/// Returns the point together with the parameters `ua` (along the first segment)
/// and `ub` (along the second), or `None` when the denominator
/// `d = (y4-y3)(x2-x1) - (x4-x3)(y2-y1)` vanishes (parallel or collinear).
pub fn line_line_intersection_unbounded(
    l1_start: [f64; 2], l1_end: [f64; 2],
    l2_start: [f64; 2], l2_end: [f64; 2],
    parallel_epsilon: f64,
) -> Option<([f64; 2], f64, f64)> {
    let [x1, y1] = l1_start;
    let [x2, y2] = l1_end;
    let [x3, y3] = l2_start;
    let [x4, y4] = l2_end;

    let d = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);
    if d.abs() <= parallel_epsilon {
        return None;
    }

    let ua = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / d;
    let ub = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / d;

    Some(([x1 + ua * (x2 - x1), y1 + ua * (y2 - y1)], ua, ub))
}

/// Intersection point of two segments, or `None` when they are parallel or
/// only their infinite extensions meet.
///
/// `tolerance` widens the accepted parameter range to `[-tolerance, 1 + tolerance]`
/// so segments meeting exactly at a shared endpoint are not lost to rounding.
pub fn segment_intersection(
    l1_start: [f64; 2], l1_end: [f64; 2],
    l2_start: [f64; 2], l2_end: [f64; 2],
    parallel_epsilon: f64,
    tolerance: f64,
) -> Option<[f64; 2]> {
    let (point, ua, ub) =
        line_line_intersection_unbounded(l1_start, l1_end, l2_start, l2_end, parallel_epsilon)?;

    let within = |t: f64| t >= -tolerance && t <= 1.0 + tolerance;
    if within(ua) && within(ub) {
        Some(point)
    } else {
        None
    }
}
