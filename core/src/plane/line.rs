//! Line recalculation and solve rules.
//!
//! A line carries its endpoints, midpoint, the deltas `dx`/`dy`, its length and
//! its angle measured clockwise from the +Y axis.

use super::container::Plane;
use super::types::LineItem;
use crate::geometry::utils_2d::{angle_from_y_axis, midpoint};
use crate::topo::EntityId;
use crate::variables::formula::{add, average, call, div, mul, neg, num, sqrt, square, sub, term};

/// Below this, a sine or cosine is too small to divide by.
const TRIG_GUARD: f64 = 1e-9;

impl Plane {
    /// Recompute midpoint, deltas, length and angle from the endpoints.
    pub(crate) fn recalculate_line(&mut self, id: EntityId) {
        let Ok(line) = self.line(id).cloned() else { return };
        let a = self.coords(line.from);
        let b = self.coords(line.to);
        self.set_coords(line.midpoint, midpoint(a, b));

        let dx = b[0] - a[0];
        let dy = b[1] - a[1];
        let mut angle = angle_from_y_axis(dx, dy);
        if angle <= -180.0 {
            angle += 360.0;
        }
        self.set_val(line.dx, Some(dx));
        self.set_val(line.dy, Some(dy));
        self.set_val(line.length, Some(dx.hypot(dy)));
        self.set_val(line.angle, Some(angle));
    }

    pub(crate) fn solve_line(&mut self, id: EntityId) {
        let Ok(line) = self.line(id).cloned() else { return };

        if self.det(id) {
            self.derive_from_known_line(&line);
        }
        self.apply_polar_rules(&line);
        self.apply_endpoint_rules(&line);

        if self.det(line.from) && self.det(line.to) {
            self.promote(id, "known endpoints");
        }
    }

    /// Everything a line owns follows from the line itself.
    fn derive_from_known_line(&mut self, line: &LineItem) {
        let (Ok(from), Ok(to), Ok(mid)) = (
            self.point(line.from).cloned(),
            self.point(line.to).cloned(),
            self.point(line.midpoint).cloned(),
        ) else {
            return;
        };

        self.derive(mid.x, "midpoint", average(&[1, 2]), &[from.x, to.x]);
        self.derive(mid.y, "midpoint", average(&[1, 2]), &[from.y, to.y]);
        self.derive(line.dx, "known line", sub(term(1), term(2)), &[to.x, from.x]);
        self.derive(line.dy, "known line", sub(term(1), term(2)), &[to.y, from.y]);
        self.derive(
            line.length,
            "known line",
            sqrt(add(square(term(1)), square(term(2)))),
            &[line.dx, line.dy],
        );
        self.derive(line.angle, "known line", call("atan2", vec![term(1), term(2)]), &[line.dx, line.dy]);
        self.promote(line.from, "known line");
        self.promote(line.to, "known line");
    }

    /// Rules among dx, dy, length and angle.
    fn apply_polar_rules(&mut self, line: &LineItem) {
        let (dx, dy, len, ang) = (line.dx, line.dy, line.length, line.angle);

        if self.det(len) && self.det(ang) {
            self.derive(dx, "length and angle", mul(term(1), call("sin", vec![term(2)])), &[len, ang]);
            self.derive(dy, "length and angle", mul(term(1), call("cos", vec![term(2)])), &[len, ang]);
        }

        // The sign of the missing delta comes from the current geometry.
        for (known, missing) in [(dx, dy), (dy, dx)] {
            if self.det(len) && self.det(known) && !self.det(missing) {
                let magnitude = sqrt(sub(square(term(1)), square(term(2))));
                let expr = if self.val(missing) < 0.0 { neg(magnitude) } else { magnitude };
                self.derive(missing, "length and delta", expr, &[len, known]);
            }
        }

        if self.det(ang) {
            let rad = self.val(ang).to_radians();
            if self.det(dx) && !self.det(dy) && rad.sin().abs() > TRIG_GUARD {
                let expr = div(mul(term(1), call("cos", vec![term(2)])), call("sin", vec![term(2)]));
                self.derive(dy, "angle and delta", expr, &[dx, ang]);
            }
            if self.det(dy) && !self.det(dx) && rad.cos().abs() > TRIG_GUARD {
                self.derive(dx, "angle and delta", mul(term(1), call("tan", vec![term(2)])), &[dy, ang]);
            }
        }
    }

    /// Per-axis rules among the endpoints, the midpoint and the delta.
    fn apply_endpoint_rules(&mut self, line: &LineItem) {
        let (Ok(from), Ok(to), Ok(mid)) = (
            self.point(line.from).cloned(),
            self.point(line.to).cloned(),
            self.point(line.midpoint).cloned(),
        ) else {
            return;
        };

        for (f, t, m, d) in [(from.x, to.x, mid.x, line.dx), (from.y, to.y, mid.y, line.dy)] {
            if self.det(f) && self.det(t) {
                self.derive(d, "known endpoints", sub(term(1), term(2)), &[t, f]);
            }
            if self.det(f) && self.det(d) {
                self.derive(t, "endpoint and delta", add(term(1), term(2)), &[f, d]);
            }
            if self.det(t) && self.det(d) {
                self.derive(f, "endpoint and delta", sub(term(1), term(2)), &[t, d]);
            }
            if self.det(f) && self.det(m) {
                self.derive(t, "endpoint and midpoint", sub(mul(num(2.0), term(1)), term(2)), &[m, f]);
            }
            if self.det(t) && self.det(m) {
                self.derive(f, "endpoint and midpoint", sub(mul(num(2.0), term(1)), term(2)), &[m, t]);
            }
        }
    }
}
