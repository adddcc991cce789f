//! Vertex discovery, recalculation and solve rules.
//!
//! A vertex is the intersection of exactly two lines. It appears when the
//! segments start crossing and disappears, with its triangles, when they stop.

use super::container::Plane;
use super::types::{Category, Item, ItemKind, VertexItem};
use crate::geometry::segment_intersection;
use crate::topo::EntityId;
use crate::variables::formula::{add, div, mul, sub, term};
use crate::variables::{Expr, Variable, VariableRole};
use tracing::debug;

/// Coordinate of the intersection of segment (@1,@2)-(@3,@4) with (@5,@6)-(@7,@8).
/// `axis` 0 gives x, 1 gives y.
fn intersection_formula(axis: usize) -> Expr {
    let (x1, y1, x2, y2, x3, y3, x4, y4) = (1, 2, 3, 4, 5, 6, 7, 8);
    let d = sub(
        mul(sub(term(y4), term(y3)), sub(term(x2), term(x1))),
        mul(sub(term(x4), term(x3)), sub(term(y2), term(y1))),
    );
    let ua = div(
        sub(
            mul(sub(term(x4), term(x3)), sub(term(y1), term(y3))),
            mul(sub(term(y4), term(y3)), sub(term(x1), term(x3))),
        ),
        d,
    );
    let (start, end) = if axis == 0 { (x1, x2) } else { (y1, y2) };
    add(term(start), mul(ua, sub(term(end), term(start))))
}

impl Plane {
    fn segment_of(&self, line: EntityId) -> Option<([f64; 2], [f64; 2])> {
        let line = self.line(line).ok()?;
        Some((self.coords(line.from), self.coords(line.to)))
    }

    fn intersect(&self, a: EntityId, b: EntityId) -> Option<[f64; 2]> {
        let (a0, a1) = self.segment_of(a)?;
        let (b0, b1) = self.segment_of(b)?;
        segment_intersection(a0, a1, b0, b1, self.config.parallel_epsilon, self.config.segment_tolerance)
    }

    fn share_vertex(&self, a: EntityId, b: EntityId) -> bool {
        let Ok(line) = self.line(a) else { return false };
        line.vertices.iter().any(|v| {
            self.get(*v)
                .and_then(|i| i.as_vertex())
                .map_or(false, |v| v.line_a == b || v.line_b == b)
        })
    }

    /// Create a vertex for every line crossing `line_id` that does not share one with it yet.
    pub(crate) fn discover_vertices(&mut self, line_id: EntityId) {
        if self.line(line_id).is_err() {
            return;
        }
        for other in self.ids_of("line") {
            if other == line_id || self.share_vertex(line_id, other) {
                continue;
            }
            if let Some(at) = self.intersect(line_id, other) {
                self.create_vertex(line_id, other, at);
            }
        }
    }

    fn create_vertex(&mut self, line_a: EntityId, line_b: EntityId, at: [f64; 2]) -> EntityId {
        let id = self.ids.next_id();
        let position = self.ids.next_id();
        let angle = self.ids.next_id();
        let name = self.names.next("V");

        let kind = ItemKind::Vertex(VertexItem {
            line_a,
            line_b,
            position,
            angle,
            triangles: Vec::new(),
        });
        self.insert_item(Item::new(id, name.clone(), kind, vec![Category::Vertex]), None);
        self.insert_point(position, Some(id), format!("{}.pos", name), at, false, false, vec![Category::Point]);

        let value = self.vertex_angle_value(line_a, line_b);
        let variable = Variable::new(VariableRole::VertexAngle, value).at(position);
        self.insert_variable(angle, id, variable, Category::Angle);

        for line in [line_a, line_b] {
            if let Some(ItemKind::Line(l)) = self.items.get_mut(&line).map(|i| &mut i.kind) {
                l.vertices.push(id);
            }
        }
        debug!(vertex = %name, x = at[0], y = at[1], "vertex discovered");
        id
    }

    fn vertex_angle_value(&self, line_a: EntityId, line_b: EntityId) -> f64 {
        match (self.line(line_a), self.line(line_b)) {
            (Ok(a), Ok(b)) => self.val(a.angle) - self.val(b.angle),
            _ => f64::NAN,
        }
    }

    /// Follow the intersection of the two lines; drop the vertex once they stop crossing.
    /// Returns whether the vertex still exists.
    pub(crate) fn recalculate_vertex(&mut self, id: EntityId) -> bool {
        let Some(vertex) = self.get(id).and_then(|i| i.as_vertex()).cloned() else {
            return false;
        };
        match self.intersect(vertex.line_a, vertex.line_b) {
            Some(at) => {
                self.set_coords(vertex.position, at);
                let value = self.vertex_angle_value(vertex.line_a, vertex.line_b);
                self.set_val(vertex.angle, Some(value));
                true
            }
            None => {
                self.remove_vertex(id);
                false
            }
        }
    }

    pub(crate) fn solve_vertex(&mut self, id: EntityId) {
        let Some(vertex) = self.get(id).and_then(|i| i.as_vertex()).cloned() else {
            return;
        };
        let (Ok(a), Ok(b)) = (self.line(vertex.line_a).cloned(), self.line(vertex.line_b).cloned()) else {
            return;
        };

        if self.det(a.angle) && self.det(b.angle) {
            self.derive(vertex.angle, "line angles", sub(term(1), term(2)), &[a.angle, b.angle]);
        }

        if self.det(vertex.line_a) && self.det(vertex.line_b) {
            if let (Ok(pos), Some(terms)) = (self.point(vertex.position).cloned(), self.segment_terms(&a, &b)) {
                self.derive(pos.x, "line intersection", intersection_formula(0), &terms);
                self.derive(pos.y, "line intersection", intersection_formula(1), &terms);
            }
        }

        if self.det(id) {
            self.promote(vertex.position, "known vertex");
            self.promote(vertex.angle, "known vertex");
        } else if self.det(vertex.angle) && self.det(vertex.position) {
            self.promote(id, "known angle and position");
        }
    }

    /// Endpoint coordinate ids of both segments, in intersection formula order.
    fn segment_terms(&self, a: &super::types::LineItem, b: &super::types::LineItem) -> Option<[EntityId; 8]> {
        let p = |id: EntityId| self.point(id).ok().map(|p| (p.x, p.y));
        let (x1, y1) = p(a.from)?;
        let (x2, y2) = p(a.to)?;
        let (x3, y3) = p(b.from)?;
        let (x4, y4) = p(b.to)?;
        Some([x1, y1, x2, y2, x3, y3, x4, y4])
    }
}
