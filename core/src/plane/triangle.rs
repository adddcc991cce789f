//! Triangle discovery, recalculation and solve rules.

use super::container::Plane;
use super::types::{Category, Item, ItemKind, TriangleItem};
use crate::error::{PlaneError, Result};
use crate::geometry::utils_2d::{altitude, angle_from_sides, centroid, distance, heron_area, polar_angle, signed_area};
use crate::geometry::EPSILON;
use crate::topo::EntityId;
use crate::variables::formula::{add, average, call, div, distance as distance_formula, mul, neg, num, sqrt, square, sub, term};
use crate::variables::{Expr, Variable, VariableRole};
use serde::Serialize;
use tracing::{debug, warn};

/// Below this, a sine is too small to divide by in the law of sines.
const SINE_GUARD: f64 = 1e-9;

/// How a vertex's raw angle relates to the interior angle at that corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AngleRelation {
    /// `interior == vertex`
    Same,
    /// `interior == -vertex`, vertex negative
    Negated,
    /// `interior == 180 - vertex`
    Supplement,
    /// `interior == vertex + 180`, vertex negative
    Shifted,
}

impl AngleRelation {
    /// First relation satisfied by the current values, tested in a fixed order.
    pub(crate) fn find(vertex: f64, interior: f64, eps: f64) -> Option<Self> {
        if (interior - vertex).abs() < eps {
            Some(Self::Same)
        } else if vertex < 0.0 && (interior + vertex).abs() < eps {
            Some(Self::Negated)
        } else if (interior - (180.0 - vertex)).abs() < eps {
            Some(Self::Supplement)
        } else if vertex < 0.0 && (interior - (vertex + 180.0)).abs() < eps {
            Some(Self::Shifted)
        } else {
            None
        }
    }

    /// Interior angle in terms of `@1`, the vertex angle.
    fn interior_from_vertex(self) -> Expr {
        match self {
            Self::Same => term(1),
            Self::Negated => neg(term(1)),
            Self::Supplement => sub(num(180.0), term(1)),
            Self::Shifted => add(term(1), num(180.0)),
        }
    }

    /// Vertex angle in terms of `@1`, the interior angle.
    fn vertex_from_interior(self) -> Expr {
        match self {
            Self::Same => term(1),
            Self::Negated => neg(term(1)),
            Self::Supplement => sub(num(180.0), term(1)),
            Self::Shifted => sub(term(1), num(180.0)),
        }
    }
}

/// Read-only measurements of a triangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriangleMetrics {
    /// Shoelace area over v1, v2, v3
    pub signed_area: f64,
    /// Heron's formula over the three sides
    pub area: f64,
    pub perimeter: f64,
    /// `altitudes[i]` is the height onto side `i`
    pub altitudes: [f64; 3],
}

/// The other two indices of a triangle corner, in cyclic order.
fn others(i: usize) -> (usize, usize) {
    ((i + 1) % 3, (i + 2) % 3)
}

impl Plane {
    fn vertex_position(&self, vertex: EntityId) -> Option<EntityId> {
        self.get(vertex).and_then(|i| i.as_vertex()).map(|v| v.position)
    }

    fn vertex_lines(&self, vertex: EntityId) -> Vec<EntityId> {
        self.get(vertex)
            .and_then(|i| i.as_vertex())
            .map(|v| vec![v.line_a, v.line_b])
            .unwrap_or_default()
    }

    fn connecting_lines(&self, u: EntityId, w: EntityId) -> Vec<EntityId> {
        let theirs = self.vertex_lines(w);
        self.vertex_lines(u).into_iter().filter(|l| theirs.contains(l)).collect()
    }

    /// Each pair of corners is joined by its own line.
    fn has_distinct_sides(&self, [a, b, c]: [EntityId; 3]) -> bool {
        let ab = self.connecting_lines(a, b);
        let bc = self.connecting_lines(b, c);
        let ca = self.connecting_lines(c, a);
        ab.iter().any(|l1| {
            bc.iter()
                .any(|l2| l2 != l1 && ca.iter().any(|l3| l3 != l1 && l3 != l2))
        })
    }

    /// Register a triangle for every new non-collinear triple of pairwise connected vertices.
    pub(crate) fn discover_triangles(&mut self) {
        let vertices = self.ids_of("vertex");
        let n = vertices.len();
        for i in 0..n {
            for j in (i + 1)..n {
                for k in (j + 1)..n {
                    let triple = [vertices[i], vertices[j], vertices[k]];
                    let mut key = triple;
                    key.sort();
                    if self.triangle_index.contains_key(&key) || !self.has_distinct_sides(triple) {
                        continue;
                    }
                    let [p, q, r] = triple.map(|v| {
                        self.vertex_position(v).map_or([f64::NAN; 2], |p| self.coords(p))
                    });
                    let area = signed_area(p, q, r);
                    if !(area.abs() > self.config.area_epsilon) {
                        continue;
                    }
                    self.create_triangle(triple, key);
                }
            }
        }
    }

    fn create_triangle(&mut self, triple: [EntityId; 3], key: [EntityId; 3]) -> EntityId {
        // Canonical order: ascending polar angle around the centroid, frozen from here on.
        let mut corners: Vec<(EntityId, [f64; 2])> = triple
            .iter()
            .map(|v| (*v, self.vertex_position(*v).map_or([f64::NAN; 2], |p| self.coords(p))))
            .collect();
        let center = centroid(&corners.iter().map(|(_, p)| *p).collect::<Vec<_>>());
        corners.sort_by(|a, b| {
            polar_angle(center, a.1)
                .partial_cmp(&polar_angle(center, b.1))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let vertices = [corners[0].0, corners[1].0, corners[2].0];

        let id = self.ids.next_id();
        let sides: [EntityId; 3] = std::array::from_fn(|_| self.ids.next_id());
        let angles: [EntityId; 3] = std::array::from_fn(|_| self.ids.next_id());
        let centroid_id = self.ids.next_id();
        let name = self.names.next("T");

        let kind = ItemKind::Triangle(TriangleItem {
            vertices,
            sides,
            angles,
            centroid: centroid_id,
        });
        self.insert_item(Item::new(id, name.clone(), kind, vec![Category::Shape, Category::Triangle]), None);
        for i in 0..3 {
            self.insert_numbered_variable(sides[i], id, i + 1, Variable::new(VariableRole::Side, 0.0), Category::Side);
        }
        for i in 0..3 {
            let mut variable = Variable::new(VariableRole::InteriorAngle, 0.0);
            variable.location = self.vertex_position(vertices[i]);
            self.insert_numbered_variable(angles[i], id, i + 1, variable, Category::Angle);
        }
        self.insert_point(centroid_id, Some(id), format!("{}.centroid", name), center, false, false, vec![Category::Centroid]);

        for vertex in vertices {
            if let Some(ItemKind::Vertex(v)) = self.items.get_mut(&vertex).map(|i| &mut i.kind) {
                v.triangles.push(id);
            }
        }
        self.triangle_index.insert(key, id);
        self.recalculate_triangle(id);
        debug!(triangle = %name, "triangle discovered");
        id
    }

    fn corner_positions(&self, triangle: &TriangleItem) -> [[f64; 2]; 3] {
        triangle
            .vertices
            .map(|v| self.vertex_position(v).map_or([f64::NAN; 2], |p| self.coords(p)))
    }

    /// Drop triangles whose vertices have become collinear or coincident.
    pub(crate) fn remove_degenerate_triangles(&mut self) {
        let eps = self.config.area_epsilon;
        for id in self.ids_of("triangle") {
            let Some(triangle) = self.get(id).and_then(|i| i.as_triangle()) else {
                continue;
            };
            let p = self.corner_positions(triangle);
            // NaN counts as degenerate
            if !(signed_area(p[0], p[1], p[2]).abs() > eps) {
                self.remove_triangle(id);
            }
        }
    }

    /// Recompute sides, interior angles and centroid from the vertex positions.
    pub(crate) fn recalculate_triangle(&mut self, id: EntityId) {
        let Some(triangle) = self.get(id).and_then(|i| i.as_triangle()).cloned() else {
            return;
        };
        let p = self.corner_positions(&triangle);
        let sides: [f64; 3] = std::array::from_fn(|i| {
            let (j, k) = others(i);
            distance(p[j], p[k])
        });
        for i in 0..3 {
            let (j, k) = others(i);
            self.set_val(triangle.sides[i], Some(sides[i]));
            let angle = if sides[j] > EPSILON && sides[k] > EPSILON {
                Some(angle_from_sides(sides[j], sides[k], sides[i]))
            } else {
                None
            };
            self.set_val(triangle.angles[i], angle);
        }
        self.set_coords(triangle.centroid, centroid(&p));
    }

    pub fn triangle_metrics(&self, id: EntityId) -> Result<TriangleMetrics> {
        let triangle = self
            .item(id)?
            .as_triangle()
            .ok_or(PlaneError::WrongKind { id, expected: "triangle" })?;
        let p = self.corner_positions(triangle);
        let s = triangle.sides.map(|side| self.val(side));
        let area = heron_area(s[0], s[1], s[2]);
        Ok(TriangleMetrics {
            signed_area: signed_area(p[0], p[1], p[2]),
            area,
            perimeter: s.iter().sum(),
            altitudes: s.map(|base| altitude(area, base)),
        })
    }

    pub(crate) fn solve_triangle(&mut self, id: EntityId) {
        let Some(t) = self.get(id).and_then(|i| i.as_triangle()).cloned() else {
            return;
        };
        let (s, a) = (t.sides, t.angles);

        // 1. vertex angle <-> interior angle
        let eps = self.config.correspondence_epsilon;
        for i in 0..3 {
            let Some(vertex_angle) = self.get(t.vertices[i]).and_then(|v| v.as_vertex()).map(|v| v.angle) else {
                continue;
            };
            let (from, to, forward) = match (self.det(vertex_angle), self.det(a[i])) {
                (true, false) => (vertex_angle, a[i], true),
                (false, true) => (a[i], vertex_angle, false),
                _ => continue,
            };
            let (v, interior) = (self.val(vertex_angle), self.val(a[i]));
            match AngleRelation::find(v, interior, eps) {
                Some(rel) if forward => {
                    self.derive(to, "vertex angle", rel.interior_from_vertex(), &[from]);
                }
                Some(rel) => {
                    self.derive(to, "interior angle", rel.vertex_from_interior(), &[from]);
                }
                None => warn!(
                    vertex = %self.name_of(t.vertices[i]),
                    vertex_angle = v,
                    interior,
                    "vertex angle does not correspond to the interior angle"
                ),
            }
        }

        // 2. angle sum
        for i in 0..3 {
            let (j, k) = others(i);
            if self.det(a[j]) && self.det(a[k]) {
                self.derive(a[i], "angle sum", sub(sub(num(180.0), term(1)), term(2)), &[a[j], a[k]]);
            }
        }

        // 3. side from the two corner positions it joins
        for i in 0..3 {
            let (j, k) = others(i);
            let corners = (
                self.vertex_position(t.vertices[j]).and_then(|p| self.point(p).ok().cloned()),
                self.vertex_position(t.vertices[k]).and_then(|p| self.point(p).ok().cloned()),
            );
            if let (Some(pj), Some(pk)) = corners {
                if [pj.x, pj.y, pk.x, pk.y].iter().all(|c| self.det(*c)) {
                    self.derive(s[i], "vertex positions", distance_formula(1, 2, 3, 4), &[pj.x, pk.x, pj.y, pk.y]);
                }
            }
        }

        // 4. law of cosines
        if s.iter().all(|side| self.det(*side)) {
            for i in 0..3 {
                let (j, k) = others(i);
                if self.val(s[j]) > EPSILON && self.val(s[k]) > EPSILON {
                    let cosine = div(
                        sub(add(square(term(1)), square(term(2))), square(term(3))),
                        mul(mul(num(2.0), term(1)), term(2)),
                    );
                    self.derive(a[i], "law of cosines", call("acos", vec![cosine]), &[s[j], s[k], s[i]]);
                }
            }
        }
        for i in 0..3 {
            let (j, k) = others(i);
            if !self.det(s[i]) && self.det(a[i]) && self.det(s[j]) && self.det(s[k]) {
                let expr = sqrt(sub(
                    add(square(term(1)), square(term(2))),
                    mul(mul(mul(num(2.0), term(1)), term(2)), call("cos", vec![term(3)])),
                ));
                self.derive(s[i], "law of cosines", expr, &[s[j], s[k], a[i]]);
            }
        }

        // 5. law of sines
        for i in 0..3 {
            if self.det(s[i]) || !self.det(a[i]) {
                continue;
            }
            let (j, k) = others(i);
            let reference = [j, k].into_iter().find(|&r| {
                self.det(s[r]) && self.det(a[r]) && self.val(a[r]).to_radians().sin().abs() > SINE_GUARD
            });
            if let Some(r) = reference {
                let expr = div(mul(term(1), call("sin", vec![term(2)])), call("sin", vec![term(3)]));
                self.derive(s[i], "law of sines", expr, &[s[r], a[i], a[r]]);
            }
        }

        // 6. centroid
        let positions: Vec<_> = t
            .vertices
            .iter()
            .filter_map(|v| self.vertex_position(*v))
            .filter_map(|p| self.point(p).ok().cloned())
            .collect();
        if let (Ok(center), 3) = (self.point(t.centroid).cloned(), positions.len()) {
            let xs: Vec<_> = positions.iter().map(|p| p.x).collect();
            let ys: Vec<_> = positions.iter().map(|p| p.y).collect();
            if xs.iter().all(|x| self.det(*x)) {
                self.derive(center.x, "centroid", average(&[1, 2, 3]), &xs);
            }
            if ys.iter().all(|y| self.det(*y)) {
                self.derive(center.y, "centroid", average(&[1, 2, 3]), &ys);
            }
        }

        // 7. promotion
        if !self.det(id) {
            if s.iter().all(|side| self.det(*side)) {
                self.promote(id, "known sides");
            } else if t
                .vertices
                .iter()
                .all(|v| self.det(*v))
            {
                self.promote(id, "known vertices");
            }
        }
        if self.det(id) {
            for var in s.iter().chain(a.iter()) {
                self.promote(*var, "known triangle");
            }
        }
    }
}
