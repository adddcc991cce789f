//! Point solve rules.

use super::container::Plane;
use crate::geometry::utils_2d::points_equal;
use crate::topo::EntityId;
use crate::variables::formula::{num, term};

impl Plane {
    pub(crate) fn solve_point(&mut self, id: EntityId) {
        let Ok(point) = self.point(id).cloned() else { return };

        if self.det(id) {
            for coordinate in [point.x, point.y] {
                let value = self.val(coordinate);
                if value.is_finite() {
                    self.derive(coordinate, "known point", num(value), &[]);
                }
            }
        } else if self.det(point.x) && self.det(point.y) {
            self.promote(id, "known coordinates");
        }

        self.propagate_equivalent_position(id);
    }

    /// Push each determined coordinate of `id` onto every other point at the same place.
    fn propagate_equivalent_position(&mut self, id: EntityId) {
        let Ok(point) = self.point(id).cloned() else { return };
        if !self.det(point.x) && !self.det(point.y) {
            return;
        }
        let here = self.coords(id);
        if !here.iter().all(|c| c.is_finite()) {
            return;
        }
        let eps = self.config.coincidence_epsilon;
        let twins: Vec<_> = self
            .items()
            .filter(|i| i.id != id)
            .filter_map(|i| i.as_point().cloned().map(|p| (i.id, p)))
            .filter(|(other, _)| points_equal(here, self.coords(*other), eps))
            .map(|(_, p)| p)
            .collect();

        for twin in twins {
            for (mine, theirs) in [(point.x, twin.x), (point.y, twin.y)] {
                if self.det(mine) && !self.det(theirs) {
                    self.derive(theirs, "equivalent position", term(1), &[mine]);
                }
            }
        }
    }
}
