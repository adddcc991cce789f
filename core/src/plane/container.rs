//! The plane: owner of every item, command entry points and the fixed-point loop.

use super::attributes::PendingReference;
use super::events::{EventQueue, Observer, PlaneEvent};
use super::types::{Capabilities, Category, Item, ItemKind, LineItem, PointItem, Status};
use crate::config::PlaneConfig;
use crate::error::{PlaneError, Result};
use crate::geometry::utils_2d::angle_from_y_axis;
use crate::topo::{EntityId, IdGenerator, NameSequence};
use crate::variables::{Expr, Inference, Variable, VariableRole};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

pub struct Plane {
    pub(crate) items: HashMap<EntityId, Item>,
    /// Creation order; solve passes and listings follow it
    pub(crate) order: Vec<EntityId>,
    pub(crate) ids: IdGenerator,
    pub(crate) names: NameSequence,
    pub(crate) dirty: bool,
    pub(crate) config: PlaneConfig,
    pub(crate) events: EventQueue,
    /// Sorted vertex triple -> triangle
    pub(crate) triangle_index: HashMap<[EntityId; 3], EntityId>,
    pub(crate) pending_refs: Vec<PendingReference>,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(PlaneConfig::default())
    }
}

impl std::fmt::Debug for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plane")
            .field("items", &self.order.len())
            .field("dirty", &self.dirty)
            .field("config", &self.config)
            .finish()
    }
}

impl Plane {
    pub fn new(config: PlaneConfig) -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            ids: IdGenerator::new(&config.id_seed),
            names: NameSequence::new(),
            dirty: false,
            config,
            events: EventQueue::default(),
            triangle_index: HashMap::new(),
            pending_refs: Vec::new(),
        }
    }

    pub fn config(&self) -> &PlaneConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: Observer) {
        self.events.subscribe(observer);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // --- arena -------------------------------------------------------------

    pub fn get(&self, id: EntityId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn item(&self, id: EntityId) -> Result<&Item> {
        self.items.get(&id).ok_or(PlaneError::NotFound(id))
    }

    pub(crate) fn item_mut(&mut self, id: EntityId) -> Result<&mut Item> {
        self.items.get_mut(&id).ok_or(PlaneError::NotFound(id))
    }

    /// Items in creation order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.order.iter().filter_map(move |id| self.items.get(id))
    }

    /// Ids of items of one kind, in creation order.
    pub fn ids_of(&self, kind: &str) -> Vec<EntityId> {
        self.items()
            .filter(|i| i.kind.name() == kind)
            .map(|i| i.id)
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.items().find(|i| i.name == name).map(|i| i.id)
    }

    pub fn name_of(&self, id: EntityId) -> String {
        self.items
            .get(&id)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn status(&self, id: EntityId) -> Result<Status> {
        Ok(self.item(id)?.status)
    }

    pub fn value(&self, id: EntityId) -> Result<Option<f64>> {
        self.item(id)?
            .as_variable()
            .map(|v| v.value)
            .ok_or(PlaneError::WrongKind { id, expected: "variable" })
    }

    pub fn position(&self, id: EntityId) -> Result<[f64; 2]> {
        let point = self
            .item(id)?
            .as_point()
            .ok_or(PlaneError::WrongKind { id, expected: "point" })?;
        Ok([self.val(point.x), self.val(point.y)])
    }

    pub fn point(&self, id: EntityId) -> Result<&PointItem> {
        self.item(id)?
            .as_point()
            .ok_or(PlaneError::WrongKind { id, expected: "point" })
    }

    pub fn line(&self, id: EntityId) -> Result<&LineItem> {
        self.item(id)?
            .as_line()
            .ok_or(PlaneError::WrongKind { id, expected: "line" })
    }

    /// Current value of a variable, NaN when absent.
    pub(crate) fn val(&self, id: EntityId) -> f64 {
        self.items
            .get(&id)
            .and_then(|i| i.as_variable())
            .and_then(|v| v.value)
            .unwrap_or(f64::NAN)
    }

    pub(crate) fn det(&self, id: EntityId) -> bool {
        self.items.get(&id).map_or(false, |i| i.is_determined())
    }

    pub(crate) fn set_val(&mut self, id: EntityId, value: Option<f64>) {
        if let Some(ItemKind::Variable(v)) = self.items.get_mut(&id).map(|i| &mut i.kind) {
            v.value = value;
        }
    }

    pub(crate) fn coords(&self, point: EntityId) -> [f64; 2] {
        match self.items.get(&point).and_then(|i| i.as_point()) {
            Some(p) => [self.val(p.x), self.val(p.y)],
            None => [f64::NAN, f64::NAN],
        }
    }

    pub(crate) fn set_coords(&mut self, point: EntityId, pos: [f64; 2]) {
        if let Some(p) = self.items.get(&point).and_then(|i| i.as_point()).cloned() {
            self.set_val(p.x, Some(pos[0]));
            self.set_val(p.y, Some(pos[1]));
        }
    }

    // --- construction ------------------------------------------------------

    fn insert(&mut self, mut item: Item, owner: Option<EntityId>) -> EntityId {
        let id = item.id;
        item.owner = owner;
        if let Some(owner) = owner.and_then(|o| self.items.get_mut(&o)) {
            owner.children.push(id);
        }
        self.events.push(PlaneEvent::ItemAdded {
            id,
            name: item.name.clone(),
            kind: item.kind.name(),
        });
        self.order.push(id);
        self.items.insert(id, item);
        self.dirty = true;
        id
    }

    /// Insert a variable named after its owner and role, e.g. `L1.length`.
    pub(crate) fn insert_variable(&mut self, id: EntityId, owner: EntityId, variable: Variable, category: Category) -> EntityId {
        let name = format!("{}.{}", self.name_of(owner), variable.role.suffix());
        let item = Item::new(id, name, ItemKind::Variable(variable), vec![category]);
        self.insert(item, Some(owner))
    }

    /// Like `insert_variable` for one of several same-role children, e.g. `T1.side2`.
    pub(crate) fn insert_numbered_variable(
        &mut self,
        id: EntityId,
        owner: EntityId,
        number: usize,
        variable: Variable,
        category: Category,
    ) -> EntityId {
        let name = format!("{}.{}{}", self.name_of(owner), variable.role.suffix(), number);
        let item = Item::new(id, name, ItemKind::Variable(variable), vec![category]);
        self.insert(item, Some(owner))
    }

    /// Insert a point and its two coordinate variables.
    pub(crate) fn insert_point(
        &mut self,
        id: EntityId,
        owner: Option<EntityId>,
        name: String,
        pos: [f64; 2],
        draggable: bool,
        transpose: bool,
        categories: Vec<Category>,
    ) -> EntityId {
        let x = self.ids.next_id();
        let y = self.ids.next_id();
        let kind = ItemKind::Point(PointItem { x, y, draggable, transpose });
        self.insert(Item::new(id, name, kind, categories), owner);
        self.insert_variable(x, id, Variable::new(VariableRole::X, pos[0]).at(id), Category::Coordinate);
        self.insert_variable(y, id, Variable::new(VariableRole::Y, pos[1]).at(id), Category::Coordinate);
        id
    }

    pub(crate) fn insert_item(&mut self, item: Item, owner: Option<EntityId>) -> EntityId {
        self.insert(item, owner)
    }

    /// Add a free, draggable point.
    pub fn add_point(&mut self, pos: [f64; 2]) -> EntityId {
        let id = self.ids.next_id();
        let name = self.names.next("P");
        self.insert_point(id, None, name, pos, true, false, vec![Category::Shape, Category::Point]);
        self.propagate();
        self.events.flush();
        id
    }

    /// Add a segment; the line owns its two endpoints and its midpoint.
    pub fn add_line(&mut self, from: [f64; 2], to: [f64; 2]) -> EntityId {
        let id = self.ids.next_id();
        let [p_from, p_to, midpoint, dx, dy, length, angle] =
            std::array::from_fn(|_| self.ids.next_id());
        let name = self.names.next("L");
        let kind = ItemKind::Line(LineItem {
            from: p_from,
            to: p_to,
            midpoint,
            dx,
            dy,
            length,
            angle,
            vertices: Vec::new(),
        });
        self.insert(Item::new(id, name.clone(), kind, vec![Category::Shape, Category::Line]), None);

        let from_name = self.names.next("P");
        self.insert_point(p_from, Some(id), from_name, from, true, false, vec![Category::Point]);
        let to_name = self.names.next("P");
        self.insert_point(p_to, Some(id), to_name, to, true, false, vec![Category::Point]);
        let mid = [(from[0] + to[0]) / 2.0, (from[1] + to[1]) / 2.0];
        self.insert_point(midpoint, Some(id), format!("{}.mid", name), mid, true, true, vec![Category::Midpoint]);

        let delta = [to[0] - from[0], to[1] - from[1]];
        let len = delta[0].hypot(delta[1]);
        self.insert_variable(dx, id, Variable::new(VariableRole::Dx, delta[0]).at(midpoint), Category::Delta);
        self.insert_variable(dy, id, Variable::new(VariableRole::Dy, delta[1]).at(midpoint), Category::Delta);
        self.insert_variable(length, id, Variable::new(VariableRole::Length, len).at(midpoint), Category::Length);
        let dir = angle_from_y_axis(delta[0], delta[1]);
        self.insert_variable(angle, id, Variable::new(VariableRole::Angle, dir).at(p_from), Category::Angle);

        self.refresh_geometry(&[id]);
        self.propagate();
        self.events.flush();
        id
    }

    // --- geometry maintenance ---------------------------------------------

    /// Recompute values after the given lines moved, then rediscover vertices and triangles.
    pub(crate) fn refresh_geometry(&mut self, moved_lines: &[EntityId]) {
        for &line in moved_lines {
            self.recalculate_line(line);
        }
        for vertex in self.ids_of("vertex") {
            self.recalculate_vertex(vertex);
        }
        for &line in moved_lines {
            self.discover_vertices(line);
        }
        self.discover_triangles();
        for triangle in self.ids_of("triangle") {
            self.recalculate_triangle(triangle);
        }
        self.remove_degenerate_triangles();
        self.dirty = true;
    }

    /// Remove an item and its whole subtree.
    pub(crate) fn remove_subtree(&mut self, id: EntityId) {
        let mut stack = vec![id];
        let mut doomed = HashSet::new();
        while let Some(next) = stack.pop() {
            if doomed.insert(next) {
                if let Some(item) = self.items.get(&next) {
                    stack.extend(item.children.iter().copied());
                }
            }
        }
        if let Some(owner) = self.items.get(&id).and_then(|i| i.owner) {
            if let Some(owner) = self.items.get_mut(&owner) {
                owner.children.retain(|c| *c != id);
            }
        }
        self.order.retain(|i| !doomed.contains(i));
        for gone in &doomed {
            if let Some(item) = self.items.remove(gone) {
                self.events.push(PlaneEvent::ItemRemoved { id: item.id, name: item.name });
            }
        }
        self.dirty = true;
    }

    /// Remove a vertex together with every triangle built on it.
    pub(crate) fn remove_vertex(&mut self, id: EntityId) {
        let Some(vertex) = self.items.get(&id).and_then(|i| i.as_vertex()).cloned() else {
            return;
        };
        for triangle in vertex.triangles {
            self.remove_triangle(triangle);
        }
        for line in [vertex.line_a, vertex.line_b] {
            if let Some(ItemKind::Line(l)) = self.items.get_mut(&line).map(|i| &mut i.kind) {
                l.vertices.retain(|v| *v != id);
            }
        }
        debug!(vertex = %self.name_of(id), "vertex removed");
        self.remove_subtree(id);
    }

    pub(crate) fn remove_triangle(&mut self, id: EntityId) {
        let Some(triangle) = self.items.get(&id).and_then(|i| i.as_triangle()).cloned() else {
            return;
        };
        for vertex in triangle.vertices {
            if let Some(ItemKind::Vertex(v)) = self.items.get_mut(&vertex).map(|i| &mut i.kind) {
                v.triangles.retain(|t| *t != id);
            }
        }
        self.triangle_index.retain(|_, t| *t != id);
        debug!(triangle = %self.name_of(id), "triangle removed");
        self.remove_subtree(id);
    }

    // --- status ------------------------------------------------------------

    /// Change the status of an item. Returns whether anything changed.
    pub(crate) fn set_status(&mut self, id: EntityId, status: Status, reason: Option<String>) -> bool {
        let Some(item) = self.items.get_mut(&id) else {
            return false;
        };
        if item.status == status && item.reason == reason {
            return false;
        }
        item.status = status;
        item.reason = reason.clone();
        if status == Status::Unknown {
            if let ItemKind::Variable(v) = &mut item.kind {
                if !v.inference.as_ref().map_or(false, |i| i.attached) {
                    v.inference = None;
                }
            }
        }
        let name = item.name.clone();
        self.dirty = true;
        self.events.push(PlaneEvent::StatusChanged { id, name, status, reason });
        true
    }

    /// Mark an undetermined item derived without recording a formula.
    pub(crate) fn promote(&mut self, id: EntityId, reason: &str) -> bool {
        if !self.items.contains_key(&id) || self.det(id) {
            return false;
        }
        self.set_status(id, Status::Derived, Some(reason.to_string()))
    }

    /// Derive an undetermined variable, recording `owner == expr(terms)`.
    /// A variable carrying an attached formula is left to that formula.
    pub(crate) fn derive(&mut self, owner: EntityId, reason: &str, expr: Expr, terms: &[EntityId]) -> bool {
        if self.det(owner) {
            return false;
        }
        match self.items.get_mut(&owner).map(|i| &mut i.kind) {
            Some(ItemKind::Variable(v)) if v.inference.as_ref().map_or(false, |i| i.attached) => return false,
            Some(ItemKind::Variable(v)) => {
                v.inference = Some(Inference::new(owner, reason, expr, terms));
            }
            _ => return false,
        }
        self.set_status(owner, Status::Derived, Some(reason.to_string()))
    }

    fn reset_derived_items(&mut self) {
        let derived: Vec<EntityId> = self
            .items()
            .filter(|i| i.status == Status::Derived)
            .map(|i| i.id)
            .collect();
        for id in derived {
            self.set_status(id, Status::Unknown, None);
        }
    }

    // --- solving -----------------------------------------------------------

    /// Solve to a fixed point and deliver the resulting events. Returns the number of passes.
    pub fn solve(&mut self) -> usize {
        let passes = self.propagate();
        self.events.flush();
        passes
    }

    /// Run local solve rules over every item until a full pass changes nothing.
    /// Events stay queued for the calling command to flush.
    pub(crate) fn propagate(&mut self) -> usize {
        if self.order.is_empty() {
            self.dirty = false;
            return 0;
        }
        let bound = self.order.len();
        let mut passes = 0;
        loop {
            self.dirty = false;
            passes += 1;
            let ids = self.order.clone();
            for id in ids {
                self.solve_item(id);
            }
            trace!(pass = passes, changed = self.dirty, "solve pass");
            if !self.dirty {
                break;
            }
            if passes >= bound {
                warn!(passes, "solve loop hit its pass bound");
                self.dirty = false;
                break;
            }
        }
        self.events.push(PlaneEvent::Solved { passes });
        passes
    }

    fn solve_item(&mut self, id: EntityId) {
        match self.items.get(&id).map(|i| &i.kind) {
            Some(ItemKind::Variable(_)) => self.solve_variable(id),
            Some(ItemKind::Point(_)) => self.solve_point(id),
            Some(ItemKind::Line(_)) => self.solve_line(id),
            Some(ItemKind::Vertex(_)) => self.solve_vertex(id),
            Some(ItemKind::Triangle(_)) => self.solve_triangle(id),
            None => {}
        }
    }

    /// A variable carrying a formula whose terms are all determined is itself determined.
    fn solve_variable(&mut self, id: EntityId) {
        let Some(item) = self.items.get(&id) else { return };
        if item.is_determined() {
            return;
        }
        let Some(inference) = item.as_variable().and_then(|v| v.inference.clone()) else {
            return;
        };
        if inference.terms[1..].iter().all(|t| self.det(*t)) {
            self.set_status(id, Status::Derived, Some(inference.reason));
        }
    }

    // --- commands ----------------------------------------------------------

    pub fn capabilities(&self, id: EntityId) -> Result<Capabilities> {
        let item = self.item(id)?;
        let settable = match item.as_variable() {
            Some(v) if v.role.is_coordinate() => item
                .owner
                .and_then(|o| self.items.get(&o))
                .and_then(|o| o.as_point())
                .map_or(false, |p| p.draggable && !p.transpose),
            Some(v) => v.role == VariableRole::Angle,
            None => false,
        };
        Ok(Capabilities {
            can_set_known: item.status != Status::Known,
            can_set_fixed: item.status != Status::Fixed,
            can_set_unknown: item.status.is_asserted(),
            can_set_value: settable && item.status != Status::Fixed,
            can_show_derivation: item.as_variable().map_or(false, |v| v.inference.is_some()),
        })
    }

    pub fn set_known(&mut self, id: EntityId) -> Result<()> {
        self.assert_status(id, Status::Known)
    }

    pub fn set_fixed(&mut self, id: EntityId) -> Result<()> {
        self.assert_status(id, Status::Fixed)
    }

    fn assert_status(&mut self, id: EntityId, status: Status) -> Result<()> {
        if self.item(id)?.status == status {
            return Ok(());
        }
        self.set_status(id, status, Some(status.to_string()));
        self.propagate();
        self.events.flush();
        Ok(())
    }

    /// Retract an asserted fact; stale derivations are reset and re-solved.
    pub fn set_unknown(&mut self, id: EntityId) -> Result<()> {
        match self.item(id)?.status {
            Status::Unknown => return Ok(()),
            Status::Derived => return Err(PlaneError::NotAllowed { id, action: "retract derived" }),
            _ => {}
        }
        self.set_status(id, Status::Unknown, None);
        self.reset_derived_items();
        self.propagate();
        self.events.flush();
        Ok(())
    }

    /// Flip every derived item back to unknown and solve again.
    pub fn reset_derived(&mut self) {
        self.reset_derived_items();
        self.propagate();
        self.events.flush();
    }

    /// Attach a formula (`@0 == ...`) to a variable; `terms[0]` must be the variable itself.
    /// Attached formulas outlive `reset_derived` and re-derive the variable once their terms are determined.
    pub fn set_formula(&mut self, owner: EntityId, reason: &str, template: &str, terms: &[EntityId]) -> Result<()> {
        if self.item(owner)?.as_variable().is_none() {
            return Err(PlaneError::WrongKind { id: owner, expected: "variable" });
        }
        if terms.first() != Some(&owner) {
            return Err(PlaneError::NotAllowed { id: owner, action: "attach foreign formula to" });
        }
        for term in terms {
            self.item(*term)?;
        }
        let inference = Inference::from_template(reason, template, terms.to_vec())?.attached();
        if let ItemKind::Variable(v) = &mut self.item_mut(owner)?.kind {
            v.inference = Some(inference);
        }
        if !self.item(owner)?.status.is_asserted() {
            self.set_status(owner, Status::Derived, Some(reason.to_string()));
        }
        self.propagate();
        self.events.flush();
        Ok(())
    }

    /// Set a coordinate of a draggable point (moves it) or a line angle
    /// (rotates the line about its `from` endpoint, keeping its length).
    pub fn set_value(&mut self, id: EntityId, value: f64) -> Result<()> {
        let item = self.item(id)?;
        let role = item
            .as_variable()
            .map(|v| v.role)
            .ok_or(PlaneError::WrongKind { id, expected: "variable" })?;
        if item.status == Status::Fixed {
            return Err(PlaneError::Fixed(id));
        }
        if !self.capabilities(id)?.can_set_value {
            return Err(PlaneError::NotAllowed { id, action: "set value of" });
        }
        let owner = item.owner.ok_or(PlaneError::NotAllowed { id, action: "set value of" })?;
        match role {
            VariableRole::X | VariableRole::Y => {
                let mut pos = self.coords(owner);
                pos[if role == VariableRole::X { 0 } else { 1 }] = value;
                self.drag(&[(owner, pos)])
            }
            _ => {
                let line = self.line(owner)?.clone();
                let from = self.coords(line.from);
                let length = self.val(line.length);
                let rad = value.to_radians();
                let to = [from[0] + length * rad.sin(), from[1] + length * rad.cos()];
                self.drag(&[(line.to, to)])
            }
        }
    }

    /// Move points and recalculate. Midpoints translate their whole line.
    pub fn drag(&mut self, moves: &[(EntityId, [f64; 2])]) -> Result<()> {
        let mut plan: Vec<(EntityId, [f64; 2])> = Vec::new();
        for &(id, target) in moves {
            let point = self.point(id)?.clone();
            if !point.draggable {
                return Err(PlaneError::NotAllowed { id, action: "drag" });
            }
            if point.transpose {
                let owner = self.item(id)?.owner.ok_or(PlaneError::NotAllowed { id, action: "drag" })?;
                let line = self.line(owner)?.clone();
                let current = self.coords(id);
                let delta = [target[0] - current[0], target[1] - current[1]];
                for end in [line.from, line.to] {
                    let p = self.coords(end);
                    plan.push((end, [p[0] + delta[0], p[1] + delta[1]]));
                }
            } else {
                plan.push((id, target));
            }
        }
        for &(id, _) in &plan {
            let point = self.point(id)?;
            for part in [id, point.x, point.y] {
                if self.item(part)?.status == Status::Fixed {
                    return Err(PlaneError::Fixed(part));
                }
            }
        }

        let mut moved_lines = Vec::new();
        for &(id, _) in &plan {
            if let Some(owner) = self.items.get(&id).and_then(|i| i.owner) {
                if self.items.get(&owner).map_or(false, |o| o.as_line().is_some()) && !moved_lines.contains(&owner) {
                    moved_lines.push(owner);
                }
            }
        }
        let targets: HashMap<EntityId, [f64; 2]> = plan.iter().copied().collect();
        for &line in &moved_lines {
            self.check_fixed_line(line, &targets)?;
        }

        for (id, target) in plan {
            self.set_coords(id, target);
            self.events.push(PlaneEvent::Moved { id });
        }
        self.refresh_geometry(&moved_lines);
        self.propagate();
        self.events.flush();
        Ok(())
    }

    /// A fixed line, or a fixed measurement of it, must keep its value through a drag.
    fn check_fixed_line(&self, id: EntityId, targets: &HashMap<EntityId, [f64; 2]>) -> Result<()> {
        if self.item(id)?.status == Status::Fixed {
            return Err(PlaneError::Fixed(id));
        }
        let line = self.line(id)?;
        let position = |p: EntityId| targets.get(&p).copied().unwrap_or_else(|| self.coords(p));
        let (from, to) = (position(line.from), position(line.to));
        let (dx, dy) = (to[0] - from[0], to[1] - from[1]);
        let mid = self.point(line.midpoint)?;
        let after = [
            (line.dx, dx),
            (line.dy, dy),
            (line.length, dx.hypot(dy)),
            (line.angle, angle_from_y_axis(dx, dy)),
            (mid.x, (from[0] + to[0]) / 2.0),
            (mid.y, (from[1] + to[1]) / 2.0),
        ];
        let eps = self.config.coincidence_epsilon;
        if self.item(line.midpoint)?.status == Status::Fixed
            && (after[4].1 - self.val(mid.x)).abs().max((after[5].1 - self.val(mid.y)).abs()) > eps
        {
            return Err(PlaneError::Fixed(line.midpoint));
        }
        for (var, value) in after {
            if self.item(var)?.status == Status::Fixed && (value - self.val(var)).abs() > eps {
                return Err(PlaneError::Fixed(var));
            }
        }
        Ok(())
    }

    pub fn move_point(&mut self, id: EntityId, pos: [f64; 2]) -> Result<()> {
        self.drag(&[(id, pos)])
    }

    /// Remove a top-level shape with all its children, the vertices on it and
    /// the triangles on those vertices.
    pub fn remove(&mut self, id: EntityId) -> Result<()> {
        let item = self.item(id)?;
        if item.owner.is_some() || !matches!(item.kind, ItemKind::Point(_) | ItemKind::Line(_)) {
            return Err(PlaneError::NotAllowed { id, action: "remove" });
        }
        let vertices = item.as_line().map(|l| l.vertices.clone()).unwrap_or_default();
        for vertex in vertices {
            self.remove_vertex(vertex);
        }
        self.remove_subtree(id);
        self.reset_derived_items();
        self.propagate();
        self.events.flush();
        Ok(())
    }
}
