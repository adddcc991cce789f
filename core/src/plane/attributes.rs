//! Attribute export and restore for the persistence layer.
//!
//! Every item exports a flat `key -> string` map. Restoring a map may name
//! items that do not exist yet (a label location, a formula term); those
//! references are parked and resolved by `resolve_references` once every
//! item has been rebuilt.

use super::container::Plane;
use super::types::{ItemKind, Status};
use crate::error::{PlaneError, Result};
use crate::topo::EntityId;
use crate::variables::{Inference, VariableRole};
use std::collections::BTreeMap;
use tracing::warn;

pub type Attributes = BTreeMap<String, String>;

/// A reference read from attributes whose target did not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingReference {
    Location { owner: EntityId, target: EntityId },
    Formula { owner: EntityId, reason: String, template: String, terms: Vec<EntityId>, attached: bool },
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

fn parse_id(key: &str, text: &str) -> Result<EntityId> {
    text.parse().map_err(|e: uuid::Error| PlaneError::Attribute {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_ids(key: &str, text: &str) -> Result<Vec<EntityId>> {
    text.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_id(key, s))
        .collect()
}

impl Plane {
    pub fn attributes(&self, id: EntityId) -> Result<Attributes> {
        let item = self.item(id)?;
        let mut map = Attributes::new();
        map.insert("id".into(), id.to_string());
        map.insert("name".into(), item.name.clone());
        map.insert("kind".into(), item.kind.name().into());
        map.insert("status".into(), item.status.to_string());
        if let Some(reason) = &item.reason {
            map.insert("reason".into(), reason.clone());
        }
        if let Some(owner) = item.owner {
            map.insert("owner".into(), owner.to_string());
        }
        let categories: Vec<String> = item
            .categories
            .iter()
            .filter_map(|c| serde_json::to_value(c).ok())
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        map.insert("categories".into(), categories.join(","));

        match &item.kind {
            ItemKind::Variable(v) => {
                map.insert("role".into(), format!("{:?}", v.role));
                if let Some(value) = v.value {
                    map.insert("value".into(), value.to_string());
                }
                if let Some(location) = v.location {
                    map.insert("location".into(), location.to_string());
                }
                if let Some(inference) = &v.inference {
                    map.insert("formula".into(), inference.template());
                    map.insert("formula_reason".into(), inference.reason.clone());
                    map.insert("terms".into(), join_ids(&inference.terms));
                    if inference.attached {
                        map.insert("formula_attached".into(), "true".into());
                    }
                }
            }
            ItemKind::Point(p) => {
                map.insert("x".into(), p.x.to_string());
                map.insert("y".into(), p.y.to_string());
                map.insert("draggable".into(), p.draggable.to_string());
            }
            ItemKind::Line(l) => {
                map.insert("from".into(), l.from.to_string());
                map.insert("to".into(), l.to.to_string());
            }
            ItemKind::Vertex(v) => {
                map.insert("lines".into(), join_ids(&[v.line_a, v.line_b]));
            }
            ItemKind::Triangle(t) => {
                map.insert("vertices".into(), join_ids(&t.vertices));
            }
        }
        Ok(map)
    }

    /// Restore name, status, value and formula linkage of an existing item.
    pub fn read_attributes(&mut self, map: &Attributes) -> Result<()> {
        let text = map.get("id").ok_or_else(|| PlaneError::Attribute {
            key: "id".into(),
            message: "missing".into(),
        })?;
        let id = parse_id("id", text)?;
        let item = self.item(id)?;
        if let (Some(role), Some(variable)) = (map.get("role"), item.as_variable()) {
            let role: VariableRole = role.parse().map_err(|message| PlaneError::Attribute {
                key: "role".into(),
                message,
            })?;
            if role != variable.role {
                return Err(PlaneError::Attribute {
                    key: "role".into(),
                    message: format!("{} is a {:?}, not a {:?}", item.name, variable.role, role),
                });
            }
        }

        if let Some(name) = map.get("name") {
            self.names.observe(name);
            self.item_mut(id)?.name = name.clone();
        }
        if let Some(status) = map.get("status") {
            let status: Status = status.parse().map_err(|message| PlaneError::Attribute {
                key: "status".into(),
                message,
            })?;
            self.set_status(id, status, map.get("reason").cloned());
        }

        if self.item(id)?.as_variable().is_none() {
            self.events.flush();
            return Ok(());
        }
        if let Some(value) = map.get("value") {
            let value: f64 = value.parse().map_err(|e: std::num::ParseFloatError| PlaneError::Attribute {
                key: "value".into(),
                message: e.to_string(),
            })?;
            self.set_val(id, Some(value));
        }
        if let Some(location) = map.get("location") {
            let target = parse_id("location", location)?;
            self.pending_refs.push(PendingReference::Location { owner: id, target });
        }
        if let Some(template) = map.get("formula") {
            let terms = parse_ids("terms", map.get("terms").map(String::as_str).unwrap_or(""))?;
            if terms.first() != Some(&id) {
                return Err(PlaneError::Attribute {
                    key: "terms".into(),
                    message: "first term must be the owner".into(),
                });
            }
            let reason = map
                .get("formula_reason")
                .or_else(|| map.get("reason"))
                .cloned()
                .unwrap_or_default();
            // Validate the template now, link it once the terms exist.
            Inference::from_template(&reason, template, terms.clone())?;
            self.pending_refs.push(PendingReference::Formula {
                owner: id,
                reason,
                template: template.clone(),
                terms,
                attached: map.get("formula_attached").map_or(false, |v| v == "true"),
            });
        }
        self.resolve_available();
        self.events.flush();
        Ok(())
    }

    /// Link whatever parked references can be linked now.
    fn resolve_available(&mut self) {
        let pending = std::mem::take(&mut self.pending_refs);
        for reference in pending {
            if !self.try_link(&reference) {
                self.pending_refs.push(reference);
            }
        }
    }

    fn try_link(&mut self, reference: &PendingReference) -> bool {
        match reference {
            PendingReference::Location { owner, target } => {
                if self.get(*target).is_none() {
                    return false;
                }
                if let Some(ItemKind::Variable(v)) = self.items.get_mut(owner).map(|i| &mut i.kind) {
                    v.location = Some(*target);
                }
                true
            }
            PendingReference::Formula { owner, reason, template, terms, attached } => {
                if terms.iter().any(|t| self.get(*t).is_none()) {
                    return false;
                }
                let Ok(mut inference) = Inference::from_template(reason, template, terms.clone()) else {
                    return true;
                };
                inference.attached = *attached;
                if let Some(ItemKind::Variable(v)) = self.items.get_mut(owner).map(|i| &mut i.kind) {
                    v.inference = Some(inference);
                }
                true
            }
        }
    }

    /// Resolve parked forward references once every item exists, then solve.
    /// Returns the number of references that could not be resolved; they are dropped.
    pub fn resolve_references(&mut self) -> usize {
        self.resolve_available();
        let unresolved = std::mem::take(&mut self.pending_refs);
        for reference in &unresolved {
            warn!(?reference, "dropping unresolved reference");
        }
        self.propagate();
        self.events.flush();
        unresolved.len()
    }

    pub fn pending_references(&self) -> &[PendingReference] {
        &self.pending_refs
    }
}
