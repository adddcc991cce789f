//! Read-side queries: formula texts, derivations, consistency and table rows.

use super::container::Plane;
use super::types::{Category, Status};
use crate::error::Result;
use crate::topo::EntityId;
use crate::variables::Inference;
use serde::Serialize;
use std::collections::HashSet;

/// One line of the item table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: EntityId,
    pub name: String,
    pub kind: &'static str,
    pub categories: Vec<Category>,
    pub status: Status,
    pub reason: Option<String>,
    pub value: Option<f64>,
    pub formula: Option<String>,
    pub derived_formula: Option<String>,
}

/// One inference of a derivation chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivationStep {
    pub id: EntityId,
    pub name: String,
    pub reason: String,
    pub formula: String,
    pub derived: String,
}

/// A recorded formula that no longer matches the stored value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inconsistency {
    pub id: EntityId,
    pub name: String,
    pub formula: String,
    /// Formula evaluated over current term values, `None` if it could not be evaluated
    pub expected: Option<f64>,
    pub actual: Option<f64>,
}

/// Short literal for derived formulas: 4 decimals, trailing zeros dropped.
pub fn format_literal(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

impl Plane {
    fn inference_of(&self, id: EntityId) -> Result<Option<&Inference>> {
        Ok(self.item(id)?.as_variable().and_then(|v| v.inference.as_ref()))
    }

    fn instantiate(&self, inference: &Inference) -> String {
        inference.instantiate(&|term| self.name_of(term))
    }

    fn substitute_determined(&self, inference: &Inference) -> String {
        inference.substitute(&self.name_of(inference.owner()), &|_, term| {
            if self.det(term) && self.val(term).is_finite() {
                format_literal(self.val(term))
            } else {
                self.name_of(term)
            }
        })
    }

    /// The formula with term names, e.g. `L1.length == sqrt(L1.dx^2 + L1.dy^2)`.
    pub fn formula_text(&self, id: EntityId) -> Result<Option<String>> {
        Ok(self.inference_of(id)?.map(|inf| self.instantiate(inf)))
    }

    /// The formula with every determined term replaced by its value.
    pub fn derived_formula(&self, id: EntityId) -> Result<Option<String>> {
        Ok(self.inference_of(id)?.map(|inf| self.substitute_determined(inf)))
    }

    /// Every inference reachable from `id` through formula terms, depth first.
    pub fn derivation(&self, id: EntityId) -> Result<Vec<DerivationStep>> {
        self.item(id)?;
        let mut steps = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Ok(Some(inference)) = self.inference_of(next) else {
                continue;
            };
            steps.push(DerivationStep {
                id: next,
                name: self.name_of(next),
                reason: inference.reason.clone(),
                formula: self.instantiate(inference),
                derived: self.substitute_determined(inference),
            });
            stack.extend(inference.terms[1..].iter().rev().copied());
        }
        Ok(steps)
    }

    /// Evaluate every recorded formula of a determined variable against current values.
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let eps = self.config.consistency_epsilon;
        self.items()
            .filter(|item| item.is_determined())
            .filter_map(|item| {
                let variable = item.as_variable()?;
                let inference = variable.inference.as_ref()?;
                let values: Vec<f64> = inference.terms.iter().map(|t| self.val(*t)).collect();
                let expected = inference.evaluate(&values).ok().filter(|v| v.is_finite());
                let consistent = match (expected, variable.value) {
                    (Some(e), Some(a)) => (e - a).abs() <= eps,
                    _ => false,
                };
                (!consistent).then(|| Inconsistency {
                    id: item.id,
                    name: item.name.clone(),
                    formula: self.instantiate(inference),
                    expected,
                    actual: variable.value,
                })
            })
            .collect()
    }

    /// One row per item, in creation order.
    pub fn rows(&self) -> Vec<Row> {
        self.items()
            .map(|item| {
                let inference = item.as_variable().and_then(|v| v.inference.as_ref());
                Row {
                    id: item.id,
                    name: item.name.clone(),
                    kind: item.kind.name(),
                    categories: item.categories.clone(),
                    status: item.status,
                    reason: item.reason.clone(),
                    value: item.as_variable().and_then(|v| v.value),
                    formula: inference.map(|inf| self.instantiate(inf)),
                    derived_formula: inference.map(|inf| self.substitute_determined(inf)),
                }
            })
            .collect()
    }
}
