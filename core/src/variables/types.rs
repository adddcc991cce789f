//! Core types for the variable ledger.

use super::evaluator::{evaluate, EvalError};
use super::formula::{max_term, render};
use super::parser::{parse_expression, Expr, ParseError};
use crate::topo::EntityId;
use serde::{Deserialize, Serialize};

/// What a scalar variable measures. Fixes its display suffix and which edits it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRole {
    X,
    Y,
    Dx,
    Dy,
    Length,
    /// Line direction from the +Y axis, degrees
    Angle,
    /// Difference of the two line angles at a vertex, degrees
    VertexAngle,
    /// Triangle side length
    Side,
    /// Triangle interior angle, degrees
    InteriorAngle,
}

impl VariableRole {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Dx => "dx",
            Self::Dy => "dy",
            Self::Length => "length",
            Self::Angle => "angle",
            Self::VertexAngle => "angle",
            Self::Side => "side",
            Self::InteriorAngle => "angle",
        }
    }

    pub fn is_coordinate(&self) -> bool {
        matches!(self, Self::X | Self::Y)
    }
}

impl std::str::FromStr for VariableRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(Self::X),
            "Y" => Ok(Self::Y),
            "Dx" => Ok(Self::Dx),
            "Dy" => Ok(Self::Dy),
            "Length" => Ok(Self::Length),
            "Angle" => Ok(Self::Angle),
            "VertexAngle" => Ok(Self::VertexAngle),
            "Side" => Ok(Self::Side),
            "InteriorAngle" => Ok(Self::InteriorAngle),
            other => Err(format!("Unknown variable role '{}'", other)),
        }
    }
}

/// A scalar quantity in the plane.
#[derive(Debug, Clone)]
pub struct Variable {
    pub role: VariableRole,
    /// Current value, maintained by the owner's recalculation
    pub value: Option<f64>,
    /// Why this variable is determined, once a rule has fired
    pub inference: Option<Inference>,
    /// Point used to place this variable's label
    pub location: Option<EntityId>,
}

impl Variable {
    pub fn new(role: VariableRole, value: f64) -> Self {
        Self {
            role,
            value: Some(value),
            inference: None,
            location: None,
        }
    }

    pub fn at(mut self, location: EntityId) -> Self {
        self.location = Some(location);
        self
    }
}

/// The reified formula of a determined variable: `terms[0] == expr(terms[1..])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub reason: String,
    /// Right-hand side; `Expr::Term(i)` refers to `terms[i]`
    pub expr: Expr,
    /// Ordered term ids, the owner first
    pub terms: Vec<EntityId>,
    /// Attached by a caller rather than recorded by a solve rule; survives resets
    pub attached: bool,
}

impl Inference {
    /// Build an inference for `owner`; `rhs_terms` become `@1`, `@2`, ...
    pub fn new(owner: EntityId, reason: &str, expr: Expr, rhs_terms: &[EntityId]) -> Self {
        let mut terms = Vec::with_capacity(rhs_terms.len() + 1);
        terms.push(owner);
        terms.extend_from_slice(rhs_terms);
        Self {
            reason: reason.to_string(),
            expr,
            terms,
            attached: false,
        }
    }

    /// Rebuild an inference from its persisted template (`@0 == ...`) and term ids.
    pub fn from_template(reason: &str, template: &str, terms: Vec<EntityId>) -> Result<Self, ParseError> {
        let rhs = template
            .split_once("==")
            .filter(|(lhs, _)| lhs.trim() == "@0")
            .map(|(_, rhs)| rhs)
            .ok_or_else(|| ParseError {
                message: "Formula must read '@0 == ...'".to_string(),
                position: 0,
            })?;
        let expr = parse_expression(rhs)?;
        if terms.is_empty() || max_term(&expr).map_or(false, |i| i >= terms.len()) {
            return Err(ParseError {
                message: format!("Formula references more terms than the {} given", terms.len()),
                position: 0,
            });
        }
        Ok(Self {
            reason: reason.to_string(),
            expr,
            terms,
            attached: false,
        })
    }

    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }

    pub fn owner(&self) -> EntityId {
        self.terms[0]
    }

    /// Persisted form, e.g. `@0 == sqrt(@1^2 + @2^2)`.
    pub fn template(&self) -> String {
        format!("@0 == {}", render(&self.expr, &|i| format!("@{}", i)))
    }

    /// Human readable form with each term spelled by `name`.
    pub fn instantiate(&self, name: &dyn Fn(EntityId) -> String) -> String {
        let rhs = render(&self.expr, &|i| {
            self.terms.get(i).map(|id| name(*id)).unwrap_or_else(|| format!("@{}", i))
        });
        format!("{} == {}", name(self.owner()), rhs)
    }

    /// Form with each term replaced by `substitute` (used for literal substitution).
    pub fn substitute(&self, owner_name: &str, substitute: &dyn Fn(usize, EntityId) -> String) -> String {
        let rhs = render(&self.expr, &|i| {
            self.terms.get(i).map(|id| substitute(i, *id)).unwrap_or_else(|| format!("@{}", i))
        });
        format!("{} == {}", owner_name, rhs)
    }

    /// Right-hand side evaluated with `values[i]` for term `i`.
    pub fn evaluate(&self, values: &[f64]) -> Result<f64, EvalError> {
        evaluate(&self.expr, values)
    }
}
