//! Variable & inference ledger.
//!
//! Provides the scalar variables of the plane together with:
//! - A structured formula AST recording why a variable is determined
//! - Rendering with term names ("instantiation") or substituted values
//! - A parser for the persisted `@0 == ...` template form
//! - Numeric evaluation for consistency checks

pub mod types;
pub mod parser;
pub mod evaluator;
pub mod formula;


pub use types::{Variable, VariableRole, Inference};
pub use parser::{parse_expression, Expr, ParseError};
pub use evaluator::{evaluate, EvalError};
