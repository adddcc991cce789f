//! Numeric evaluation of formulas against term values.
//!
//! Trigonometry is in degrees throughout: `sin`, `cos` and `tan` take degrees,
//! `asin`, `acos`, `atan` and `atan2` return degrees.

use super::parser::{BinaryOperator, Expr, UnaryOperator};

/// Slack accepted on the domain of `sqrt`, `asin` and `acos` before an argument is rejected.
const DOMAIN_SLACK: f64 = 1e-9;

/// Evaluation error
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Term index not present in the value list
    MissingTerm(usize),
    /// Division by zero
    DivisionByZero,
    /// Unknown function
    UnknownFunction(String),
    /// Function called with the wrong number of arguments
    Arity { name: String, expected: usize, got: usize },
    /// Invalid function argument (e.g., sqrt of negative)
    InvalidArgument(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTerm(index) => write!(f, "No value for term @{}", index),
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            Self::Arity { name, expected, got } => {
                write!(f, "{} expects {} argument(s), got {}", name, expected, got)
            }
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluate `expr`, reading `Expr::Term(i)` from `values[i]`.
pub fn evaluate(expr: &Expr, values: &[f64]) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(n) => Ok(*n),

        Expr::Term(index) => values.get(*index).copied().ok_or(EvalError::MissingTerm(*index)),

        Expr::Constant(name) => match name.as_str() {
            "PI" => Ok(std::f64::consts::PI),
            _ => Err(EvalError::InvalidArgument(format!("Unknown constant: {}", name))),
        },

        Expr::BinaryOp { op, left, right } => {
            let l = evaluate(left, values)?;
            let r = evaluate(right, values)?;

            match op {
                BinaryOperator::Add => Ok(l + r),
                BinaryOperator::Sub => Ok(l - r),
                BinaryOperator::Mul => Ok(l * r),
                BinaryOperator::Div => {
                    if r.abs() < 1e-15 {
                        Err(EvalError::DivisionByZero)
                    } else {
                        Ok(l / r)
                    }
                }
                BinaryOperator::Pow => Ok(l.powf(r)),
            }
        }

        Expr::UnaryOp { op, operand } => {
            let val = evaluate(operand, values)?;
            match op {
                UnaryOperator::Neg => Ok(-val),
            }
        }

        Expr::FnCall { name, args } => {
            let vals = args
                .iter()
                .map(|arg| evaluate(arg, values))
                .collect::<Result<Vec<_>, _>>()?;
            call(name, &vals)
        }
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, EvalError> {
    let expected = if name == "atan2" { 2 } else { 1 };
    if args.len() != expected {
        return Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        });
    }
    let val = args[0];

    match name {
        "sin" => Ok(val.to_radians().sin()),
        "cos" => Ok(val.to_radians().cos()),
        "tan" => Ok(val.to_radians().tan()),
        "asin" => unit_interval(name, val).map(|v| v.asin().to_degrees()),
        "acos" => unit_interval(name, val).map(|v| v.acos().to_degrees()),
        "atan" => Ok(val.atan().to_degrees()),
        "atan2" => Ok(val.atan2(args[1]).to_degrees()),
        "sqrt" => {
            if val < -DOMAIN_SLACK {
                Err(EvalError::InvalidArgument("sqrt of negative number".to_string()))
            } else {
                Ok(val.max(0.0).sqrt())
            }
        }
        "abs" => Ok(val.abs()),
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn unit_interval(name: &str, val: f64) -> Result<f64, EvalError> {
    if val < -1.0 - DOMAIN_SLACK || val > 1.0 + DOMAIN_SLACK {
        Err(EvalError::InvalidArgument(format!("{} argument must be in [-1, 1]", name)))
    } else {
        Ok(val.clamp(-1.0, 1.0))
    }
}
