//! Builders and rendering for formula ASTs.
//!
//! A formula always reads `@0 == <rhs>`: term 0 is the owner, the right-hand side
//! refers to the remaining terms by index.

use super::parser::{BinaryOperator, Expr, UnaryOperator};

pub fn num(value: f64) -> Expr {
    Expr::Number(value)
}

pub fn term(index: usize) -> Expr {
    Expr::Term(index)
}

fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn add(left: Expr, right: Expr) -> Expr {
    binary(BinaryOperator::Add, left, right)
}

pub fn sub(left: Expr, right: Expr) -> Expr {
    binary(BinaryOperator::Sub, left, right)
}

pub fn mul(left: Expr, right: Expr) -> Expr {
    binary(BinaryOperator::Mul, left, right)
}

pub fn div(left: Expr, right: Expr) -> Expr {
    binary(BinaryOperator::Div, left, right)
}

pub fn pow(base: Expr, exponent: Expr) -> Expr {
    binary(BinaryOperator::Pow, base, exponent)
}

pub fn neg(operand: Expr) -> Expr {
    Expr::UnaryOp {
        op: UnaryOperator::Neg,
        operand: Box::new(operand),
    }
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FnCall {
        name: name.to_string(),
        args,
    }
}

pub fn sqrt(arg: Expr) -> Expr {
    call("sqrt", vec![arg])
}

pub fn square(arg: Expr) -> Expr {
    pow(arg, num(2.0))
}

/// Mean of the given terms, e.g. `(@1 + @2) / 2`.
pub fn average(terms: &[usize]) -> Expr {
    let sum = terms
        .iter()
        .map(|&i| term(i))
        .reduce(add)
        .unwrap_or(num(0.0));
    div(sum, num(terms.len().max(1) as f64))
}

/// `sqrt((@a - @b)^2 + (@c - @d)^2)`: distance between (@a, @c) and (@b, @d).
pub fn distance(ax: usize, bx: usize, ay: usize, by: usize) -> Expr {
    sqrt(add(
        square(sub(term(ax), term(bx))),
        square(sub(term(ay), term(by))),
    ))
}

/// Highest index referenced by the expression, if any.
pub fn max_term(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Number(_) | Expr::Constant(_) => None,
        Expr::Term(i) => Some(*i),
        Expr::BinaryOp { left, right, .. } => max_term(left).max(max_term(right)),
        Expr::UnaryOp { operand, .. } => max_term(operand),
        Expr::FnCall { args, .. } => args.iter().filter_map(max_term).max(),
    }
}

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_UNARY: u8 = 4;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp { op, .. } => match op {
            BinaryOperator::Add | BinaryOperator::Sub => PREC_ADD,
            BinaryOperator::Mul | BinaryOperator::Div => PREC_MUL,
            BinaryOperator::Pow => PREC_POW,
        },
        Expr::UnaryOp { .. } => PREC_UNARY,
        _ => u8::MAX,
    }
}

/// Render `expr` as text, spelling each term with `term_text`.
///
/// Negative literals and negative substituted values are parenthesized
/// whenever they are not the whole expression.
pub fn render(expr: &Expr, term_text: &dyn Fn(usize) -> String) -> String {
    render_at(expr, 0, term_text)
}

fn wrap_negative(text: String, context: u8) -> String {
    if context > 0 && text.starts_with('-') {
        format!("({})", text)
    } else {
        text
    }
}

fn render_at(expr: &Expr, context: u8, term_text: &dyn Fn(usize) -> String) -> String {
    match expr {
        Expr::Number(n) => wrap_negative(format!("{}", n), context),
        Expr::Term(i) => wrap_negative(term_text(*i), context),
        Expr::Constant(name) => name.clone(),
        Expr::BinaryOp { op, left, right } => {
            let prec = precedence(expr);
            let symbol = match op {
                BinaryOperator::Add => "+",
                BinaryOperator::Sub => "-",
                BinaryOperator::Mul => "*",
                BinaryOperator::Div => "/",
                BinaryOperator::Pow => "^",
            };
            // Left-associative operators need parentheses on an equal-precedence right
            // operand; the right-associative power needs them on the left.
            let (left_min, right_min) = if *op == BinaryOperator::Pow {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            let l = render_at(left, left_min, term_text);
            let r = render_at(right, right_min, term_text);
            let text = if *op == BinaryOperator::Pow {
                format!("{}{}{}", l, symbol, r)
            } else {
                format!("{} {} {}", l, symbol, r)
            };
            if prec < context {
                format!("({})", text)
            } else {
                text
            }
        }
        Expr::UnaryOp { op, operand } => {
            let inner = render_at(operand, PREC_UNARY, term_text);
            let text = match op {
                UnaryOperator::Neg => format!("-{}", inner),
            };
            if PREC_UNARY < context {
                format!("({})", text)
            } else {
                text
            }
        }
        Expr::FnCall { name, args } => {
            let args: Vec<String> = args.iter().map(|a| render_at(a, 0, term_text)).collect();
            format!("{}({})", name, args.join(", "))
        }
    }
}
