use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use super::{FactRecord, Value};
use crate::parse::ParseError;

/// Derived-column expression AST.
///
/// Identifiers are bound to fact-record fields at evaluation time; there is
/// no way to reach anything outside the record.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Value),
    Ident(String),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Why a derived value could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    TypeMismatch {
        op: BinaryOp,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot negate {operand}")]
    InvalidNegation { operand: &'static str },
}

impl Expression {
    /// Evaluate against a fact record.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] for unbound identifiers, division by zero, or
    /// arithmetic on values without a numeric view.
    pub fn eval(&self, record: &FactRecord) -> Result<Value, ExprError> {
        match self {
            Expression::Literal(v) => Ok(v.clone()),
            Expression::Ident(name) => record
                .lookup(name)
                .map(Cow::into_owned)
                .ok_or_else(|| ExprError::UnknownIdentifier { name: name.clone() }),
            Expression::Unary(UnaryOp::Not, inner) => {
                Ok(Value::Bool(!inner.eval(record)?.is_truthy()))
            }
            Expression::Unary(UnaryOp::Neg, inner) => {
                let v = inner.eval(record)?;
                v.as_number()
                    .map(|n| Value::Number(-n))
                    .ok_or(ExprError::InvalidNegation {
                        operand: v.type_name(),
                    })
            }
            Expression::Binary(BinaryOp::And, a, b) => {
                Ok(Value::Bool(a.eval(record)?.is_truthy() && b.eval(record)?.is_truthy()))
            }
            Expression::Binary(BinaryOp::Or, a, b) => {
                Ok(Value::Bool(a.eval(record)?.is_truthy() || b.eval(record)?.is_truthy()))
            }
            Expression::Binary(op, a, b) => apply_binary(*op, &a.eval(record)?, &b.eval(record)?),
        }
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    use Ordering::{Equal, Greater, Less};

    let ord = || left.loose_cmp(right);
    match op {
        BinaryOp::Add if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) => {
            Ok(Value::String(format!(
                "{}{}",
                left.to_plain_string(),
                right.to_plain_string()
            )))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
                return Err(ExprError::TypeMismatch {
                    op,
                    left: left.type_name(),
                    right: right.type_name(),
                });
            };
            let n = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                _ if r == 0.0 => return Err(ExprError::DivisionByZero),
                BinaryOp::Div => l / r,
                _ => l % r,
            };
            Ok(Value::Number(n))
        }
        BinaryOp::Lt => Ok(Value::Bool(ord() == Some(Less))),
        BinaryOp::Le => Ok(Value::Bool(matches!(ord(), Some(Less | Equal)))),
        BinaryOp::Gt => Ok(Value::Bool(ord() == Some(Greater))),
        BinaryOp::Ge => Ok(Value::Bool(matches!(ord(), Some(Greater | Equal)))),
        BinaryOp::Eq => Ok(Value::Bool(left.loose_eq(right))),
        BinaryOp::Ne => Ok(Value::Bool(!left.loose_eq(right))),
        // Short-circuiting operators are handled by `Expression::eval`.
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{v}"),
            Expression::Ident(name) => write!(f, "{name}"),
            Expression::Unary(op, inner) => write!(f, "({op}{inner})"),
            Expression::Binary(op, a, b) => write!(f, "({a} {op} {b})"),
        }
    }
}
