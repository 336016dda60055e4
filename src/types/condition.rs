use std::fmt;

use super::Value;

/// Operators a rule's input condition can apply to a fact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
    In,
    NotIn,
    /// Wildcard (`-`): always satisfied.
    Any,
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Scalar(Value),
    /// Inclusive `[lo..hi]` bounds.
    Range(Value, Value),
    List(Vec<Value>),
}

/// One input constraint of a rule, bound to a column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub operand: Operand,
}

impl Condition {
    /// Parse FEEL-like condition text (`>= 18`, `in (a, b)`, `[1..5]`, `-`)
    /// for the given column. Never fails; unrecognised text becomes an
    /// exact match on the whole text.
    #[must_use]
    pub fn parse(column: &str, text: &str) -> Self {
        let (operator, operand) = crate::parse::parse_condition(text);
        Self {
            column: column.to_owned(),
            operator,
            operand,
        }
    }

    /// Exact match against an already-typed value; no text parsing happens.
    #[must_use]
    pub fn exact(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_owned(),
            operator: Operator::Eq,
            operand: Operand::Scalar(value.into()),
        }
    }

    /// Whether `value` satisfies this condition.
    ///
    /// Ordered operators are false when the operands are incomparable; `Ne`
    /// and `NotIn` are plain negations of `Eq` and `In`.
    #[must_use]
    pub fn test(&self, value: &Value) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};

        match (self.operator, &self.operand) {
            (Operator::Any, _) => true,
            (Operator::Eq, Operand::Scalar(v)) => value.loose_eq(v),
            (Operator::Ne, Operand::Scalar(v)) => !value.loose_eq(v),
            (Operator::Lt, Operand::Scalar(v)) => value.loose_cmp(v) == Some(Less),
            (Operator::Le, Operand::Scalar(v)) => {
                matches!(value.loose_cmp(v), Some(Less | Equal))
            }
            (Operator::Gt, Operand::Scalar(v)) => value.loose_cmp(v) == Some(Greater),
            (Operator::Ge, Operand::Scalar(v)) => {
                matches!(value.loose_cmp(v), Some(Greater | Equal))
            }
            (Operator::Between, Operand::Range(lo, hi)) => {
                matches!(value.loose_cmp(lo), Some(Greater | Equal))
                    && matches!(value.loose_cmp(hi), Some(Less | Equal))
            }
            (Operator::In, Operand::List(items)) => items.iter().any(|i| value.loose_eq(i)),
            (Operator::NotIn, Operand::List(items)) => !items.iter().any(|i| value.loose_eq(i)),
            // Operator/operand shapes that the parser never produces.
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Between => "between",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Any => "-",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Scalar(v) => write!(f, "{v}"),
            Operand::Range(lo, hi) => write!(f, "[{lo}..{hi}]"),
            Operand::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "({})", rendered.join(", "))
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.operator, &self.operand) {
            (Operator::Any, _) => write!(f, "{} -", self.column),
            (Operator::Between, range) => write!(f, "{} {range}", self.column),
            (op, operand) => write!(f, "{} {op} {operand}", self.column),
        }
    }
}

/// Intermediate builder for typed conditions.
/// Created by [`column()`]; requires an operator method to produce a [`Condition`].
#[derive(Debug, Clone)]
pub struct ColumnCondition {
    name: String,
}

impl ColumnCondition {
    fn scalar(self, operator: Operator, value: impl Into<Value>) -> Condition {
        Condition {
            column: self.name,
            operator,
            operand: Operand::Scalar(value.into()),
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Eq, value)
    }

    #[must_use]
    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Ne, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Lt, value)
    }

    #[must_use]
    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Le, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Gt, value)
    }

    #[must_use]
    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.scalar(Operator::Ge, value)
    }

    #[must_use]
    pub fn between(self, lo: impl Into<Value>, hi: impl Into<Value>) -> Condition {
        Condition {
            column: self.name,
            operator: Operator::Between,
            operand: Operand::Range(lo.into(), hi.into()),
        }
    }

    #[must_use]
    pub fn one_of<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Condition {
        Condition {
            column: self.name,
            operator: Operator::In,
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    #[must_use]
    pub fn none_of<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Condition {
        Condition {
            column: self.name,
            operator: Operator::NotIn,
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    #[must_use]
    pub fn any(self) -> Condition {
        Condition {
            column: self.name,
            operator: Operator::Any,
            operand: Operand::None,
        }
    }
}

#[must_use]
pub fn column(name: &str) -> ColumnCondition {
    ColumnCondition {
        name: name.to_owned(),
    }
}
