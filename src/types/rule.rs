use super::{Condition, Value};

/// A single row of a decision table.
///
/// Rules are created via [`DecisionTableBuilder`](super::DecisionTableBuilder)
/// or from a [`TableConfig`](crate::TableConfig). Conditions that do not
/// mention a column place no constraint on it; a rule with no conditions at
/// all matches every record.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub conditions: Vec<Condition>,
    pub outputs: Vec<OutputAssignment>,
    /// Used by the `PRIORITY` hit policy; missing counts as 0.
    pub priority: Option<f64>,
    pub annotation: Option<String>,
}

/// A raw value assigned to an output column. Coercion to the column's type
/// happens when the rule matches, not when it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputAssignment {
    pub column: String,
    pub value: Value,
}

impl Rule {
    /// Priority with the `PRIORITY` default applied.
    #[must_use]
    pub fn effective_priority(&self) -> f64 {
        self.priority.unwrap_or(0.0)
    }
}

/// Condition input accepted by [`RuleBuilder::when`](super::RuleBuilder::when):
/// either FEEL-like text to parse, or a typed value matched exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCondition {
    Text(String),
    Value(Value),
}

impl RawCondition {
    /// Turn this raw entry into a [`Condition`] on `column`.
    #[must_use]
    pub fn into_condition(self, column: &str) -> Condition {
        match self {
            RawCondition::Text(text) => Condition::parse(column, &text),
            RawCondition::Value(value) => Condition::exact(column, value),
        }
    }
}

impl From<&str> for RawCondition {
    fn from(v: &str) -> Self {
        RawCondition::Text(v.to_owned())
    }
}

impl From<String> for RawCondition {
    fn from(v: String) -> Self {
        RawCondition::Text(v)
    }
}

impl From<Value> for RawCondition {
    fn from(v: Value) -> Self {
        RawCondition::Value(v)
    }
}

impl From<i64> for RawCondition {
    fn from(v: i64) -> Self {
        RawCondition::Value(v.into())
    }
}

impl From<f64> for RawCondition {
    fn from(v: f64) -> Self {
        RawCondition::Value(v.into())
    }
}

impl From<bool> for RawCondition {
    fn from(v: bool) -> Self {
        RawCondition::Value(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Operand, Operator};

    #[test]
    fn text_is_parsed() {
        let cond = RawCondition::from("< 18").into_condition("age");
        assert_eq!(cond.operator, Operator::Lt);
        assert_eq!(cond.operand, Operand::Scalar(Value::Number(18.0)));
    }

    #[test]
    fn typed_value_is_exact() {
        let cond = RawCondition::from(true).into_condition("vip");
        assert_eq!(cond.operator, Operator::Eq);
        assert_eq!(cond.operand, Operand::Scalar(Value::Bool(true)));
    }

    #[test]
    fn missing_priority_is_zero() {
        let rule = Rule {
            id: "r".into(),
            conditions: vec![],
            outputs: vec![],
            priority: None,
            annotation: None,
        };
        assert_eq!(rule.effective_priority(), 0.0);
    }
}
