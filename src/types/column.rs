use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::BuildError;
use super::expression::{ExprError, Expression};
use super::value::{parse_date, parse_number};
use super::{FactRecord, Value};
use crate::parse::ParseError;

/// Declared data type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl ColumnType {
    /// Coerce a raw output value into this type.
    ///
    /// Failed coercions into `Number` or `Date` produce `Value::Null`
    /// instead of a NaN or an invalid timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coerce(self, value: Value) -> Value {
        match self {
            ColumnType::String => value,
            ColumnType::Number => match value {
                Value::Number(_) | Value::Null => value,
                Value::String(s) if s.trim().is_empty() => Value::Number(0.0),
                Value::String(s) => parse_number(&s).map_or(Value::Null, Value::Number),
                other => other.as_number().map_or(Value::Null, Value::Number),
            },
            ColumnType::Boolean => match value {
                Value::Bool(_) => value,
                Value::String(s) if s == "true" => Value::Bool(true),
                Value::String(s) if s == "false" => Value::Bool(false),
                other => Value::Bool(other.is_truthy()),
            },
            ColumnType::Date => match value {
                Value::Date(_) => value,
                Value::String(s) => parse_date(&s).map_or(Value::Null, Value::Date),
                Value::Number(ms) if ms.is_finite() => {
                    DateTime::<Utc>::from_timestamp_millis(ms as i64)
                        .map_or(Value::Null, Value::Date)
                }
                _ => Value::Null,
            },
        }
    }
}

impl FromStr for ColumnType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "number" => Ok(ColumnType::Number),
            "boolean" => Ok(ColumnType::Boolean),
            "date" => Ok(ColumnType::Date),
            _ => Err(BuildError::UnknownColumnType { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        };
        f.write_str(s)
    }
}

/// An input-column expression, parsed once when the column is declared.
///
/// A parse failure is kept rather than raised: evaluating a broken
/// expression yields `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedExpression {
    source: String,
    parsed: Result<Expression, ParseError>,
}

impl DerivedExpression {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            parsed: crate::parse::parse_expression(source),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed AST, or the parse error.
    pub fn parsed(&self) -> Result<&Expression, &ParseError> {
        self.parsed.as_ref()
    }

    /// Compute the derived value for a record.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError`] if the source did not parse or evaluation fails.
    pub fn evaluate(&self, record: &FactRecord) -> Result<Value, ExprError> {
        match &self.parsed {
            Ok(expr) => expr.eval(record),
            Err(e) => Err(ExprError::Parse(e.clone())),
        }
    }
}

/// An input or output column declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub expression: Option<DerivedExpression>,
    pub default_value: Option<Value>,
}

impl Column {
    #[must_use]
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_owned(),
            column_type,
            expression: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn string(name: &str) -> Self {
        Self::new(name, ColumnType::String)
    }

    #[must_use]
    pub fn number(name: &str) -> Self {
        Self::new(name, ColumnType::Number)
    }

    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self::new(name, ColumnType::Boolean)
    }

    #[must_use]
    pub fn date(name: &str) -> Self {
        Self::new(name, ColumnType::Date)
    }

    /// Derive this input column's value from an expression over the record
    /// instead of reading the field with the column's name.
    #[must_use]
    pub fn with_expression(mut self, source: &str) -> Self {
        self.expression = Some(DerivedExpression::new(source));
        self
    }

    /// Value used for this output column when no rule assigns it.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}
