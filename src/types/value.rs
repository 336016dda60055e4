use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Scalar values flowing through conditions, fact records and outputs.
///
/// Cross-variant comparisons follow a fixed policy (see [`Value::loose_cmp`]);
/// nothing falls back to ambient string conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent or explicitly null.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit floating-point number. All numbers are stored this way.
    Number(f64),
    /// A UTF-8 string.
    String(String),
    /// A UTC timestamp, produced by coercion into a `Date` column.
    Date(DateTime<Utc>),
}

impl Value {
    /// Loose equality: `loose_cmp` reports `Equal`.
    #[must_use]
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.loose_cmp(other) == Some(Ordering::Equal)
    }

    /// Order two values under the cross-type policy.
    ///
    /// | pair | rule |
    /// |---|---|
    /// | same variant | natural order (strings bytewise, `false < true`) |
    /// | number / string | numeric, if the string parses as a finite number |
    /// | bool / string | as bools, if the string is exactly `true` or `false` |
    /// | date / string | chronological, if the string parses as a date |
    /// | date / number | epoch milliseconds |
    ///
    /// Every other pair, including anything against `Null` except `Null`
    /// itself, is incomparable and yields `None`. NaN is never ordered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::String(s)) => a.partial_cmp(&parse_number(s)?),
            (Value::String(s), Value::Number(b)) => parse_number(s)?.partial_cmp(b),
            (Value::Bool(a), Value::String(s)) => Some(a.cmp(&parse_bool(s)?)),
            (Value::String(s), Value::Bool(b)) => Some(parse_bool(s)?.cmp(b)),
            (Value::Date(a), Value::String(s)) => Some(a.cmp(&parse_date(s)?)),
            (Value::String(s), Value::Date(b)) => Some(parse_date(s)?.cmp(b)),
            (Value::Number(a), Value::Date(b)) => a.partial_cmp(&(b.timestamp_millis() as f64)),
            (Value::Date(a), Value::Number(b)) => (a.timestamp_millis() as f64).partial_cmp(b),
            _ => None,
        }
    }

    /// Truthiness used by boolean coercion and the `&&`, `||` and `!`
    /// expression operators.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Date(_) => true,
        }
    }

    /// Numeric view used by arithmetic. `Null` has none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => parse_number(s),
            Value::Date(d) => Some(d.timestamp_millis() as f64),
            Value::Null => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
        }
    }

    /// Render without quoting strings (used for concatenation).
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Convert into a `serde_json::Value`. Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_rfc3339()),
        }
    }
}

/// Parse a trimmed string as a finite number. Empty strings do not parse.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (UTC) and `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Arrays and objects have no scalar form; they are kept as compact JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Value::String(nested.to_string())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Number(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Date(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}
