use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::Value;

/// The input data a decision table is evaluated against: a flat mapping
/// from field name to [`Value`].
///
/// Keys are kept sorted, so snapshots taken for tracing are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FactRecord {
    fields: BTreeMap<String, Value>,
}

/// Returned when a JSON value other than an object is turned into a record.
#[derive(Debug, Error)]
#[error("fact record must be a JSON object, found {found}")]
pub struct RecordError {
    found: &'static str,
}

impl FactRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Insert a field (mutable reference version).
    pub fn insert(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_owned(), value);
    }

    /// Look up a field. `None` means absent, which is distinct from a
    /// present `Value::Null`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Resolve a dotted path such as `item.price`.
    ///
    /// An exact key always wins. Otherwise the longest key prefix whose value
    /// is JSON object or array text is descended into, one segment per dot;
    /// numeric segments index arrays.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.fields.get(path) {
            return Some(Cow::Borrowed(value));
        }
        path.rmatch_indices('.').find_map(|(at, _)| {
            let Value::String(text) = self.fields.get(&path[..at])? else {
                return None;
            };
            let nested: serde_json::Value = serde_json::from_str(text).ok()?;
            let pointer: String = path[at + 1..].split('.').map(|s| format!("/{s}")).collect();
            nested
                .pointer(&pointer)
                .map(|v| Cow::Owned(Value::from(v.clone())))
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object. Nested arrays and objects are kept
    /// as their compact JSON text.
    #[must_use]
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: object
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        }
    }

    /// Parse a record from JSON text holding an object.
    ///
    /// # Errors
    ///
    /// Returns [`DmnError`](crate::DmnError) if the text is not valid JSON
    /// or is not an object.
    pub fn from_json(input: &str) -> Result<Self, crate::DmnError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        Ok(Self::try_from(value)?)
    }

    /// Convert back into a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for FactRecord {
    type Error = RecordError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(object) => Ok(Self::from_json_object(object)),
            other => Err(RecordError {
                found: json_kind(&other),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FactRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
