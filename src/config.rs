use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Aggregation, BuildError, Column, ColumnType, DecisionTable, DecisionTableBuilder, DmnError,
    HitPolicy, RawCondition, Value,
};

/// A decision table as described in JSON.
///
/// Field names are camelCase. Rule `conditions` and `outputs` may be given
/// either as a JSON object or as a string containing one.
///
/// ```
/// use dmntab::TableConfig;
///
/// let config = TableConfig::from_json(r#"{
///     "hitPolicy": "FIRST",
///     "inputColumns": [{"name": "age", "type": "number"}],
///     "outputColumns": [{"name": "tier", "type": "string", "defaultValue": "STANDARD"}],
///     "rules": [{"id": "adult", "conditions": "{\"age\": \">= 18\"}", "outputs": {"tier": "ADULT"}}]
/// }"#).unwrap();
/// let table = config.build().unwrap();
/// assert_eq!(table.rules().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub hit_policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub input_columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub output_columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    /// Input columns only. An empty string means no expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Output columns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub conditions: Payload,
    #[serde(default)]
    pub outputs: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// A column-to-value mapping, given inline or as embedded JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Object(serde_json::Map<String, serde_json::Value>),
    Text(String),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Object(serde_json::Map::new())
    }
}

impl Payload {
    /// Decode into an object, naming `field` of rule `position` on failure.
    fn decode(
        &self,
        position: usize,
        field: &str,
    ) -> Result<serde_json::Map<String, serde_json::Value>, BuildError> {
        let malformed = |reason: String| BuildError::MalformedRule {
            position,
            field: field.to_owned(),
            reason,
        };
        let object = match self {
            Payload::Object(object) => object.clone(),
            Payload::Text(text) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(serde_json::Value::Object(object)) => object,
                Ok(_) => return Err(malformed("expected a JSON object".to_owned())),
                Err(e) => return Err(malformed(e.to_string())),
            },
        };
        for (column, value) in &object {
            if value.is_array() || value.is_object() {
                return Err(BuildError::MalformedRule {
                    position,
                    field: format!("{field}.{column}"),
                    reason: "nested arrays and objects are not supported".to_owned(),
                });
            }
        }
        Ok(object)
    }
}

impl TableConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DmnError::Json`] if the text does not match the expected shape.
    pub fn from_json(input: &str) -> Result<Self, DmnError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DmnError::Io`] or [`DmnError::Json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DmnError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading decision table config");
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate the configuration and build the table.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for unknown policy, aggregation or column type
    /// names, malformed rule payloads, and anything
    /// [`DecisionTableBuilder::build`] rejects.
    pub fn build(&self) -> Result<DecisionTable, BuildError> {
        let mut builder = DecisionTableBuilder::new(self.hit_policy.parse::<HitPolicy>()?);
        if let Some(name) = &self.aggregation {
            builder = builder.aggregation(name.parse::<Aggregation>()?);
        }

        for column in &self.input_columns {
            let mut input = Column::new(&column.name, column.parsed_type()?);
            if let Some(source) = column.expression.as_deref().filter(|s| !s.trim().is_empty()) {
                input = input.with_expression(source);
            }
            builder = builder.input(input);
        }
        for column in &self.output_columns {
            let mut output = Column::new(&column.name, column.parsed_type()?);
            if let Some(default) = &column.default_value {
                output = output.with_default(Value::from(default.clone()));
            }
            builder = builder.output(output);
        }

        for (i, rule) in self.rules.iter().enumerate() {
            let position = i + 1;
            let conditions = rule.conditions.decode(position, "conditions")?;
            let outputs = rule.outputs.decode(position, "outputs")?;
            let id = rule.id.clone().unwrap_or_default();
            builder = builder.rule(&id, |mut r| {
                for (column, raw) in conditions {
                    r = r.when(&column, raw_condition(raw));
                }
                for (column, value) in outputs {
                    r = r.then(&column, Value::from(value));
                }
                if let Some(priority) = rule.priority {
                    r = r.priority(priority);
                }
                if let Some(annotation) = &rule.annotation {
                    r = r.annotate(annotation);
                }
                r
            });
        }

        builder.build()
    }
}

impl ColumnConfig {
    fn parsed_type(&self) -> Result<ColumnType, BuildError> {
        self.column_type
            .as_deref()
            .map_or(Ok(ColumnType::default()), str::parse)
    }
}

/// Strings are condition text; any other scalar is matched exactly.
fn raw_condition(value: serde_json::Value) -> RawCondition {
    match value {
        serde_json::Value::String(text) => RawCondition::Text(text),
        other => RawCondition::Value(Value::from(other)),
    }
}
