use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Aggregation, FactRecord, HitPolicy, Value};

/// Typed outputs of one rule (or of an aggregation), keyed by column name.
///
/// Keys are sorted, so the JSON encoding is canonical.
pub type Outputs = BTreeMap<String, Value>;

/// Switches for [`DecisionTable::evaluate`](super::DecisionTable::evaluate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluationOptions {
    /// Fail with `NoRuleMatchedInStrictMode` instead of returning defaults.
    pub strict_mode: bool,
    pub include_metadata: bool,
    pub trace_execution: bool,
}

impl EvaluationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn strict(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self) -> Self {
        self.include_metadata = true;
        self
    }

    #[must_use]
    pub fn with_trace(mut self) -> Self {
        self.trace_execution = true;
        self
    }
}

/// The hit policy's result for one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Single-hit policies, and `COLLECT` with an aggregation.
    Single(Outputs),
    /// `COLLECT` without aggregation, `RULE_ORDER`, `OUTPUT_ORDER`.
    Multiple(Vec<Outputs>),
}

impl Decision {
    /// The single output map, if this is a single-hit decision.
    #[must_use]
    pub fn single(&self) -> Option<&Outputs> {
        match self {
            Decision::Single(outputs) => Some(outputs),
            Decision::Multiple(_) => None,
        }
    }

    /// All output maps; a single decision yields a one-element slice.
    #[must_use]
    pub fn all(&self) -> &[Outputs] {
        match self {
            Decision::Single(outputs) => std::slice::from_ref(outputs),
            Decision::Multiple(list) => list,
        }
    }
}

/// Identity of a matched rule, as reported in [`Metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Match information attached when `include_metadata` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub hit_policy: HitPolicy,
    pub aggregation: Aggregation,
    /// Matched rules in declaration order.
    pub matched_rules: Vec<RuleSummary>,
    pub match_count: usize,
}

impl Metadata {
    #[must_use]
    pub fn matched_rule_ids(&self) -> Vec<&str> {
        self.matched_rules.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Debug information attached when `trace_execution` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(rename = "evaluatedRules")]
    pub evaluated_rule_count: usize,
    #[serde(rename = "matchingRules")]
    pub matched_rule_ids: Vec<String>,
    #[serde(rename = "inputData")]
    pub input_snapshot: FactRecord,
}

/// Result of evaluating one fact record.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct EvaluationOutcome {
    decision: Decision,
    metadata: Option<Metadata>,
    trace: Option<Trace>,
}

impl EvaluationOutcome {
    pub(crate) fn new(decision: Decision, metadata: Option<Metadata>, trace: Option<Trace>) -> Self {
        Self {
            decision,
            metadata,
            trace,
        }
    }

    #[must_use]
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Shorthand for the single output map of a single-hit decision.
    #[must_use]
    pub fn outputs(&self) -> Option<&Outputs> {
        self.decision.single()
    }

    /// Look up one output of a single-hit decision.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.outputs()?.get(column)
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Render in the flat JSON shape used by workflow hosts.
    ///
    /// A single decision becomes its output object, a list becomes
    /// `{"results": [...]}`. Metadata and trace land under `_metadata` and
    /// `_trace`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = match &self.decision {
            Decision::Single(outputs) => outputs_to_json(outputs),
            Decision::Multiple(list) => {
                let mut object = serde_json::Map::new();
                object.insert(
                    "results".to_owned(),
                    serde_json::Value::Array(
                        list.iter()
                            .map(|o| serde_json::Value::Object(outputs_to_json(o)))
                            .collect(),
                    ),
                );
                object
            }
        };
        if let Some(metadata) = &self.metadata {
            object.insert("_metadata".to_owned(), to_json_or_null(metadata));
        }
        if let Some(trace) = &self.trace {
            object.insert("_trace".to_owned(), to_json_or_null(trace));
        }
        serde_json::Value::Object(object)
    }
}

fn outputs_to_json(outputs: &Outputs) -> serde_json::Map<String, serde_json::Value> {
    outputs
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect()
}

fn to_json_or_null(value: &impl Serialize) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.decision {
            Decision::Single(outputs) => write!(f, "outputs: {}", render(outputs))?,
            Decision::Multiple(list) => {
                let rendered: Vec<String> = list.iter().map(render).collect();
                write!(f, "results: [{}]", rendered.join(", "))?;
            }
        }
        if let Some(metadata) = &self.metadata {
            write!(
                f,
                ", matched: [{}]",
                metadata.matched_rule_ids().join(", ")
            )?;
        }
        Ok(())
    }
}

fn render(outputs: &Outputs) -> String {
    let fields: Vec<String> = outputs.iter().map(|(k, v)| format!("{k} = {v}")).collect();
    format!("{{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn outputs(pairs: &[(&str, Value)]) -> Outputs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn options_builder() {
        let opts = EvaluationOptions::new().strict().with_trace();
        assert!(opts.strict_mode);
        assert!(!opts.include_metadata);
        assert!(opts.trace_execution);
    }

    #[test]
    fn options_from_json() {
        let opts: EvaluationOptions =
            serde_json::from_value(json!({"includeMetadata": true})).unwrap();
        assert_eq!(opts, EvaluationOptions::new().with_metadata());
    }

    #[test]
    fn single_to_json() {
        let outcome = EvaluationOutcome::new(
            Decision::Single(outputs(&[("tier", Value::from("GOLD"))])),
            None,
            None,
        );
        assert_eq!(outcome.to_json(), json!({"tier": "GOLD"}));
        assert_eq!(outcome.get("tier"), Some(&Value::from("GOLD")));
    }

    #[test]
    fn multiple_to_json() {
        let outcome = EvaluationOutcome::new(
            Decision::Multiple(vec![
                outputs(&[("tier", Value::from("GOLD"))]),
                outputs(&[("tier", Value::from("SILVER"))]),
            ]),
            None,
            None,
        );
        assert_eq!(
            outcome.to_json(),
            json!({"results": [{"tier": "GOLD"}, {"tier": "SILVER"}]})
        );
        assert!(outcome.outputs().is_none());
        assert_eq!(outcome.decision().all().len(), 2);
    }

    #[test]
    fn metadata_and_trace_to_json() {
        let outcome = EvaluationOutcome::new(
            Decision::Single(Outputs::new()),
            Some(Metadata {
                hit_policy: HitPolicy::First,
                aggregation: Aggregation::None,
                matched_rules: vec![RuleSummary {
                    id: "r1".into(),
                    annotation: Some("note".into()),
                }],
                match_count: 1,
            }),
            Some(Trace {
                evaluated_rule_count: 4,
                matched_rule_ids: vec!["r1".into()],
                input_snapshot: FactRecord::new().set("age", "x"),
            }),
        );
        assert_eq!(
            outcome.to_json(),
            json!({
                "_metadata": {
                    "hitPolicy": "FIRST",
                    "aggregation": "NONE",
                    "matchedRules": [{"id": "r1", "annotation": "note"}],
                    "matchCount": 1,
                },
                "_trace": {
                    "evaluatedRules": 4,
                    "matchingRules": ["r1"],
                    "inputData": {"age": "x"},
                },
            })
        );
    }

    #[test]
    fn display() {
        let outcome = EvaluationOutcome::new(
            Decision::Single(outputs(&[("discount", Value::Number(0.1))])),
            None,
            None,
        );
        assert_eq!(outcome.to_string(), "outputs: {discount = 0.1}");
    }
}
