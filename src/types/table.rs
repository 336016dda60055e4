use std::collections::HashMap;
use std::fmt;

use super::error::{BuildError, EvalError};
use super::outcome::{EvaluationOptions, EvaluationOutcome};
use super::rule::{OutputAssignment, RawCondition, Rule};
use super::{Aggregation, Column, Condition, FactRecord, HitPolicy, Value};

/// Builder for constructing a [`DecisionTable`].
///
/// Rules are defined via closures and compiled into an immutable, thread-safe
/// table.
///
/// # Example
///
/// ```
/// use dmntab::{Column, DecisionTable, EvaluationOptions, FactRecord, HitPolicy, Value};
///
/// let table = DecisionTable::builder(HitPolicy::First)
///     .input(Column::number("age"))
///     .output(Column::string("tier").with_default("STANDARD"))
///     .rule("senior", |r| r.when("age", ">= 65").then("tier", "SENIOR"))
///     .rule("adult", |r| r.when("age", "[18..64]").then("tier", "ADULT"))
///     .build()
///     .unwrap();
///
/// let record = FactRecord::new().set("age", 70_i64);
/// let outcome = table.evaluate(&record, &EvaluationOptions::default()).unwrap();
/// assert_eq!(outcome.get("tier"), Some(&Value::from("SENIOR")));
/// ```
#[derive(Debug, Default)]
pub struct DecisionTableBuilder {
    pub(crate) hit_policy: HitPolicy,
    pub(crate) aggregation: Aggregation,
    pub(crate) inputs: Vec<Column>,
    pub(crate) outputs: Vec<Column>,
    pub(crate) rules: Vec<RuleDraft>,
}

/// A rule before ids are assigned and the table is validated.
#[derive(Debug, Default)]
pub(crate) struct RuleDraft {
    pub(crate) id: Option<String>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) outputs: Vec<OutputAssignment>,
    pub(crate) priority: Option<f64>,
    pub(crate) annotation: Option<String>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug)]
pub struct RuleBuilder {
    draft: RuleDraft,
}

impl DecisionTableBuilder {
    #[must_use]
    pub fn new(hit_policy: HitPolicy) -> Self {
        Self {
            hit_policy,
            ..Self::default()
        }
    }

    /// Set the aggregation. Only meaningful for [`HitPolicy::Collect`].
    #[must_use]
    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    #[must_use]
    pub fn input(mut self, column: Column) -> Self {
        self.inputs.push(column);
        self
    }

    #[must_use]
    pub fn output(mut self, column: Column) -> Self {
        self.outputs.push(column);
        self
    }

    /// Define a rule with an explicit id.
    #[must_use]
    pub fn rule(self, id: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.push_rule(Some(id.to_owned()), f)
    }

    /// Define a rule whose id defaults to `rule_<position>` (1-based).
    #[must_use]
    pub fn rule_auto(self, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.push_rule(None, f)
    }

    fn push_rule(mut self, id: Option<String>, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder {
            draft: RuleDraft {
                id,
                ..RuleDraft::default()
            },
        });
        self.rules.push(builder.draft);
        self
    }

    /// Validate and assemble the table.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] for duplicate or empty column names.
    pub fn build(self) -> Result<DecisionTable, BuildError> {
        crate::compile::compile(self)
    }
}

impl RuleBuilder {
    /// Constrain `column` with condition text (`">= 18"`, `"in (a, b)"`,
    /// `"[1..5]"`, `"-"`) or with a typed value matched exactly.
    #[must_use]
    pub fn when(mut self, column: &str, condition: impl Into<RawCondition>) -> Self {
        self.draft
            .conditions
            .push(condition.into().into_condition(column));
        self
    }

    /// Add a condition built with [`column()`](crate::column).
    #[must_use]
    pub fn when_condition(mut self, condition: Condition) -> Self {
        self.draft.conditions.push(condition);
        self
    }

    /// Assign a raw output value; it is coerced to the column type on match.
    #[must_use]
    pub fn then(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.draft.outputs.push(OutputAssignment {
            column: column.to_owned(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: f64) -> Self {
        self.draft.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn annotate(mut self, annotation: &str) -> Self {
        self.draft.annotation = Some(annotation.to_owned());
        self
    }
}

/// A built, immutable decision table. Thread-safe and designed to live
/// behind `Arc`.
#[derive(Debug)]
pub struct DecisionTable {
    pub(crate) hit_policy: HitPolicy,
    pub(crate) aggregation: Aggregation,
    pub(crate) input_columns: Vec<Column>,
    pub(crate) output_columns: Vec<Column>,
    pub(crate) rules: Vec<Rule>,
    /// Input columns that declare a derived-value expression, by name.
    pub(crate) derived_inputs: HashMap<String, usize>,
}

impl DecisionTable {
    #[must_use]
    pub fn builder(hit_policy: HitPolicy) -> DecisionTableBuilder {
        DecisionTableBuilder::new(hit_policy)
    }

    /// Evaluate one fact record.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::HitPolicyViolation`] when a `UNIQUE` table has
    /// several matches or an `ANY` table has disagreeing matches, and
    /// [`EvalError::NoRuleMatchedInStrictMode`] when `strict_mode` is set
    /// and nothing matched.
    pub fn evaluate(
        &self,
        record: &FactRecord,
        options: &EvaluationOptions,
    ) -> Result<EvaluationOutcome, EvalError> {
        crate::evaluate::evaluate(self, record, options)
    }

    /// Evaluate every record independently. A failure is reported in its
    /// own slot and does not affect the other records.
    pub fn evaluate_batch(
        &self,
        records: &[FactRecord],
        options: &EvaluationOptions,
    ) -> Vec<Result<EvaluationOutcome, EvalError>> {
        records
            .iter()
            .map(|record| self.evaluate(record, options))
            .collect()
    }

    /// Parse a JSON table configuration and build it.
    ///
    /// This is a convenience method combining
    /// [`TableConfig::from_json`](crate::TableConfig::from_json) and
    /// [`TableConfig::build`](crate::TableConfig::build).
    ///
    /// # Errors
    ///
    /// Returns [`DmnError`](crate::DmnError) on JSON or build failure.
    pub fn from_json(input: &str) -> Result<Self, crate::DmnError> {
        let config = crate::TableConfig::from_json(input)?;
        Ok(config.build()?)
    }

    /// Read a JSON table configuration file and build it.
    ///
    /// # Errors
    ///
    /// Returns [`DmnError`](crate::DmnError) on I/O, JSON, or build failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::DmnError> {
        let config = crate::TableConfig::from_file(path)?;
        Ok(config.build()?)
    }

    #[must_use]
    pub fn hit_policy(&self) -> HitPolicy {
        self.hit_policy
    }

    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    #[must_use]
    pub fn input_columns(&self) -> &[Column] {
        &self.input_columns
    }

    #[must_use]
    pub fn output_columns(&self) -> &[Column] {
        &self.output_columns
    }

    /// Rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The first rule with this id. Ids are not required to be unique.
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

impl fmt::Display for DecisionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecisionTable({}", self.hit_policy)?;
        if self.hit_policy == HitPolicy::Collect && self.aggregation != Aggregation::None {
            write!(f, " {}", self.aggregation)?;
        }
        write!(
            f,
            ", {} rules, {} inputs, {} outputs)",
            self.rules.len(),
            self.input_columns.len(),
            self.output_columns.len(),
        )
    }
}
