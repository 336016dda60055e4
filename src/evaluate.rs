use std::borrow::Cow;

use tracing::{debug, trace};

use crate::resolve::{self, MatchResult};
use crate::{
    DecisionTable, EvalError, EvaluationOptions, EvaluationOutcome, FactRecord, Metadata, Outputs,
    Rule, RuleSummary, Trace, Value,
};

pub(crate) fn evaluate(
    table: &DecisionTable,
    record: &FactRecord,
    options: &EvaluationOptions,
) -> Result<EvaluationOutcome, EvalError> {
    let matches: Vec<MatchResult<'_>> = table
        .rules
        .iter()
        .filter(|rule| rule_matches(rule, record, table))
        .map(|rule| {
            trace!(rule = %rule.id, "rule matched");
            MatchResult {
                rule,
                outputs: generate_outputs(rule, table),
            }
        })
        .collect();
    let matched: Vec<&Rule> = matches.iter().map(|m| m.rule).collect();

    let decision = resolve::resolve(matches, table)?;

    if options.strict_mode && matched.is_empty() {
        debug!(policy = %table.hit_policy, "no rules matched in strict mode");
        return Err(EvalError::NoRuleMatchedInStrictMode);
    }

    let metadata = options.include_metadata.then(|| Metadata {
        hit_policy: table.hit_policy,
        aggregation: table.aggregation,
        matched_rules: matched
            .iter()
            .map(|rule| RuleSummary {
                id: rule.id.clone(),
                annotation: rule.annotation.clone(),
            })
            .collect(),
        match_count: matched.len(),
    });
    let trace = options.trace_execution.then(|| Trace {
        evaluated_rule_count: table.rules.len(),
        matched_rule_ids: matched.iter().map(|rule| rule.id.clone()).collect(),
        input_snapshot: record.clone(),
    });

    Ok(EvaluationOutcome::new(decision, metadata, trace))
}

/// All conditions hold, checked in declaration order.
fn rule_matches(rule: &Rule, record: &FactRecord, table: &DecisionTable) -> bool {
    rule.conditions
        .iter()
        .all(|condition| condition.test(&resolve_input(table, record, &condition.column)))
}

/// The value a condition on `column` is tested against: the derived
/// expression if the input column declares one, else the record field.
fn resolve_input<'r>(table: &DecisionTable, record: &'r FactRecord, column: &str) -> Cow<'r, Value> {
    let derived = table
        .derived_inputs
        .get(column)
        .and_then(|&i| table.input_columns.get(i))
        .and_then(|c| c.expression.as_ref());
    match derived {
        Some(expression) => match expression.evaluate(record) {
            Ok(value) => Cow::Owned(value),
            Err(err) => {
                debug!(
                    column,
                    expression = expression.source(),
                    error = %err,
                    "derived input failed, using null"
                );
                Cow::Owned(Value::Null)
            }
        },
        None => record.get(column).map_or(Cow::Owned(Value::Null), Cow::Borrowed),
    }
}

/// Coerce the rule's assignments to their declared types and fill in
/// defaults for unassigned columns.
fn generate_outputs(rule: &Rule, table: &DecisionTable) -> Outputs {
    let mut outputs: Outputs = rule
        .outputs
        .iter()
        .map(|assignment| {
            let value = match table.output_columns.iter().find(|c| c.name == assignment.column) {
                Some(column) => column.column_type.coerce(assignment.value.clone()),
                None => assignment.value.clone(),
            };
            (assignment.column.clone(), value)
        })
        .collect();
    for column in &table.output_columns {
        if let Some(default) = &column.default_value {
            outputs
                .entry(column.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
    outputs
}
