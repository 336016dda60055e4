use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::RuleDraft;
use crate::{Aggregation, BuildError, Column, ColumnKind, DecisionTable, DecisionTableBuilder, HitPolicy, Rule};

pub(crate) fn compile(builder: DecisionTableBuilder) -> Result<DecisionTable, BuildError> {
    let DecisionTableBuilder {
        hit_policy,
        aggregation,
        inputs,
        outputs,
        rules,
    } = builder;

    check_columns(&inputs, ColumnKind::Input)?;
    check_columns(&outputs, ColumnKind::Output)?;

    let rules = assign_ids(rules);
    log_repeated_ids(&rules);

    if hit_policy != HitPolicy::Collect && aggregation != Aggregation::None {
        debug!(
            policy = %hit_policy,
            aggregation = %aggregation,
            "aggregation ignored for non-COLLECT hit policy"
        );
    }

    let derived_inputs: HashMap<String, usize> = inputs
        .iter()
        .enumerate()
        .filter(|(_, column)| column.expression.is_some())
        .map(|(i, column)| (column.name.clone(), i))
        .collect();

    debug!(
        policy = %hit_policy,
        rules = rules.len(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        derived = derived_inputs.len(),
        "decision table built"
    );

    Ok(DecisionTable {
        hit_policy,
        aggregation,
        input_columns: inputs,
        output_columns: outputs,
        rules,
        derived_inputs,
    })
}

fn check_columns(columns: &[Column], kind: ColumnKind) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for (i, column) in columns.iter().enumerate() {
        if column.name.is_empty() {
            return Err(BuildError::EmptyColumnName {
                kind,
                position: i + 1,
            });
        }
        if !seen.insert(column.name.as_str()) {
            return Err(BuildError::DuplicateColumn {
                kind,
                name: column.name.clone(),
            });
        }
    }
    Ok(())
}

/// Rules without an id (or with an empty one) are named `rule_<position>`.
fn assign_ids(drafts: Vec<RuleDraft>) -> Vec<Rule> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| Rule {
            id: draft
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("rule_{}", i + 1)),
            conditions: draft.conditions,
            outputs: draft.outputs,
            priority: draft.priority,
            annotation: draft.annotation,
        })
        .collect()
}

/// Ids need not be unique; a repeat only makes `DecisionTable::rule` return
/// the first.
fn log_repeated_ids(rules: &[Rule]) {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.id.as_str()) {
            debug!(id = %rule.id, "rule id used more than once");
        }
    }
}
