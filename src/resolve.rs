use tracing::debug;

use crate::{Aggregation, ColumnType, Decision, DecisionTable, EvalError, HitPolicy, Outputs, Rule, Value};

/// A rule that matched, with its outputs already generated.
#[derive(Debug)]
pub(crate) struct MatchResult<'t> {
    pub(crate) rule: &'t Rule,
    pub(crate) outputs: Outputs,
}

/// Reduce the matches (in declaration order) according to the table's hit
/// policy.
pub(crate) fn resolve(
    matches: Vec<MatchResult<'_>>,
    table: &DecisionTable,
) -> Result<Decision, EvalError> {
    match table.hit_policy {
        HitPolicy::Unique => {
            if matches.len() > 1 {
                return Err(violation(
                    HitPolicy::Unique,
                    matches.len(),
                    "multiple rules matched",
                ));
            }
            Ok(single_or_defaults(matches.into_iter().next(), table))
        }
        HitPolicy::First => Ok(single_or_defaults(matches.into_iter().next(), table)),
        HitPolicy::Priority => {
            // Strictly greater keeps the earliest rule on ties; NaN never wins.
            let best = matches.into_iter().reduce(|best, m| {
                let (current, candidate) =
                    (best.rule.effective_priority(), m.rule.effective_priority());
                if candidate > current || (current.is_nan() && !candidate.is_nan()) {
                    m
                } else {
                    best
                }
            });
            Ok(single_or_defaults(best, table))
        }
        HitPolicy::Any => {
            let disagree = matches
                .first()
                .is_some_and(|first| matches.iter().any(|m| m.outputs != first.outputs));
            if disagree {
                return Err(violation(
                    HitPolicy::Any,
                    matches.len(),
                    "matching rules produced different outputs",
                ));
            }
            Ok(single_or_defaults(matches.into_iter().next(), table))
        }
        HitPolicy::Collect if table.aggregation != Aggregation::None => {
            Ok(Decision::Single(aggregate(&matches, table)))
        }
        HitPolicy::Collect | HitPolicy::RuleOrder => Ok(Decision::Multiple(
            matches.into_iter().map(|m| m.outputs).collect(),
        )),
        HitPolicy::OutputOrder => {
            let mut list: Vec<Outputs> = matches.into_iter().map(|m| m.outputs).collect();
            list.sort_by_cached_key(canonical_json);
            Ok(Decision::Multiple(list))
        }
    }
}

fn violation(policy: HitPolicy, match_count: usize, reason: &str) -> EvalError {
    debug!(policy = %policy, match_count, reason, "hit policy violated");
    EvalError::HitPolicyViolation {
        policy,
        match_count,
        reason: reason.to_owned(),
    }
}

fn single_or_defaults(hit: Option<MatchResult<'_>>, table: &DecisionTable) -> Decision {
    Decision::Single(hit.map_or_else(|| default_outputs(table), |m| m.outputs))
}

/// Every output column with a declared default, and nothing else.
pub(crate) fn default_outputs(table: &DecisionTable) -> Outputs {
    table
        .output_columns
        .iter()
        .filter_map(|column| {
            column
                .default_value
                .as_ref()
                .map(|v| (column.name.clone(), v.clone()))
        })
        .collect()
}

fn canonical_json(outputs: &Outputs) -> String {
    serde_json::to_string(outputs).unwrap_or_default()
}

#[allow(clippy::cast_precision_loss)]
fn aggregate(matches: &[MatchResult<'_>], table: &DecisionTable) -> Outputs {
    let mut result = Outputs::new();
    if matches.is_empty() {
        return result;
    }
    match table.aggregation {
        Aggregation::None => {}
        Aggregation::Count => {
            result.insert("count".to_owned(), Value::Number(matches.len() as f64));
        }
        Aggregation::Sum | Aggregation::Min | Aggregation::Max => {
            let numeric = table
                .output_columns
                .iter()
                .filter(|c| c.column_type == ColumnType::Number);
            for column in numeric {
                let values = matches.iter().filter_map(|m| match m.outputs.get(&column.name) {
                    Some(Value::Number(n)) => Some(*n),
                    _ => None,
                });
                let reduced = match table.aggregation {
                    Aggregation::Sum => values.reduce(|a, b| a + b),
                    Aggregation::Min => values.reduce(f64::min),
                    Aggregation::Max => values.reduce(f64::max),
                    Aggregation::None | Aggregation::Count => None,
                };
                if let Some(v) = reduced {
                    result.insert(column.name.clone(), Value::Number(v));
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Column;

    fn rule(id: &str, priority: Option<f64>) -> Rule {
        Rule {
            id: id.into(),
            conditions: vec![],
            outputs: vec![],
            priority,
            annotation: None,
        }
    }

    fn outputs(pairs: &[(&str, Value)]) -> Outputs {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    fn table(policy: HitPolicy, aggregation: Aggregation) -> DecisionTable {
        DecisionTable::builder(policy)
            .aggregation(aggregation)
            .output(Column::number("points").with_default(0_i64))
            .output(Column::string("tier"))
            .build()
            .unwrap()
    }

    #[test]
    fn priority_tie_keeps_earliest() {
        let (a, b, c) = (rule("a", Some(5.0)), rule("b", Some(10.0)), rule("c", Some(10.0)));
        let matches = vec![
            MatchResult { rule: &a, outputs: outputs(&[("tier", "A".into())]) },
            MatchResult { rule: &b, outputs: outputs(&[("tier", "B".into())]) },
            MatchResult { rule: &c, outputs: outputs(&[("tier", "C".into())]) },
        ];
        let decision = resolve(matches, &table(HitPolicy::Priority, Aggregation::None)).unwrap();
        assert_eq!(decision.single().unwrap()["tier"], Value::from("B"));
    }

    #[test]
    fn missing_priority_counts_as_zero() {
        let (a, b) = (rule("a", None), rule("b", Some(-1.0)));
        let matches = vec![
            MatchResult { rule: &b, outputs: outputs(&[("tier", "B".into())]) },
            MatchResult { rule: &a, outputs: outputs(&[("tier", "A".into())]) },
        ];
        let decision = resolve(matches, &table(HitPolicy::Priority, Aggregation::None)).unwrap();
        assert_eq!(decision.single().unwrap()["tier"], Value::from("A"));
    }

    #[test]
    fn fractional_priority_and_nan() {
        let (a, b, c) = (
            rule("a", Some(f64::NAN)),
            rule("b", Some(1.5)),
            rule("c", Some(1.25)),
        );
        let matches = vec![
            MatchResult { rule: &a, outputs: outputs(&[("tier", "A".into())]) },
            MatchResult { rule: &b, outputs: outputs(&[("tier", "B".into())]) },
            MatchResult { rule: &c, outputs: outputs(&[("tier", "C".into())]) },
        ];
        let decision = resolve(matches, &table(HitPolicy::Priority, Aggregation::None)).unwrap();
        assert_eq!(decision.single().unwrap()["tier"], Value::from("B"));
    }

    #[test]
    fn defaults_only_for_declared_defaults() {
        let decision = resolve(vec![], &table(HitPolicy::First, Aggregation::None)).unwrap();
        assert_eq!(decision, Decision::Single(outputs(&[("points", Value::Number(0.0))])));
    }

    #[test]
    fn output_order_is_stable_for_equal_outputs() {
        let (a, b, c) = (rule("a", None), rule("b", None), rule("c", None));
        let matches = vec![
            MatchResult { rule: &a, outputs: outputs(&[("tier", "SILVER".into())]) },
            MatchResult { rule: &b, outputs: outputs(&[("tier", "GOLD".into())]) },
            MatchResult { rule: &c, outputs: outputs(&[("tier", "GOLD".into())]) },
        ];
        let decision = resolve(matches, &table(HitPolicy::OutputOrder, Aggregation::None)).unwrap();
        let tiers: Vec<&Value> = decision.all().iter().map(|o| &o["tier"]).collect();
        assert_eq!(tiers, [&Value::from("GOLD"), &Value::from("GOLD"), &Value::from("SILVER")]);
    }

    #[test]
    fn aggregation_skips_non_numbers() {
        let (a, b) = (rule("a", None), rule("b", None));
        let matches = vec![
            MatchResult { rule: &a, outputs: outputs(&[("points", Value::Number(3.0))]) },
            MatchResult { rule: &b, outputs: outputs(&[("points", Value::Null)]) },
        ];
        let result = aggregate(&matches, &table(HitPolicy::Collect, Aggregation::Max));
        assert_eq!(result, outputs(&[("points", Value::Number(3.0))]));
    }

    #[test]
    fn aggregation_omits_columns_without_values() {
        let a = rule("a", None);
        let matches = vec![MatchResult { rule: &a, outputs: outputs(&[("tier", "X".into())]) }];
        let result = aggregate(&matches, &table(HitPolicy::Collect, Aggregation::Sum));
        assert!(result.is_empty());
    }

    #[test]
    fn count_and_empty_aggregation() {
        let a = rule("a", None);
        let t = table(HitPolicy::Collect, Aggregation::Count);
        assert!(aggregate(&[], &t).is_empty());
        let matches = vec![MatchResult { rule: &a, outputs: Outputs::new() }];
        assert_eq!(aggregate(&matches, &t), outputs(&[("count", Value::Number(1.0))]));
    }
}
