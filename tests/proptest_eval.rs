mod strategies;

use dmntab::parse::{parse_condition, parse_expression, parse_scalar};
use dmntab::{
    Aggregation, Condition, Decision, EvalError, EvaluationOptions, FactRecord, HitPolicy,
    Operand, Operator, Value,
};
use proptest::prelude::*;
use strategies::{arb_record, arb_table, arb_value};

fn opts() -> EvaluationOptions {
    EvaluationOptions::default()
}

proptest! {
    /// Any text is accepted as a condition cell.
    #[test]
    fn parse_condition_never_panics(text in "\\PC{0,40}") {
        let _ = parse_condition(&text);
    }

    /// Any text either parses or yields an error; nothing panics.
    #[test]
    fn parse_expression_never_panics(text in "[a-z0-9 +*/%<>=!&|()'.-]{0,30}") {
        let _ = parse_expression(&text);
    }

    #[test]
    fn comparison_text_parses_to_operator_and_scalar(
        (symbol, operator) in prop::sample::select(&[
            (">=", Operator::Ge),
            ("<=", Operator::Le),
            (">", Operator::Gt),
            ("<", Operator::Lt),
            ("!=", Operator::Ne),
            ("=", Operator::Eq),
        ][..]),
        n in -100_000_i64..100_000,
    ) {
        let text = format!("{symbol} {n}");
        prop_assert_eq!(parse_condition(&text), (operator, Operand::Scalar(Value::Number(n as f64))));
        prop_assert_eq!(parse_scalar(&n.to_string()), Value::Number(n as f64));
    }

    #[test]
    fn in_and_not_in_are_complements(
        items in prop::collection::vec("[a-z0-9]{1,4}", 1..5),
        value in arb_value(),
    ) {
        let list = items.join(", ");
        let within = Condition::parse("c", &format!("in ({list})"));
        let outside = Condition::parse("c", &format!("not in ({list})"));
        prop_assert_ne!(within.test(&value), outside.test(&value));
    }

    #[test]
    fn between_is_inclusive(lo in -1_000_i64..1_000, span in 0_i64..500, offset in 0_i64..500) {
        let cond = Condition::parse("v", &format!("[{lo}..{}]", lo + span));
        prop_assert!(cond.test(&Value::from(lo)));
        prop_assert!(cond.test(&Value::from(lo + span)));
        prop_assert_eq!(cond.test(&Value::from(lo + offset)), offset <= span);
        prop_assert!(!cond.test(&Value::from(lo - 1)));
    }

    #[test]
    fn eq_and_ne_are_complements(a in arb_value(), b in arb_value()) {
        let eq = Condition::exact("c", b.clone());
        let ne = Condition { operator: Operator::Ne, ..eq.clone() };
        prop_assert_ne!(eq.test(&a), ne.test(&a));
    }

    #[test]
    fn loose_cmp_is_antisymmetric(a in arb_value(), b in arb_value()) {
        let forward = a.loose_cmp(&b);
        let backward = b.loose_cmp(&a);
        prop_assert_eq!(forward, backward.map(std::cmp::Ordering::reverse));
    }

    /// FIRST returns the head of the RULE_ORDER list, or the defaults.
    #[test]
    fn first_is_head_of_rule_order(table in arb_table(), record in arb_record()) {
        let first = table.build(HitPolicy::First).evaluate(&record, &opts()).unwrap();
        let all = table.build(HitPolicy::RuleOrder).evaluate(&record, &opts()).unwrap();
        match all.decision().all().first() {
            Some(head) => prop_assert_eq!(first.outputs(), Some(head)),
            None => prop_assert_eq!(
                first.get("points"),
                Some(&Value::Number(0.0))
            ),
        }
    }

    /// OUTPUT_ORDER is a sorted permutation of RULE_ORDER.
    #[test]
    fn output_order_is_permutation(table in arb_table(), record in arb_record()) {
        let ordered = table.build(HitPolicy::OutputOrder).evaluate(&record, &opts()).unwrap();
        let plain = table.build(HitPolicy::RuleOrder).evaluate(&record, &opts()).unwrap();
        let key = |o: &dmntab::Outputs| serde_json::to_string(o).unwrap();
        let mut expected: Vec<String> = plain.decision().all().iter().map(key).collect();
        expected.sort();
        let actual: Vec<String> = ordered.decision().all().iter().map(key).collect();
        prop_assert_eq!(actual, expected);
    }

    /// UNIQUE succeeds exactly when at most one rule matches.
    #[test]
    fn unique_violation_iff_multiple_matches(table in arb_table(), record in arb_record()) {
        let matches = table
            .build(HitPolicy::RuleOrder)
            .evaluate(&record, &opts())
            .unwrap()
            .decision()
            .all()
            .len();
        let unique = table.build(HitPolicy::Unique).evaluate(&record, &opts());
        if matches > 1 {
            let is_violation = matches!(unique, Err(EvalError::HitPolicyViolation { .. }));
            prop_assert!(is_violation);
        } else {
            prop_assert!(unique.is_ok());
        }
    }

    /// PRIORITY picks a rule whose priority is the maximum among matches.
    #[test]
    fn priority_picks_maximum(table in arb_table(), record in arb_record()) {
        let options = EvaluationOptions::new().with_metadata();
        let outcome = table.build(HitPolicy::Priority).evaluate(&record, &options).unwrap();
        let built = table.build(HitPolicy::Priority);
        let matched = outcome.metadata().unwrap().matched_rule_ids();
        let priorities: Vec<f64> = matched
            .iter()
            .map(|id| built.rule(id).unwrap().effective_priority())
            .collect();
        if let Some(best) = priorities.iter().copied().reduce(f64::max) {
            let winner = matched
                .iter()
                .zip(&priorities)
                .find(|(_, p)| **p == best)
                .map(|(id, _)| *id)
                .unwrap();
            let expected = built.rule(winner).unwrap().outputs[0].value.as_number();
            prop_assert_eq!(
                outcome.get("points").and_then(Value::as_number),
                expected
            );
        }
    }

    /// COLLECT SUM/COUNT agree with the collected list.
    #[test]
    fn collect_aggregations_agree_with_list(table in arb_table(), record in arb_record()) {
        let list = table.build(HitPolicy::Collect).evaluate(&record, &opts()).unwrap();
        let points: Vec<f64> = list
            .decision()
            .all()
            .iter()
            .filter_map(|o| o.get("points").and_then(Value::as_number))
            .collect();

        let sum = table.build_aggregated(Aggregation::Sum).evaluate(&record, &opts()).unwrap();
        let count = table.build_aggregated(Aggregation::Count).evaluate(&record, &opts()).unwrap();
        if points.is_empty() {
            prop_assert_eq!(sum.decision(), &Decision::Single(Default::default()));
            prop_assert_eq!(count.decision(), &Decision::Single(Default::default()));
        } else {
            let total: f64 = points.iter().sum();
            prop_assert_eq!(sum.get("points"), Some(&Value::Number(total)));
            prop_assert_eq!(count.get("count"), Some(&Value::Number(points.len() as f64)));
        }
    }

    /// Evaluation never panics on records outside the schema.
    #[test]
    fn eval_never_panics_on_foreign_records(
        table in arb_table(),
        values in prop::collection::vec(arb_value(), 3),
    ) {
        let record = FactRecord::new()
            .set("x", values[0].clone())
            .set("y", values[1].clone())
            .set("kind", values[2].clone());
        for policy in HitPolicy::ALL {
            let _ = table.build(policy).evaluate(&record, &opts());
        }
    }
}
