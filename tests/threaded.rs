use std::sync::Arc;
use std::thread;

use dmntab::{Column, DecisionTable, EvaluationOptions, FactRecord, HitPolicy, Value};

fn shared_table() -> Arc<DecisionTable> {
    Arc::new(
        DecisionTable::builder(HitPolicy::First)
            .input(Column::number("age"))
            .input(Column::string("status"))
            .output(Column::string("verdict").with_default("REVIEW"))
            .rule("banned", |r| r.when("status", "banned").then("verdict", "DENY"))
            .rule("adult_active", |r| {
                r.when("age", ">= 18")
                    .when("status", "active")
                    .then("verdict", "ALLOW")
            })
            .rule("minor", |r| r.when("age", "< 18").then("verdict", "DENY"))
            .build()
            .unwrap(),
    )
}

#[test]
fn evaluate_across_threads() {
    let table = shared_table();
    let cases = [
        (25_i64, "active", "ALLOW"),
        (30, "banned", "DENY"),
        (15, "active", "DENY"),
        (40, "inactive", "REVIEW"),
    ];

    let handles: Vec<_> = cases
        .into_iter()
        .map(|(age, status, expected)| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let record = FactRecord::new().set("age", age).set("status", status);
                let outcome = table.evaluate(&record, &EvaluationOptions::default()).unwrap();
                (outcome.get("verdict").cloned(), expected)
            })
        })
        .collect();

    for handle in handles {
        let (verdict, expected) = handle.join().unwrap();
        assert_eq!(verdict, Some(Value::from(expected)));
    }
}

#[test]
fn high_contention() {
    let table = shared_table();
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let options = EvaluationOptions::new().with_metadata();
                for i in 0..1_000_i64 {
                    let age = (i + t) % 40;
                    let record = FactRecord::new().set("age", age).set("status", "active");
                    let outcome = table.evaluate(&record, &options).unwrap();
                    let expected = if age >= 18 { "ALLOW" } else { "DENY" };
                    assert_eq!(outcome.get("verdict"), Some(&Value::from(expected)));
                    assert_eq!(outcome.metadata().unwrap().match_count, 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn batch_matches_sequential() {
    let table = shared_table();
    let records: Vec<FactRecord> = (0..50_i64)
        .map(|age| FactRecord::new().set("age", age).set("status", "active"))
        .collect();
    let options = EvaluationOptions::default();
    let batch = table.evaluate_batch(&records, &options);
    for (record, result) in records.iter().zip(batch) {
        assert_eq!(result.unwrap(), table.evaluate(record, &options).unwrap());
    }
}
