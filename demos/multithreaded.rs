use std::sync::Arc;
use std::thread;

use dmntab::{Column, DecisionTable, EvaluationOptions, FactRecord, HitPolicy};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let table = Arc::new(
        DecisionTable::builder(HitPolicy::Unique)
            .input(Column::number("age"))
            .input(Column::number("total").with_expression("price * quantity"))
            .output(Column::string("lane").with_default("MANUAL"))
            .rule("minor", |r| r.when("age", "< 18").then("lane", "BLOCKED"))
            .rule("express", |r| {
                r.when("age", ">= 18")
                    .when("total", "< 500")
                    .then("lane", "EXPRESS")
            })
            .build()
            .expect("failed to build decision table"),
    );

    let handles: Vec<_> = (0..4_i64)
        .map(|i| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let record = FactRecord::new()
                    .set("age", 15 + i * 3)
                    .set("price", 100 + i * 80)
                    .set("quantity", 2_i64);
                let outcome = table.evaluate(&record, &EvaluationOptions::default());
                match outcome {
                    Ok(outcome) => println!("Thread {i}: {outcome}"),
                    Err(e) => println!("Thread {i}: error: {e}"),
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
