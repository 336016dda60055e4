use dmntab::{
    Aggregation, Column, DecisionTable, DecisionTableBuilder, EvaluationOptions, FactRecord,
    HitPolicy,
};

/// Three overlapping loyalty rules; a 95-point customer matches all of them.
fn loyalty(policy: HitPolicy) -> DecisionTableBuilder {
    DecisionTable::builder(policy)
        .input(Column::number("score"))
        .output(Column::number("points").with_default(0_i64))
        .output(Column::string("tier").with_default("NONE"))
        .rule("bronze", |r| {
            r.when("score", ">= 10")
                .then("points", 1_i64)
                .then("tier", "BRONZE")
                .priority(1.0)
        })
        .rule("gold", |r| {
            r.when("score", ">= 90")
                .then("points", 10_i64)
                .then("tier", "GOLD")
                .priority(10.0)
        })
        .rule("silver", |r| {
            r.when("score", ">= 50")
                .then("points", 5_i64)
                .then("tier", "SILVER")
                .priority(5.0)
        })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let record = FactRecord::new().set("score", 95_i64);
    let options = EvaluationOptions::default();

    for policy in HitPolicy::ALL {
        let table = loyalty(policy)
            .build()
            .expect("failed to build decision table");
        match table.evaluate(&record, &options) {
            Ok(outcome) => println!("{policy:>12}: {}", outcome.to_json()),
            Err(e) => println!("{policy:>12}: error: {e}"),
        }
    }

    for aggregation in [Aggregation::Count, Aggregation::Sum, Aggregation::Min, Aggregation::Max] {
        let table = loyalty(HitPolicy::Collect)
            .aggregation(aggregation)
            .build()
            .expect("failed to build decision table");
        let outcome = table
            .evaluate(&record, &options)
            .expect("COLLECT never violates");
        println!("{:>12}: {}", format!("COLLECT {aggregation}"), outcome.to_json());
    }
}
