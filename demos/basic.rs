use dmntab::{Column, DecisionTable, EvaluationOptions, FactRecord, HitPolicy};

fn main() {
    // Define the table
    let table = DecisionTable::builder(HitPolicy::First)
        .input(Column::number("age"))
        .input(Column::string("membership"))
        .output(Column::number("discount").with_default(0_i64))
        .output(Column::string("tier").with_default("STANDARD"))
        .rule("senior", |r| {
            r.when("age", ">= 65")
                .then("discount", 0.2)
                .then("tier", "SENIOR")
        })
        .rule("member", |r| {
            r.when("membership", "in (gold, platinum)")
                .then("discount", "0.15")
                .then("tier", "MEMBER")
        })
        .rule("young_adult", |r| {
            r.when("age", "[18..25]")
                .then("discount", 0.05)
                .annotate("student-age promotion")
        })
        .build()
        .expect("failed to build decision table");

    println!("{table}");

    // Evaluate a few records
    let records = [
        FactRecord::new().set("age", 70_i64).set("membership", "none"),
        FactRecord::new().set("age", 40_i64).set("membership", "gold"),
        FactRecord::new().set("age", 21_i64).set("membership", "none"),
        FactRecord::new().set("age", 40_i64).set("membership", "none"),
    ];
    let options = EvaluationOptions::new().with_metadata();

    for record in &records {
        match table.evaluate(record, &options) {
            Ok(outcome) => println!("{outcome}"),
            Err(e) => println!("error: {e}"),
        }
    }
}
