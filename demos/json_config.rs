use dmntab::{DecisionTable, EvaluationOptions, FactRecord};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/demos/tables/discounts.json").to_owned());
    let table = DecisionTable::from_file(&path)?;
    println!("{table} from {path}");

    let customers = [
        json!({"age": 25, "country": "US", "orderTotal": 150}),
        json!({"age": 70, "country": "US", "orderTotal": 50}),
        json!({"age": 16, "country": "CA", "orderTotal": 200}),
    ];
    let options = EvaluationOptions::new().with_metadata();

    for customer in customers {
        let record = FactRecord::try_from(customer)?;
        let result = match table.evaluate(&record, &options) {
            Ok(outcome) => outcome.to_json(),
            Err(e) => json!({"error": e.to_string()}),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
