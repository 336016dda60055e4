#![allow(dead_code)]

use dmntab::{
    Aggregation, Column, DecisionTable, DecisionTableBuilder, FactRecord, HitPolicy, Value,
};
use proptest::prelude::*;

// --- Fixed field schema ---
// x    : number (-20..=120)
// y    : number (-20..=120)
// kind : string, one of KINDS

pub const KINDS: &[&str] = &["a", "b", "c", "d"];
const FIELDS: &[&str] = &["x", "y"];
const COMPARISONS: &[&str] = &[">=", "<=", ">", "<", "!=", "="];

/// A scalar value of any kind except dates.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1_000_i64..1_000).prop_map(Value::from),
        any::<f64>()
            .prop_filter("must be finite", |f| f.is_finite())
            .prop_map(Value::Number),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

/// A record aligned with the fixed schema.
pub fn arb_record() -> impl Strategy<Value = FactRecord> {
    (-20_i64..=120, -20_i64..=120, prop::sample::select(KINDS)).prop_map(|(x, y, kind)| {
        FactRecord::new()
            .set("x", x)
            .set("y", y)
            .set("kind", kind)
    })
}

/// Condition text on a numeric field.
fn arb_numeric_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        (prop::sample::select(COMPARISONS), -20_i64..=120).prop_map(|(op, n)| format!("{op} {n}")),
        (-20_i64..=120, 0_i64..=60).prop_map(|(lo, span)| format!("[{lo}..{}]", lo + span)),
        prop::collection::vec(-20_i64..=120, 1..4).prop_map(|items| {
            let items: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("in ({})", items.join(", "))
        }),
        Just("-".to_owned()),
    ]
}

/// Condition text on the `kind` field.
fn arb_kind_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(KINDS).prop_map(str::to_owned),
        prop::sample::select(KINDS).prop_map(|k| format!("not in ({k})")),
        Just("-".to_owned()),
    ]
}

#[derive(Debug, Clone)]
pub struct GenRule {
    pub cells: Vec<(String, String)>,
    pub points: i64,
    pub tier: String,
    pub priority: f64,
}

#[derive(Debug, Clone)]
pub struct GenTable {
    pub rules: Vec<GenRule>,
}

fn arb_rule() -> impl Strategy<Value = GenRule> {
    (
        prop::collection::vec(
            (prop::sample::select(FIELDS), arb_numeric_cell())
                .prop_map(|(f, c)| (f.to_owned(), c)),
            0..3,
        ),
        prop::option::of(arb_kind_cell()),
        0_i64..100,
        prop::sample::select(&["GOLD", "SILVER", "BRONZE"][..]),
        (-10_i32..10).prop_map(|n| f64::from(n) / 2.0),
    )
        .prop_map(|(mut cells, kind, points, tier, priority)| {
            if let Some(kind) = kind {
                cells.push(("kind".to_owned(), kind));
            }
            GenRule {
                cells,
                points,
                tier: tier.to_owned(),
                priority,
            }
        })
}

/// Between 1 and 12 rules over the fixed schema.
pub fn arb_table() -> impl Strategy<Value = GenTable> {
    prop::collection::vec(arb_rule(), 1..12).prop_map(|rules| GenTable { rules })
}

impl GenTable {
    pub fn builder(&self, policy: HitPolicy) -> DecisionTableBuilder {
        let mut builder = DecisionTable::builder(policy)
            .input(Column::number("x"))
            .input(Column::number("y"))
            .input(Column::string("kind"))
            .output(Column::number("points").with_default(0_i64))
            .output(Column::string("tier"));
        for rule in &self.rules {
            let rule = rule.clone();
            builder = builder.rule_auto(move |mut r| {
                for (field, cell) in &rule.cells {
                    r = r.when(field, cell.as_str());
                }
                r.then("points", rule.points)
                    .then("tier", rule.tier.as_str())
                    .priority(rule.priority)
            });
        }
        builder
    }

    pub fn build(&self, policy: HitPolicy) -> DecisionTable {
        self.builder(policy).build().unwrap()
    }

    pub fn build_aggregated(&self, aggregation: Aggregation) -> DecisionTable {
        self.builder(HitPolicy::Collect)
            .aggregation(aggregation)
            .build()
            .unwrap()
    }
}
