mod compile;
mod config;
mod error;
mod evaluate;
pub mod parse;
mod resolve;
mod types;

pub use config::{ColumnConfig, Payload, RuleConfig, TableConfig};
pub use error::DmnError;
pub use types::{
    Aggregation, BinaryOp, BuildError, Column, ColumnCondition, ColumnKind, ColumnType, Condition,
    Decision, DecisionTable, DecisionTableBuilder, DerivedExpression, EvalError,
    EvaluationOptions, EvaluationOutcome, ExprError, Expression, FactRecord, HitPolicy, Metadata,
    Operand, Operator, OutputAssignment, Outputs, RawCondition, RecordError, Rule, RuleBuilder,
    RuleSummary, Trace, UnaryOp, Value, column,
};
