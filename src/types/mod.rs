mod column;
mod condition;
mod error;
mod expression;
mod hit_policy;
mod outcome;
mod record;
mod rule;
mod table;
mod value;

pub use column::{Column, ColumnType, DerivedExpression};
pub use condition::{Condition, ColumnCondition, Operand, Operator, column};
pub use error::{BuildError, ColumnKind, EvalError};
pub use expression::{BinaryOp, ExprError, Expression, UnaryOp};
pub use hit_policy::{Aggregation, HitPolicy};
pub use outcome::{
    Decision, EvaluationOptions, EvaluationOutcome, Metadata, Outputs, RuleSummary, Trace,
};
pub use record::{FactRecord, RecordError};
pub use rule::{OutputAssignment, RawCondition, Rule};
pub use table::{DecisionTable, DecisionTableBuilder, RuleBuilder};
pub use value::Value;
pub(crate) use table::RuleDraft;
