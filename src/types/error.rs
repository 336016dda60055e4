use thiserror::Error;

use super::HitPolicy;

/// Errors raised while assembling a [`DecisionTable`](super::DecisionTable).
///
/// Build-time problems are never recovered: a table either builds completely
/// or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("rule {position}: malformed {field}: {reason}")]
    MalformedRule {
        /// 1-based position of the rule in declaration order.
        position: usize,
        field: String,
        reason: String,
    },

    #[error("duplicate {kind} column '{name}'")]
    DuplicateColumn { kind: ColumnKind, name: String },

    #[error("{kind} column at position {position} has an empty name")]
    EmptyColumnName { kind: ColumnKind, position: usize },

    #[error("unknown hit policy '{name}'")]
    UnknownHitPolicy { name: String },

    #[error("unknown aggregation '{name}'")]
    UnknownAggregation { name: String },

    #[error("unknown column type '{name}'")]
    UnknownColumnType { name: String },
}

/// Which column list a [`BuildError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Input,
    Output,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Input => f.write_str("input"),
            ColumnKind::Output => f.write_str("output"),
        }
    }
}

/// Errors scoped to the evaluation of a single fact record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{policy} hit policy violated: {reason} ({match_count} rules matched)")]
    HitPolicyViolation {
        policy: HitPolicy,
        match_count: usize,
        reason: String,
    },

    #[error("no rules matched in strict mode")]
    NoRuleMatchedInStrictMode,
}
