use thiserror::Error;

use crate::{BuildError, EvalError, RecordError};

/// Unified error type covering configuration, building, evaluation, and I/O.
///
/// Returned by convenience methods like
/// [`DecisionTable::from_json()`](crate::DecisionTable::from_json) and
/// [`DecisionTable::from_file()`](crate::DecisionTable::from_file).
#[derive(Debug, Error)]
pub enum DmnError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Evaluate(#[from] EvalError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
