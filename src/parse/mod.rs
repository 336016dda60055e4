//! Text front-ends: FEEL-like condition cells, literal scalars, and
//! derived-column expressions.

mod error;
mod expression;
mod grammar;

pub use error::ParseError;

use crate::{Expression, Operand, Operator, Value};

/// Parse a literal condition fragment into a typed scalar.
///
/// Quoted text stays a string; otherwise numbers, then `true`/`false`, are
/// recognised. Anything else is returned unchanged as a string.
#[must_use]
pub fn parse_scalar(text: &str) -> Value {
    grammar::scalar(text)
}

/// Parse a condition cell such as `>= 18`, `not in (a, b)`, `[1..5]` or `-`.
///
/// Never fails: text that matches no pattern becomes an exact match on the
/// whole (trimmed) text.
#[must_use]
pub fn parse_condition(text: &str) -> (Operator, Operand) {
    grammar::condition(text)
}

/// Parse a derived-column expression.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid expression.
pub fn parse_expression(input: &str) -> Result<Expression, ParseError> {
    use winnow::Parser;
    expression::parse_root
        .parse(input)
        .map_err(|e| ParseError::from_winnow(&e))
}
