use thiserror::Error;
use winnow::error::ContextError;

/// A derived-column expression that could not be parsed.
///
/// Kept alongside the column instead of failing the build; evaluation of
/// that column then yields `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression `{expression}` at offset {offset}: {reason}")]
pub struct ParseError {
    expression: String,
    offset: usize,
    reason: String,
}

impl ParseError {
    pub(crate) fn from_winnow(err: &winnow::error::ParseError<&str, ContextError>) -> Self {
        let reason = err
            .inner()
            .to_string()
            .lines()
            .next()
            .filter(|line| !line.is_empty())
            .map_or_else(|| describe(&err.input()[err.offset()..]), str::to_owned);
        Self {
            expression: (*err.input()).to_owned(),
            offset: err.offset(),
            reason,
        }
    }

    /// The expression source as written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Byte offset into [`expression`](Self::expression) where parsing stopped.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

fn describe(remaining: &str) -> String {
    remaining
        .chars()
        .next()
        .map_or_else(|| "unexpected end of expression".to_owned(), |c| {
            format!("unexpected character '{c}'")
        })
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_expression;

    #[test]
    fn records_source_and_offset() {
        let err = parse_expression("price * * 2").unwrap_err();
        assert_eq!(err.expression(), "price * * 2");
        assert!(err.offset() >= 7, "offset {}", err.offset());
        assert!(err.to_string().starts_with("invalid expression `price * * 2` at offset"));
    }

    #[test]
    fn trailing_input_points_past_the_expression() {
        let err = parse_expression("a b").unwrap_err();
        assert_eq!(err.offset(), 2);
        assert!(err.to_string().contains("at offset 2"));
    }

    #[test]
    fn empty_input_is_end_of_expression() {
        let err = parse_expression("").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(!err.reason().is_empty());
    }
}
