use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode, ModalResult};
use winnow::prelude::*;
use winnow::token::{rest, take_while};

use crate::{Operand, Operator, Value};

type Cell = (Operator, Operand);

// -- Scalars ----------------------------------------------------------------

pub(super) fn scalar(text: &str) -> Value {
    if let Some(inner) = strip_quotes(text) {
        return Value::String(inner.to_owned());
    }
    if let Ok(n) = number.parse(text) {
        return Value::Number(n);
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_owned()),
    }
}

/// Matching single or double quotes. A lone quote character counts as an
/// empty quoted string.
fn strip_quotes(text: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|q| {
        (text.starts_with(q) && text.ends_with(q))
            .then(|| text.get(1..text.len() - 1).unwrap_or(""))
    })
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (opt('-'), digit1, opt(('.', digit1)))
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

// -- Condition cells --------------------------------------------------------

pub(super) fn condition(text: &str) -> Cell {
    let trimmed = text.trim();
    cell.parse(trimmed)
        .unwrap_or_else(|_| (Operator::Eq, Operand::Scalar(scalar(trimmed))))
}

// Longer operators are tried before their prefixes (`not in` before `in`,
// `<=` before `<`). Every branch but `-` consumes the rest of the input.
fn cell(input: &mut &str) -> ModalResult<Cell> {
    alt((
        not_in_list,
        in_list,
        range,
        comparison("<=", Operator::Le),
        comparison(">=", Operator::Ge),
        comparison("!=", Operator::Ne),
        comparison("<", Operator::Lt),
        comparison(">", Operator::Gt),
        comparison("=", Operator::Eq),
        "-".value((Operator::Any, Operand::None)),
    ))
    .parse_next(input)
}

fn space(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Non-empty and free of line terminators (`\n`, `\r`, U+2028, U+2029).
fn single_line(s: &str) -> bool {
    !s.is_empty() && !s.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

fn not_in_list(input: &mut &str) -> ModalResult<Cell> {
    preceded(("not", space, "in", space), list)
        .map(|items| (Operator::NotIn, Operand::List(items)))
        .parse_next(input)
}

fn in_list(input: &mut &str) -> ModalResult<Cell> {
    preceded(("in", space), list)
        .map(|items| (Operator::In, Operand::List(items)))
        .parse_next(input)
}

/// `(a, b, c)` up to the final closing parenthesis. Entries are split on
/// every comma, quoted or not.
fn list(input: &mut &str) -> ModalResult<Vec<Value>> {
    preceded(
        '(',
        rest.verify_map(list_body),
    )
    .map(|inner: &str| inner.split(',').map(|v| scalar(v.trim())).collect())
    .parse_next(input)
}

fn range(input: &mut &str) -> ModalResult<Cell> {
    preceded(
        '[',
        rest.verify_map(range_body),
    )
    .map(|(lo, hi)| {
        (
            Operator::Between,
            Operand::Range(scalar(lo.trim()), scalar(hi.trim())),
        )
    })
    .parse_next(input)
}

fn list_body(body: &str) -> Option<&str> {
    body.strip_suffix(')').filter(|inner| single_line(inner))
}

fn range_body(body: &str) -> Option<(&str, &str)> {
    body.strip_suffix(']').and_then(split_range)
}

/// Split at the rightmost `..` that leaves both bounds non-empty.
fn split_range(inner: &str) -> Option<(&str, &str)> {
    (1..inner.len().saturating_sub(2))
        .rev()
        .find(|&i| inner.as_bytes()[i..].starts_with(b".."))
        .map(|i| (&inner[..i], &inner[i + 2..]))
        .filter(|(lo, hi)| single_line(lo) && single_line(hi))
}

fn comparison<'i>(
    symbol: &'static str,
    operator: Operator,
) -> impl Parser<&'i str, Cell, ErrMode<ContextError>> {
    preceded((symbol, space), rest.verify(|s: &str| single_line(s)))
        .map(move |operand: &str| (operator, Operand::Scalar(scalar(operand.trim()))))
}
