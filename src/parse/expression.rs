use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, terminated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::{BinaryOp, Expression, UnaryOp, Value};

// -- Whitespace & tokens ----------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
        }),
    )
        .take()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('"', take_while(0.., |c: char| c != '"'), '"'),
        delimited('\'', take_while(0.., |c: char| c != '\''), '\''),
    ))
    .map(str::to_owned)
    .parse_next(input)
}

fn keyword_or_ident(name: &str) -> Expression {
    match name {
        "true" => Expression::Literal(Value::Bool(true)),
        "false" => Expression::Literal(Value::Bool(false)),
        "null" => Expression::Literal(Value::Null),
        _ => Expression::Ident(name.to_owned()),
    }
}

// -- Expressions (precedence: || < && < equality < comparison < + - < * / %) -

fn primary(input: &mut &str) -> ModalResult<Expression> {
    ws.parse_next(input)?;
    alt((
        delimited('(', cut_err(expr), cut_err((ws, ')'))),
        number.map(|n| Expression::Literal(Value::Number(n))),
        string_literal.map(|s| Expression::Literal(Value::String(s))),
        ident.map(keyword_or_ident),
    ))
    .context(StrContext::Expected(StrContextValue::Description("operand")))
    .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Expression> {
    ws.parse_next(input)?;
    let op = opt(alt(('!'.value(UnaryOp::Not), '-'.value(UnaryOp::Neg)))).parse_next(input)?;
    match op {
        Some(op) => {
            let inner = cut_err(unary).parse_next(input)?;
            Ok(Expression::Unary(op, Box::new(inner)))
        }
        None => primary(input),
    }
}

fn fold(first: Expression, rest: Vec<(BinaryOp, Expression)>) -> Expression {
    rest.into_iter().fold(first, |acc, (op, rhs)| {
        Expression::Binary(op, Box::new(acc), Box::new(rhs))
    })
}

fn multiplicative(input: &mut &str) -> ModalResult<Expression> {
    let first = unary(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(
                ws,
                alt((
                    '*'.value(BinaryOp::Mul),
                    '/'.value(BinaryOp::Div),
                    '%'.value(BinaryOp::Rem),
                )),
            ),
            cut_err(unary),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn additive(input: &mut &str) -> ModalResult<Expression> {
    let first = multiplicative(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(ws, alt(('+'.value(BinaryOp::Add), '-'.value(BinaryOp::Sub)))),
            cut_err(multiplicative),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn comparison(input: &mut &str) -> ModalResult<Expression> {
    let first = additive(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(
                ws,
                alt((
                    "<=".value(BinaryOp::Le),
                    ">=".value(BinaryOp::Ge),
                    "<".value(BinaryOp::Lt),
                    ">".value(BinaryOp::Gt),
                )),
            ),
            cut_err(additive),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn equality(input: &mut &str) -> ModalResult<Expression> {
    let first = comparison(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(
                ws,
                alt((
                    "===".value(BinaryOp::Eq),
                    "==".value(BinaryOp::Eq),
                    "!==".value(BinaryOp::Ne),
                    "!=".value(BinaryOp::Ne),
                )),
            ),
            cut_err(comparison),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn logical_and(input: &mut &str) -> ModalResult<Expression> {
    let first = equality(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(ws, "&&".value(BinaryOp::And)),
            cut_err(equality),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn logical_or(input: &mut &str) -> ModalResult<Expression> {
    let first = logical_and(input)?;
    let rest: Vec<(BinaryOp, Expression)> = repeat(
        0..,
        (
            preceded(ws, "||".value(BinaryOp::Or)),
            cut_err(logical_and),
        ),
    )
    .parse_next(input)?;
    Ok(fold(first, rest))
}

fn expr(input: &mut &str) -> ModalResult<Expression> {
    logical_or(input)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_root(input: &mut &str) -> ModalResult<Expression> {
    terminated(expr, ws).parse_next(input)
}
