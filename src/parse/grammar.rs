use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, cut_err, fail, opt, separated};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::{any, one_of, take_while};

use crate::types::{BinaryOp, Builtin, Expr, Method, UnaryOp, Value};

/// How deep the parser currently is, and how deep it may go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    current: usize,
    limit: usize,
}

pub type Input<'i> = Stateful<&'i str, Depth>;

pub fn stream(source: &str, max_depth: usize) -> Input<'_> {
    Stateful {
        input: source,
        state: Depth {
            current: 0,
            limit: max_depth,
        },
    }
}

// -- Nesting ------------------------------------------------------------------

fn too_deep<O>(input: &mut Input<'_>) -> ModalResult<O> {
    cut_err(fail)
        .context(StrContext::Label("nesting depth"))
        .parse_next(input)
}

/// Step one level down, failing once the limit is reached. Callers restore
/// the level they started at.
fn descend(input: &mut Input<'_>) -> ModalResult<()> {
    if input.state.current >= input.state.limit {
        return too_deep(input);
    }
    input.state.current += 1;
    Ok(())
}

/// Run `parser` one level deeper.
fn nested<'i, O>(
    input: &mut Input<'i>,
    mut parser: impl Parser<Input<'i>, O, ErrMode<ContextError>>,
) -> ModalResult<O> {
    let level = input.state.current;
    descend(input)?;
    let result = parser.parse_next(input);
    input.state.current = level;
    result
}

// -- Whitespace ---------------------------------------------------------------

fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace())
        .void()
        .parse_next(input)
}

/// Fail without consuming, reporting `what` as the expected token.
fn expected<O>(input: &mut Input<'_>, what: &'static str) -> ModalResult<O> {
    cut_err(fail)
        .context(StrContext::Expected(StrContextValue::Description(what)))
        .parse_next(input)
}

// -- Identifiers --------------------------------------------------------------

fn ident<'i>(input: &mut Input<'i>) -> ModalResult<&'i str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    )
        .take()
        .parse_next(input)
}

// -- Literals -----------------------------------------------------------------

fn string_literal(input: &mut Input<'_>) -> ModalResult<String> {
    let quote = one_of(['"', '\'']).parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any)
            .context(StrContext::Expected(StrContextValue::Description(
                "closing quote",
            )))
            .parse_next(input)?;
        match ch {
            c if c == quote => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    'r' => s.push('\r'),
                    '0' => s.push('\0'),
                    other => s.push(other),
                }
            }
            c => s.push(c),
        }
    }
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<f64> {
    (
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn array_literal(input: &mut Input<'_>) -> ModalResult<Expr> {
    '['.parse_next(input)?;
    let items: Vec<Expr> = nested(input, separated(0.., expr, (ws, ',')))?;
    (ws, cut_err(']')).parse_next(input)?;
    Ok(Expr::Array(items))
}

fn parenthesized(input: &mut Input<'_>) -> ModalResult<Expr> {
    '('.parse_next(input)?;
    let inner = nested(input, cut_err(expr))?;
    (ws, cut_err(')')).parse_next(input)?;
    Ok(inner)
}

/// Arguments after an opening `(`, through the closing `)`.
fn call_args(input: &mut Input<'_>) -> ModalResult<Vec<Expr>> {
    let args: Vec<Expr> = nested(input, separated(0.., expr, (ws, ',')))?;
    (ws, cut_err(')'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)?;
    Ok(args)
}

fn within(count: usize, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&count)
}

// -- Primary ------------------------------------------------------------------

fn primary(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    alt((
        parenthesized,
        array_literal,
        string_literal.map(|s| Expr::Literal(Value::String(s))),
        number_literal.map(|n| Expr::Literal(Value::Number(n))),
        identifier_or_call,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn identifier_or_call(input: &mut Input<'_>) -> ModalResult<Expr> {
    let start = input.checkpoint();
    let name = ident.parse_next(input)?;
    match name {
        "true" => return Ok(Expr::Literal(Value::Bool(true))),
        "false" => return Ok(Expr::Literal(Value::Bool(false))),
        "null" => return Ok(Expr::Literal(Value::Null)),
        "undefined" => return Ok(Expr::Undefined),
        _ => {}
    }

    let after_name = input.checkpoint();
    ws.parse_next(input)?;
    if opt('(').parse_next(input)?.is_none() {
        input.reset(&after_name);
        return Ok(Expr::Ident(name.to_owned()));
    }

    let Some(function) = Builtin::from_name(name) else {
        input.reset(&start);
        return expected(input, "Number, String, Boolean or isEmpty");
    };
    let args = call_args(input)?;
    if !within(args.len(), function.arity()) {
        input.reset(&start);
        return expected(input, "a valid argument count");
    }
    Ok(Expr::Call { function, args })
}

// -- Postfix: member access, indexing, method calls ----------------------------

fn postfix(input: &mut Input<'_>) -> ModalResult<Expr> {
    let level = input.state.current;
    let result = postfix_chain(input);
    input.state.current = level;
    result
}

fn postfix_chain(input: &mut Input<'_>) -> ModalResult<Expr> {
    let mut expr = primary(input)?;
    loop {
        let checkpoint = input.checkpoint();
        ws.parse_next(input)?;

        if opt('.').parse_next(input)?.is_some() {
            descend(input)?;
            ws.parse_next(input)?;
            let name_start = input.checkpoint();
            let name = cut_err(ident)
                .context(StrContext::Expected(StrContextValue::Description(
                    "property name",
                )))
                .parse_next(input)?;

            let after_name = input.checkpoint();
            ws.parse_next(input)?;
            if opt('(').parse_next(input)?.is_none() {
                input.reset(&after_name);
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: name.to_owned(),
                };
                continue;
            }

            let Some(method) = Method::from_name(name) else {
                input.reset(&name_start);
                return expected(input, "a supported method");
            };
            let args = call_args(input)?;
            if !within(args.len(), method.arity()) {
                input.reset(&name_start);
                return expected(input, "a valid argument count");
            }
            expr = Expr::Method {
                receiver: Box::new(expr),
                method,
                args,
            };
        } else if opt('[').parse_next(input)?.is_some() {
            descend(input)?;
            let index = nested(input, cut_err(self::expr))?;
            (ws, cut_err(']')).parse_next(input)?;
            expr = Expr::Index {
                object: Box::new(expr),
                index: Box::new(index),
            };
        } else {
            input.reset(&checkpoint);
            return Ok(expr);
        }
    }
}

fn unary(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    let op = opt(alt((
        '!'.value(UnaryOp::Not),
        '-'.value(UnaryOp::Neg),
        '+'.value(UnaryOp::Plus),
    )))
    .parse_next(input)?;
    match op {
        Some(op) => {
            let operand = nested(input, cut_err(unary))?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        }
        None => postfix(input),
    }
}

// -- Binary operators (precedence: ?? < || < && < equality < relational <
// additive < multiplicative) -----------------------------------------------------

type Level = fn(&mut Input<'_>) -> ModalResult<Expr>;
type OpParser = fn(&mut Input<'_>) -> ModalResult<BinaryOp>;

/// Left-associative chain of `operand (op operand)*`.
fn binary_level(input: &mut Input<'_>, operand: Level, op: OpParser) -> ModalResult<Expr> {
    let level = input.state.current;
    let result = binary_chain(input, operand, op);
    input.state.current = level;
    result
}

fn binary_chain(input: &mut Input<'_>, operand: Level, op: OpParser) -> ModalResult<Expr> {
    let mut left = operand(input)?;
    loop {
        let checkpoint = input.checkpoint();
        ws.parse_next(input)?;
        match op(input) {
            Ok(op) => {
                descend(input)?;
                let right = cut_err(operand).parse_next(input)?;
                left = Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                };
            }
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                return Ok(left);
            }
            Err(e) => return Err(e),
        }
    }
}

fn multiplicative_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    alt((
        '*'.value(BinaryOp::Mul),
        '/'.value(BinaryOp::Div),
        '%'.value(BinaryOp::Rem),
    ))
    .parse_next(input)
}

fn additive_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    alt(('+'.value(BinaryOp::Add), '-'.value(BinaryOp::Sub))).parse_next(input)
}

fn relational_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    alt((
        "<=".value(BinaryOp::Lte),
        "<".value(BinaryOp::Lt),
        ">=".value(BinaryOp::Gte),
        ">".value(BinaryOp::Gt),
    ))
    .parse_next(input)
}

fn equality_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    alt((
        "===".value(BinaryOp::StrictEq),
        "!==".value(BinaryOp::StrictNeq),
        "==".value(BinaryOp::LooseEq),
        "!=".value(BinaryOp::LooseNeq),
    ))
    .parse_next(input)
}

fn and_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    "&&".value(BinaryOp::And).parse_next(input)
}

fn or_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    "||".value(BinaryOp::Or).parse_next(input)
}

fn coalesce_op(input: &mut Input<'_>) -> ModalResult<BinaryOp> {
    "??".value(BinaryOp::Coalesce).parse_next(input)
}

fn multiplicative(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, unary, multiplicative_op)
}

fn additive(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, multiplicative, additive_op)
}

fn relational(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, additive, relational_op)
}

fn equality(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, relational, equality_op)
}

fn and_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, equality, and_op)
}

fn or_expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, and_expr, or_op)
}

fn coalesce(input: &mut Input<'_>) -> ModalResult<Expr> {
    binary_level(input, or_expr, coalesce_op)
}

fn conditional(input: &mut Input<'_>) -> ModalResult<Expr> {
    let test = coalesce(input)?;
    let checkpoint = input.checkpoint();
    ws.parse_next(input)?;
    if opt('?').parse_next(input)?.is_none() {
        input.reset(&checkpoint);
        return Ok(test);
    }
    let consequent = nested(input, cut_err(conditional))?;
    (ws, cut_err(':'))
        .context(StrContext::Expected(StrContextValue::CharLiteral(':')))
        .parse_next(input)?;
    let alternate = nested(input, cut_err(conditional))?;
    Ok(Expr::Conditional {
        test: Box::new(test),
        consequent: Box::new(consequent),
        alternate: Box::new(alternate),
    })
}

fn expr(input: &mut Input<'_>) -> ModalResult<Expr> {
    ws.parse_next(input)?;
    conditional(input)
}

// -- Top level ----------------------------------------------------------------

/// A complete expression followed only by whitespace, whose tree is no
/// deeper than the depth limit.
pub fn source(input: &mut Input<'_>) -> ModalResult<Expr> {
    let start = input.checkpoint();
    let parsed = expr(input)?;
    ws.parse_next(input)?;
    if parsed.depth() > input.state.limit {
        input.reset(&start);
        return too_deep(input);
    }
    Ok(parsed)
}
