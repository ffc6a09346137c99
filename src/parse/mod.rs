mod error;
mod grammar;

pub use error::ParseError;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::types::Expr;

/// Parse a rule expression into an [`Expr`], with the default nesting limit.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid expression or calls a
/// function or method outside the whitelist.
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    parse_expression_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// Parse a rule expression, rejecting groups, operator chains and expression
/// trees nested deeper than `max_depth`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid expression or nests too
/// deeply.
pub fn parse_expression_with_depth(input: &str, max_depth: usize) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::source
        .parse(grammar::stream(input, max_depth))
        .map_err(|e| {
            let message = e.inner().to_string();
            let message = if message.trim().is_empty() {
                "unexpected input".to_owned()
            } else {
                message.replace('\n', "; ")
            };
            ParseError::new(message, e.offset())
        })
}

/// Parse a `function` rule body, with the default nesting limit.
///
/// Accepts a bare expression, optionally written as a statement: a leading
/// `return`, a trailing `;`, and enclosing braces are all stripped.
///
/// # Errors
///
/// Returns [`ParseError`] if what remains is not a valid expression.
pub fn parse_function_body(input: &str) -> Result<Expr, ParseError> {
    parse_function_body_with_depth(input, DEFAULT_MAX_DEPTH)
}

/// [`parse_function_body`] with an explicit nesting limit.
///
/// # Errors
///
/// Returns [`ParseError`] if what remains is not a valid expression or nests
/// too deeply.
pub fn parse_function_body_with_depth(input: &str, max_depth: usize) -> Result<Expr, ParseError> {
    let mut body = input.trim();
    if let Some(inner) = body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
        body = inner.trim();
    }
    if let Some(rest) = body.strip_prefix("return")
        && !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        body = rest.trim_start();
    }
    body = body.trim_end().trim_end_matches(';').trim_end();
    parse_expression_with_depth(body, max_depth)
}
