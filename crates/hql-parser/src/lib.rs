//! HQL/JPQL parser using Winnow
//!
//! Turns query text into the [`hql_syntax`] parse tree consumed by the semantic
//! analyzer. The grammar is a hand-written recursive descent with precedence
//! climbing; keywords are case-insensitive.

mod combinators;
mod expression;
mod literal;
mod statement;

use hql_diagnostics::{HQL0001, HQL0002, HqlError, Result, SourceLocation, Span};
use hql_syntax::{Expression, Statement};

/// Parse a complete statement
pub fn parse(source: &str) -> Result<Statement> {
    let mut input: &str = source;
    let parsed = statement::statement(&mut input);
    finish(source, input, parsed)
}

/// Parse a standalone expression
pub fn parse_expression(source: &str) -> Result<Expression> {
    let mut input: &str = source;
    let parsed = expression::expression(&mut input);
    finish(source, input, parsed)
}

fn finish<T>(source: &str, rest: &str, parsed: combinators::PResult<T>) -> Result<T> {
    let rest_trimmed = rest.trim_start();
    let offset = source.len() - rest_trimmed.len();
    match parsed {
        Ok(value) if rest_trimmed.is_empty() => Ok(value),
        _ if rest_trimmed.is_empty() => Err(HqlError::syntax_at(
            HQL0002,
            "Unexpected end of input",
            source,
            SourceLocation::from_span(Span::single(offset), source),
        )),
        _ => Err(HqlError::syntax_at(
            HQL0001,
            format!("Unexpected token near '{}'", snippet(rest_trimmed)),
            source,
            SourceLocation::from_span(Span::single(offset), source),
        )),
    }
}

fn snippet(rest: &str) -> &str {
    let end = rest
        .char_indices()
        .nth(20)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}
