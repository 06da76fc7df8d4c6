//! Literal token lexing
//!
//! Literals keep their original text; only the lexical form decides the kind.
//! Numeric interpretation happens in the semantic layer.

use crate::combinators::{Input, PResult, backtrack, is_ident_char, keyword, lit};
use hql_syntax::{Literal, LiteralKind};
use winnow::ascii::Caseless;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{literal, take_while};

pub fn literal_token(input: &mut Input<'_>) -> PResult<Literal> {
    if let Some(quote @ ('\'' | '"')) = input.chars().next() {
        return quoted_literal(input, quote);
    }
    if keyword("true").parse_next(input).is_ok() {
        return Ok(Literal::new(LiteralKind::True, "true"));
    }
    if keyword("false").parse_next(input).is_ok() {
        return Ok(Literal::new(LiteralKind::False, "false"));
    }
    if keyword("null").parse_next(input).is_ok() {
        return Ok(Literal::new(LiteralKind::Null, "null"));
    }
    numeric_literal(input)
}

/// `'text'` or `"text"`, doubled quotes escape; a single quoted character is a character literal
fn quoted_literal(input: &mut Input<'_>, quote: char) -> PResult<Literal> {
    let checkpoint = *input;
    let mut chars = input.char_indices().skip(1).peekable();
    let mut content = String::new();
    let mut end = None;

    while let Some((i, ch)) = chars.next() {
        if ch == quote {
            if chars.peek().is_some_and(|(_, next)| *next == quote) {
                content.push(quote);
                chars.next();
            } else {
                end = Some(i + ch.len_utf8());
                break;
            }
        } else {
            content.push(ch);
        }
    }

    let Some(end) = end else {
        *input = checkpoint;
        return Err(backtrack());
    };
    *input = &input[end..];

    let kind = if quote == '\'' && content.chars().count() == 1 {
        LiteralKind::Character
    } else {
        LiteralKind::String
    };
    Ok(Literal::new(kind, content))
}

fn digits<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn hex_digits<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_hexdigit()).parse_next(input)
}

fn suffix<'a>(s: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    literal(Caseless(s))
}

/// `e[+-]digits`; leaves the input untouched when absent
fn exponent(input: &mut Input<'_>) -> bool {
    let Some(rest) = input.strip_prefix(['e', 'E']) else {
        return false;
    };
    let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    let count = rest.chars().take_while(char::is_ascii_digit).count();
    if count == 0 {
        return false;
    }
    *input = &rest[count..];
    true
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Suffix {
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
}

fn numeric_suffix(input: &mut Input<'_>) -> Option<Suffix> {
    if suffix("bi").parse_next(input).is_ok() {
        Some(Suffix::BigInteger)
    } else if suffix("bd").parse_next(input).is_ok() {
        Some(Suffix::BigDecimal)
    } else if suffix("l").parse_next(input).is_ok() {
        Some(Suffix::Long)
    } else if suffix("f").parse_next(input).is_ok() {
        Some(Suffix::Float)
    } else if suffix("d").parse_next(input).is_ok() {
        Some(Suffix::Double)
    } else {
        None
    }
}

pub fn numeric_literal(input: &mut Input<'_>) -> PResult<Literal> {
    let start = *input;
    let result = numeric_kind(input);
    let kind = match result {
        Ok(kind) if !input.chars().next().is_some_and(is_ident_char) => kind,
        _ => {
            *input = start;
            return Err(backtrack());
        }
    };
    let text = &start[..start.len() - input.len()];
    Ok(Literal::new(kind, text))
}

fn numeric_kind(input: &mut Input<'_>) -> PResult<LiteralKind> {
    if lit("0x").parse_next(input).is_ok() || lit("0X").parse_next(input).is_ok() {
        hex_digits(input)?;
        let _ = suffix("l").parse_next(input);
        return Ok(LiteralKind::Hex);
    }

    let whole = digits(input)?;
    let mut fractional = false;
    if lit(".").parse_next(input).is_ok() {
        let fraction = digits(input)?;
        if whole.is_empty() && fraction.is_empty() {
            return Err(backtrack());
        }
        fractional = true;
    } else if whole.is_empty() {
        return Err(backtrack());
    }

    if exponent(input) {
        fractional = true;
    }

    let octal = !fractional && whole.len() > 1 && whole.starts_with('0');
    let kind = match (numeric_suffix(input), fractional) {
        (None, true) => LiteralKind::Float,
        (None, false) if octal => LiteralKind::Octal,
        (None, false) => LiteralKind::Integer,
        (Some(Suffix::Long), false) if octal => LiteralKind::Octal,
        (Some(Suffix::Long), false) => LiteralKind::Long,
        (Some(Suffix::BigInteger), false) => LiteralKind::BigInteger,
        (Some(Suffix::Long | Suffix::BigInteger), true) => return Err(backtrack()),
        (Some(Suffix::Float), _) => LiteralKind::Float,
        (Some(Suffix::Double), _) => LiteralKind::Double,
        (Some(Suffix::BigDecimal), _) => LiteralKind::BigDecimal,
    };
    Ok(kind)
}
