//! Literal interpretation
//!
//! The lexer classifies a literal by its lexical form and keeps the text;
//! here the text is parsed into a typed value. Type suffixes (`L`, `BI`, `F`,
//! `D`, `BD`) are case-insensitive and stripped before parsing.

use crate::tree::{Literal, LiteralValue};
use hql_diagnostics::{HQL0402, HqlError, Result};
use hql_syntax::{Literal as SyntaxLiteral, LiteralKind};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn build_literal(literal: &SyntaxLiteral) -> Result<Literal> {
    let text = literal.text.as_str();
    let value = match literal.kind {
        LiteralKind::String => LiteralValue::String(text.to_string()),
        LiteralKind::Character => character(text)?,
        LiteralKind::True => LiteralValue::Boolean(true),
        LiteralKind::False => LiteralValue::Boolean(false),
        LiteralKind::Null => LiteralValue::Null,
        LiteralKind::Integer => LiteralValue::Integer(parse(text, text)?),
        LiteralKind::Long => LiteralValue::Long(parse(strip_suffix(text, "l"), text)?),
        LiteralKind::BigInteger => {
            LiteralValue::BigInteger(parse::<BigInt>(strip_suffix(text, "bi"), text)?)
        }
        LiteralKind::Float => LiteralValue::Float(parse(strip_suffix(text, "f"), text)?),
        LiteralKind::Double => LiteralValue::Double(parse(strip_suffix(text, "d"), text)?),
        LiteralKind::BigDecimal => LiteralValue::BigDecimal(big_decimal(text)?),
        LiteralKind::Hex => {
            let digits = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .unwrap_or(text);
            radix(digits, 16, text)?
        }
        LiteralKind::Octal => radix(text, 8, text)?,
    };
    Ok(Literal {
        value,
        text: literal.text.clone(),
    })
}

fn character(text: &str) -> Result<LiteralValue> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(LiteralValue::Character(c)),
        _ => Err(HqlError::parsing(
            HQL0402,
            format!("Character literal must hold exactly one character: '{}'", text),
        )),
    }
}

/// Strip a case-insensitive ASCII suffix, if present
fn strip_suffix<'t>(text: &'t str, suffix: &str) -> &'t str {
    let split = text.len().saturating_sub(suffix.len());
    match text.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(suffix) => &text[..split],
        _ => text,
    }
}

fn parse<T>(digits: &str, original: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    digits
        .parse::<T>()
        .map_err(|err| HqlError::number_format(original, err))
}

fn big_decimal(text: &str) -> Result<Decimal> {
    let digits = strip_suffix(text, "bd");
    let parsed = if digits.contains(['e', 'E']) {
        Decimal::from_scientific(digits)
    } else {
        Decimal::from_str(digits)
    };
    parsed.map_err(|err| HqlError::number_format(text, err))
}

/// Hex and octal literals are `Integer` unless suffixed with `L`
fn radix(text: &str, radix: u32, original: &str) -> Result<LiteralValue> {
    let digits = strip_suffix(text, "l");
    if digits.len() < text.len() {
        i64::from_str_radix(digits, radix)
            .map(LiteralValue::Long)
            .map_err(|err| HqlError::number_format(original, err))
    } else {
        i32::from_str_radix(digits, radix)
            .map(LiteralValue::Integer)
            .map_err(|err| HqlError::number_format(original, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hql_diagnostics::HQL0106;
    use rstest::rstest;

    fn value(kind: LiteralKind, text: &str) -> LiteralValue {
        build_literal(&SyntaxLiteral::new(kind, text)).unwrap().value
    }

    #[rstest]
    #[case(LiteralKind::Integer, "42", LiteralValue::Integer(42))]
    #[case(LiteralKind::Long, "42L", LiteralValue::Long(42))]
    #[case(LiteralKind::Long, "42l", LiteralValue::Long(42))]
    #[case(LiteralKind::Float, "1.5", LiteralValue::Float(1.5))]
    #[case(LiteralKind::Float, "1.5f", LiteralValue::Float(1.5))]
    #[case(LiteralKind::Double, "1.5D", LiteralValue::Double(1.5))]
    #[case(LiteralKind::Hex, "0x1F", LiteralValue::Integer(31))]
    #[case(LiteralKind::Hex, "0xFFL", LiteralValue::Long(255))]
    #[case(LiteralKind::Octal, "017", LiteralValue::Integer(15))]
    #[case(LiteralKind::Octal, "017L", LiteralValue::Long(15))]
    #[case(LiteralKind::Character, "x", LiteralValue::Character('x'))]
    #[case(LiteralKind::True, "true", LiteralValue::Boolean(true))]
    #[case(LiteralKind::Null, "null", LiteralValue::Null)]
    fn test_literal_values(
        #[case] kind: LiteralKind,
        #[case] text: &str,
        #[case] expected: LiteralValue,
    ) {
        assert_eq!(value(kind, text), expected);
    }

    #[test]
    fn test_big_numbers() {
        assert_eq!(
            value(LiteralKind::BigInteger, "123456789012345678901234567890BI"),
            LiteralValue::BigInteger(BigInt::from_str("123456789012345678901234567890").unwrap())
        );
        assert_eq!(
            value(LiteralKind::BigDecimal, "1.25bd"),
            LiteralValue::BigDecimal(Decimal::new(125, 2))
        );
        assert_eq!(
            value(LiteralKind::BigDecimal, "1.5e2BD"),
            LiteralValue::BigDecimal(Decimal::new(150, 0))
        );
    }

    #[test]
    fn test_malformed_numbers_keep_original_text() {
        let err = build_literal(&SyntaxLiteral::new(LiteralKind::Integer, "99999999999")).unwrap_err();
        assert_eq!(err.code(), HQL0106);
        assert!(err.to_string().contains("99999999999"));

        let err = build_literal(&SyntaxLiteral::new(LiteralKind::Octal, "09")).unwrap_err();
        assert_eq!(err.code(), HQL0106);
    }

    #[test]
    fn test_character_literal_length() {
        let err = build_literal(&SyntaxLiteral::new(LiteralKind::Character, "ab")).unwrap_err();
        assert_eq!(err.code(), HQL0402);
    }
}
