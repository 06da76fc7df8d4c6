//! Tests for literal interpretation inside queries
//!
//! Covers:
//! - Each numeric kind with its suffix
//! - Malformed numeric literals
//! - Property-based round trips

mod common;

use common::*;
use hql_diagnostics::{HQL0106, HqlError};
use hql_model::{BasicType, TypeDescriptor};
use hql_sqm::{Expression, LiteralValue};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn literal_value(text: &str) -> LiteralValue {
    let select = interpret_select(&model(), &format!("select {} from Person p", text));
    match selection(&select, 0) {
        Expression::Literal(literal) => {
            assert_eq!(literal.text.as_str(), text);
            literal.value.clone()
        }
        other => panic!("Expected Literal for '{}', got: {:?}", text, other),
    }
}

#[rstest]
#[case("1", LiteralValue::Integer(1))]
#[case("1L", LiteralValue::Long(1))]
#[case("1l", LiteralValue::Long(1))]
#[case("1BI", LiteralValue::BigInteger(BigInt::from(1)))]
#[case("1.5F", LiteralValue::Float(1.5))]
#[case("1.5", LiteralValue::Float(1.5))]
#[case("1.5D", LiteralValue::Double(1.5))]
#[case("1.5BD", LiteralValue::BigDecimal(Decimal::new(15, 1)))]
#[case("0x1F", LiteralValue::Integer(31))]
#[case("0x1FL", LiteralValue::Long(31))]
#[case("017", LiteralValue::Integer(15))]
#[case("true", LiteralValue::Boolean(true))]
#[case("null", LiteralValue::Null)]
fn test_numeric_and_keyword_literals(#[case] text: &str, #[case] expected: LiteralValue) {
    assert_eq!(literal_value(text), expected);
}

#[test]
fn test_string_and_character_literals() {
    let select = interpret_select(&model(), "select 'it''s', 'x' from Person p");
    let values: Vec<_> = (0..2)
        .map(|position| match selection(&select, position) {
            Expression::Literal(literal) => literal.value.clone(),
            other => panic!("Expected Literal, got: {:?}", other),
        })
        .collect();
    assert_eq!(
        values,
        vec![LiteralValue::String("it's".into()), LiteralValue::Character('x')]
    );
    assert_eq!(
        selection(&select, 1).expression_type(),
        Some(TypeDescriptor::Basic(BasicType::Character))
    );
}

#[rstest]
#[case("99999999999")]
#[case("99999999999999999999L")]
#[case("09")]
fn test_malformed_numbers_keep_original_text(#[case] text: &str) {
    match interpret_err(&model(), &format!("select {} from Person p", text)) {
        HqlError::NumberFormat { code, text: reported, .. } => {
            assert_eq!(code, HQL0106);
            assert_eq!(reported, text);
        }
        other => panic!("Expected NumberFormat, got: {:?}", other),
    }
}

#[test]
fn test_null_literal_is_untyped() {
    let select = interpret_select(&model(), "select null from Person p");
    assert_eq!(selection(&select, 0).expression_type(), None);
}

proptest! {
    #[test]
    fn prop_integer_literals_round_trip(value in 0i32..i32::MAX) {
        prop_assert_eq!(literal_value(&value.to_string()), LiteralValue::Integer(value));
    }

    #[test]
    fn prop_long_literals_round_trip(value in 0i64..i64::MAX) {
        prop_assert_eq!(literal_value(&format!("{}L", value)), LiteralValue::Long(value));
    }

    #[test]
    fn prop_big_integer_literals_round_trip(value in 0u64..u64::MAX) {
        prop_assert_eq!(
            literal_value(&format!("{}BI", value)),
            LiteralValue::BigInteger(BigInt::from(value))
        );
    }

    #[test]
    fn prop_big_decimal_literals_round_trip(units in 0i64..1_000_000_000, scale in 1u32..6) {
        let expected = Decimal::new(units, scale);
        let text = format!("{}BD", expected);
        prop_assert_eq!(literal_value(&text), LiteralValue::BigDecimal(expected));
    }
}
