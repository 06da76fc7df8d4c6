//! JPQL function catalog and result typing
//!
//! Only the JPQL standard functions are typed here. Anything else is passed
//! through untyped for a downstream function registry to resolve.

use hql_model::{BasicType, TypeDescriptor};

/// JPQL standard functions, aggregates included
const STANDARD_FUNCTIONS: &[&str] = &[
    "abs",
    "avg",
    "coalesce",
    "concat",
    "count",
    "current_date",
    "current_time",
    "current_timestamp",
    "index",
    "length",
    "locate",
    "lower",
    "max",
    "min",
    "mod",
    "nullif",
    "size",
    "sqrt",
    "substring",
    "sum",
    "trim",
    "upper",
];

/// Reserved identifiers of JPQL, which strict mode refuses as aliases
const JPQL_RESERVED_WORDS: &[&str] = &[
    "abs", "all", "and", "any", "as", "asc", "avg", "between", "bit_length", "both", "by",
    "case", "char_length", "character_length", "class", "coalesce", "concat", "count",
    "current_date", "current_time", "current_timestamp", "delete", "desc", "distinct", "else",
    "empty", "end", "entry", "escape", "exists", "false", "fetch", "from", "function", "group",
    "having", "in", "index", "inner", "is", "join", "key", "leading", "left", "length", "like",
    "locate", "lower", "max", "member", "min", "mod", "new", "not", "null", "nullif", "object",
    "of", "on", "or", "order", "outer", "position", "select", "set", "size", "some", "sqrt",
    "substring", "sum", "then", "trailing", "treat", "trim", "true", "type", "unknown", "update",
    "upper", "value", "when", "where",
];

/// Date/time functions that may be written without parentheses
pub const NILADIC_FUNCTIONS: &[&str] = &["current_date", "current_time", "current_timestamp"];

pub fn is_standard_function(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    STANDARD_FUNCTIONS.contains(&lower.as_str())
}

pub fn is_reserved_word(identifier: &str) -> bool {
    let lower = identifier.to_ascii_lowercase();
    JPQL_RESERVED_WORDS.contains(&lower.as_str())
}

pub fn is_niladic_function(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    NILADIC_FUNCTIONS.contains(&lower.as_str())
}

fn basic(basic: BasicType) -> Option<TypeDescriptor> {
    Some(TypeDescriptor::Basic(basic))
}

/// Result type of a standard function given its argument types
pub fn function_result_type(
    name: &str,
    arguments: &[Option<TypeDescriptor>],
) -> Option<TypeDescriptor> {
    let first = arguments.first().cloned().flatten();
    match name.to_ascii_lowercase().as_str() {
        "count" => basic(BasicType::Long),
        "avg" | "sqrt" => basic(BasicType::Double),
        "sum" => match first.as_ref().and_then(TypeDescriptor::as_basic) {
            Some(BasicType::Integer) => basic(BasicType::Long),
            Some(BasicType::Float) => basic(BasicType::Double),
            _ => first,
        },
        "min" | "max" | "abs" | "coalesce" | "nullif" => first,
        "concat" | "lower" | "upper" | "trim" | "substring" => basic(BasicType::String),
        "length" | "locate" | "mod" => basic(BasicType::Integer),
        "current_date" => basic(BasicType::Date),
        "current_time" => basic(BasicType::Time),
        "current_timestamp" => basic(BasicType::Timestamp),
        _ => None,
    }
}

/// Numeric promotion of a binary arithmetic operation
pub fn arithmetic_result_type(
    left: Option<TypeDescriptor>,
    right: Option<TypeDescriptor>,
) -> Option<TypeDescriptor> {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(left), Some(right)) => {
            let ranks = (
                left.as_basic().and_then(BasicType::numeric_rank),
                right.as_basic().and_then(BasicType::numeric_rank),
            );
            match ranks {
                (Some(l), Some(r)) if r > l => Some(right),
                _ => Some(left),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ty(basic: BasicType) -> Option<TypeDescriptor> {
        Some(TypeDescriptor::Basic(basic))
    }

    #[rstest]
    #[case("count", vec![ty(BasicType::String)], ty(BasicType::Long))]
    #[case("SUM", vec![ty(BasicType::Integer)], ty(BasicType::Long))]
    #[case("sum", vec![ty(BasicType::Float)], ty(BasicType::Double))]
    #[case("sum", vec![ty(BasicType::BigDecimal)], ty(BasicType::BigDecimal))]
    #[case("avg", vec![ty(BasicType::Integer)], ty(BasicType::Double))]
    #[case("max", vec![ty(BasicType::Date)], ty(BasicType::Date))]
    #[case("upper", vec![None], ty(BasicType::String))]
    #[case("locate", vec![], ty(BasicType::Integer))]
    #[case("current_timestamp", vec![], ty(BasicType::Timestamp))]
    #[case("soundex", vec![ty(BasicType::String)], None)]
    fn test_function_result_types(
        #[case] name: &str,
        #[case] arguments: Vec<Option<TypeDescriptor>>,
        #[case] expected: Option<TypeDescriptor>,
    ) {
        assert_eq!(function_result_type(name, &arguments), expected);
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(
            arithmetic_result_type(ty(BasicType::Integer), ty(BasicType::Double)),
            ty(BasicType::Double)
        );
        assert_eq!(
            arithmetic_result_type(ty(BasicType::Long), ty(BasicType::Integer)),
            ty(BasicType::Long)
        );
        assert_eq!(arithmetic_result_type(None, ty(BasicType::Float)), ty(BasicType::Float));
        assert_eq!(
            arithmetic_result_type(ty(BasicType::Date), ty(BasicType::Integer)),
            ty(BasicType::Date)
        );
    }

    #[test]
    fn test_catalog_lookups_ignore_case() {
        assert!(is_standard_function("Upper"));
        assert!(!is_standard_function("soundex"));
        assert!(is_reserved_word("Order"));
        assert!(!is_reserved_word("customer"));
        assert!(is_niladic_function("CURRENT_DATE"));
    }
}
