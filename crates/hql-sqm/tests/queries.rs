//! Tests for building select statements
//!
//! Covers:
//! - Select clauses, implicit selects and dynamic instantiation
//! - Function and collection function typing
//! - Arithmetic promotion, concatenation and case expressions
//! - Predicates over collections and subqueries
//! - Ordering, paging and parameters

mod common;

use common::*;
use hql_diagnostics::{
    HQL0103, HQL0107, HQL0108, HQL0113, HQL0114, HQL0115, HQL0200, HQL0203, HQL0204, HQL0400,
    Severity,
};
use hql_model::{BasicType, TypeDescriptor};
use hql_sqm::{
    CollectionFunctionKind, Expression, InstantiationTarget, Parameter, Predicate, SortOrder,
};
use hql_syntax::ArithmeticOperator;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn basic(basic: BasicType) -> Option<TypeDescriptor> {
    Some(TypeDescriptor::Basic(basic))
}

fn selection_type(text: &str) -> Option<TypeDescriptor> {
    let select = interpret_select(&model(), text);
    selection(&select, 0).expression_type()
}

#[test]
fn test_implicit_select_selects_first_root() {
    let (statement, diagnostics) = interpret_with_diagnostics(&model(), "from Person p, Cat c");
    let select = statement.expect("interprets").as_select().cloned().expect("select");
    assert_eq!(select.query_spec.select_clause.selections.len(), 1);
    let selected = assert_from_element(selection(&select, 0));
    assert_eq!(selected.alias(), "p");

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, HQL0200);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn test_object_and_distinct() {
    let select = interpret_select(&model(), "select distinct object(p) from Person p");
    assert!(select.query_spec.select_clause.distinct);
    assert_eq!(assert_from_element(selection(&select, 0)).alias(), "p");
}

#[test]
fn test_dynamic_instantiation() {
    let select = interpret_select(
        &model(),
        "select new map(p.name as name, new list(p.age, p.salary) as extra) from Person p",
    );
    let Expression::DynamicInstantiation(map) = selection(&select, 0) else {
        panic!("Expected DynamicInstantiation");
    };
    assert!(matches!(map.target, InstantiationTarget::Map));
    assert!(matches!(
        &map.arguments[1].expression,
        Expression::DynamicInstantiation(list) if matches!(list.target, InstantiationTarget::List)
    ));

    let select = interpret_select(&model(), "select new com.acme.PersonDto(p.name) from Person p");
    assert_eq!(
        selection(&select, 0).expression_type(),
        basic(BasicType::Named("com.acme.PersonDto".into()))
    );
}

#[rstest]
#[case("select new map(p.name, p.age) from Person p", HQL0114)]
#[case("select new com.acme.Missing(p.name) from Person p", HQL0108)]
fn test_invalid_dynamic_instantiation(#[case] text: &str, #[case] code: hql_diagnostics::ErrorCode) {
    assert_eq!(interpret_err(&model(), text).code(), code);
}

#[rstest]
#[case("select count(*) from Person p", basic(BasicType::Long))]
#[case("select count(distinct p.name) from Person p", basic(BasicType::Long))]
#[case("select avg(p.age) from Person p", basic(BasicType::Double))]
#[case("select sum(p.age) from Person p", basic(BasicType::Long))]
#[case("select sum(p.salary) from Person p", basic(BasicType::BigDecimal))]
#[case("select max(p.name) from Person p", basic(BasicType::String))]
#[case("select upper(p.name) from Person p", basic(BasicType::String))]
#[case("select length(p.name) from Person p", basic(BasicType::Integer))]
#[case("select current_date from Person p", basic(BasicType::Date))]
#[case("select current_timestamp() from Person p", basic(BasicType::Timestamp))]
#[case("select soundex(p.name) from Person p", None)]
#[case("select function('soundex', p.name) from Person p", None)]
fn test_function_result_types(#[case] text: &str, #[case] expected: Option<TypeDescriptor>) {
    assert_eq!(selection_type(text), expected);
}

#[test]
fn test_non_standard_function_is_passed_through_with_advisory() {
    let (statement, diagnostics) =
        interpret_with_diagnostics(&model(), "select soundex(p.name) from Person p");
    let select = statement.expect("interprets").as_select().cloned().expect("select");
    let Expression::Function(function) = selection(&select, 0) else {
        panic!("Expected Function");
    };
    assert!(!function.standard);
    assert_eq!(function.arguments.len(), 1);
    assert_eq!(diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(), vec![HQL0203]);
}

#[rstest]
#[case("select size(p.pets) from Person p", CollectionFunctionKind::Size, "Integer")]
#[case("select maxelement(p.pets) from Person p", CollectionFunctionKind::MaxElement, "Cat")]
#[case("select maxindex(p.nicknames) from Person p", CollectionFunctionKind::MaxIndex, "String")]
#[case("select minindex(o.items) from Order o", CollectionFunctionKind::MinIndex, "Integer")]
#[case("select index(pet) from Person p join p.pets pet", CollectionFunctionKind::Index, "Integer")]
fn test_collection_functions(
    #[case] text: &str,
    #[case] kind: CollectionFunctionKind,
    #[case] expected: &str,
) {
    let select = interpret_select(&model(), text);
    let Expression::CollectionFunction(function) = selection(&select, 0) else {
        panic!("Expected CollectionFunction, got: {:?}", selection(&select, 0));
    };
    assert_eq!(function.function, kind);
    assert_eq!(function.result_type.as_ref().map(TypeDescriptor::name).as_deref(), Some(expected));
}

#[test]
fn test_deprecated_collection_function_advisory() {
    let (statement, diagnostics) =
        interpret_with_diagnostics(&model(), "select p from Person p where 'x' in elements(p.tags)");
    assert!(statement.is_ok());
    assert_eq!(diagnostics.iter().map(|d| d.code).collect::<Vec<_>>(), vec![HQL0204]);
}

#[rstest]
#[case("select size(p.name) from Person p")]
#[case("select maxindex(p.tags) from Person p")]
#[case("select index(p) from Person p")]
fn test_invalid_collection_function_argument(#[case] text: &str) {
    assert_eq!(interpret_err(&model(), text).code(), HQL0115);
}

#[test]
fn test_arithmetic_keeps_both_operands_and_promotes() {
    let select = interpret_select(&model(), "select p.age - p.salary from Person p");
    let Expression::Arithmetic(arithmetic) = selection(&select, 0) else {
        panic!("Expected Arithmetic");
    };
    assert_eq!(arithmetic.operator, ArithmeticOperator::Subtract);
    assert_eq!(arithmetic.left.as_attribute().map(|a| a.attribute.name.as_str()), Some("age"));
    assert_eq!(arithmetic.right.as_attribute().map(|a| a.attribute.name.as_str()), Some("salary"));
    assert_eq!(arithmetic.result_type, basic(BasicType::BigDecimal));
}

#[test]
fn test_concatenation_keeps_both_operands() {
    let select = interpret_select(&model(), "select p.name || p.address.city from Person p");
    let Expression::Concatenation(concatenation) = selection(&select, 0) else {
        panic!("Expected Concatenation, got: {:?}", selection(&select, 0));
    };
    assert_eq!(concatenation.left.as_attribute().map(|a| a.attribute.name.as_str()), Some("name"));
    assert_eq!(concatenation.right.as_attribute().map(|a| a.attribute.name.as_str()), Some("city"));
}

#[rstest]
#[case("select p.age + 1 from Person p", basic(BasicType::Integer))]
#[case("select p.age * 2L from Person p", basic(BasicType::Long))]
#[case("select p.age / 2.0D from Person p", basic(BasicType::Double))]
#[case("select p.age + :delta from Person p", basic(BasicType::Integer))]
#[case("select -p.age from Person p", basic(BasicType::Integer))]
#[case("select p.name || '!' from Person p", basic(BasicType::String))]
fn test_expression_typing(#[case] text: &str, #[case] expected: Option<TypeDescriptor>) {
    assert_eq!(selection_type(text), expected);
}

#[rstest]
#[case("select case when p.age > 18 then 'adult' else 'minor' end from Person p", basic(BasicType::String))]
#[case("select case when p.age > 18 then null else p.age end from Person p", basic(BasicType::Integer))]
#[case("select case p.age when 1 then 1L else 0L end from Person p", basic(BasicType::Long))]
fn test_case_expression_typing(#[case] text: &str, #[case] expected: Option<TypeDescriptor>) {
    assert_eq!(selection_type(text), expected);
}

#[test]
fn test_member_of_and_is_empty() {
    let select = interpret_select(
        &model(),
        "select p from Person p where p.tags not member of :tags and p.pets is not empty",
    );
    let Predicate::And(left, right) = where_clause(&select) else {
        panic!("Expected And, got: {:?}", where_clause(&select));
    };
    match left.as_ref() {
        Predicate::MemberOf { plural_path, other, negated } => {
            assert_eq!(plural_path.attribute.name, "tags");
            assert!(matches!(other, Expression::Parameter(Parameter::Named(n)) if n == "tags"));
            assert!(*negated);
        }
        other => panic!("Expected MemberOf, got: {:?}", other),
    }
    assert!(matches!(right.as_ref(), Predicate::IsEmpty { negated: true, collection } if collection.attribute.name == "pets"));
}

#[rstest]
#[case("select p from Person p where p.name member of p.tags")]
#[case("select p from Person p where p.manager is empty")]
fn test_collection_predicates_require_plural_path(#[case] text: &str) {
    assert_eq!(interpret_err(&model(), text).code(), HQL0103);
}

#[test]
fn test_in_predicates() {
    let select = interpret_select(
        &model(),
        "select p from Person p where p.age in (1, 2, 3) or p.name in (select c.name from Cat c)",
    );
    let Predicate::Or(list, subquery) = where_clause(&select) else {
        panic!("Expected Or");
    };
    assert!(matches!(list.as_ref(), Predicate::InList { list, .. } if list.len() == 3));
    match subquery.as_ref() {
        Predicate::InSubQuery { subquery, .. } => {
            assert_eq!(subquery.expression_type, basic(BasicType::String));
        }
        other => panic!("Expected InSubQuery, got: {:?}", other),
    }
}

#[test]
fn test_exists_requires_a_subquery() {
    let err = interpret_err(&model(), "select p from Person p where exists p.name");
    assert_eq!(err.code(), HQL0400);
    assert!(!err.is_semantic());
}

#[test]
fn test_order_by() {
    let select = interpret_select(
        &model(),
        "select p.name as n, p.age from Person p order by n desc, p.age, p.salary ascending",
    );
    let order_by = select.order_by.as_ref().expect("order by");
    let specs = &order_by.sort_specifications;
    assert_eq!(specs.len(), 3);

    match &specs[0].expression {
        Expression::SelectionReference(reference) => {
            assert_eq!(reference.alias, "n");
            assert_eq!(reference.position, 0);
            assert_eq!(reference.expression_type, basic(BasicType::String));
        }
        other => panic!("Expected SelectionReference, got: {:?}", other),
    }
    let orders: Vec<_> = specs.iter().map(|s| s.order).collect();
    assert_eq!(
        orders,
        vec![SortOrder::Descending, SortOrder::Ascending, SortOrder::Ascending]
    );
}

#[test]
fn test_unrecognized_sort_ordering() {
    let err = interpret_err(&model(), "select p from Person p order by p.name sideways");
    assert_eq!(err.code(), HQL0107);
    assert!(err.to_string().contains("sideways"));
}

#[test]
fn test_limit_and_offset() {
    let select = interpret_select(&model(), "select p from Person p order by p.age limit 10 offset :start");
    assert!(matches!(select.limit, Some(Expression::Literal(_))));
    assert!(matches!(select.offset, Some(Expression::Parameter(Parameter::Named(ref n))) if n == "start"));
}

#[test]
fn test_parameters() {
    let select = interpret_select(&model(), "select p from Person p where p.age > ?1 and p.name = ?2");
    let Predicate::And(left, _) = where_clause(&select) else {
        panic!("Expected And");
    };
    assert!(matches!(
        left.as_ref(),
        Predicate::Comparison { right: Expression::Parameter(Parameter::Positional(1)), .. }
    ));
}

#[rstest]
#[case("select p from Person p where p.age > ?0")]
#[case("select p from Person p where p.age > ?1 and p.name = :name")]
#[case("select p from Person p where p.name = :name and p.age in (select c.lives from Cat c where c.lives > ?1)")]
fn test_invalid_parameters(#[case] text: &str) {
    assert_eq!(interpret_err(&model(), text).code(), HQL0113);
}
