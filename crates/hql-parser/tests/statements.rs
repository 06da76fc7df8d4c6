//! Tests for parsing complete statements
//!
//! Covers:
//! - Select clauses (implicit, distinct, dynamic instantiation, object)
//! - From clauses (roots, joins, treat, JPA collection member joins)
//! - Where-clause comparisons
//! - Ordering and paging
//! - Update, delete and insert statements
//! - Syntax error reporting

use hql_diagnostics::HqlError;
use hql_parser::parse;
use hql_syntax::{
    ArithmeticOperator, ComparisonOperator, Expression, InstantiationTarget, Join, JoinTarget,
    JoinType, LiteralKind, Predicate, QueryExpression, SelectExpression, Statement,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

fn parse_select(text: &str) -> QueryExpression {
    match parse(text).unwrap_or_else(|e| panic!("Failed to parse '{}': {}", text, e)) {
        Statement::Select(query) => query,
        other => panic!("Expected Select, got: {:?}", other),
    }
}

#[test]
fn test_implicit_select() {
    let query = parse_select("from Person");
    assert!(query.spec.select.is_none());
    assert_eq!(query.spec.from.spaces.len(), 1);
    assert_eq!(query.spec.from.spaces[0].root.entity_name.to_string(), "Person");
    assert_eq!(query.spec.from.spaces[0].root.alias, None);
}

#[rstest]
#[case("select p from Person p")]
#[case("SELECT p FROM Person AS p")]
#[case("select p from Person as p where p.name = 'x'")]
#[case("  select p from Person p  ")]
fn test_simple_selects(#[case] text: &str) {
    let query = parse_select(text);
    assert_eq!(query.spec.from.spaces[0].root.alias.as_deref(), Some("p"));
    let select = query.spec.select.expect("select clause");
    assert_eq!(select.items.len(), 1);
}

#[test]
fn test_multiple_roots() {
    let query = parse_select("select a from Something a, SomethingElse b");
    let aliases: Vec<_> = query
        .spec
        .from
        .spaces
        .iter()
        .map(|s| s.root.alias.clone())
        .collect();
    assert_eq!(aliases, vec![Some("a".to_string()), Some("b".to_string())]);
}

#[test]
fn test_entity_named_like_a_keyword() {
    let query = parse_select("select o from Order o");
    assert_eq!(query.spec.from.spaces[0].root.entity_name.to_string(), "Order");
}

#[test]
fn test_select_aliases() {
    let query = parse_select("select distinct p.name as n, p.age a2 from Person p");
    let select = query.spec.select.expect("select clause");
    assert!(select.distinct);
    let aliases: Vec<_> = select.items.iter().map(|i| i.alias.clone()).collect();
    assert_eq!(aliases, vec![Some("n".to_string()), Some("a2".to_string())]);
}

#[test]
fn test_nested_dynamic_instantiation() {
    let query =
        parse_select("select new map(p.name as name, new list(p.age, p.id) as extra) from Person p");
    let select = query.spec.select.expect("select clause");
    match &select.items[0].expression {
        SelectExpression::DynamicInstantiation(outer) => {
            assert_eq!(outer.target, InstantiationTarget::Map);
            assert_eq!(outer.arguments.len(), 2);
            match &outer.arguments[1].expression {
                SelectExpression::DynamicInstantiation(inner) => {
                    assert_eq!(inner.target, InstantiationTarget::List);
                    assert_eq!(inner.arguments.len(), 2);
                }
                other => panic!("Expected nested instantiation, got: {:?}", other),
            }
        }
        other => panic!("Expected DynamicInstantiation, got: {:?}", other),
    }
}

#[test]
fn test_class_instantiation_and_object() {
    let query = parse_select("select new com.acme.PersonDto(p.name) from Person p");
    let select = query.spec.select.expect("select clause");
    assert!(matches!(
        &select.items[0].expression,
        SelectExpression::DynamicInstantiation(d)
            if matches!(&d.target, InstantiationTarget::Class(name) if name.to_string() == "com.acme.PersonDto")
    ));

    let query = parse_select("select object(p) from Person p");
    let select = query.spec.select.expect("select clause");
    assert_eq!(select.items[0].expression, SelectExpression::Object("p".into()));
}

#[test]
fn test_qualified_joins() {
    let query = parse_select(
        "select p from Person p left outer join fetch p.addresses a inner join p.manager m with m.age > 3 join treat(p.pets as Dog) d",
    );
    let joins = &query.spec.from.spaces[0].joins;
    assert_eq!(joins.len(), 3);

    match &joins[0] {
        Join::Qualified(join) => {
            assert_eq!(join.join_type, JoinType::Left);
            assert!(join.fetch);
            assert_eq!(join.alias.as_deref(), Some("a"));
        }
        other => panic!("Expected Qualified join, got: {:?}", other),
    }
    match &joins[1] {
        Join::Qualified(join) => {
            assert_eq!(join.join_type, JoinType::Inner);
            assert!(join.predicate.is_some());
        }
        other => panic!("Expected Qualified join, got: {:?}", other),
    }
    match &joins[2] {
        Join::Qualified(join) => match &join.target {
            JoinTarget::Treated { path, target } => {
                assert_eq!(path.to_string(), "p.pets");
                assert_eq!(target.to_string(), "Dog");
            }
            other => panic!("Expected Treated target, got: {:?}", other),
        },
        other => panic!("Expected Qualified join, got: {:?}", other),
    }
}

#[test]
fn test_cross_and_collection_member_joins() {
    let query = parse_select("select p from Person p cross join Address a, in(p.pets) pet");
    let joins = &query.spec.from.spaces[0].joins;
    assert!(matches!(&joins[0], Join::Cross(root) if root.alias.as_deref() == Some("a")));
    assert!(matches!(&joins[1], Join::Collection(j) if j.alias.as_deref() == Some("pet")));
}

#[test]
fn test_order_by_keeps_raw_ordering_text() {
    let query = parse_select(
        "select p from Person p order by p.name collate nocase descending, p.age sideways, p.id",
    );
    let items = query.order_by.expect("order by").items;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].collation.as_deref(), Some("nocase"));
    assert_eq!(items[0].ordering.as_deref(), Some("descending"));
    assert_eq!(items[1].ordering.as_deref(), Some("sideways"));
    assert_eq!(items[2].ordering, None);
}

#[test]
fn test_limit_offset() {
    let query = parse_select("select p from Person p order by p.id limit 10 offset :start");
    assert!(matches!(query.limit, Some(Expression::Literal(ref l)) if l.kind == LiteralKind::Integer));
    assert!(matches!(query.offset, Some(Expression::Parameter(_))));
}

#[test]
fn test_comparison_right_operand_is_full_expression() {
    let query = parse_select("select p from Person p where p.age >= p.minimum + 1");
    assert_eq!(
        query.spec.where_clause,
        Some(Predicate::compare(
            ComparisonOperator::GreaterThanOrEqual,
            Expression::path("p.age"),
            Expression::arithmetic(
                ArithmeticOperator::Add,
                Expression::path("p.minimum"),
                Expression::literal(LiteralKind::Integer, "1"),
            ),
        ))
    );
}

#[test]
fn test_update_statement() {
    match parse("update Person p set p.name = 'x', p.age = p.age + 1 where p.id = ?1") {
        Ok(Statement::Update(update)) => {
            assert_eq!(update.target.alias.as_deref(), Some("p"));
            assert_eq!(update.assignments.len(), 2);
            assert!(update.where_clause.is_some());
        }
        other => panic!("Expected Update, got: {:?}", other),
    }
}

#[test]
fn test_delete_statement() {
    match parse("delete from Person p where p.age < 18") {
        Ok(Statement::Delete(delete)) => {
            assert_eq!(delete.target.entity_name.to_string(), "Person");
            assert!(delete.where_clause.is_some());
        }
        other => panic!("Expected Delete, got: {:?}", other),
    }
}

#[test]
fn test_insert_statement() {
    match parse("insert into Archive (name, age) select p.name, p.age from Person p") {
        Ok(Statement::Insert(insert)) => {
            assert_eq!(insert.target.to_string(), "Archive");
            assert_eq!(insert.state_fields.len(), 2);
            assert!(insert.query.spec.select.is_some());
        }
        other => panic!("Expected Insert, got: {:?}", other),
    }
}

#[rstest]
#[case("select p from")]
#[case("select p from Person p where")]
#[case("select p from Person p where p.name = 'open")]
#[case("select p from Person p )")]
fn test_syntax_errors(#[case] text: &str) {
    match parse(text) {
        Err(HqlError::Syntax { location, query, .. }) => {
            assert_eq!(query, text);
            assert!(location.is_some());
        }
        other => panic!("Expected Syntax error, got: {:?}", other),
    }
}

#[test]
fn test_syntax_error_location_points_at_leftover() {
    let err = parse("select p from Person p )").expect_err("trailing paren");
    let location = err.location().expect("location");
    assert_eq!(location.column, 24);
}

fn literal_kind(text: &str) -> LiteralKind {
    match hql_parser::parse_expression(text) {
        Ok(Expression::Literal(lit)) => {
            assert_eq!(lit.text, text);
            lit.kind
        }
        other => panic!("Expected literal for '{}', got: {:?}", text, other),
    }
}

proptest! {
    #[test]
    fn prop_integer_suffixes_select_kind(value in 1u64..u64::MAX / 2) {
        prop_assert_eq!(literal_kind(&value.to_string()), LiteralKind::Integer);
        prop_assert_eq!(literal_kind(&format!("{}L", value)), LiteralKind::Long);
        prop_assert_eq!(literal_kind(&format!("{}BI", value)), LiteralKind::BigInteger);
    }

    #[test]
    fn prop_decimal_suffixes_select_kind(whole in 0u32..100_000, fraction in 0u32..1000) {
        let base = format!("{}.{}", whole, fraction);
        prop_assert_eq!(literal_kind(&base), LiteralKind::Float);
        prop_assert_eq!(literal_kind(&format!("{}F", base)), LiteralKind::Float);
        prop_assert_eq!(literal_kind(&format!("{}D", base)), LiteralKind::Double);
        prop_assert_eq!(literal_kind(&format!("{}BD", base)), LiteralKind::BigDecimal);
    }
}
