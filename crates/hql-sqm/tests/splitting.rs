//! Tests for splitting unmapped polymorphic queries
//!
//! Covers:
//! - One statement per implementor, and per combination of several roots
//! - Copies are independent of each other and of the original
//! - References keep pointing at the copied element they were bound to
//! - Types derived from the split root follow the implementor

mod common;

use common::*;
use hql_model::{ConsumerContext, TypeDescriptor};
use hql_sqm::{Expression, Predicate, QuerySplitter, SelectStatement, split};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn root_types(statement: &SelectStatement) -> Vec<String> {
    statement
        .query_spec
        .from_clause
        .roots()
        .map(|root| root.bound_type().name())
        .collect()
}

#[test]
fn test_split_per_implementor() {
    let select = interpret_select(&model(), "select a from Animal a where a.name = 'x'");
    let statements = split(&select);

    assert_eq!(statements.len(), 2);
    assert_eq!(root_types(&statements[0]), vec!["Cat"]);
    assert_eq!(root_types(&statements[1]), vec!["Dog"]);
    assert_eq!(root_types(&select), vec!["Animal"]);

    for statement in &statements {
        let copied_root = root(statement, 0);
        assert_eq!(copied_root.alias(), "a");
        assert!(!copied_root.is_polymorphic());
        assert!(Arc::ptr_eq(assert_from_element(selection(statement, 0)), copied_root));

        let Predicate::Comparison { left, .. } = where_clause(statement) else {
            panic!("Expected Comparison");
        };
        let source = left
            .as_attribute()
            .and_then(|attribute| attribute.source_element())
            .expect("attribute with a from element source");
        assert!(Arc::ptr_eq(source, copied_root));
    }
}

#[test]
fn test_split_copies_are_independent() {
    let select = interpret_select(&model(), "select a from Animal a");
    let statements = QuerySplitter::split(&select);
    let cat = model()
        .resolve_entity_reference("Cat")
        .expect("Cat is mapped");

    root(&statements[0], 0).add_treated_as(cat);

    assert_eq!(root(&statements[0], 0).treated_as().len(), 1);
    assert!(root(&statements[1], 0).treated_as().is_empty());
    assert!(root(&select, 0).treated_as().is_empty());

    let uids = [
        root(&select, 0).uid(),
        root(&statements[0], 0).uid(),
        root(&statements[1], 0).uid(),
    ];
    assert_ne!(uids[0], uids[1]);
    assert_ne!(uids[1], uids[2]);
    assert_ne!(uids[0], uids[2]);
}

#[test]
fn test_split_preserves_shared_bindings() {
    let select = interpret_select(
        &model(),
        "select m from Animal a, Person p join p.manager m where m.name = 'x'",
    );
    let statements = split(&select);
    assert_eq!(statements.len(), 2);

    for statement in &statements {
        let space = &statement.query_spec.from_clause.spaces[1];
        let join = &space.joins[0].element;
        assert!(Arc::ptr_eq(assert_from_element(selection(statement, 0)), join));
        assert!(Arc::ptr_eq(
            &join.attribute_join().expect("attribute join").source,
            &space.root
        ));
        assert!(!Arc::ptr_eq(join, &select.query_spec.from_clause.spaces[1].joins[0].element));

        let Predicate::Comparison { left, .. } = where_clause(statement) else {
            panic!("Expected Comparison");
        };
        let source = left
            .as_attribute()
            .and_then(|attribute| attribute.source_element())
            .expect("attribute with a from element source");
        assert!(Arc::ptr_eq(source, join));
    }
}

#[test]
fn test_split_of_monomorphic_statement_is_identity() {
    let select = interpret_select(&model(), "select p from Person p join p.pets pet");
    let statements = split(&select);
    assert_eq!(statements.len(), 1);
    assert!(Arc::ptr_eq(&statements[0], &select));
}

#[test]
fn test_split_expands_every_polymorphic_root() {
    let select = interpret_select(&model(), "select a, b from Animal a, Animal b");
    let statements = split(&select);

    let combinations: Vec<_> = statements.iter().map(|s| root_types(s)).collect();
    assert_eq!(
        combinations,
        vec![
            vec!["Cat", "Cat"],
            vec!["Cat", "Dog"],
            vec!["Dog", "Cat"],
            vec!["Dog", "Dog"],
        ]
    );
    for statement in &statements {
        let Expression::FromElement(b) = selection(statement, 1) else {
            panic!("Expected FromElement");
        };
        assert!(Arc::ptr_eq(b, root(statement, 1)));
    }
}

fn type_name(ty: &Option<TypeDescriptor>) -> Option<String> {
    ty.as_ref().map(TypeDescriptor::name)
}

#[test]
fn test_split_retypes_expressions_derived_from_the_root() {
    let select = interpret_select(
        &model(),
        "select a as x, case when a.name = 'x' then a else a end from Animal a \
         where a in (select a from Person p) order by x",
    );
    let statements = split(&select);
    assert_eq!(statements.len(), 2);

    for (statement, implementor) in statements.iter().zip(["Cat", "Dog"]) {
        let expected = Some(implementor.to_string());

        let Expression::SearchedCase(case) = selection(statement, 1) else {
            panic!("Expected SearchedCase, got: {:?}", selection(statement, 1));
        };
        assert_eq!(type_name(&case.result_type), expected);

        let Predicate::InSubQuery { subquery, .. } = where_clause(statement) else {
            panic!("Expected InSubQuery, got: {:?}", where_clause(statement));
        };
        assert_eq!(type_name(&subquery.expression_type), expected);

        let order_by = statement.order_by.as_ref().expect("order by");
        let Expression::SelectionReference(reference) = &order_by.sort_specifications[0].expression
        else {
            panic!("Expected SelectionReference");
        };
        assert_eq!(type_name(&reference.expression_type), expected);
    }

    let Predicate::InSubQuery { subquery, .. } = where_clause(&select) else {
        panic!("Expected InSubQuery");
    };
    assert_eq!(type_name(&subquery.expression_type), Some("Animal".to_string()));
}
