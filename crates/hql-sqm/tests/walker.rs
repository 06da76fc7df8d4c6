//! Tests for the semantic query walker
//!
//! Covers:
//! - A walker that overrides nothing is an identity transform
//! - Overridden folds see every node of their kind, subqueries included
//! - Leaf folds can replace nodes

mod common;

use common::*;
use hql_sqm::{
    AttributeReference, Expression, Parameter, Predicate, SemanticQueryWalker, Statement,
    walker::walk_attribute_reference,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Identity;

impl SemanticQueryWalker for Identity {}

#[derive(Default)]
struct AttributeCollector {
    names: Vec<String>,
}

impl SemanticQueryWalker for AttributeCollector {
    fn fold_attribute_reference(&mut self, attribute: AttributeReference) -> AttributeReference {
        self.names.push(attribute.attribute.name.clone());
        walk_attribute_reference(self, attribute)
    }
}

/// Rewrites named parameters as positional ones, in order of appearance
#[derive(Default)]
struct PositionalParameters {
    next: u32,
}

impl SemanticQueryWalker for PositionalParameters {
    fn fold_parameter(&mut self, parameter: Parameter) -> Parameter {
        match parameter {
            Parameter::Named(_) => {
                self.next += 1;
                Parameter::Positional(self.next)
            }
            positional => positional,
        }
    }
}

const QUERY: &str = "select p.name, upper(p.address.city) from Person p join p.pets pet \
     where pet.lives > 3 and exists (select c from Cat c where c.name = p.name)";

#[test]
fn test_identity_walker_preserves_bindings() {
    let select = interpret_select(&model(), QUERY);
    let folded = Identity.fold_select_statement(select.as_ref().clone());

    let original_space = &select.query_spec.from_clause.spaces[0];
    let folded_space = &folded.query_spec.from_clause.spaces[0];
    assert!(Arc::ptr_eq(&original_space.root, &folded_space.root));
    assert_eq!(original_space.joins.len(), folded_space.joins.len());
    for (original, folded) in original_space.joins.iter().zip(&folded_space.joins) {
        assert!(Arc::ptr_eq(&original.element, &folded.element));
    }
    assert_eq!(format!("{:?}", folded), format!("{:?}", select.as_ref()));
}

#[test]
fn test_identity_walker_over_statement() {
    let statement = interpret(&model(), "delete from Person p where p.age < 18").expect("interprets");
    let folded = Identity.fold_statement(statement.clone());
    assert!(matches!(folded, Statement::Delete(_)));
    assert_eq!(format!("{:?}", folded), format!("{:?}", statement));
}

#[test]
fn test_collector_visits_subqueries() {
    let select = interpret_select(&model(), QUERY);
    let mut collector = AttributeCollector::default();
    collector.fold_select_statement(select.as_ref().clone());

    let mut names = collector.names;
    names.sort();
    assert_eq!(names, vec!["city", "lives", "name", "name", "name"]);
}

#[test]
fn test_leaf_fold_replaces_parameters() {
    let select = interpret_select(
        &model(),
        "select p from Person p where p.name = :name or p.age > :age",
    );
    let folded = PositionalParameters::default().fold_select_statement(select.as_ref().clone());

    let Some(Predicate::Or(left, right)) = &folded.query_spec.where_clause else {
        panic!("Expected Or");
    };
    for (predicate, position) in [(left, 1), (right, 2)] {
        match predicate.as_ref() {
            Predicate::Comparison { right, .. } => assert!(matches!(
                right,
                Expression::Parameter(Parameter::Positional(p)) if *p == position
            )),
            other => panic!("Expected Comparison, got: {:?}", other),
        }
    }
}
