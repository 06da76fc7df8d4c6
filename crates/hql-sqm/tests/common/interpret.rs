//! Interpretation test helpers

use hql_diagnostics::{Diagnostic, HqlError, Result};
use hql_model::ConsumerContext;
use hql_sqm::{Expression, FromElement, Predicate, SelectStatement, SemanticQueryBuilder, Statement};
use std::sync::Arc;

/// Parse and interpret query text
pub fn interpret(consumer: &dyn ConsumerContext, text: &str) -> Result<Statement> {
    let parsed = hql_parser::parse(text)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", text, e));
    SemanticQueryBuilder::new(consumer).build_statement(&parsed)
}

/// Interpret and return the advisories recorded along the way
pub fn interpret_with_diagnostics(
    consumer: &dyn ConsumerContext,
    text: &str,
) -> (Result<Statement>, Vec<Diagnostic>) {
    let parsed = hql_parser::parse(text)
        .unwrap_or_else(|e| panic!("Failed to parse '{}': {}", text, e));
    let mut builder = SemanticQueryBuilder::new(consumer);
    let statement = builder.build_statement(&parsed);
    (statement, builder.take_diagnostics())
}

/// Interpret a select statement and expect success
#[track_caller]
pub fn interpret_select(consumer: &dyn ConsumerContext, text: &str) -> Arc<SelectStatement> {
    match interpret(consumer, text) {
        Ok(Statement::Select(select)) => select,
        Ok(other) => panic!("Expected Select for '{}', got: {:?}", text, other),
        Err(e) => panic!("Failed to interpret '{}': {}", text, e),
    }
}

/// Interpret and expect an error
#[track_caller]
pub fn interpret_err(consumer: &dyn ConsumerContext, text: &str) -> HqlError {
    match interpret(consumer, text) {
        Ok(statement) => panic!("Expected error for '{}', got: {:?}", text, statement),
        Err(e) => e,
    }
}

/// Expression of the n-th selection
#[track_caller]
pub fn selection(select: &SelectStatement, position: usize) -> &Expression {
    &select.query_spec.select_clause.selections[position].expression
}

/// The where clause, which must be present
#[track_caller]
pub fn where_clause(select: &SelectStatement) -> &Predicate {
    select
        .query_spec
        .where_clause
        .as_ref()
        .expect("where clause")
}

/// Root of the n-th from element space
#[track_caller]
pub fn root(select: &SelectStatement, space: usize) -> &Arc<FromElement> {
    &select.query_spec.from_clause.spaces[space].root
}

/// Assert an expression is a from element and return it
#[track_caller]
pub fn assert_from_element(expression: &Expression) -> &Arc<FromElement> {
    match expression {
        Expression::FromElement(element) => element,
        other => panic!("Expected FromElement, got: {:?}", other),
    }
}
