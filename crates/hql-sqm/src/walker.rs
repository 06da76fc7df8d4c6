//! Folding walker over the semantic query model
//!
//! [`SemanticQueryWalker`] has one method per node kind. Each takes a node by
//! value and returns its replacement. The defaults delegate to the `walk_*`
//! functions, which rebuild the node from its folded children, so a walker
//! that overrides nothing is an identity transform. Implementors override the
//! kinds they care about and call the matching `walk_*` function to keep
//! descending.
//!
//! From elements are the one exception: [`SemanticQueryWalker::fold_from_element`]
//! returns the shared element unchanged by default and does not descend into
//! join sources. A walker that copies bindings must keep its own identity map.

use crate::tree::{
    Assignment, AttributeReference, BinaryArithmetic, CollectionFunction, Concatenation,
    DeleteStatement, DynamicInstantiation, Expression, FromClause, FromElement,
    FromElementSpace, FunctionExpression, IndexedReference, InsertSelectStatement,
    InstantiationArgument, Join, Literal, MapEntryReference, OrderByClause, Parameter,
    PathSource, Predicate, QuerySpec, SearchedCase, SearchedCaseWhen, SelectClause,
    SelectStatement, Selection, SimpleCase, SimpleCaseWhen, SortSpecification, Statement,
    SubQueryExpression, UnaryExpression, UpdateStatement,
};
use std::sync::Arc;

pub trait SemanticQueryWalker {
    fn fold_statement(&mut self, statement: Statement) -> Statement {
        walk_statement(self, statement)
    }

    fn fold_select_statement(&mut self, select: SelectStatement) -> SelectStatement {
        walk_select_statement(self, select)
    }

    fn fold_update_statement(&mut self, update: UpdateStatement) -> UpdateStatement {
        walk_update_statement(self, update)
    }

    fn fold_delete_statement(&mut self, delete: DeleteStatement) -> DeleteStatement {
        walk_delete_statement(self, delete)
    }

    fn fold_insert_select_statement(&mut self, insert: InsertSelectStatement) -> InsertSelectStatement {
        walk_insert_select_statement(self, insert)
    }

    fn fold_assignment(&mut self, assignment: Assignment) -> Assignment {
        walk_assignment(self, assignment)
    }

    fn fold_query_spec(&mut self, spec: QuerySpec) -> QuerySpec {
        walk_query_spec(self, spec)
    }

    fn fold_from_clause(&mut self, from: FromClause) -> FromClause {
        walk_from_clause(self, from)
    }

    fn fold_from_element_space(&mut self, space: FromElementSpace) -> FromElementSpace {
        walk_from_element_space(self, space)
    }

    fn fold_join(&mut self, join: Join) -> Join {
        walk_join(self, join)
    }

    fn fold_from_element(&mut self, element: Arc<FromElement>) -> Arc<FromElement> {
        element
    }

    fn fold_select_clause(&mut self, select: SelectClause) -> SelectClause {
        walk_select_clause(self, select)
    }

    fn fold_selection(&mut self, selection: Selection) -> Selection {
        walk_selection(self, selection)
    }

    fn fold_order_by_clause(&mut self, order_by: OrderByClause) -> OrderByClause {
        walk_order_by_clause(self, order_by)
    }

    fn fold_sort_specification(&mut self, sort: SortSpecification) -> SortSpecification {
        walk_sort_specification(self, sort)
    }

    fn fold_predicate(&mut self, predicate: Predicate) -> Predicate {
        walk_predicate(self, predicate)
    }

    fn fold_expression(&mut self, expression: Expression) -> Expression {
        walk_expression(self, expression)
    }

    fn fold_literal(&mut self, literal: Literal) -> Literal {
        literal
    }

    fn fold_parameter(&mut self, parameter: Parameter) -> Parameter {
        parameter
    }

    fn fold_attribute_reference(&mut self, attribute: AttributeReference) -> AttributeReference {
        walk_attribute_reference(self, attribute)
    }

    fn fold_indexed_reference(&mut self, indexed: IndexedReference) -> IndexedReference {
        walk_indexed_reference(self, indexed)
    }

    fn fold_function(&mut self, function: FunctionExpression) -> FunctionExpression {
        walk_function(self, function)
    }

    fn fold_subquery(&mut self, subquery: SubQueryExpression) -> SubQueryExpression {
        walk_subquery(self, subquery)
    }

    fn fold_dynamic_instantiation(
        &mut self,
        instantiation: DynamicInstantiation,
    ) -> DynamicInstantiation {
        walk_dynamic_instantiation(self, instantiation)
    }
}

// === Statements ===

pub fn walk_statement<W>(walker: &mut W, statement: Statement) -> Statement
where
    W: SemanticQueryWalker + ?Sized,
{
    match statement {
        Statement::Select(select) => Statement::Select(Arc::new(
            walker.fold_select_statement(Arc::unwrap_or_clone(select)),
        )),
        Statement::Update(update) => Statement::Update(walker.fold_update_statement(update)),
        Statement::Delete(delete) => Statement::Delete(walker.fold_delete_statement(delete)),
        Statement::InsertSelect(insert) => {
            Statement::InsertSelect(walker.fold_insert_select_statement(insert))
        }
    }
}

pub fn walk_select_statement<W>(walker: &mut W, select: SelectStatement) -> SelectStatement
where
    W: SemanticQueryWalker + ?Sized,
{
    SelectStatement {
        query_spec: walker.fold_query_spec(select.query_spec),
        order_by: select.order_by.map(|o| walker.fold_order_by_clause(o)),
        limit: select.limit.map(|e| walker.fold_expression(e)),
        offset: select.offset.map(|e| walker.fold_expression(e)),
    }
}

pub fn walk_update_statement<W>(walker: &mut W, update: UpdateStatement) -> UpdateStatement
where
    W: SemanticQueryWalker + ?Sized,
{
    UpdateStatement {
        target: walker.fold_from_element_space(update.target),
        assignments: update
            .assignments
            .into_iter()
            .map(|a| walker.fold_assignment(a))
            .collect(),
        where_clause: update.where_clause.map(|p| walker.fold_predicate(p)),
    }
}

pub fn walk_delete_statement<W>(walker: &mut W, delete: DeleteStatement) -> DeleteStatement
where
    W: SemanticQueryWalker + ?Sized,
{
    DeleteStatement {
        target: walker.fold_from_element_space(delete.target),
        where_clause: delete.where_clause.map(|p| walker.fold_predicate(p)),
    }
}

pub fn walk_insert_select_statement<W>(
    walker: &mut W,
    insert: InsertSelectStatement,
) -> InsertSelectStatement
where
    W: SemanticQueryWalker + ?Sized,
{
    InsertSelectStatement {
        target: walker.fold_from_element_space(insert.target),
        state_fields: insert
            .state_fields
            .into_iter()
            .map(|f| walker.fold_attribute_reference(f))
            .collect(),
        select: walker.fold_select_statement(insert.select),
    }
}

pub fn walk_assignment<W>(walker: &mut W, assignment: Assignment) -> Assignment
where
    W: SemanticQueryWalker + ?Sized,
{
    Assignment {
        target_path: walker.fold_attribute_reference(assignment.target_path),
        value: walker.fold_expression(assignment.value),
    }
}

// === Clauses ===

pub fn walk_query_spec<W>(walker: &mut W, spec: QuerySpec) -> QuerySpec
where
    W: SemanticQueryWalker + ?Sized,
{
    // From first: selections and predicates reference its bindings
    let from_clause = walker.fold_from_clause(spec.from_clause);
    QuerySpec {
        from_clause,
        select_clause: walker.fold_select_clause(spec.select_clause),
        where_clause: spec.where_clause.map(|p| walker.fold_predicate(p)),
    }
}

pub fn walk_from_clause<W>(walker: &mut W, from: FromClause) -> FromClause
where
    W: SemanticQueryWalker + ?Sized,
{
    FromClause {
        spaces: from
            .spaces
            .into_iter()
            .map(|s| walker.fold_from_element_space(s))
            .collect(),
    }
}

pub fn walk_from_element_space<W>(walker: &mut W, space: FromElementSpace) -> FromElementSpace
where
    W: SemanticQueryWalker + ?Sized,
{
    FromElementSpace {
        root: walker.fold_from_element(space.root),
        joins: space.joins.into_iter().map(|j| walker.fold_join(j)).collect(),
    }
}

pub fn walk_join<W>(walker: &mut W, join: Join) -> Join
where
    W: SemanticQueryWalker + ?Sized,
{
    Join {
        element: walker.fold_from_element(join.element),
        predicate: join.predicate.map(|p| walker.fold_predicate(p)),
    }
}

pub fn walk_select_clause<W>(walker: &mut W, select: SelectClause) -> SelectClause
where
    W: SemanticQueryWalker + ?Sized,
{
    SelectClause {
        distinct: select.distinct,
        selections: select
            .selections
            .into_iter()
            .map(|s| walker.fold_selection(s))
            .collect(),
    }
}

pub fn walk_selection<W>(walker: &mut W, selection: Selection) -> Selection
where
    W: SemanticQueryWalker + ?Sized,
{
    Selection {
        expression: walker.fold_expression(selection.expression),
        alias: selection.alias,
    }
}

pub fn walk_order_by_clause<W>(walker: &mut W, order_by: OrderByClause) -> OrderByClause
where
    W: SemanticQueryWalker + ?Sized,
{
    OrderByClause {
        sort_specifications: order_by
            .sort_specifications
            .into_iter()
            .map(|s| walker.fold_sort_specification(s))
            .collect(),
    }
}

pub fn walk_sort_specification<W>(walker: &mut W, sort: SortSpecification) -> SortSpecification
where
    W: SemanticQueryWalker + ?Sized,
{
    SortSpecification {
        expression: walker.fold_expression(sort.expression),
        collation: sort.collation,
        order: sort.order,
    }
}

// === Predicates ===

pub fn walk_predicate<W>(walker: &mut W, predicate: Predicate) -> Predicate
where
    W: SemanticQueryWalker + ?Sized,
{
    match predicate {
        Predicate::And(left, right) => Predicate::And(
            Box::new(walker.fold_predicate(*left)),
            Box::new(walker.fold_predicate(*right)),
        ),
        Predicate::Or(left, right) => Predicate::Or(
            Box::new(walker.fold_predicate(*left)),
            Box::new(walker.fold_predicate(*right)),
        ),
        Predicate::Negated(inner) => Predicate::Negated(Box::new(walker.fold_predicate(*inner))),
        Predicate::Grouped(inner) => Predicate::Grouped(Box::new(walker.fold_predicate(*inner))),
        Predicate::Comparison {
            left,
            operator,
            right,
        } => Predicate::Comparison {
            left: walker.fold_expression(left),
            operator,
            right: walker.fold_expression(right),
        },
        Predicate::Between {
            expression,
            lower,
            upper,
            negated,
        } => Predicate::Between {
            expression: walker.fold_expression(expression),
            lower: walker.fold_expression(lower),
            upper: walker.fold_expression(upper),
            negated,
        },
        Predicate::Like {
            matched,
            pattern,
            escape,
            negated,
        } => Predicate::Like {
            matched: walker.fold_expression(matched),
            pattern: walker.fold_expression(pattern),
            escape: escape.map(|e| walker.fold_expression(e)),
            negated,
        },
        Predicate::InList {
            expression,
            list,
            negated,
        } => Predicate::InList {
            expression: walker.fold_expression(expression),
            list: list.into_iter().map(|e| walker.fold_expression(e)).collect(),
            negated,
        },
        Predicate::InSubQuery {
            expression,
            subquery,
            negated,
        } => Predicate::InSubQuery {
            expression: walker.fold_expression(expression),
            subquery: walker.fold_subquery(subquery),
            negated,
        },
        Predicate::IsNull {
            expression,
            negated,
        } => Predicate::IsNull {
            expression: walker.fold_expression(expression),
            negated,
        },
        Predicate::IsEmpty {
            collection,
            negated,
        } => Predicate::IsEmpty {
            collection: walker.fold_attribute_reference(collection),
            negated,
        },
        Predicate::MemberOf {
            plural_path,
            other,
            negated,
        } => Predicate::MemberOf {
            plural_path: walker.fold_attribute_reference(plural_path),
            other: walker.fold_expression(other),
            negated,
        },
        Predicate::Exists { subquery, negated } => Predicate::Exists {
            subquery: walker.fold_subquery(subquery),
            negated,
        },
    }
}

// === Expressions ===

pub fn walk_expression<W>(walker: &mut W, expression: Expression) -> Expression
where
    W: SemanticQueryWalker + ?Sized,
{
    match expression {
        Expression::Literal(literal) => Expression::Literal(walker.fold_literal(literal)),
        Expression::Parameter(parameter) => Expression::Parameter(walker.fold_parameter(parameter)),
        Expression::FromElement(element) => {
            Expression::FromElement(walker.fold_from_element(element))
        }
        Expression::EntityType(entity) => Expression::EntityType(entity),
        Expression::Attribute(attribute) => {
            Expression::Attribute(walker.fold_attribute_reference(attribute))
        }
        Expression::Indexed(indexed) => Expression::Indexed(walker.fold_indexed_reference(indexed)),
        Expression::Constant(constant) => Expression::Constant(constant),
        Expression::MapEntry(entry) => Expression::MapEntry(MapEntryReference {
            function: entry.function,
            join: walker.fold_from_element(entry.join),
            result_type: entry.result_type,
        }),
        Expression::CollectionFunction(function) => {
            Expression::CollectionFunction(CollectionFunction {
                function: function.function,
                argument: Box::new(walker.fold_expression(*function.argument)),
                result_type: function.result_type,
            })
        }
        Expression::Function(function) => Expression::Function(walker.fold_function(function)),
        Expression::Arithmetic(arithmetic) => Expression::Arithmetic(BinaryArithmetic {
            operator: arithmetic.operator,
            left: Box::new(walker.fold_expression(*arithmetic.left)),
            right: Box::new(walker.fold_expression(*arithmetic.right)),
            result_type: arithmetic.result_type,
        }),
        Expression::Concatenation(concat) => Expression::Concatenation(Concatenation {
            left: Box::new(walker.fold_expression(*concat.left)),
            right: Box::new(walker.fold_expression(*concat.right)),
        }),
        Expression::Unary(unary) => Expression::Unary(UnaryExpression {
            operator: unary.operator,
            operand: Box::new(walker.fold_expression(*unary.operand)),
        }),
        Expression::SimpleCase(case) => Expression::SimpleCase(SimpleCase {
            operand: Box::new(walker.fold_expression(*case.operand)),
            whens: case
                .whens
                .into_iter()
                .map(|w| SimpleCaseWhen {
                    value: walker.fold_expression(w.value),
                    result: walker.fold_expression(w.result),
                })
                .collect(),
            otherwise: case.otherwise.map(|e| Box::new(walker.fold_expression(*e))),
            result_type: case.result_type,
        }),
        Expression::SearchedCase(case) => Expression::SearchedCase(SearchedCase {
            whens: case
                .whens
                .into_iter()
                .map(|w| SearchedCaseWhen {
                    condition: walker.fold_predicate(w.condition),
                    result: walker.fold_expression(w.result),
                })
                .collect(),
            otherwise: case.otherwise.map(|e| Box::new(walker.fold_expression(*e))),
            result_type: case.result_type,
        }),
        Expression::SubQuery(subquery) => Expression::SubQuery(walker.fold_subquery(subquery)),
        Expression::SelectionReference(reference) => Expression::SelectionReference(reference),
        Expression::DynamicInstantiation(instantiation) => {
            Expression::DynamicInstantiation(walker.fold_dynamic_instantiation(instantiation))
        }
    }
}

pub fn walk_attribute_reference<W>(walker: &mut W, attribute: AttributeReference) -> AttributeReference
where
    W: SemanticQueryWalker + ?Sized,
{
    let source = match attribute.source {
        PathSource::FromElement(element) => PathSource::FromElement(walker.fold_from_element(element)),
        PathSource::Indexed(indexed) => {
            PathSource::Indexed(Box::new(walker.fold_indexed_reference(*indexed)))
        }
        PathSource::Attribute(parent) => {
            PathSource::Attribute(Box::new(walker.fold_attribute_reference(*parent)))
        }
    };
    AttributeReference {
        source,
        attribute: attribute.attribute,
        attribute_type: attribute.attribute_type,
    }
}

pub fn walk_indexed_reference<W>(walker: &mut W, indexed: IndexedReference) -> IndexedReference
where
    W: SemanticQueryWalker + ?Sized,
{
    IndexedReference {
        collection: walker.fold_attribute_reference(indexed.collection),
        index: Box::new(walker.fold_expression(*indexed.index)),
        element_type: indexed.element_type,
    }
}

pub fn walk_function<W>(walker: &mut W, function: FunctionExpression) -> FunctionExpression
where
    W: SemanticQueryWalker + ?Sized,
{
    FunctionExpression {
        arguments: function
            .arguments
            .into_iter()
            .map(|a| walker.fold_expression(a))
            .collect(),
        ..function
    }
}

pub fn walk_subquery<W>(walker: &mut W, subquery: SubQueryExpression) -> SubQueryExpression
where
    W: SemanticQueryWalker + ?Sized,
{
    SubQueryExpression {
        query: Box::new(walker.fold_select_statement(*subquery.query)),
        expression_type: subquery.expression_type,
    }
}

pub fn walk_dynamic_instantiation<W>(
    walker: &mut W,
    instantiation: DynamicInstantiation,
) -> DynamicInstantiation
where
    W: SemanticQueryWalker + ?Sized,
{
    DynamicInstantiation {
        target: instantiation.target,
        arguments: instantiation
            .arguments
            .into_iter()
            .map(|a| InstantiationArgument {
                expression: walker.fold_expression(a.expression),
                alias: a.alias,
            })
            .collect(),
    }
}
