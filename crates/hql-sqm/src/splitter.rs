//! Expansion of unmapped polymorphic queries
//!
//! `from Animal a`, where `Animal` names several mapped entities and maps none
//! itself, is split into one statement per implementor. Each copy is produced
//! by a [`SemanticQueryWalker`] that rebinds every from element exactly once
//! and hands out the same copy for every later reference to it, so bindings
//! shared in the original stay shared in the copy.

use crate::functions::{arithmetic_result_type, function_result_type};
use crate::tree::{
    AttributeJoin, Expression, FromElement, FromElementKind, SelectStatement, SubQueryExpression,
    Uid,
};
use crate::walker::{SemanticQueryWalker, walk_expression, walk_select_statement, walk_subquery};
use hql_model::{EntityDescriptor, PolymorphicEntityDescriptor, TypeDescriptor};
use std::collections::HashMap;
use std::sync::Arc;

pub struct QuerySplitter;

impl QuerySplitter {
    /// One statement per implementor combination of the polymorphic roots
    ///
    /// A statement without polymorphic roots is returned as is, not copied.
    pub fn split(statement: &Arc<SelectStatement>) -> Vec<Arc<SelectStatement>> {
        let Some((root, polymorphic)) = first_polymorphic_root(statement) else {
            return vec![Arc::clone(statement)];
        };
        log::debug!(
            "Splitting query over {} into {} implementors",
            root,
            polymorphic.implementors.len()
        );

        let mut next_uid = max_uid(statement) + 1;
        let mut statements = Vec::with_capacity(polymorphic.implementors.len());
        for implementor in &polymorphic.implementors {
            let mut copier = StatementCopier {
                target: root.uid(),
                implementor: Arc::clone(implementor),
                identity: HashMap::new(),
                next_uid,
            };
            let copy = Arc::new(copier.fold_select_statement(SelectStatement::clone(statement)));
            next_uid = copier.next_uid;
            statements.extend(Self::split(&copy));
        }
        statements
    }
}

fn first_polymorphic_root(
    statement: &SelectStatement,
) -> Option<(Arc<FromElement>, Arc<PolymorphicEntityDescriptor>)> {
    statement
        .query_spec
        .from_clause
        .roots()
        .find_map(|root| match root.bound_type() {
            TypeDescriptor::PolymorphicEntity(polymorphic) => {
                Some((Arc::clone(root), Arc::clone(polymorphic)))
            }
            _ => None,
        })
}

fn max_uid(statement: &SelectStatement) -> u64 {
    let mut collector = MaxUid::default();
    collector.fold_select_statement(statement.clone());
    collector.max
}

/// Highest unique id reachable from a statement
#[derive(Default)]
struct MaxUid {
    max: u64,
}

impl MaxUid {
    fn observe(&mut self, element: &FromElement) {
        self.max = self.max.max(element.uid().value());
        match element.kind() {
            FromElementKind::AttributeJoin(join) => self.observe(&join.source),
            FromElementKind::TreatedRoot { wrapped }
            | FromElementKind::TreatedAttributeJoin { wrapped } => self.observe(wrapped),
            FromElementKind::Root | FromElementKind::CrossJoin | FromElementKind::EntityJoin { .. } => {}
        }
    }
}

impl SemanticQueryWalker for MaxUid {
    fn fold_from_element(&mut self, element: Arc<FromElement>) -> Arc<FromElement> {
        self.observe(&element);
        element
    }
}

/// Copies a statement, binding the target root to one implementor
struct StatementCopier {
    target: Uid,
    implementor: Arc<EntityDescriptor>,
    /// Original unique id to copied element
    identity: HashMap<Uid, Arc<FromElement>>,
    next_uid: u64,
}

impl StatementCopier {
    fn fresh_uid(&mut self) -> Uid {
        let uid = Uid::new(self.next_uid);
        self.next_uid += 1;
        uid
    }
}

impl SemanticQueryWalker for StatementCopier {
    fn fold_from_element(&mut self, element: Arc<FromElement>) -> Arc<FromElement> {
        if let Some(copy) = self.identity.get(&element.uid()) {
            return Arc::clone(copy);
        }

        let kind = match element.kind() {
            FromElementKind::AttributeJoin(join) => FromElementKind::AttributeJoin(AttributeJoin {
                source: self.fold_from_element(Arc::clone(&join.source)),
                ..join.clone()
            }),
            FromElementKind::TreatedRoot { wrapped } => FromElementKind::TreatedRoot {
                wrapped: self.fold_from_element(Arc::clone(wrapped)),
            },
            FromElementKind::TreatedAttributeJoin { wrapped } => {
                FromElementKind::TreatedAttributeJoin {
                    wrapped: self.fold_from_element(Arc::clone(wrapped)),
                }
            }
            other => other.clone(),
        };
        let bound_type = if element.uid() == self.target {
            TypeDescriptor::Entity(Arc::clone(&self.implementor))
        } else {
            element.bound_type().clone()
        };

        let copy = Arc::new(element.rebind(self.fresh_uid(), bound_type, kind));
        log::trace!("Copied {} as {}", element, copy);
        self.identity.insert(element.uid(), Arc::clone(&copy));
        copy
    }

    // Types derived from a rebound element are derived again from the copy

    fn fold_select_statement(&mut self, select: SelectStatement) -> SelectStatement {
        let mut copy = walk_select_statement(self, select);
        if let Some(order_by) = copy.order_by.as_mut() {
            for sort in &mut order_by.sort_specifications {
                if let Expression::SelectionReference(reference) = &mut sort.expression {
                    reference.expression_type = copy
                        .query_spec
                        .select_clause
                        .selections
                        .get(reference.position)
                        .and_then(|selection| selection.expression.expression_type());
                }
            }
        }
        copy
    }

    fn fold_subquery(&mut self, subquery: SubQueryExpression) -> SubQueryExpression {
        let mut copy = walk_subquery(self, subquery);
        copy.expression_type = copy.query.selection_type(0);
        copy
    }

    fn fold_expression(&mut self, expression: Expression) -> Expression {
        match walk_expression(self, expression) {
            Expression::Arithmetic(mut arithmetic) => {
                arithmetic.result_type = arithmetic_result_type(
                    arithmetic.left.expression_type(),
                    arithmetic.right.expression_type(),
                );
                Expression::Arithmetic(arithmetic)
            }
            Expression::Function(mut function) if function.standard => {
                let types: Vec<_> = function
                    .arguments
                    .iter()
                    .map(Expression::expression_type)
                    .collect();
                function.result_type = function_result_type(&function.name, &types);
                Expression::Function(function)
            }
            Expression::SimpleCase(mut case) => {
                case.result_type = case.first_result_type();
                Expression::SimpleCase(case)
            }
            Expression::SearchedCase(mut case) => {
                case.result_type = case.first_result_type();
                Expression::SearchedCase(case)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{FromClause, FromElementSpace, QuerySpec, SelectClause, Selection};
    use hql_model::EntityDescriptor;

    fn statement(root: Arc<FromElement>) -> SelectStatement {
        SelectStatement {
            query_spec: QuerySpec {
                from_clause: FromClause {
                    spaces: vec![FromElementSpace {
                        root: Arc::clone(&root),
                        joins: Vec::new(),
                    }],
                },
                select_clause: SelectClause {
                    distinct: false,
                    selections: vec![Selection {
                        expression: Expression::FromElement(root),
                        alias: None,
                    }],
                },
                where_clause: None,
            },
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn test_max_uid_sees_every_element() {
        let root = Arc::new(FromElement::new(
            Uid::new(7),
            "t",
            false,
            TypeDescriptor::Entity(Arc::new(EntityDescriptor::new("Thing"))),
            FromElementKind::Root,
        ));
        assert_eq!(max_uid(&statement(root)), 7);
    }

    #[test]
    fn test_copy_reuses_copied_binding() {
        let cat = Arc::new(EntityDescriptor::new("Cat"));
        let animal = Arc::new(PolymorphicEntityDescriptor {
            name: "Animal".into(),
            implementors: vec![Arc::clone(&cat)],
        });
        let root = Arc::new(FromElement::new(
            Uid::new(0),
            "a",
            false,
            TypeDescriptor::PolymorphicEntity(Arc::clone(&animal)),
            FromElementKind::Root,
        ));
        let mut copier = StatementCopier {
            target: root.uid(),
            implementor: cat,
            identity: HashMap::new(),
            next_uid: 1,
        };
        let copy = copier.fold_select_statement(statement(root));

        let copied_root = &copy.query_spec.from_clause.spaces[0].root;
        assert_eq!(copied_root.uid(), Uid::new(1));
        assert_eq!(copied_root.bound_type().name(), "Cat");
        let Expression::FromElement(selected) = &copy.query_spec.select_clause.selections[0].expression
        else {
            panic!("expected a from element selection");
        };
        assert!(Arc::ptr_eq(selected, copied_root));
    }
}
