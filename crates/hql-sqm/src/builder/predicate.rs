//! Predicate building

use super::SemanticQueryBuilder;
use crate::tree::{AttributeReference, Expression, Predicate};
use hql_diagnostics::{HQL0103, HQL0400, HqlError, Result};
use hql_syntax as syntax;

impl<'a> SemanticQueryBuilder<'a> {
    pub(super) fn build_predicate(&mut self, predicate: &syntax::Predicate) -> Result<Predicate> {
        Ok(match predicate {
            syntax::Predicate::And(left, right) => Predicate::And(
                Box::new(self.build_predicate(left)?),
                Box::new(self.build_predicate(right)?),
            ),
            syntax::Predicate::Or(left, right) => Predicate::Or(
                Box::new(self.build_predicate(left)?),
                Box::new(self.build_predicate(right)?),
            ),
            syntax::Predicate::Not(inner) => {
                Predicate::Negated(Box::new(self.build_predicate(inner)?))
            }
            syntax::Predicate::Grouped(inner) => {
                Predicate::Grouped(Box::new(self.build_predicate(inner)?))
            }
            syntax::Predicate::Comparison {
                operator,
                left,
                right,
            } => Predicate::Comparison {
                left: self.build_expression(left)?,
                operator: *operator,
                right: self.build_expression(right)?,
            },
            syntax::Predicate::Between {
                expression,
                lower,
                upper,
                negated,
            } => Predicate::Between {
                expression: self.build_expression(expression)?,
                lower: self.build_expression(lower)?,
                upper: self.build_expression(upper)?,
                negated: *negated,
            },
            syntax::Predicate::Like {
                expression,
                pattern,
                escape,
                negated,
            } => Predicate::Like {
                matched: self.build_expression(expression)?,
                pattern: self.build_expression(pattern)?,
                escape: escape
                    .as_ref()
                    .map(|escape| self.build_expression(escape))
                    .transpose()?,
                negated: *negated,
            },
            syntax::Predicate::In {
                expression,
                list,
                negated,
            } => self.build_in_predicate(expression, list, *negated)?,
            syntax::Predicate::IsNull {
                expression,
                negated,
            } => Predicate::IsNull {
                expression: self.build_expression(expression)?,
                negated: *negated,
            },
            syntax::Predicate::IsEmpty {
                expression,
                negated,
            } => Predicate::IsEmpty {
                collection: self.build_plural_reference(expression, "IS EMPTY")?,
                negated: *negated,
            },
            syntax::Predicate::MemberOf {
                element,
                collection,
                negated,
            } => Predicate::MemberOf {
                plural_path: self.build_plural_reference(element, "MEMBER OF")?,
                other: self.build_expression(collection)?,
                negated: *negated,
            },
            syntax::Predicate::Exists {
                expression,
                negated,
            } => match expression {
                syntax::Expression::SubQuery(query) => Predicate::Exists {
                    subquery: self.build_subquery(query)?,
                    negated: *negated,
                },
                other => {
                    return Err(HqlError::parsing(
                        HQL0400,
                        format!("Expecting a subquery as EXISTS operand, found {:?}", other),
                    ));
                }
            },
        })
    }

    fn build_in_predicate(
        &mut self,
        expression: &syntax::Expression,
        list: &syntax::InList,
        negated: bool,
    ) -> Result<Predicate> {
        let expression = self.build_expression(expression)?;
        match list {
            syntax::InList::Expressions(items) => Ok(Predicate::InList {
                expression,
                list: items
                    .iter()
                    .map(|item| self.build_expression(item))
                    .collect::<Result<Vec<_>>>()?,
                negated,
            }),
            syntax::InList::SubQuery(subquery) => match subquery.as_ref() {
                syntax::Expression::SubQuery(query) => Ok(Predicate::InSubQuery {
                    expression,
                    subquery: self.build_subquery(query)?,
                    negated,
                }),
                other => Err(HqlError::parsing(
                    HQL0400,
                    format!(
                        "Expecting a subquery on the right-hand side of IN, found {:?}",
                        other
                    ),
                )),
            },
        }
    }

    /// An expression that must resolve to a collection-valued attribute
    fn build_plural_reference(
        &mut self,
        expression: &syntax::Expression,
        operator: &str,
    ) -> Result<AttributeReference> {
        match self.build_expression(expression)? {
            Expression::Attribute(attribute) if attribute.is_plural() => Ok(attribute),
            other => Err(HqlError::semantic(
                HQL0103,
                format!(
                    "{} requires a collection-valued path; found {}",
                    operator,
                    other
                        .expression_type()
                        .map_or_else(|| "an untyped expression".to_string(), |t| t.name())
                ),
            )),
        }
    }
}
