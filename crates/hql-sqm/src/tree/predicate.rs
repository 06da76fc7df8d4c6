//! Typed predicate nodes

use crate::tree::{AttributeReference, Expression, SubQueryExpression};
use hql_syntax::ComparisonOperator;

#[derive(Debug, Clone)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Negated(Box<Predicate>),
    Grouped(Box<Predicate>),
    Comparison {
        left: Expression,
        operator: ComparisonOperator,
        right: Expression,
    },
    Between {
        expression: Expression,
        lower: Expression,
        upper: Expression,
        negated: bool,
    },
    Like {
        matched: Expression,
        pattern: Expression,
        escape: Option<Expression>,
        negated: bool,
    },
    InList {
        expression: Expression,
        list: Vec<Expression>,
        negated: bool,
    },
    InSubQuery {
        expression: Expression,
        subquery: SubQueryExpression,
        negated: bool,
    },
    IsNull {
        expression: Expression,
        negated: bool,
    },
    IsEmpty {
        collection: AttributeReference,
        negated: bool,
    },
    /// `plural_path [not] member of other`
    MemberOf {
        plural_path: AttributeReference,
        other: Expression,
        negated: bool,
    },
    Exists {
        subquery: SubQueryExpression,
        negated: bool,
    },
}

impl Predicate {
    pub fn is_negated(&self) -> bool {
        match self {
            Self::Negated(_) => true,
            Self::Between { negated, .. }
            | Self::Like { negated, .. }
            | Self::InList { negated, .. }
            | Self::InSubQuery { negated, .. }
            | Self::IsNull { negated, .. }
            | Self::IsEmpty { negated, .. }
            | Self::MemberOf { negated, .. }
            | Self::Exists { negated, .. } => *negated,
            _ => false,
        }
    }
}
