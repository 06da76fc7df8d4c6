//! Predicate parse tree nodes

use crate::{ComparisonOperator, Expression};

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Grouped(Box<Predicate>),
    Comparison {
        operator: ComparisonOperator,
        left: Expression,
        right: Expression,
    },
    Between {
        expression: Expression,
        lower: Expression,
        upper: Expression,
        negated: bool,
    },
    Like {
        expression: Expression,
        pattern: Expression,
        escape: Option<Expression>,
        negated: bool,
    },
    In {
        expression: Expression,
        list: InList,
        negated: bool,
    },
    IsNull {
        expression: Expression,
        negated: bool,
    },
    IsEmpty {
        expression: Expression,
        negated: bool,
    },
    MemberOf {
        element: Expression,
        collection: Expression,
        negated: bool,
    },
    Exists {
        expression: Expression,
        negated: bool,
    },
}

impl Predicate {
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Predicate, right: Predicate) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn compare(operator: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Self::Comparison {
            operator,
            left,
            right,
        }
    }
}

/// Right-hand side of `in`
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    /// `(a, b, c)`, a single parameter, or an HQL collection function
    Expressions(Vec<Expression>),
    /// `(select …)`; the expression is expected to be a sub-query
    SubQuery(Box<Expression>),
}
