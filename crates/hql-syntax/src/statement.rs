//! Statement-level parse tree nodes

use crate::{DotIdentifier, EntityRoot, Expression, FromClause, Predicate};

/// A complete parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(QueryExpression),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Insert(InsertStatement),
}

/// A select query at any nesting level, with its ordering and paging
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub spec: QuerySpec,
    pub order_by: Option<OrderByClause>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl QueryExpression {
    pub fn new(spec: QuerySpec) -> Self {
        Self {
            spec,
            order_by: None,
            limit: None,
            offset: None,
        }
    }
}

/// `select … from … where …`
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    /// Absent for HQL's implicit-select form (`from Entity`)
    pub select: Option<SelectClause>,
    pub from: FromClause,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub distinct: bool,
    pub items: Vec<SelectItem>,
}

/// One entry of the select list with its optional result variable
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expression: SelectExpression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectExpression {
    /// `new Target(args…)`
    DynamicInstantiation(DynamicInstantiation),
    /// JPQL `object(alias)`
    Object(String),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicInstantiation {
    pub target: InstantiationTarget,
    pub arguments: Vec<SelectItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstantiationTarget {
    List,
    Map,
    Class(DotIdentifier),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub items: Vec<SortSpecification>,
}

/// One ordering item; `ordering` keeps the raw direction text as written
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpecification {
    pub expression: Expression,
    pub collation: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub target: EntityRoot,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Predicate>,
}

/// `set path = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: DotIdentifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub target: EntityRoot,
    pub where_clause: Option<Predicate>,
}

/// `insert into Target (fields…) select …`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub target: DotIdentifier,
    pub state_fields: Vec<DotIdentifier>,
    pub query: QueryExpression,
}
