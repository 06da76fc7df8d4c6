//! Statements, query specs and their clauses

use crate::tree::{AttributeReference, Expression, FromClause, FromElementSpace, Predicate};
use hql_model::TypeDescriptor;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Statement {
    Select(Arc<SelectStatement>),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    InsertSelect(InsertSelectStatement),
}

impl Statement {
    pub fn as_select(&self) -> Option<&Arc<SelectStatement>> {
        match self {
            Self::Select(select) => Some(select),
            _ => None,
        }
    }
}

/// A query with its ordering and paging; also the body of a subquery
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub query_spec: QuerySpec,
    pub order_by: Option<OrderByClause>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

impl SelectStatement {
    /// Type of the selection at `position`
    pub fn selection_type(&self, position: usize) -> Option<TypeDescriptor> {
        self.query_spec
            .select_clause
            .selections
            .get(position)
            .and_then(|selection| selection.expression.expression_type())
    }
}

#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub from_clause: FromClause,
    pub select_clause: SelectClause,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectClause {
    pub distinct: bool,
    pub selections: Vec<Selection>,
}

/// One select-list item with its optional result variable
#[derive(Debug, Clone)]
pub struct Selection {
    pub expression: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderByClause {
    pub sort_specifications: Vec<SortSpecification>,
}

#[derive(Debug, Clone)]
pub struct SortSpecification {
    pub expression: Expression,
    pub collation: Option<String>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Parse ordering text; `None` when the text is not an ordering
    pub fn interpret(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("asc"),
            Self::Descending => f.write_str("desc"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateStatement {
    pub target: FromElementSpace,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub target_path: AttributeReference,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub struct DeleteStatement {
    pub target: FromElementSpace,
    pub where_clause: Option<Predicate>,
}

#[derive(Debug, Clone)]
pub struct InsertSelectStatement {
    pub target: FromElementSpace,
    pub state_fields: Vec<AttributeReference>,
    pub select: SelectStatement,
}
