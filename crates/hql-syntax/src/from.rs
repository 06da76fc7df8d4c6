//! FROM clause parse tree nodes

use crate::{DotIdentifier, JoinType, Predicate};

/// Comma-separated from element spaces
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub spaces: Vec<FromElementSpace>,
}

/// One root with the joins attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct FromElementSpace {
    pub root: EntityRoot,
    pub joins: Vec<Join>,
}

/// `EntityName [as] alias`
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRoot {
    pub entity_name: DotIdentifier,
    pub alias: Option<String>,
}

impl EntityRoot {
    pub fn new(entity_name: impl Into<DotIdentifier>, alias: Option<&str>) -> Self {
        Self {
            entity_name: entity_name.into(),
            alias: alias.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    /// `cross join Entity alias`
    Cross(EntityRoot),
    /// `[type] join [fetch] target [alias] [on predicate]`
    Qualified(QualifiedJoin),
    /// JPQL `, in(path) alias`
    Collection(CollectionMemberJoin),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedJoin {
    pub join_type: JoinType,
    pub fetch: bool,
    pub target: JoinTarget,
    pub alias: Option<String>,
    pub predicate: Option<Predicate>,
}

/// What a qualified join navigates to
#[derive(Debug, Clone, PartialEq)]
pub enum JoinTarget {
    /// An attribute path rooted at an alias, or an entity name
    Path(DotIdentifier),
    /// `treat(path as Subtype)`
    Treated {
        path: DotIdentifier,
        target: DotIdentifier,
    },
}

impl JoinTarget {
    pub fn path(&self) -> &DotIdentifier {
        match self {
            Self::Path(path) | Self::Treated { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMemberJoin {
    pub path: DotIdentifier,
    pub alias: Option<String>,
}
