//! From-clause nodes
//!
//! A `FromElement` is shared: its owning `FromElementSpace` holds one `Arc`,
//! and every expression that references the binding holds another. Downstream
//! consumers rely on that identity, so two references to the same binding are
//! always `Arc::ptr_eq`.

use crate::tree::Predicate;
use hql_model::{AttributeDescriptor, EntityTypeDescriptor, TypeDescriptor};
use hql_syntax::JoinType;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Unique id of a from element within one interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<uid:{}>", self.0)
    }
}

/// An identification variable bound in a FROM clause
#[derive(Debug)]
pub struct FromElement {
    uid: Uid,
    alias: String,
    alias_generated: bool,
    bound_type: TypeDescriptor,
    kind: FromElementKind,
    treated_as: Mutex<Vec<EntityTypeDescriptor>>,
}

#[derive(Debug, Clone)]
pub enum FromElementKind {
    Root,
    CrossJoin,
    EntityJoin { join_type: JoinType },
    AttributeJoin(AttributeJoin),
    /// `treat(root as Sub)`
    TreatedRoot { wrapped: Arc<FromElement> },
    /// `treat(join as Sub)`
    TreatedAttributeJoin { wrapped: Arc<FromElement> },
}

/// Navigation from a source element through one attribute
#[derive(Debug, Clone)]
pub struct AttributeJoin {
    pub source: Arc<FromElement>,
    pub attribute: AttributeDescriptor,
    /// Declared type of the attribute; the collection type for plural attributes
    pub attribute_type: TypeDescriptor,
    pub join_type: JoinType,
    pub fetched: bool,
    pub implicit: bool,
    /// Path text the join was created from, e.g. `p.address`
    pub path: String,
}

impl FromElement {
    pub fn new(
        uid: Uid,
        alias: impl Into<String>,
        alias_generated: bool,
        bound_type: TypeDescriptor,
        kind: FromElementKind,
    ) -> Self {
        Self {
            uid,
            alias: alias.into(),
            alias_generated,
            bound_type,
            kind,
            treated_as: Mutex::new(Vec::new()),
        }
    }

    /// Copy under a new uid with a replacement type and kind; treat-as annotations carry over
    pub fn rebind(&self, uid: Uid, bound_type: TypeDescriptor, kind: FromElementKind) -> Self {
        Self {
            uid,
            alias: self.alias.clone(),
            alias_generated: self.alias_generated,
            bound_type,
            kind,
            treated_as: Mutex::new(self.treated_as()),
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn is_alias_generated(&self) -> bool {
        self.alias_generated
    }

    pub fn bound_type(&self) -> &TypeDescriptor {
        &self.bound_type
    }

    pub fn kind(&self) -> &FromElementKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, FromElementKind::Root)
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self.bound_type, TypeDescriptor::PolymorphicEntity(_))
    }

    pub fn attribute_join(&self) -> Option<&AttributeJoin> {
        match &self.kind {
            FromElementKind::AttributeJoin(join) => Some(join),
            _ => None,
        }
    }

    pub fn is_implicit_join(&self) -> bool {
        self.attribute_join().is_some_and(|join| join.implicit)
    }

    /// Plural attribute joins expose their collection type
    pub fn collection_type(&self) -> Option<&TypeDescriptor> {
        self.attribute_join()
            .map(|join| &join.attribute_type)
            .filter(|ty| ty.is_collection())
    }

    pub fn join_type(&self) -> Option<JoinType> {
        match &self.kind {
            FromElementKind::EntityJoin { join_type } => Some(*join_type),
            FromElementKind::AttributeJoin(join) => Some(join.join_type),
            FromElementKind::CrossJoin => Some(JoinType::Inner),
            _ => None,
        }
    }

    /// The element a treated wrapper stands for, or `self`
    pub fn unwrap_treated(self: &Arc<Self>) -> Arc<FromElement> {
        match &self.kind {
            FromElementKind::TreatedRoot { wrapped }
            | FromElementKind::TreatedAttributeJoin { wrapped } => wrapped.unwrap_treated(),
            _ => Arc::clone(self),
        }
    }

    pub fn add_treated_as(&self, target: EntityTypeDescriptor) {
        let mut treated = self.treated_as.lock();
        if !treated.iter().any(|t| t.name() == target.name()) {
            treated.push(target);
        }
    }

    pub fn treated_as(&self) -> Vec<EntityTypeDescriptor> {
        self.treated_as.lock().clone()
    }
}

impl fmt::Display for FromElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.bound_type, self.alias, self.uid)
    }
}

/// A join inside a from element space with its optional ON/WITH restriction
#[derive(Debug, Clone)]
pub struct Join {
    pub element: Arc<FromElement>,
    pub predicate: Option<Predicate>,
}

/// One root plus the joins hanging off it
#[derive(Debug, Clone)]
pub struct FromElementSpace {
    pub root: Arc<FromElement>,
    pub joins: Vec<Join>,
}

impl FromElementSpace {
    pub fn elements(&self) -> impl Iterator<Item = &Arc<FromElement>> {
        std::iter::once(&self.root).chain(self.joins.iter().map(|join| &join.element))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FromClause {
    pub spaces: Vec<FromElementSpace>,
}

impl FromClause {
    pub fn roots(&self) -> impl Iterator<Item = &Arc<FromElement>> {
        self.spaces.iter().map(|space| &space.root)
    }
}
