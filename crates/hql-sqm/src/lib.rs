//! Semantic query model for HQL/JPQL
//!
//! This crate turns a [`hql_syntax`] parse tree into a typed, fully resolved
//! query model:
//! - [`SemanticQueryBuilder`] drives the single top-down pass
//! - [`AliasRegistry`] scopes identification and result variables
//! - [`FromElementBuilder`] creates roots and joins, deduplicating implicit joins
//! - [`AttributePathResolver`] resolves dotted paths, indexed access and TREAT
//! - [`QuerySplitter`] expands unmapped polymorphic queries
//! - [`SemanticQueryWalker`] folds over the finished model

mod alias_registry;
mod builder;
mod context;
mod from_element_builder;
mod functions;
mod literal;
mod path;
mod splitter;
pub mod tree;
pub mod walker;

pub use alias_registry::{AliasRegistry, ScopeId};
pub use builder::SemanticQueryBuilder;
pub use context::{FromElementSpaceBuilder, IMPLICIT_ALIAS_PREFIX, ParsingContext, SpaceId};
pub use from_element_builder::{AttributeJoinSpec, FromElementBuilder};
pub use functions::{is_reserved_word, is_standard_function};
pub use literal::build_literal;
pub use path::{AttributePathResolver, PathResolver};
pub use splitter::QuerySplitter;
pub use tree::*;
pub use walker::SemanticQueryWalker;

use hql_diagnostics::Result;
use hql_model::ConsumerContext;
use std::sync::Arc;

/// Build the semantic model of a parsed statement
pub fn build(statement: &hql_syntax::Statement, consumer: &dyn ConsumerContext) -> Result<Statement> {
    SemanticQueryBuilder::new(consumer).build_statement(statement)
}

/// Expand a select statement over unmapped polymorphic roots, see [`QuerySplitter`]
pub fn split(statement: &Arc<SelectStatement>) -> Vec<Arc<SelectStatement>> {
    QuerySplitter::split(statement)
}
