//! HQL/JPQL semantic interpretation for Rust
//!
//! This crate ties the layers together:
//! - Parsing query text into a parse tree
//! - Semantic analysis into a typed, fully resolved query model
//! - Splitting queries over unmapped polymorphic entities
//!
//! Names are resolved through a [`ConsumerContext`]. [`StaticMetamodel`] is an
//! in-memory implementation that can be built in code or loaded from JSON.
//!
//! # Example
//!
//! ```ignore
//! use hql::{StaticMetamodel, interpret, split};
//!
//! let model = StaticMetamodel::from_json_file("model.json")?;
//! let statement = interpret("select a from Animal a where a.name = :name", &model)?;
//! if let Some(select) = statement.as_select() {
//!     for query in split(select) {
//!         // one query per mapped implementor of Animal
//!     }
//! }
//! ```

// Re-export all public APIs from internal crates
pub use hql_diagnostics as diagnostics;
pub use hql_model as model;
pub use hql_parser as parser;
pub use hql_sqm as sqm;
pub use hql_syntax as syntax;

// Convenience re-exports
pub use hql_diagnostics::{Diagnostic, HqlError, Result};
pub use hql_model::{ConsumerContext, StaticMetamodel};
pub use hql_parser::parse;
pub use hql_sqm::{SelectStatement, Statement, split};

/// A semantic statement with the advisories raised while building it
#[derive(Debug, Clone)]
pub struct Interpretation {
    pub statement: Statement,
    /// Warnings for deprecated or non-portable constructs
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse and semantically analyze a query
pub fn interpret(query: &str, consumer: &dyn ConsumerContext) -> Result<Statement> {
    interpret_with_diagnostics(query, consumer).map(|interpretation| interpretation.statement)
}

/// Like [`interpret`], keeping the advisory diagnostics
pub fn interpret_with_diagnostics(
    query: &str,
    consumer: &dyn ConsumerContext,
) -> Result<Interpretation> {
    let parsed = parse(query)?;
    log::debug!("Interpreting: {}", query);

    let mut builder = hql_sqm::SemanticQueryBuilder::new(consumer);
    let statement = builder.build_statement(&parsed)?;
    Ok(Interpretation {
        statement,
        diagnostics: builder.take_diagnostics(),
    })
}
