//! HQL/JPQL parse tree definitions
//!
//! This crate defines the syntax tree handed from the grammar to the semantic
//! analyzer. Nodes mirror the grammar productions and carry no type
//! information; paths and names are kept as written.

mod expression;
mod from;
mod operator;
mod predicate;
mod statement;

pub use expression::*;
pub use from::*;
pub use operator::*;
pub use predicate::*;
pub use statement::*;

use smallvec::SmallVec;
use std::fmt;

/// A dot-separated identifier sequence (`a.address.city`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DotIdentifier {
    parts: SmallVec<[String; 4]>,
}

impl DotIdentifier {
    /// Create from already split parts
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a dotted name
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.'))
    }

    /// All parts in order
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The leading part
    pub fn first(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or_default()
    }

    /// The trailing part
    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True for a single identifier with no dots
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

impl fmt::Display for DotIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

impl From<&str> for DotIdentifier {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
