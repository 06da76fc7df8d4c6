//! Host classes exposing named constants
//!
//! Query text may reference `com.acme.Status.ACTIVE` or
//! `com.acme.Limits.MAX_SIZE`. The host supplies the class and its members;
//! nothing here inspects a runtime.

use crate::BasicType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Enum,
}

/// A class the host resolved by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHandle {
    pub name: String,
    pub kind: ClassKind,
    /// Enum constants, in declaration order
    #[serde(default)]
    pub variants: Vec<String>,
    /// Static fields and their types
    #[serde(default)]
    pub constants: IndexMap<String, BasicType>,
}

impl ClassHandle {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            variants: Vec::new(),
            constants: IndexMap::new(),
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: ClassKind::Enum,
            variants: variants.into_iter().map(Into::into).collect(),
            constants: IndexMap::new(),
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value_type: BasicType) -> Self {
        self.constants.insert(name.into(), value_type);
        self
    }

    /// Type of the named member, if the class declares it
    pub fn constant(&self, member: &str) -> Option<BasicType> {
        if self.kind == ClassKind::Enum && self.variants.iter().any(|v| v == member) {
            return Some(BasicType::Named(self.name.clone()));
        }
        self.constants.get(member).cloned()
    }
}

/// Raised by [`ConsumerContext::class_by_name`](crate::ConsumerContext::class_by_name)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Class not found: {name}")]
pub struct ClassNotFoundError {
    pub name: String,
}

impl ClassNotFoundError {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
