//! The semantic query model
//!
//! Nodes are immutable once built and carry their inferred types. From
//! elements are shared through `Arc`, see [`FromElement`].

mod expression;
mod from;
mod predicate;
mod statement;

pub use expression::*;
pub use from::*;
pub use predicate::*;
pub use statement::*;
