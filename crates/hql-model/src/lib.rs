//! Domain metamodel abstraction
//!
//! This crate provides:
//! - Type descriptors (basic, entity, polymorphic entity, composite, collection)
//! - The `ConsumerContext` trait the semantic analyzer resolves names through
//! - Class handles for constant and enum resolution
//! - `StaticMetamodel`, an in-memory implementation loadable from JSON

pub mod class;
pub mod context;
pub mod descriptor;
pub mod metamodel;

pub use class::*;
pub use context::*;
pub use descriptor::*;
pub use metamodel::*;
