//! The collaborator contract the semantic analyzer resolves names through

use crate::{ClassHandle, ClassNotFoundError, EntityTypeDescriptor, TypeDescriptor, ValueType};

/// Host-supplied view of the domain model and interpretation settings
///
/// Implementations must be cheap to call; every path segment of a query may
/// trigger a lookup.
pub trait ConsumerContext: Send + Sync {
    /// Resolve an entity name; may yield a polymorphic reference
    fn resolve_entity_reference(&self, name: &str) -> Option<EntityTypeDescriptor>;

    /// Resolve a host class for constant and dynamic-instantiation lookups
    fn class_by_name(&self, name: &str) -> Result<ClassHandle, ClassNotFoundError>;

    /// Whether HQL extensions beyond JPQL are rejected
    fn use_strict_jpa_compliance(&self) -> bool;

    /// Resolve a declared attribute type into a descriptor
    fn resolve_value_type(&self, value_type: &ValueType) -> Option<TypeDescriptor>;
}
