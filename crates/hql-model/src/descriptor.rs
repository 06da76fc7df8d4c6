//! Type descriptors for the domain metamodel
//!
//! Attributes name their types (`ValueType`) rather than embedding them, so
//! cyclic entity graphs (`Person.manager: Person`) stay representable. A
//! [`ConsumerContext`](crate::ConsumerContext) turns a `ValueType` into a
//! resolved [`TypeDescriptor`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Scalar types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicType {
    String,
    Character,
    Boolean,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Date,
    Time,
    Timestamp,
    /// Any other scalar, named by the host (enums, custom value types)
    Named(String),
}

impl BasicType {
    /// Numeric promotion rank; `None` for non-numeric types
    pub const fn numeric_rank(&self) -> Option<u8> {
        match self {
            Self::Integer => Some(1),
            Self::Long => Some(2),
            Self::BigInteger => Some(3),
            Self::BigDecimal => Some(4),
            Self::Float => Some(5),
            Self::Double => Some(6),
            _ => None,
        }
    }

    pub const fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Character => f.write_str("Character"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Integer => f.write_str("Integer"),
            Self::Long => f.write_str("Long"),
            Self::BigInteger => f.write_str("BigInteger"),
            Self::Float => f.write_str("Float"),
            Self::Double => f.write_str("Double"),
            Self::BigDecimal => f.write_str("BigDecimal"),
            Self::Date => f.write_str("Date"),
            Self::Time => f.write_str("Time"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Bag,
    Set,
    List,
    Map,
}

/// Declared type of an attribute; managed types are referenced by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Basic(BasicType),
    Entity(String),
    Composite(String),
    Collection(CollectionType),
}

impl ValueType {
    pub fn basic(basic: BasicType) -> Self {
        Self::Basic(basic)
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::Entity(name.into())
    }

    pub fn composite(name: impl Into<String>) -> Self {
        Self::Composite(name.into())
    }

    pub fn bag(element: ValueType) -> Self {
        Self::collection(CollectionKind::Bag, None, element)
    }

    pub fn set(element: ValueType) -> Self {
        Self::collection(CollectionKind::Set, None, element)
    }

    /// Lists are indexed by position
    pub fn list(element: ValueType) -> Self {
        Self::collection(
            CollectionKind::List,
            Some(ValueType::Basic(BasicType::Integer)),
            element,
        )
    }

    pub fn map(key: ValueType, element: ValueType) -> Self {
        Self::collection(CollectionKind::Map, Some(key), element)
    }

    fn collection(kind: CollectionKind, index: Option<ValueType>, element: ValueType) -> Self {
        Self::Collection(CollectionType {
            kind,
            index: index.map(Box::new),
            element: Box::new(element),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionType {
    pub kind: CollectionKind,
    #[serde(default)]
    pub index: Option<Box<ValueType>>,
    pub element: Box<ValueType>,
}

/// A named attribute of a managed type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeDescriptor {
    pub name: String,
    pub value_type: ValueType,
}

impl AttributeDescriptor {
    pub fn is_plural(&self) -> bool {
        matches!(self.value_type, ValueType::Collection(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub name: String,
    #[serde(default)]
    pub attributes: IndexMap<String, ValueType>,
}

impl EntityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.attributes.insert(name.into(), value_type);
        self
    }

    pub fn attribute_descriptor(&self, name: &str) -> Option<AttributeDescriptor> {
        self.attributes.get(name).map(|value_type| AttributeDescriptor {
            name: name.to_string(),
            value_type: value_type.clone(),
        })
    }
}

/// Embeddable value type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDescriptor {
    pub name: String,
    #[serde(default)]
    pub attributes: IndexMap<String, ValueType>,
}

impl CompositeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        self.attributes.insert(name.into(), value_type);
        self
    }
}

/// A name implemented by several mapped entities and mapped by none itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymorphicEntityDescriptor {
    pub name: String,
    pub implementors: Vec<Arc<EntityDescriptor>>,
}

impl PolymorphicEntityDescriptor {
    /// Attributes declared with the same type by every implementor
    pub fn attribute_descriptor(&self, name: &str) -> Option<AttributeDescriptor> {
        let (first, rest) = self.implementors.split_first()?;
        let candidate = first.attribute_descriptor(name)?;
        rest.iter()
            .all(|entity| entity.attributes.get(name) == Some(&candidate.value_type))
            .then_some(candidate)
    }
}

/// Resolved collection type
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDescriptor {
    pub kind: CollectionKind,
    pub index: Option<TypeDescriptor>,
    pub element: TypeDescriptor,
}

/// A fully resolved type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Basic(BasicType),
    Entity(Arc<EntityDescriptor>),
    PolymorphicEntity(Arc<PolymorphicEntityDescriptor>),
    Composite(Arc<CompositeDescriptor>),
    Collection(Arc<CollectionDescriptor>),
}

impl TypeDescriptor {
    pub fn attribute_descriptor(&self, name: &str) -> Option<AttributeDescriptor> {
        match self {
            Self::Entity(entity) => entity.attribute_descriptor(name),
            Self::PolymorphicEntity(poly) => poly.attribute_descriptor(name),
            Self::Composite(composite) => {
                composite
                    .attributes
                    .get(name)
                    .map(|value_type| AttributeDescriptor {
                        name: name.to_string(),
                        value_type: value_type.clone(),
                    })
            }
            Self::Basic(_) | Self::Collection(_) => None,
        }
    }

    /// Index type of a collection (list position or map key)
    pub fn index_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Collection(collection) => collection.index.as_ref(),
            _ => None,
        }
    }

    /// Element type of a collection
    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Collection(collection) => Some(&collection.element),
            _ => None,
        }
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            Self::Collection(collection) => Some(collection.kind),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    pub fn is_basic(&self) -> bool {
        matches!(self, Self::Basic(_))
    }

    pub fn as_basic(&self) -> Option<&BasicType> {
        match self {
            Self::Basic(basic) => Some(basic),
            _ => None,
        }
    }

    /// Display name used in messages
    pub fn name(&self) -> String {
        match self {
            Self::Basic(basic) => basic.to_string(),
            Self::Entity(entity) => entity.name.clone(),
            Self::PolymorphicEntity(poly) => poly.name.clone(),
            Self::Composite(composite) => composite.name.clone(),
            Self::Collection(collection) => {
                format!("{:?}<{}>", collection.kind, collection.element.name())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// What an entity name resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum EntityTypeDescriptor {
    Entity(Arc<EntityDescriptor>),
    Polymorphic(Arc<PolymorphicEntityDescriptor>),
}

impl EntityTypeDescriptor {
    pub fn name(&self) -> &str {
        match self {
            Self::Entity(entity) => &entity.name,
            Self::Polymorphic(poly) => &poly.name,
        }
    }

    pub fn is_polymorphic(&self) -> bool {
        matches!(self, Self::Polymorphic(_))
    }

    pub fn to_type(&self) -> TypeDescriptor {
        match self {
            Self::Entity(entity) => TypeDescriptor::Entity(Arc::clone(entity)),
            Self::Polymorphic(poly) => TypeDescriptor::PolymorphicEntity(Arc::clone(poly)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animal(name: &str, extra: &str) -> Arc<EntityDescriptor> {
        Arc::new(
            EntityDescriptor::new(name)
                .with_attribute("name", ValueType::basic(BasicType::String))
                .with_attribute(extra, ValueType::basic(BasicType::Integer)),
        )
    }

    #[test]
    fn test_polymorphic_exposes_common_attributes_only() {
        let poly = PolymorphicEntityDescriptor {
            name: "Animal".into(),
            implementors: vec![animal("Cat", "lives"), animal("Dog", "barkVolume")],
        };
        assert!(poly.attribute_descriptor("name").is_some());
        assert!(poly.attribute_descriptor("lives").is_none());
    }

    #[test]
    fn test_numeric_rank_orders_promotion() {
        assert!(BasicType::Double.numeric_rank() > BasicType::Float.numeric_rank());
        assert!(BasicType::Float.numeric_rank() > BasicType::BigDecimal.numeric_rank());
        assert!(BasicType::BigDecimal.numeric_rank() > BasicType::BigInteger.numeric_rank());
        assert!(BasicType::BigInteger.numeric_rank() > BasicType::Long.numeric_rank());
        assert!(BasicType::Long.numeric_rank() > BasicType::Integer.numeric_rank());
        assert!(!BasicType::String.is_numeric());
    }

    #[test]
    fn test_list_value_type_has_integer_index() {
        match ValueType::list(ValueType::entity("Item")) {
            ValueType::Collection(collection) => {
                assert_eq!(collection.kind, CollectionKind::List);
                assert_eq!(
                    collection.index.as_deref(),
                    Some(&ValueType::Basic(BasicType::Integer))
                );
            }
            other => panic!("Expected Collection, got: {:?}", other),
        }
    }
}
