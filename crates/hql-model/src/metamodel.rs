//! In-memory metamodel implementing [`ConsumerContext`]
//!
//! A `StaticMetamodel` is built from a [`MetamodelConfig`], either assembled in
//! code or loaded from JSON:
//!
//! ```json
//! {
//!   "strict_jpa_compliance": false,
//!   "entities": [
//!     { "name": "Person", "attributes": {
//!         "name": { "basic": "string" },
//!         "address": { "composite": "Address" },
//!         "pets": { "collection": { "kind": "list", "element": { "entity": "Pet" } } } } }
//!   ],
//!   "composites": [ { "name": "Address", "attributes": { "city": { "basic": "string" } } } ],
//!   "polymorphic": [ { "name": "Animal", "implementors": ["Cat", "Dog"] } ],
//!   "classes": [ { "name": "com.acme.Status", "kind": "enum", "variants": ["ACTIVE"] } ]
//! }
//! ```

use crate::{
    BasicType, ClassHandle, ClassNotFoundError, CollectionDescriptor, CollectionKind,
    CompositeDescriptor, ConsumerContext, EntityDescriptor, EntityTypeDescriptor,
    PolymorphicEntityDescriptor, TypeDescriptor, ValueType,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Metamodel loading and validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetamodelError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported metamodel format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown type '{name}' referenced by '{owner}'")]
    UnknownType { owner: String, name: String },

    #[error("Duplicate type name: {0}")]
    DuplicateName(String),

    #[error("Map attribute of '{0}' declares no key type")]
    MissingMapKey(String),
}

/// Serializable description of a metamodel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetamodelConfig {
    #[serde(default)]
    pub strict_jpa_compliance: bool,
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
    #[serde(default)]
    pub composites: Vec<CompositeDescriptor>,
    #[serde(default)]
    pub polymorphic: Vec<PolymorphicConfig>,
    #[serde(default)]
    pub classes: Vec<ClassHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicConfig {
    pub name: String,
    pub implementors: Vec<String>,
}

impl MetamodelConfig {
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_composite(mut self, composite: CompositeDescriptor) -> Self {
        self.composites.push(composite);
        self
    }

    pub fn with_polymorphic<I, S>(mut self, name: impl Into<String>, implementors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.polymorphic.push(PolymorphicConfig {
            name: name.into(),
            implementors: implementors.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_class(mut self, class: ClassHandle) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_strict_jpa_compliance(mut self, strict: bool) -> Self {
        self.strict_jpa_compliance = strict;
        self
    }
}

#[derive(Debug, Default)]
struct MetamodelState {
    entities: IndexMap<String, Arc<EntityDescriptor>>,
    composites: IndexMap<String, Arc<CompositeDescriptor>>,
    polymorphic: IndexMap<String, Arc<PolymorphicEntityDescriptor>>,
    classes: IndexMap<String, ClassHandle>,
    strict_jpa_compliance: bool,
}

impl MetamodelState {
    fn check_value_type(&self, owner: &str, value_type: &ValueType) -> Result<(), MetamodelError> {
        let unknown = |name: &str| MetamodelError::UnknownType {
            owner: owner.to_string(),
            name: name.to_string(),
        };
        match value_type {
            ValueType::Basic(_) => Ok(()),
            ValueType::Entity(name) if self.entities.contains_key(name) => Ok(()),
            ValueType::Composite(name) if self.composites.contains_key(name) => Ok(()),
            ValueType::Entity(name) | ValueType::Composite(name) => Err(unknown(name)),
            ValueType::Collection(collection) => {
                if collection.kind == CollectionKind::Map && collection.index.is_none() {
                    return Err(MetamodelError::MissingMapKey(owner.to_string()));
                }
                if let Some(index) = &collection.index {
                    self.check_value_type(owner, index)?;
                }
                self.check_value_type(owner, &collection.element)
            }
        }
    }

    fn resolve(&self, value_type: &ValueType) -> Option<TypeDescriptor> {
        match value_type {
            ValueType::Basic(basic) => Some(TypeDescriptor::Basic(basic.clone())),
            ValueType::Entity(name) => self
                .entities
                .get(name)
                .map(|entity| TypeDescriptor::Entity(Arc::clone(entity))),
            ValueType::Composite(name) => self
                .composites
                .get(name)
                .map(|composite| TypeDescriptor::Composite(Arc::clone(composite))),
            ValueType::Collection(collection) => {
                let index = match (&collection.index, collection.kind) {
                    (Some(index), _) => Some(self.resolve(index)?),
                    (None, CollectionKind::List) => Some(TypeDescriptor::Basic(BasicType::Integer)),
                    (None, _) => None,
                };
                let element = self.resolve(&collection.element)?;
                Some(TypeDescriptor::Collection(Arc::new(CollectionDescriptor {
                    kind: collection.kind,
                    index,
                    element,
                })))
            }
        }
    }
}

/// Thread-safe in-memory metamodel
#[derive(Debug, Clone, Default)]
pub struct StaticMetamodel {
    state: Arc<RwLock<MetamodelState>>,
}

impl StaticMetamodel {
    /// Create an empty metamodel
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate from a configuration
    pub fn from_config(config: MetamodelConfig) -> Result<Self, MetamodelError> {
        let mut state = MetamodelState {
            strict_jpa_compliance: config.strict_jpa_compliance,
            ..MetamodelState::default()
        };

        for entity in config.entities {
            if state.entities.contains_key(&entity.name) {
                return Err(MetamodelError::DuplicateName(entity.name));
            }
            state.entities.insert(entity.name.clone(), Arc::new(entity));
        }
        for composite in config.composites {
            if state.composites.contains_key(&composite.name) {
                return Err(MetamodelError::DuplicateName(composite.name));
            }
            state
                .composites
                .insert(composite.name.clone(), Arc::new(composite));
        }
        for poly in config.polymorphic {
            if state.entities.contains_key(&poly.name) || state.polymorphic.contains_key(&poly.name)
            {
                return Err(MetamodelError::DuplicateName(poly.name));
            }
            let implementors = poly
                .implementors
                .iter()
                .map(|name| {
                    state
                        .entities
                        .get(name)
                        .cloned()
                        .ok_or_else(|| MetamodelError::UnknownType {
                            owner: poly.name.clone(),
                            name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            state.polymorphic.insert(
                poly.name.clone(),
                Arc::new(PolymorphicEntityDescriptor {
                    name: poly.name,
                    implementors,
                }),
            );
        }
        for class in config.classes {
            state.classes.insert(class.name.clone(), class);
        }

        for entity in state.entities.values() {
            for value_type in entity.attributes.values() {
                state.check_value_type(&entity.name, value_type)?;
            }
        }
        for composite in state.composites.values() {
            for value_type in composite.attributes.values() {
                state.check_value_type(&composite.name, value_type)?;
            }
        }

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Load from a JSON string
    pub fn from_json(json: &str) -> Result<Self, MetamodelError> {
        let config: MetamodelConfig =
            serde_json::from_str(json).map_err(|e| MetamodelError::Parse(e.to_string()))?;
        Self::from_config(config)
    }

    /// Load from a JSON file at runtime
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MetamodelError> {
        let json =
            std::fs::read_to_string(path).map_err(|e| MetamodelError::Io(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Load from a file, choosing the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MetamodelError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            Some(ext) => Err(MetamodelError::UnsupportedFormat(format!(
                "Unsupported file extension: .{}. Expected .json",
                ext
            ))),
            None => Err(MetamodelError::UnsupportedFormat(
                "No file extension found. Expected .json".to_string(),
            )),
        }
    }

    /// Register an entity after construction; its attribute types must already be known
    pub fn register_entity(&self, entity: EntityDescriptor) -> Result<(), MetamodelError> {
        let mut state = self.state.write();
        if state.entities.contains_key(&entity.name) || state.polymorphic.contains_key(&entity.name)
        {
            return Err(MetamodelError::DuplicateName(entity.name));
        }
        for value_type in entity.attributes.values() {
            if !matches!(value_type, ValueType::Entity(name) if *name == entity.name) {
                state.check_value_type(&entity.name, value_type)?;
            }
        }
        state.entities.insert(entity.name.clone(), Arc::new(entity));
        Ok(())
    }

    /// Register a host class for constant resolution
    pub fn register_class(&self, class: ClassHandle) {
        self.state.write().classes.insert(class.name.clone(), class);
    }

    /// Toggle strict JPQL compliance
    pub fn set_strict_jpa_compliance(&self, strict: bool) {
        self.state.write().strict_jpa_compliance = strict;
    }

    /// Names of all mapped entities, in registration order
    pub fn entity_names(&self) -> Vec<String> {
        self.state.read().entities.keys().cloned().collect()
    }
}

impl ConsumerContext for StaticMetamodel {
    fn resolve_entity_reference(&self, name: &str) -> Option<EntityTypeDescriptor> {
        let state = self.state.read();
        if let Some(entity) = state.entities.get(name) {
            return Some(EntityTypeDescriptor::Entity(Arc::clone(entity)));
        }
        state
            .polymorphic
            .get(name)
            .map(|poly| EntityTypeDescriptor::Polymorphic(Arc::clone(poly)))
    }

    fn class_by_name(&self, name: &str) -> Result<ClassHandle, ClassNotFoundError> {
        self.state
            .read()
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| ClassNotFoundError::new(name))
    }

    fn use_strict_jpa_compliance(&self) -> bool {
        self.state.read().strict_jpa_compliance
    }

    fn resolve_value_type(&self, value_type: &ValueType) -> Option<TypeDescriptor> {
        self.state.read().resolve(value_type)
    }
}
