//! Construction and registration of from elements

use crate::context::{ParsingContext, SpaceId};
use crate::tree::{AttributeJoin, FromElement, FromElementKind};
use hql_diagnostics::{HQL0102, HQL0109, HQL0400, HqlError, Result};
use hql_model::{AttributeDescriptor, EntityTypeDescriptor};
use hql_syntax::JoinType;
use std::sync::Arc;

/// Arguments of [`FromElementBuilder::build_attribute_join`]
#[derive(Debug, Clone)]
pub struct AttributeJoinSpec<'r> {
    pub space: SpaceId,
    pub alias: Option<&'r str>,
    /// `None` when the source type has no such attribute
    pub attribute: Option<AttributeDescriptor>,
    /// TREAT target narrowing the joined type
    pub subclass_indicator: Option<EntityTypeDescriptor>,
    pub path: &'r str,
    pub join_type: JoinType,
    pub source: &'r Arc<FromElement>,
    pub fetched: bool,
    /// Reuse (or create and cache) the single implicit join for (source, attribute)
    pub reuse_implicit: bool,
}

pub struct FromElementBuilder<'c, 'a> {
    context: &'c mut ParsingContext<'a>,
}

impl<'c, 'a> FromElementBuilder<'c, 'a> {
    pub fn new(context: &'c mut ParsingContext<'a>) -> Self {
        Self { context }
    }

    /// Create the root of `space`; the space must not have one yet
    pub fn make_root(
        &mut self,
        space: SpaceId,
        entity: &EntityTypeDescriptor,
        alias: Option<&str>,
    ) -> Result<Arc<FromElement>> {
        let element = self.new_element(alias, entity, FromElementKind::Root);
        self.context.space_mut(space)?.set_root(Arc::clone(&element))?;
        self.register(&element)?;
        Ok(element)
    }

    pub fn make_cross_join(
        &mut self,
        space: SpaceId,
        entity: &EntityTypeDescriptor,
        alias: Option<&str>,
    ) -> Result<Arc<FromElement>> {
        self.ensure_mapped(entity, "cross join")?;
        let element = self.new_element(alias, entity, FromElementKind::CrossJoin);
        self.attach(space, &element)?;
        Ok(element)
    }

    pub fn build_entity_join(
        &mut self,
        space: SpaceId,
        alias: Option<&str>,
        entity: &EntityTypeDescriptor,
        join_type: JoinType,
    ) -> Result<Arc<FromElement>> {
        self.ensure_mapped(entity, "entity join")?;
        let element = self.new_element(alias, entity, FromElementKind::EntityJoin { join_type });
        self.attach(space, &element)?;
        Ok(element)
    }

    pub fn build_attribute_join(&mut self, spec: AttributeJoinSpec<'_>) -> Result<Arc<FromElement>> {
        if spec.fetched && spec.reuse_implicit {
            return Err(HqlError::parsing(
                HQL0400,
                format!("Implicit join '{}' cannot be fetched", spec.path),
            ));
        }
        if spec.alias.is_some() && spec.reuse_implicit {
            return Err(HqlError::parsing(
                HQL0400,
                format!("Implicit join '{}' cannot declare an alias", spec.path),
            ));
        }
        let Some(attribute) = spec.attribute else {
            return Err(HqlError::semantic(
                HQL0102,
                format!(
                    "Could not resolve attribute of path '{}' against {}",
                    spec.path, spec.source
                ),
            ));
        };
        if spec.source.is_polymorphic() {
            return Err(HqlError::semantic(
                HQL0109,
                format!(
                    "Cannot join '{}' from unmapped polymorphic reference {}",
                    attribute.name, spec.source
                ),
            ));
        }

        if spec.reuse_implicit
            && let Some(existing) = self
                .context
                .cached_implicit_join(spec.source.uid(), &attribute.name)
        {
            log::trace!("Reusing implicit join {} for '{}'", existing, spec.path);
            return Ok(existing);
        }

        let attribute_type = self
            .context
            .consumer()
            .resolve_value_type(&attribute.value_type)
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0102,
                    format!("Could not resolve the type of attribute '{}'", attribute.name),
                )
            })?;
        if attribute_type.is_basic() {
            return Err(HqlError::semantic(
                HQL0109,
                format!("Cannot join basic attribute '{}'", spec.path),
            ));
        }

        let bound_type = match (&spec.subclass_indicator, attribute_type.element_type()) {
            (Some(subclass), _) => subclass.to_type(),
            (None, Some(element)) => element.clone(),
            (None, None) => attribute_type.clone(),
        };
        let (alias, generated) = self.alias_or_generated(spec.alias);
        let attribute_name = attribute.name.clone();
        let element = Arc::new(FromElement::new(
            self.context.next_uid(),
            alias,
            generated,
            bound_type,
            FromElementKind::AttributeJoin(AttributeJoin {
                source: Arc::clone(spec.source),
                attribute,
                attribute_type,
                join_type: spec.join_type,
                fetched: spec.fetched,
                implicit: spec.reuse_implicit,
                path: spec.path.to_string(),
            }),
        ));
        if let Some(subclass) = spec.subclass_indicator {
            element.add_treated_as(subclass);
        }

        if spec.reuse_implicit {
            self.context
                .cache_implicit_join(spec.source.uid(), &attribute_name, &element);
        }
        self.attach(spec.space, &element)?;
        log::debug!("Built attribute join {} for '{}'", element, spec.path);
        Ok(element)
    }

    fn new_element(
        &mut self,
        alias: Option<&str>,
        entity: &EntityTypeDescriptor,
        kind: FromElementKind,
    ) -> Arc<FromElement> {
        let (alias, generated) = self.alias_or_generated(alias);
        Arc::new(FromElement::new(
            self.context.next_uid(),
            alias,
            generated,
            entity.to_type(),
            kind,
        ))
    }

    fn alias_or_generated(&mut self, alias: Option<&str>) -> (String, bool) {
        match alias {
            Some(alias) => (alias.to_string(), false),
            None => (self.context.generate_alias(), true),
        }
    }

    fn ensure_mapped(&self, entity: &EntityTypeDescriptor, what: &str) -> Result<()> {
        if entity.is_polymorphic() {
            return Err(HqlError::semantic(
                HQL0109,
                format!(
                    "Unmapped polymorphic reference '{}' cannot be used in a {}",
                    entity.name(),
                    what
                ),
            ));
        }
        Ok(())
    }

    fn attach(&mut self, space: SpaceId, element: &Arc<FromElement>) -> Result<()> {
        self.context.space_mut(space)?.add_join(Arc::clone(element))?;
        self.register(element)
    }

    fn register(&mut self, element: &Arc<FromElement>) -> Result<()> {
        self.context.register_from_element_by_uid(element);
        self.context
            .alias_registry_mut()
            .register_from_element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hql_model::{BasicType, ConsumerContext, EntityDescriptor, MetamodelConfig, StaticMetamodel, ValueType};

    fn model() -> StaticMetamodel {
        StaticMetamodel::from_config(
            MetamodelConfig::default()
                .with_entity(
                    EntityDescriptor::new("Person")
                        .with_attribute("name", ValueType::basic(BasicType::String))
                        .with_attribute("manager", ValueType::entity("Person")),
                )
                .with_entity(EntityDescriptor::new("Cat"))
                .with_entity(EntityDescriptor::new("Dog"))
                .with_polymorphic("Animal", ["Cat", "Dog"]),
        )
        .unwrap()
    }

    fn person_root(context: &mut ParsingContext<'_>) -> (SpaceId, Arc<FromElement>) {
        let person = context.consumer().resolve_entity_reference("Person").unwrap();
        context.push_from_clause();
        let space = context.new_space().unwrap();
        let root = FromElementBuilder::new(context)
            .make_root(space, &person, Some("p"))
            .unwrap();
        (space, root)
    }

    fn manager_join<'r>(
        space: SpaceId,
        source: &'r Arc<FromElement>,
        reuse_implicit: bool,
    ) -> AttributeJoinSpec<'r> {
        AttributeJoinSpec {
            space,
            alias: None,
            attribute: source.bound_type().attribute_descriptor("manager"),
            subclass_indicator: None,
            path: "p.manager",
            join_type: JoinType::Inner,
            source,
            fetched: false,
            reuse_implicit,
        }
    }

    #[test]
    fn test_root_gets_generated_alias() {
        let model = model();
        let mut context = ParsingContext::new(&model);
        let person = model.resolve_entity_reference("Person").unwrap();
        context.push_from_clause();
        let space = context.new_space().unwrap();
        let root = FromElementBuilder::new(&mut context)
            .make_root(space, &person, None)
            .unwrap();
        assert!(root.is_alias_generated());
        assert!(
            context
                .alias_registry()
                .find_from_element(root.alias())
                .is_some()
        );
    }

    #[test]
    fn test_implicit_join_is_reused() {
        let model = model();
        let mut context = ParsingContext::new(&model);
        let (space, root) = person_root(&mut context);

        let mut builder = FromElementBuilder::new(&mut context);
        let first = builder.build_attribute_join(manager_join(space, &root, true)).unwrap();
        let second = builder.build_attribute_join(manager_join(space, &root, true)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_implicit_join());

        let explicit = builder.build_attribute_join(manager_join(space, &root, false)).unwrap();
        assert!(!Arc::ptr_eq(&first, &explicit));

        let from = context.pop_from_clause().unwrap();
        assert_eq!(from.spaces[0].joins.len(), 2);
    }

    #[test]
    fn test_attribute_join_preconditions() {
        let model = model();
        let mut context = ParsingContext::new(&model);
        let (space, root) = person_root(&mut context);
        let mut builder = FromElementBuilder::new(&mut context);

        let fetched = AttributeJoinSpec {
            fetched: true,
            ..manager_join(space, &root, true)
        };
        assert_eq!(builder.build_attribute_join(fetched).unwrap_err().code(), HQL0400);

        let aliased = AttributeJoinSpec {
            alias: Some("m"),
            ..manager_join(space, &root, true)
        };
        assert_eq!(builder.build_attribute_join(aliased).unwrap_err().code(), HQL0400);

        let missing = AttributeJoinSpec {
            attribute: None,
            path: "p.boss",
            ..manager_join(space, &root, false)
        };
        let err = builder.build_attribute_join(missing).unwrap_err();
        assert_eq!(err.code(), HQL0102);
        assert!(err.to_string().contains("Person p"));

        let basic = AttributeJoinSpec {
            attribute: root.bound_type().attribute_descriptor("name"),
            path: "p.name",
            ..manager_join(space, &root, false)
        };
        assert_eq!(builder.build_attribute_join(basic).unwrap_err().code(), HQL0109);
    }

    #[test]
    fn test_polymorphic_entity_cannot_be_joined() {
        let model = model();
        let mut context = ParsingContext::new(&model);
        let (space, _) = person_root(&mut context);
        let animal = model.resolve_entity_reference("Animal").unwrap();
        let err = FromElementBuilder::new(&mut context)
            .make_cross_join(space, &animal, Some("a"))
            .unwrap_err();
        assert_eq!(err.code(), HQL0109);
    }
}
