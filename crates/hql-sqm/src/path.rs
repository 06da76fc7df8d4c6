//! Attribute path resolution
//!
//! A dotted path is tried, in order, as:
//! 1. an identification variable followed by attributes, creating implicit
//!    joins for every non-basic intermediate segment
//! 2. an entity name
//! 3. a constant (`com.acme.Status.ACTIVE`)
//! 4. an unqualified attribute of exactly one visible from element
//!
//! What a path may reference also depends on the active [`PathResolver`]. The
//! resolver stack lives on the [`ParsingContext`]; pushes go through
//! [`ParsingContext::with_resolver`] so they are undone on every exit path.

use crate::context::{ParsingContext, SpaceId};
use crate::from_element_builder::{AttributeJoinSpec, FromElementBuilder};
use crate::tree::{
    AttributeReference, ConstantReference, Expression, FromElement, FromElementKind,
    IndexedReference, PathSource,
};
use hql_diagnostics::{
    HQL0100, HQL0102, HQL0103, HQL0104, HQL0109, HQL0110, HQL0111, HQL0116, HqlError, Result,
};
use hql_model::{TypeDescriptor, ValueType};
use hql_syntax::{DotIdentifier, JoinType};
use std::sync::Arc;

/// How paths are resolved in the current position
#[derive(Debug, Clone)]
pub enum PathResolver {
    Standard,
    /// ON/WITH restriction of a join in `space`; elements of sibling spaces are off limits
    JoinPredicate { space: SpaceId },
    /// Bulk update/delete: no implicit joins; embeddables are still navigable
    Dml,
    /// Remainder of `collection[index].remainder`, rooted at the indexed element
    IndexedRoot(IndexedReference),
}

pub struct AttributePathResolver<'c, 'a> {
    context: &'c mut ParsingContext<'a>,
}

impl<'c, 'a> AttributePathResolver<'c, 'a> {
    pub fn new(context: &'c mut ParsingContext<'a>) -> Self {
        Self { context }
    }

    pub fn resolve_path(&mut self, path: &DotIdentifier) -> Result<Expression> {
        if let PathResolver::IndexedRoot(indexed) = self.context.current_resolver() {
            let indexed = indexed.clone();
            return self.resolve_from_indexed(indexed, path);
        }

        let parts = path.parts();
        let Some(first) = parts.first() else {
            return Err(could_not_interpret(path));
        };

        if let Some(element) = self.context.alias_registry().find_from_element(first) {
            return self.navigate(element, &parts[1..], path);
        }

        let consumer = self.context.consumer();
        if let Some(entity) = consumer.resolve_entity_reference(&path.to_string()) {
            log::trace!("Resolved '{}' as entity name", path);
            return Ok(Expression::EntityType(entity));
        }

        if let Some(constant) = self.resolve_constant(path) {
            return Ok(Expression::Constant(constant));
        }

        if let Some(element) = self.resolve_unqualified(first)? {
            return self.navigate(element, parts, path);
        }

        Err(could_not_interpret(path))
    }

    /// `base[index]`, optionally dereferenced further
    pub fn resolve_indexed(
        &mut self,
        base: &DotIdentifier,
        index: Expression,
        remainder: Option<&DotIdentifier>,
    ) -> Result<Expression> {
        let collection = match self.resolve_path(base)? {
            Expression::Attribute(attribute) => attribute,
            other => {
                return Err(HqlError::semantic(
                    HQL0103,
                    format!(
                        "Index operator applied to '{}', which is not a collection ({})",
                        base,
                        other.expression_type().map_or_else(|| "untyped".to_string(), |t| t.name())
                    ),
                ));
            }
        };

        let collection_type = &collection.attribute_type;
        let (Some(_), Some(element_type)) =
            (collection_type.index_type(), collection_type.element_type())
        else {
            return Err(HqlError::semantic(
                HQL0103,
                format!(
                    "Index operator applied to '{}' of type {}, which is not an indexed collection",
                    base, collection_type
                ),
            ));
        };
        let element_type = element_type.clone();

        let indexed = IndexedReference {
            collection,
            index: Box::new(index),
            element_type,
        };
        match remainder {
            None => Ok(Expression::Indexed(indexed)),
            Some(rest) => self
                .context
                .with_resolver(PathResolver::IndexedRoot(indexed), |context| {
                    AttributePathResolver::new(context).resolve_path(rest)
                }),
        }
    }

    /// `treat(base as Target)`, optionally dereferenced further
    pub fn resolve_treated(
        &mut self,
        base: &DotIdentifier,
        target: &DotIdentifier,
        remainder: Option<&DotIdentifier>,
    ) -> Result<Expression> {
        let element = self.resolve_from_element_path(base)?;
        let treated = self.treat(&element, target)?;
        match remainder {
            None => Ok(Expression::FromElement(treated)),
            Some(rest) => {
                let text = DotIdentifier::new(
                    std::iter::once(format!("treat({} as {})", base, target))
                        .chain(rest.parts().iter().cloned()),
                );
                self.navigate(treated, rest.parts(), &text)
            }
        }
    }

    /// Record `element` as treated as `target` and wrap it
    pub fn treat(
        &mut self,
        element: &Arc<FromElement>,
        target: &DotIdentifier,
    ) -> Result<Arc<FromElement>> {
        let target_name = target.to_string();
        let entity = self
            .context
            .consumer()
            .resolve_entity_reference(&target_name)
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0111,
                    format!("Could not resolve treat target entity '{}'", target_name),
                )
            })?;

        if let TypeDescriptor::PolymorphicEntity(polymorphic) = element.bound_type()
            && !polymorphic
                .implementors
                .iter()
                .any(|implementor| implementor.name == entity.name())
        {
            return Err(HqlError::semantic(
                HQL0111,
                format!(
                    "'{}' is not an implementor of '{}'",
                    entity.name(),
                    polymorphic.name
                ),
            ));
        }

        element.add_treated_as(entity.clone());
        let wrapped = Arc::clone(element);
        let kind = if element.attribute_join().is_some() {
            FromElementKind::TreatedAttributeJoin { wrapped }
        } else {
            FromElementKind::TreatedRoot { wrapped }
        };
        let treated = Arc::new(FromElement::new(
            self.context.next_uid(),
            element.alias(),
            element.is_alias_generated(),
            entity.to_type(),
            kind,
        ));
        self.context.register_from_element_by_uid(&treated);
        log::debug!("Treating {} as {}", element, entity.name());
        Ok(treated)
    }

    /// Resolve a path that must denote a from element, joining implicitly as needed
    pub fn resolve_from_element_path(&mut self, path: &DotIdentifier) -> Result<Arc<FromElement>> {
        self.resolve_from_element_parts(path.parts(), path)
    }

    /// As [`Self::resolve_from_element_path`], for a prefix of `path`
    pub fn resolve_from_element_parts(
        &mut self,
        parts: &[String],
        path: &DotIdentifier,
    ) -> Result<Arc<FromElement>> {
        let Some((first, rest)) = parts.split_first() else {
            return Err(could_not_interpret(path));
        };
        let element = self
            .context
            .alias_registry()
            .find_from_element(first)
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0110,
                    format!("Could not resolve identification variable '{}' in '{}'", first, path),
                )
            })?;
        self.check_join_predicate_scope(&element)?;

        let mut current = element;
        for (position, name) in rest.iter().enumerate() {
            let last = position + 1 == rest.len();
            let text = parts[..position + 2].join(".");
            current = self.implicit_join(&current, name, &text, last)?;
        }
        Ok(current)
    }

    fn navigate(
        &mut self,
        element: Arc<FromElement>,
        attributes: &[String],
        path: &DotIdentifier,
    ) -> Result<Expression> {
        self.check_join_predicate_scope(&element)?;
        let Some((last, intermediate)) = attributes.split_last() else {
            return Ok(Expression::FromElement(element));
        };
        if matches!(self.context.current_resolver(), PathResolver::Dml) {
            return self.navigate_state_field(element, intermediate, last, path);
        }

        let mut source = element;
        for (position, name) in intermediate.iter().enumerate() {
            let text = format!("{}.{}", source.alias(), name);
            log::trace!("Implicit join {} (segment {} of '{}')", text, position + 1, path);
            source = self.implicit_join(&source, name, &text, false)?;
        }

        let source_type = source.bound_type().clone();
        self.attribute_reference(PathSource::FromElement(source), &source_type, last, path)
            .map(Expression::Attribute)
    }

    /// Bulk statements navigate embeddables in place; anything else would need a join
    fn navigate_state_field(
        &mut self,
        element: Arc<FromElement>,
        intermediate: &[String],
        last: &str,
        path: &DotIdentifier,
    ) -> Result<Expression> {
        let mut text = element.alias().to_string();
        let mut source_type = element.bound_type().clone();
        let mut source = PathSource::FromElement(element);
        for name in intermediate {
            text = format!("{}.{}", text, name);
            let reference = self.attribute_reference(source, &source_type, name, path)?;
            ensure_dereferenceable_or_terminal(&reference.attribute_type, &text, false)?;
            if !matches!(reference.attribute_type, TypeDescriptor::Composite(_)) {
                return Err(bulk_implicit_join(&text));
            }
            source_type = reference.attribute_type.clone();
            source = PathSource::Attribute(Box::new(reference));
        }
        self.attribute_reference(source, &source_type, last, path)
            .map(Expression::Attribute)
    }

    fn resolve_from_indexed(
        &mut self,
        indexed: IndexedReference,
        path: &DotIdentifier,
    ) -> Result<Expression> {
        let Some((last, intermediate)) = path.parts().split_last() else {
            return Ok(Expression::Indexed(indexed));
        };

        let mut source_type = indexed.element_type.clone();
        let mut source = PathSource::Indexed(Box::new(indexed));
        for name in intermediate {
            let reference = self.attribute_reference(source, &source_type, name, path)?;
            ensure_dereferenceable(&reference.attribute_type, name, path)?;
            source_type = reference.attribute_type.clone();
            source = PathSource::Attribute(Box::new(reference));
        }
        self.attribute_reference(source, &source_type, last, path)
            .map(Expression::Attribute)
    }

    fn attribute_reference(
        &self,
        source: PathSource,
        source_type: &TypeDescriptor,
        name: &str,
        path: &DotIdentifier,
    ) -> Result<AttributeReference> {
        let attribute = source_type.attribute_descriptor(name).ok_or_else(|| {
            HqlError::semantic(
                HQL0102,
                format!(
                    "Could not resolve attribute '{}' of '{}' in path '{}'",
                    name, source_type, path
                ),
            )
        })?;
        let attribute_type = self.resolve_type(&attribute.value_type, name)?;
        Ok(AttributeReference {
            source,
            attribute,
            attribute_type,
        })
    }

    fn implicit_join(
        &mut self,
        source: &Arc<FromElement>,
        name: &str,
        path_text: &str,
        terminal: bool,
    ) -> Result<Arc<FromElement>> {
        let attribute = source.bound_type().attribute_descriptor(name);
        if let Some(attribute) = &attribute {
            let attribute_type = self.resolve_type(&attribute.value_type, name)?;
            ensure_dereferenceable_or_terminal(&attribute_type, path_text, terminal)?;
        }

        if matches!(self.context.current_resolver(), PathResolver::Dml) {
            return Err(bulk_implicit_join(path_text));
        }

        let space = self.context.space_of(source).ok_or_else(|| {
            HqlError::semantic(
                HQL0116,
                format!("{} does not belong to an open from clause", source),
            )
        })?;
        FromElementBuilder::new(self.context).build_attribute_join(AttributeJoinSpec {
            space,
            alias: None,
            attribute,
            subclass_indicator: None,
            path: path_text,
            join_type: JoinType::Inner,
            source,
            fetched: false,
            reuse_implicit: true,
        })
    }

    fn resolve_type(&self, value_type: &ValueType, name: &str) -> Result<TypeDescriptor> {
        self.context
            .consumer()
            .resolve_value_type(value_type)
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0102,
                    format!("Could not resolve the type of attribute '{}'", name),
                )
            })
    }

    fn resolve_constant(&self, path: &DotIdentifier) -> Option<ConstantReference> {
        let (member, class_parts) = path.parts().split_last()?;
        if class_parts.is_empty() {
            return None;
        }
        let class_name = class_parts.join(".");
        let class = match self.context.consumer().class_by_name(&class_name) {
            Ok(class) => class,
            Err(err) => {
                log::trace!("'{}' is not a constant: {}", path, err);
                return None;
            }
        };
        let constant_type = class.constant(member)?;
        Some(ConstantReference {
            class,
            member: member.clone(),
            constant_type,
        })
    }

    /// The single visible from element declaring `name`
    fn resolve_unqualified(&self, name: &str) -> Result<Option<Arc<FromElement>>> {
        let registry = self.context.alias_registry();
        for scope in registry.scope_chain() {
            let candidates: Vec<&Arc<FromElement>> = registry
                .from_elements_in(scope)
                .filter(|element| !element.is_implicit_join())
                .filter(|element| element.bound_type().attribute_descriptor(name).is_some())
                .collect();
            match candidates.as_slice() {
                [] => continue,
                [element] => return Ok(Some(Arc::clone(element))),
                many => {
                    let aliases: Vec<&str> = many.iter().map(|e| e.alias()).collect();
                    return Err(HqlError::semantic(
                        HQL0104,
                        format!(
                            "Unqualified attribute '{}' is ambiguous between {}",
                            name,
                            aliases.join(", ")
                        ),
                    ));
                }
            }
        }
        Ok(None)
    }

    fn check_join_predicate_scope(&self, element: &Arc<FromElement>) -> Result<()> {
        let PathResolver::JoinPredicate { space } = self.context.current_resolver() else {
            return Ok(());
        };
        match self.context.space_of(element) {
            Some(found) if found.level() == space.level() && found != *space => {
                Err(HqlError::semantic(
                    HQL0109,
                    format!(
                        "Join predicate references {} from another from element space",
                        element
                    ),
                ))
            }
            _ => Ok(()),
        }
    }
}

fn could_not_interpret(path: &DotIdentifier) -> HqlError {
    HqlError::semantic(HQL0100, format!("Could not interpret token '{}'", path))
}

fn bulk_implicit_join(path_text: &str) -> HqlError {
    HqlError::semantic(
        HQL0109,
        format!("Implicit join '{}' is not allowed in a bulk statement", path_text),
    )
}

fn ensure_dereferenceable(ty: &TypeDescriptor, name: &str, path: &DotIdentifier) -> Result<()> {
    ensure_dereferenceable_or_terminal(ty, &format!("{} in '{}'", name, path), false)
}

fn ensure_dereferenceable_or_terminal(ty: &TypeDescriptor, what: &str, terminal: bool) -> Result<()> {
    if ty.is_basic() {
        return Err(HqlError::semantic(
            HQL0109,
            format!("Cannot dereference basic attribute {}", what),
        ));
    }
    if ty.is_collection() && !terminal {
        return Err(HqlError::semantic(
            HQL0103,
            format!("Illegal attempt to dereference collection {}", what),
        ));
    }
    Ok(())
}
