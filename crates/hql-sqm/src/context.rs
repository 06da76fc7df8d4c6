//! Per-interpretation state
//!
//! One `ParsingContext` lives for exactly one interpretation. It owns the
//! alias registry, the path resolver stack, the from clauses under
//! construction (one level per query or subquery), the global unique-id map
//! and the implicit join cache. Nothing here outlives the call that built it.

use crate::alias_registry::AliasRegistry;
use crate::path::PathResolver;
use crate::tree::{FromClause, FromElement, FromElementSpace, Join, Predicate, Uid};
use hql_diagnostics::{Diagnostic, ErrorCode, HQL0113, HQL0116, HqlError, Result};
use hql_model::ConsumerContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Prefix of generated identification variables; never a legal identifier
pub const IMPLICIT_ALIAS_PREFIX: &str = "<gen:";

/// Handle to a from element space under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaceId {
    level: usize,
    index: usize,
}

impl SpaceId {
    /// Nesting level of the owning from clause; 0 is the outermost query
    pub fn level(&self) -> usize {
        self.level
    }
}

/// A from element space whose root is set exactly once, before any join
#[derive(Debug, Default)]
pub struct FromElementSpaceBuilder {
    root: Option<Arc<FromElement>>,
    joins: Vec<Join>,
}

impl FromElementSpaceBuilder {
    pub fn root(&self) -> Option<&Arc<FromElement>> {
        self.root.as_ref()
    }

    pub fn set_root(&mut self, root: Arc<FromElement>) -> Result<()> {
        if let Some(existing) = &self.root {
            return Err(HqlError::semantic(
                HQL0116,
                format!(
                    "From element space already has root {}; cannot set {}",
                    existing, root
                ),
            ));
        }
        self.root = Some(root);
        Ok(())
    }

    pub fn add_join(&mut self, element: Arc<FromElement>) -> Result<()> {
        if self.root.is_none() {
            return Err(HqlError::semantic(
                HQL0116,
                format!("Join {} added to a from element space without root", element),
            ));
        }
        self.joins.push(Join {
            element,
            predicate: None,
        });
        Ok(())
    }

    pub fn set_join_predicate(&mut self, uid: Uid, predicate: Predicate) {
        if let Some(join) = self.joins.iter_mut().find(|j| j.element.uid() == uid) {
            join.predicate = Some(predicate);
        }
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.root.as_ref().is_some_and(|r| r.uid() == uid)
            || self.joins.iter().any(|j| j.element.uid() == uid)
    }

    pub fn build(self) -> Result<FromElementSpace> {
        let root = self.root.ok_or_else(|| {
            HqlError::semantic(HQL0116, "From element space was closed without a root")
        })?;
        Ok(FromElementSpace {
            root,
            joins: self.joins,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterStyle {
    Named,
    Positional,
}

pub struct ParsingContext<'a> {
    consumer: &'a dyn ConsumerContext,
    strict: bool,
    next_uid: u64,
    next_alias: usize,
    from_elements_by_uid: HashMap<Uid, Arc<FromElement>>,
    /// (source, attribute) to the unique id of the implicit join over it
    implicit_joins: HashMap<(Uid, String), Uid>,
    alias_registry: AliasRegistry,
    resolvers: Vec<PathResolver>,
    from_clauses: Vec<Vec<FromElementSpaceBuilder>>,
    parameter_style: Option<ParameterStyle>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParsingContext<'a> {
    pub fn new(consumer: &'a dyn ConsumerContext) -> Self {
        Self {
            consumer,
            strict: consumer.use_strict_jpa_compliance(),
            next_uid: 0,
            next_alias: 0,
            from_elements_by_uid: HashMap::new(),
            implicit_joins: HashMap::new(),
            alias_registry: AliasRegistry::new(),
            resolvers: vec![PathResolver::Standard],
            from_clauses: Vec::new(),
            parameter_style: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn consumer(&self) -> &'a dyn ConsumerContext {
        self.consumer
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    // === Identity ===

    pub fn next_uid(&mut self) -> Uid {
        let uid = Uid::new(self.next_uid);
        self.next_uid += 1;
        uid
    }

    /// Generate an identification variable for an element declared without one
    pub fn generate_alias(&mut self) -> String {
        let alias = format!("{}{}>", IMPLICIT_ALIAS_PREFIX, self.next_alias);
        self.next_alias += 1;
        alias
    }

    pub fn register_from_element_by_uid(&mut self, element: &Arc<FromElement>) {
        self.from_elements_by_uid
            .insert(element.uid(), Arc::clone(element));
    }

    pub fn find_from_element_by_unique_id(&self, uid: Uid) -> Option<Arc<FromElement>> {
        self.from_elements_by_uid.get(&uid).cloned()
    }

    /// A join cached but never registered, because attaching it failed, is not reused
    pub fn cached_implicit_join(&self, source: Uid, attribute: &str) -> Option<Arc<FromElement>> {
        let uid = self.implicit_joins.get(&(source, attribute.to_string()))?;
        self.find_from_element_by_unique_id(*uid)
    }

    pub fn cache_implicit_join(&mut self, source: Uid, attribute: &str, join: &Arc<FromElement>) {
        self.implicit_joins
            .insert((source, attribute.to_string()), join.uid());
    }

    // === Scopes ===

    pub fn alias_registry(&self) -> &AliasRegistry {
        &self.alias_registry
    }

    pub fn alias_registry_mut(&mut self) -> &mut AliasRegistry {
        &mut self.alias_registry
    }

    pub fn current_resolver(&self) -> &PathResolver {
        self.resolvers.last().unwrap_or(&PathResolver::Standard)
    }

    pub fn resolver_depth(&self) -> usize {
        self.resolvers.len()
    }

    pub fn push_resolver(&mut self, resolver: PathResolver) {
        log::trace!("Push path resolver {:?}", resolver);
        self.resolvers.push(resolver);
    }

    /// The base resolver stays in place
    pub fn pop_resolver(&mut self) {
        if self.resolvers.len() > 1 {
            self.resolvers.pop();
        }
    }

    /// Run `f` with `resolver` active; it is popped whether `f` succeeds or fails
    pub fn with_resolver<R>(
        &mut self,
        resolver: PathResolver,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.push_resolver(resolver);
        let result = f(self);
        self.pop_resolver();
        result
    }

    // === From clauses ===

    pub fn push_from_clause(&mut self) {
        self.from_clauses.push(Vec::new());
    }

    /// Close the innermost from clause; every space must have its root
    pub fn pop_from_clause(&mut self) -> Result<FromClause> {
        let spaces = self.from_clauses.pop().unwrap_or_default();
        let spaces = spaces
            .into_iter()
            .map(FromElementSpaceBuilder::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(FromClause { spaces })
    }

    /// Drop the innermost from clause without validating it
    pub fn discard_from_clause(&mut self) {
        self.from_clauses.pop();
    }

    /// Open a new space in the innermost from clause
    pub fn new_space(&mut self) -> Result<SpaceId> {
        let level = self
            .from_clauses
            .len()
            .checked_sub(1)
            .ok_or_else(|| HqlError::semantic(HQL0116, "No from clause under construction"))?;
        let spaces = &mut self.from_clauses[level];
        spaces.push(FromElementSpaceBuilder::default());
        Ok(SpaceId {
            level,
            index: spaces.len() - 1,
        })
    }

    pub fn space(&self, id: SpaceId) -> Option<&FromElementSpaceBuilder> {
        self.from_clauses.get(id.level)?.get(id.index)
    }

    pub fn space_mut(&mut self, id: SpaceId) -> Result<&mut FromElementSpaceBuilder> {
        self.from_clauses
            .get_mut(id.level)
            .and_then(|level| level.get_mut(id.index))
            .ok_or_else(|| HqlError::semantic(HQL0116, "Unknown from element space"))
    }

    /// Root of the first space of the innermost from clause
    pub fn first_root(&self) -> Option<&Arc<FromElement>> {
        self.from_clauses.last()?.first()?.root()
    }

    /// The open space holding `element`, looking through treated wrappers
    pub fn space_of(&self, element: &Arc<FromElement>) -> Option<SpaceId> {
        let uid = element.unwrap_treated().uid();
        self.from_clauses
            .iter()
            .enumerate()
            .rev()
            .find_map(|(level, spaces)| {
                spaces
                    .iter()
                    .position(|space| space.contains(uid))
                    .map(|index| SpaceId { level, index })
            })
    }

    // === Parameters ===

    /// Positional parameters are 1-based; a statement uses one parameter style
    pub fn register_parameter(&mut self, positional: Option<u32>) -> Result<()> {
        if positional == Some(0) {
            return Err(HqlError::semantic(
                HQL0113,
                "Positional parameters are 1-based; found ?0",
            ));
        }
        let style = if positional.is_some() {
            ParameterStyle::Positional
        } else {
            ParameterStyle::Named
        };
        match self.parameter_style {
            Some(existing) if existing != style => Err(HqlError::semantic(
                HQL0113,
                "Cannot mix named and positional parameters in one statement",
            )),
            _ => {
                self.parameter_style = Some(style);
                Ok(())
            }
        }
    }

    // === Diagnostics ===

    /// Record an advisory; it never changes control flow
    pub fn warn(&mut self, code: ErrorCode, message: impl Into<String>) {
        let diagnostic = Diagnostic::warning(code, message);
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
