//! Scoped alias bindings
//!
//! Scopes live in an arena and point to their parent by index. A subquery
//! pushes a child scope; lookups of from element aliases walk the parent chain
//! so correlated references resolve, while new bindings register only in the
//! current scope. Selection aliases are never inherited.

use crate::tree::{FromElement, Selection};
use hql_diagnostics::{HqlError, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Index of a scope in the registry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct AliasScope {
    parent: Option<ScopeId>,
    from_elements: IndexMap<String, Arc<FromElement>>,
    selections: IndexMap<String, (usize, Selection)>,
}

#[derive(Debug)]
pub struct AliasRegistry {
    scopes: Vec<AliasScope>,
    current: ScopeId,
}

impl AliasRegistry {
    /// Create a registry holding a single root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![AliasScope::default()],
            current: ScopeId(0),
        }
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Number of scopes between the current one and the root
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut scope = self.scope(self.current).parent;
        while let Some(id) = scope {
            depth += 1;
            scope = self.scope(id).parent;
        }
        depth
    }

    /// Enter a child of the current scope
    pub fn push_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(AliasScope {
            parent: Some(self.current),
            ..AliasScope::default()
        });
        self.current = id;
        id
    }

    /// Return to the parent scope; the root scope is never left
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.scope(self.current).parent {
            self.current = parent;
        }
    }

    fn scope(&self, id: ScopeId) -> &AliasScope {
        &self.scopes[id.0]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut AliasScope {
        &mut self.scopes[id.0]
    }

    /// Bind a from element alias in the current scope
    ///
    /// Shadowing an alias of an enclosing scope is legal.
    pub fn register_from_element(&mut self, element: &Arc<FromElement>) -> Result<()> {
        let scope = self.scope_mut(self.current);
        if let Some(existing) = scope.from_elements.get(element.alias()) {
            return Err(HqlError::alias_collision(
                element.alias(),
                format!(
                    "Alias '{}' is already bound to {}; cannot bind it to {}",
                    element.alias(),
                    existing,
                    element
                ),
            ));
        }
        log::trace!("Registered alias {} -> {}", element.alias(), element.uid());
        scope
            .from_elements
            .insert(element.alias().to_string(), Arc::clone(element));
        Ok(())
    }

    /// Bind a result variable in the current scope
    ///
    /// A result variable may reuse a from element alias only when both have the same type.
    pub fn register_selection(&mut self, position: usize, selection: &Selection) -> Result<()> {
        let Some(alias) = selection.alias.as_deref() else {
            return Ok(());
        };
        let scope = self.scope_mut(self.current);

        if scope.selections.contains_key(alias) {
            return Err(HqlError::alias_collision(
                alias,
                format!("Result variable '{}' is defined more than once", alias),
            ));
        }
        if let Some(element) = scope.from_elements.get(alias) {
            let selection_type = selection.expression.expression_type();
            if selection_type.as_ref() != Some(element.bound_type()) {
                return Err(HqlError::alias_collision(
                    alias,
                    format!(
                        "Result variable '{}' of type {} collides with identification variable {}",
                        alias,
                        selection_type.map_or_else(|| "<unknown>".to_string(), |t| t.name()),
                        element
                    ),
                ));
            }
        }

        scope
            .selections
            .insert(alias.to_string(), (position, selection.clone()));
        Ok(())
    }

    /// Look up a from element alias, walking enclosing scopes
    pub fn find_from_element(&self, alias: &str) -> Option<Arc<FromElement>> {
        let mut scope = Some(self.current);
        while let Some(id) = scope {
            let record = self.scope(id);
            if let Some(element) = record.from_elements.get(alias) {
                return Some(Arc::clone(element));
            }
            scope = record.parent;
        }
        None
    }

    /// Look up a result variable of the current scope only
    pub fn find_selection(&self, alias: &str) -> Option<(usize, &Selection)> {
        self.scope(self.current)
            .selections
            .get(alias)
            .map(|(position, selection)| (*position, selection))
    }

    /// From elements bound in one scope, in registration order
    pub fn from_elements_in(&self, id: ScopeId) -> impl Iterator<Item = &Arc<FromElement>> {
        self.scope(id).from_elements.values()
    }

    /// The current scope followed by its ancestors
    pub fn scope_chain(&self) -> Vec<ScopeId> {
        let mut chain = vec![self.current];
        while let Some(parent) = chain.last().and_then(|id| self.scope(*id).parent) {
            chain.push(parent);
        }
        chain
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
