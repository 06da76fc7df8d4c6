//! Parse tree to semantic query model
//!
//! `SemanticQueryBuilder` walks the [`hql_syntax`] tree top-down in a single
//! pass. Each query or subquery opens a level: an alias scope, a from clause
//! and a standard path resolver. The FROM clause of a level is processed
//! before anything else in it, so every other clause can resolve its aliases.

mod expression;
mod predicate;

use crate::context::{ParsingContext, SpaceId};
use crate::from_element_builder::{AttributeJoinSpec, FromElementBuilder};
use crate::functions::is_reserved_word;
use crate::path::{AttributePathResolver, PathResolver};
use crate::tree::{
    Assignment, AttributeReference, DeleteStatement, Expression, FromClause, FromElement,
    FromElementSpace, InsertSelectStatement, OrderByClause, Predicate, QuerySpec, SelectClause,
    SelectStatement, Selection, SelectionReference, SortOrder, SortSpecification, Statement,
    UpdateStatement,
};
use hql_diagnostics::{
    ComplianceViolationKind, Diagnostic, HQL0101, HQL0103, HQL0107, HQL0109, HQL0110, HQL0111,
    HQL0200, HqlError, Result,
};
use hql_model::{ConsumerContext, EntityTypeDescriptor};
use hql_syntax as syntax;
use hql_syntax::{DotIdentifier, JoinType};
use std::sync::Arc;

/// Clauses of one query level, before its from clause is closed
struct QueryParts {
    select_clause: SelectClause,
    where_clause: Option<Predicate>,
    order_by: Option<OrderByClause>,
    limit: Option<Expression>,
    offset: Option<Expression>,
}

/// Builds one statement; create a new builder per interpretation
pub struct SemanticQueryBuilder<'a> {
    context: ParsingContext<'a>,
}

impl<'a> SemanticQueryBuilder<'a> {
    pub fn new(consumer: &'a dyn ConsumerContext) -> Self {
        Self {
            context: ParsingContext::new(consumer),
        }
    }

    pub fn context(&self) -> &ParsingContext<'a> {
        &self.context
    }

    /// Advisories recorded so far
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.context.take_diagnostics()
    }

    pub fn build_statement(&mut self, statement: &syntax::Statement) -> Result<Statement> {
        match statement {
            syntax::Statement::Select(query) => self
                .build_query_expression(query, false)
                .map(|select| Statement::Select(Arc::new(select))),
            syntax::Statement::Update(update) => {
                self.build_update_statement(update).map(Statement::Update)
            }
            syntax::Statement::Delete(delete) => {
                self.build_delete_statement(delete).map(Statement::Delete)
            }
            syntax::Statement::Insert(insert) => {
                self.build_insert_statement(insert).map(Statement::InsertSelect)
            }
        }
    }

    fn is_strict(&self) -> bool {
        self.context.is_strict()
    }

    fn ensure_compliant(
        &self,
        violated: bool,
        kind: ComplianceViolationKind,
        message: impl FnOnce() -> String,
    ) -> Result<()> {
        if violated && self.is_strict() {
            return Err(HqlError::compliance(kind, message()));
        }
        Ok(())
    }

    // === Scoping ===

    /// Run `f` as a new query level; the level is closed on every exit path
    fn with_query_level<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<(R, FromClause)> {
        self.context.alias_registry_mut().push_scope();
        self.context.push_from_clause();
        self.context.push_resolver(PathResolver::Standard);

        let result = f(self);

        self.context.pop_resolver();
        self.context.alias_registry_mut().pop_scope();
        match result {
            Ok(value) => Ok((value, self.context.pop_from_clause()?)),
            Err(err) => {
                self.context.discard_from_clause();
                Err(err)
            }
        }
    }

    fn with_resolver<R>(
        &mut self,
        resolver: PathResolver,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.context.push_resolver(resolver);
        let result = f(self);
        self.context.pop_resolver();
        result
    }

    fn path_resolver(&mut self) -> AttributePathResolver<'_, 'a> {
        AttributePathResolver::new(&mut self.context)
    }

    // === Select statements ===

    fn build_query_expression(
        &mut self,
        query: &syntax::QueryExpression,
        subquery: bool,
    ) -> Result<SelectStatement> {
        self.ensure_compliant(
            subquery && query.order_by.is_some(),
            ComplianceViolationKind::SubqueryOrderBy,
            || "ORDER BY is not allowed in a subquery".to_string(),
        )?;
        self.ensure_compliant(
            query.limit.is_some() || query.offset.is_some(),
            ComplianceViolationKind::LimitOffsetClause,
            || "LIMIT and OFFSET are not part of JPQL".to_string(),
        )?;

        let (parts, from_clause) = self.with_query_level(|builder| {
            builder.build_from_clause(&query.spec.from)?;
            let select_clause = builder.build_select_clause(query.spec.select.as_ref())?;
            let where_clause = query
                .spec
                .where_clause
                .as_ref()
                .map(|predicate| builder.build_predicate(predicate))
                .transpose()?;
            let order_by = query
                .order_by
                .as_ref()
                .map(|order_by| builder.build_order_by_clause(order_by))
                .transpose()?;
            let limit = query
                .limit
                .as_ref()
                .map(|limit| builder.build_expression(limit))
                .transpose()?;
            let offset = query
                .offset
                .as_ref()
                .map(|offset| builder.build_expression(offset))
                .transpose()?;
            Ok(QueryParts {
                select_clause,
                where_clause,
                order_by,
                limit,
                offset,
            })
        })?;

        Ok(SelectStatement {
            query_spec: QuerySpec {
                from_clause,
                select_clause: parts.select_clause,
                where_clause: parts.where_clause,
            },
            order_by: parts.order_by,
            limit: parts.limit,
            offset: parts.offset,
        })
    }

    // === From clause ===

    fn build_from_clause(&mut self, from: &syntax::FromClause) -> Result<()> {
        for space in &from.spaces {
            self.build_from_element_space(space)?;
        }
        Ok(())
    }

    fn build_from_element_space(&mut self, space: &syntax::FromElementSpace) -> Result<()> {
        let id = self.context.new_space()?;
        self.build_root(id, &space.root)?;
        for join in &space.joins {
            self.build_join(id, join)?;
        }
        Ok(())
    }

    fn resolve_entity(&self, name: &DotIdentifier) -> Result<EntityTypeDescriptor> {
        self.context
            .consumer()
            .resolve_entity_reference(&name.to_string())
            .ok_or_else(|| {
                HqlError::semantic(HQL0101, format!("Could not resolve entity reference '{}'", name))
            })
    }

    fn check_identification_variable(&self, alias: Option<&str>) -> Result<()> {
        match alias {
            Some(alias) => self.ensure_compliant(
                is_reserved_word(alias),
                ComplianceViolationKind::ReservedWordAsAlias,
                || format!("'{}' is a reserved word and cannot be used as an alias", alias),
            ),
            None => Ok(()),
        }
    }

    fn build_root(&mut self, space: SpaceId, root: &syntax::EntityRoot) -> Result<Arc<FromElement>> {
        let entity = self.resolve_entity(&root.entity_name)?;
        if entity.is_polymorphic() {
            self.ensure_compliant(true, ComplianceViolationKind::UnmappedPolymorphism, || {
                format!("Unmapped polymorphic reference '{}'", entity.name())
            })?;
            if space.level() > 0 {
                return Err(HqlError::semantic(
                    HQL0109,
                    format!(
                        "Unmapped polymorphic reference '{}' is only supported as a root of the outermost query",
                        entity.name()
                    ),
                ));
            }
        }
        self.check_identification_variable(root.alias.as_deref())?;
        FromElementBuilder::new(&mut self.context).make_root(space, &entity, root.alias.as_deref())
    }

    fn build_join(&mut self, space: SpaceId, join: &syntax::Join) -> Result<()> {
        match join {
            syntax::Join::Cross(root) => {
                let entity = self.resolve_entity(&root.entity_name)?;
                self.check_identification_variable(root.alias.as_deref())?;
                FromElementBuilder::new(&mut self.context).make_cross_join(
                    space,
                    &entity,
                    root.alias.as_deref(),
                )?;
                Ok(())
            }
            syntax::Join::Qualified(qualified) => self.build_qualified_join(space, qualified),
            syntax::Join::Collection(member) => self.build_collection_member_join(space, member),
        }
    }

    fn build_qualified_join(&mut self, space: SpaceId, join: &syntax::QualifiedJoin) -> Result<()> {
        let alias = join.alias.as_deref();
        self.check_identification_variable(alias)?;
        self.ensure_compliant(
            join.fetch && alias.is_some(),
            ComplianceViolationKind::AliasedFetchJoin,
            || format!("Fetch join '{}' declares an alias", join.target.path()),
        )?;

        let element = match &join.target {
            syntax::JoinTarget::Path(path)
                if path.is_simple()
                    && self
                        .context
                        .alias_registry()
                        .find_from_element(path.first())
                        .is_none() =>
            {
                let entity = self.resolve_entity(path)?;
                FromElementBuilder::new(&mut self.context).build_entity_join(
                    space,
                    alias,
                    &entity,
                    join.join_type,
                )?
            }
            syntax::JoinTarget::Path(path) => {
                self.build_explicit_attribute_join(space, path, alias, None, join.join_type, join.fetch)?
            }
            syntax::JoinTarget::Treated { path, target } => {
                let subclass = self.resolve_treat_target(target)?;
                self.build_explicit_attribute_join(
                    space,
                    path,
                    alias,
                    Some(subclass),
                    join.join_type,
                    join.fetch,
                )?
            }
        };

        if let Some(predicate) = &join.predicate {
            let predicate = self.with_resolver(PathResolver::JoinPredicate { space }, |builder| {
                builder.build_predicate(predicate)
            })?;
            self.context
                .space_mut(space)?
                .set_join_predicate(element.uid(), predicate);
        }
        Ok(())
    }

    fn resolve_treat_target(&self, target: &DotIdentifier) -> Result<EntityTypeDescriptor> {
        self.context
            .consumer()
            .resolve_entity_reference(&target.to_string())
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0111,
                    format!("Could not resolve treat target entity '{}'", target),
                )
            })
    }

    fn build_explicit_attribute_join(
        &mut self,
        space: SpaceId,
        path: &DotIdentifier,
        alias: Option<&str>,
        subclass_indicator: Option<EntityTypeDescriptor>,
        join_type: JoinType,
        fetched: bool,
    ) -> Result<Arc<FromElement>> {
        let Some((attribute_name, source_path)) = path.parts().split_last() else {
            return Err(HqlError::semantic(HQL0109, "Empty join path"));
        };
        if source_path.is_empty() {
            return Err(HqlError::semantic(
                HQL0109,
                format!("Join path '{}' must start with an identification variable", path),
            ));
        }
        let source = self.path_resolver().resolve_from_element_parts(source_path, path)?;
        let attribute = source.bound_type().attribute_descriptor(attribute_name);
        let path_text = path.to_string();
        FromElementBuilder::new(&mut self.context).build_attribute_join(AttributeJoinSpec {
            space,
            alias,
            attribute,
            subclass_indicator,
            path: &path_text,
            join_type,
            source: &source,
            fetched,
            reuse_implicit: false,
        })
    }

    /// JPQL `in(path) alias`
    fn build_collection_member_join(
        &mut self,
        space: SpaceId,
        join: &syntax::CollectionMemberJoin,
    ) -> Result<()> {
        self.check_identification_variable(join.alias.as_deref())?;
        if let Some((attribute_name, source_path)) = join.path.parts().split_last()
            && !source_path.is_empty()
        {
            let source = self.path_resolver().resolve_from_element_parts(source_path, &join.path)?;
            if let Some(attribute) = source.bound_type().attribute_descriptor(attribute_name)
                && !attribute.is_plural()
            {
                return Err(HqlError::semantic(
                    HQL0103,
                    format!("Collection member join path '{}' is not a collection", join.path),
                ));
            }
        }
        self.build_explicit_attribute_join(
            space,
            &join.path,
            join.alias.as_deref(),
            None,
            JoinType::Inner,
            false,
        )?;
        Ok(())
    }

    // === Select clause ===

    fn build_select_clause(&mut self, select: Option<&syntax::SelectClause>) -> Result<SelectClause> {
        let Some(select) = select else {
            return self.build_implicit_select_clause();
        };

        let mut selections = Vec::with_capacity(select.items.len());
        for (position, item) in select.items.iter().enumerate() {
            self.check_identification_variable(item.alias.as_deref())?;
            let selection = Selection {
                expression: self.build_select_expression(&item.expression)?,
                alias: item.alias.clone(),
            };
            self.context
                .alias_registry_mut()
                .register_selection(position, &selection)?;
            selections.push(selection);
        }
        Ok(SelectClause {
            distinct: select.distinct,
            selections,
        })
    }

    /// `from Entity e` selects the root of the first space
    fn build_implicit_select_clause(&mut self) -> Result<SelectClause> {
        let root = self.context.first_root().cloned().ok_or_else(|| {
            HqlError::semantic(HQL0109, "Implicit select clause requires a from clause root")
        })?;
        self.context.warn(
            HQL0200,
            format!(
                "Use of HQL implicit select clause; select {} explicitly",
                root.alias()
            ),
        );
        self.ensure_compliant(true, ComplianceViolationKind::ImplicitSelect, || {
            "Encountered implicit select clause".to_string()
        })?;

        let selection = Selection {
            expression: Expression::FromElement(root),
            alias: None,
        };
        self.context
            .alias_registry_mut()
            .register_selection(0, &selection)?;
        Ok(SelectClause {
            distinct: false,
            selections: vec![selection],
        })
    }

    fn resolve_identification_variable(&self, alias: &str) -> Result<Arc<FromElement>> {
        self.context
            .alias_registry()
            .find_from_element(alias)
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0110,
                    format!("Could not resolve identification variable '{}'", alias),
                )
            })
    }

    // === Order by ===

    fn build_order_by_clause(&mut self, order_by: &syntax::OrderByClause) -> Result<OrderByClause> {
        let sort_specifications = order_by
            .items
            .iter()
            .map(|item| self.build_sort_specification(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(OrderByClause {
            sort_specifications,
        })
    }

    fn build_sort_specification(
        &mut self,
        item: &syntax::SortSpecification,
    ) -> Result<SortSpecification> {
        let expression = match self.find_selection_reference(&item.expression) {
            Some(reference) => Expression::SelectionReference(reference),
            None => self.build_expression(&item.expression)?,
        };
        let order = match item.ordering.as_deref() {
            None => SortOrder::default(),
            Some(text) => SortOrder::interpret(text).ok_or_else(|| {
                HqlError::semantic(HQL0107, format!("Unrecognized sort ordering: {}", text))
            })?,
        };
        Ok(SortSpecification {
            expression,
            collation: item.collation.clone(),
            order,
        })
    }

    fn find_selection_reference(&self, expression: &syntax::Expression) -> Option<SelectionReference> {
        let syntax::Expression::Path(syntax::Path::Simple(path)) = expression else {
            return None;
        };
        if !path.is_simple() {
            return None;
        }
        let alias = path.first();
        self.context
            .alias_registry()
            .find_selection(alias)
            .map(|(position, selection)| SelectionReference {
                alias: alias.to_string(),
                position,
                expression_type: selection.expression.expression_type(),
            })
    }

    // === Bulk statements ===

    /// Single-root target space of an update or delete
    fn build_dml_target(&mut self, target: &syntax::EntityRoot) -> Result<SpaceId> {
        let space = self.context.new_space()?;
        let root = self.build_root(space, target)?;
        if root.is_polymorphic() {
            return Err(HqlError::semantic(
                HQL0109,
                format!("Bulk statement target '{}' must be a mapped entity", target.entity_name),
            ));
        }
        Ok(space)
    }

    fn single_space(from_clause: FromClause) -> Result<FromElementSpace> {
        let mut spaces = from_clause.spaces.into_iter();
        match (spaces.next(), spaces.next()) {
            (Some(space), None) if space.joins.is_empty() => Ok(space),
            (Some(space), None) => Err(HqlError::semantic(
                HQL0109,
                format!("Bulk statement on {} cannot contain joins", space.root),
            )),
            _ => Err(HqlError::semantic(
                HQL0109,
                "Bulk statement must have exactly one target",
            )),
        }
    }

    fn build_where_for_dml(&mut self, predicate: Option<&syntax::Predicate>) -> Result<Option<Predicate>> {
        predicate
            .map(|predicate| {
                self.with_resolver(PathResolver::Dml, |builder| builder.build_predicate(predicate))
            })
            .transpose()
    }

    fn build_update_statement(&mut self, update: &syntax::UpdateStatement) -> Result<UpdateStatement> {
        let ((assignments, where_clause), from_clause) = self.with_query_level(|builder| {
            builder.build_dml_target(&update.target)?;
            let assignments = update
                .assignments
                .iter()
                .map(|assignment| builder.build_assignment(assignment))
                .collect::<Result<Vec<_>>>()?;
            let where_clause = builder.build_where_for_dml(update.where_clause.as_ref())?;
            Ok((assignments, where_clause))
        })?;
        Ok(UpdateStatement {
            target: Self::single_space(from_clause)?,
            assignments,
            where_clause,
        })
    }

    fn build_assignment(&mut self, assignment: &syntax::Assignment) -> Result<Assignment> {
        self.with_resolver(PathResolver::Dml, |builder| {
            let target_path = builder.build_state_field(&assignment.path)?;
            let value = builder.build_expression(&assignment.value)?;
            Ok(Assignment { target_path, value })
        })
    }

    fn build_state_field(&mut self, path: &DotIdentifier) -> Result<AttributeReference> {
        match self.path_resolver().resolve_path(path)? {
            Expression::Attribute(attribute) => Ok(attribute),
            other => Err(HqlError::semantic(
                HQL0109,
                format!(
                    "'{}' is not a state field ({})",
                    path,
                    other
                        .expression_type()
                        .map_or_else(|| "untyped".to_string(), |t| t.name())
                ),
            )),
        }
    }

    fn build_delete_statement(&mut self, delete: &syntax::DeleteStatement) -> Result<DeleteStatement> {
        let (where_clause, from_clause) = self.with_query_level(|builder| {
            builder.build_dml_target(&delete.target)?;
            builder.build_where_for_dml(delete.where_clause.as_ref())
        })?;
        Ok(DeleteStatement {
            target: Self::single_space(from_clause)?,
            where_clause,
        })
    }

    fn build_insert_statement(
        &mut self,
        insert: &syntax::InsertStatement,
    ) -> Result<InsertSelectStatement> {
        let target = syntax::EntityRoot {
            entity_name: insert.target.clone(),
            alias: None,
        };
        let (state_fields, from_clause) = self.with_query_level(|builder| {
            let space = builder.build_dml_target(&target)?;
            let root = builder
                .context
                .space(space)
                .and_then(|space| space.root())
                .cloned()
                .ok_or_else(|| HqlError::semantic(HQL0109, "Insert target has no root"))?;
            builder.with_resolver(PathResolver::Dml, |builder| {
                insert
                    .state_fields
                    .iter()
                    .map(|field| {
                        let qualified = DotIdentifier::new(
                            std::iter::once(root.alias().to_string())
                                .chain(field.parts().iter().cloned()),
                        );
                        builder.build_state_field(&qualified)
                    })
                    .collect::<Result<Vec<_>>>()
            })
        })?;
        let select = self.build_query_expression(&insert.query, false)?;
        Ok(InsertSelectStatement {
            target: Self::single_space(from_clause)?,
            state_fields,
            select,
        })
    }
}
