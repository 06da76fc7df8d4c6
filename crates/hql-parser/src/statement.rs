//! Statement structure parser: select/update/delete/insert and their clauses

use crate::combinators::{
    Input, PResult, backtrack, identifier, keyword, padded_keyword, peek_keyword, punct, ws,
};
use crate::expression::{dotted_identifier, dotted_name, expression, predicate};
use hql_syntax::{
    Assignment, CollectionMemberJoin, DeleteStatement, DynamicInstantiation, EntityRoot,
    FromClause, FromElementSpace, InsertStatement, InstantiationTarget, Join, JoinTarget,
    JoinType, OrderByClause, Predicate, QualifiedJoin, QueryExpression, QuerySpec, SelectClause,
    SelectExpression, SelectItem, SortSpecification, Statement, UpdateStatement,
};
use winnow::prelude::*;

pub fn statement(input: &mut Input<'_>) -> PResult<Statement> {
    ws(input)?;
    if keyword("update").parse_next(input).is_ok() {
        return update_statement(input).map(Statement::Update);
    }
    if keyword("delete").parse_next(input).is_ok() {
        return delete_statement(input).map(Statement::Delete);
    }
    if keyword("insert").parse_next(input).is_ok() {
        return insert_statement(input).map(Statement::Insert);
    }
    query_expression(input).map(Statement::Select)
}

/// A query spec followed by its optional ordering and paging clauses
pub fn query_expression(input: &mut Input<'_>) -> PResult<QueryExpression> {
    let spec = query_spec(input)?;
    let mut query = QueryExpression::new(spec);

    if padded_keyword("order").parse_next(input).is_ok() {
        padded_keyword("by").parse_next(input)?;
        query.order_by = Some(order_by_clause(input)?);
    }
    if padded_keyword("limit").parse_next(input).is_ok() {
        query.limit = Some(expression(input)?);
    }
    if padded_keyword("offset").parse_next(input).is_ok() {
        query.offset = Some(expression(input)?);
    }
    Ok(query)
}

fn query_spec(input: &mut Input<'_>) -> PResult<QuerySpec> {
    let select = if padded_keyword("select").parse_next(input).is_ok() {
        Some(select_clause(input)?)
    } else {
        None
    };
    padded_keyword("from").parse_next(input)?;
    let from = from_clause(input)?;
    let where_clause = where_clause(input)?;
    Ok(QuerySpec {
        select,
        from,
        where_clause,
    })
}

fn where_clause(input: &mut Input<'_>) -> PResult<Option<Predicate>> {
    if padded_keyword("where").parse_next(input).is_ok() {
        Ok(Some(predicate(input)?))
    } else {
        Ok(None)
    }
}

// === Select ===

fn select_clause(input: &mut Input<'_>) -> PResult<SelectClause> {
    let distinct = padded_keyword("distinct").parse_next(input).is_ok();
    let items = select_items(input)?;
    Ok(SelectClause { distinct, items })
}

fn select_items(input: &mut Input<'_>) -> PResult<Vec<SelectItem>> {
    let mut items = vec![select_item(input)?];
    while punct(",").parse_next(input).is_ok() {
        items.push(select_item(input)?);
    }
    Ok(items)
}

fn select_item(input: &mut Input<'_>) -> PResult<SelectItem> {
    let expression = select_expression(input)?;
    let alias = result_variable(input)?;
    Ok(SelectItem { expression, alias })
}

fn select_expression(input: &mut Input<'_>) -> PResult<SelectExpression> {
    if padded_keyword("new").parse_next(input).is_ok() {
        return dynamic_instantiation(input).map(SelectExpression::DynamicInstantiation);
    }

    let checkpoint = *input;
    if padded_keyword("object").parse_next(input).is_ok() && punct("(").parse_next(input).is_ok()
    {
        let alias = identifier(input)?;
        punct(")").parse_next(input)?;
        return Ok(SelectExpression::Object(alias));
    }
    *input = checkpoint;

    expression(input).map(SelectExpression::Expression)
}

fn dynamic_instantiation(input: &mut Input<'_>) -> PResult<DynamicInstantiation> {
    let name = dotted_name(input)?;
    let target = if name.is_simple() && name.first().eq_ignore_ascii_case("list") {
        InstantiationTarget::List
    } else if name.is_simple() && name.first().eq_ignore_ascii_case("map") {
        InstantiationTarget::Map
    } else {
        InstantiationTarget::Class(name)
    };
    punct("(").parse_next(input)?;
    let arguments = select_items(input)?;
    punct(")").parse_next(input)?;
    Ok(DynamicInstantiation { target, arguments })
}

/// `[as] alias`
fn result_variable(input: &mut Input<'_>) -> PResult<Option<String>> {
    if padded_keyword("as").parse_next(input).is_ok() {
        return identifier(input).map(Some);
    }
    Ok(identifier(input).ok())
}

// === From ===

fn from_clause(input: &mut Input<'_>) -> PResult<FromClause> {
    let mut spaces = vec![from_element_space(input)?];
    while punct(",").parse_next(input).is_ok() {
        if padded_keyword("in").parse_next(input).is_ok() {
            let join = collection_member_join(input)?;
            if let Some(space) = spaces.last_mut() {
                space.joins.push(Join::Collection(join));
            }
            continue;
        }
        spaces.push(from_element_space(input)?);
    }
    Ok(FromClause { spaces })
}

fn from_element_space(input: &mut Input<'_>) -> PResult<FromElementSpace> {
    let root = entity_root(input)?;
    let mut joins = Vec::new();
    while let Some(join) = join(input)? {
        joins.push(join);
    }
    Ok(FromElementSpace { root, joins })
}

/// `EntityName [as] alias`
fn entity_root(input: &mut Input<'_>) -> PResult<EntityRoot> {
    let entity_name = dotted_name(input)?;
    let alias = result_variable(input)?;
    Ok(EntityRoot { entity_name, alias })
}

/// `in(path) [as] alias`, after the `in` keyword
fn collection_member_join(input: &mut Input<'_>) -> PResult<CollectionMemberJoin> {
    punct("(").parse_next(input)?;
    let path = dotted_identifier(input)?;
    punct(")").parse_next(input)?;
    let alias = result_variable(input)?;
    Ok(CollectionMemberJoin { path, alias })
}

/// One join, or `Ok(None)` when the space has no further joins
fn join(input: &mut Input<'_>) -> PResult<Option<Join>> {
    let checkpoint = *input;

    if padded_keyword("cross").parse_next(input).is_ok() {
        padded_keyword("join").parse_next(input)?;
        return entity_root(input).map(|root| Some(Join::Cross(root)));
    }

    let join_type = if padded_keyword("inner").parse_next(input).is_ok() {
        Some(JoinType::Inner)
    } else if padded_keyword("left").parse_next(input).is_ok() {
        Some(JoinType::Left)
    } else if padded_keyword("right").parse_next(input).is_ok() {
        Some(JoinType::Right)
    } else if padded_keyword("full").parse_next(input).is_ok() {
        Some(JoinType::Full)
    } else {
        None
    };
    if join_type.is_some_and(|t| t != JoinType::Inner) {
        let _ = padded_keyword("outer").parse_next(input);
    }

    if padded_keyword("join").parse_next(input).is_err() {
        *input = checkpoint;
        if join_type.is_some() {
            return Err(backtrack());
        }
        return Ok(None);
    }

    let fetch = padded_keyword("fetch").parse_next(input).is_ok();
    let target = join_target(input)?;
    let alias = result_variable(input)?;
    let predicate = if padded_keyword("on").parse_next(input).is_ok()
        || padded_keyword("with").parse_next(input).is_ok()
    {
        Some(predicate(input)?)
    } else {
        None
    };

    Ok(Some(Join::Qualified(QualifiedJoin {
        join_type: join_type.unwrap_or_default(),
        fetch,
        target,
        alias,
        predicate,
    })))
}

fn join_target(input: &mut Input<'_>) -> PResult<JoinTarget> {
    let checkpoint = *input;
    if padded_keyword("treat").parse_next(input).is_ok() && punct("(").parse_next(input).is_ok() {
        let path = dotted_identifier(input)?;
        padded_keyword("as").parse_next(input)?;
        let target = dotted_name(input)?;
        punct(")").parse_next(input)?;
        return Ok(JoinTarget::Treated { path, target });
    }
    *input = checkpoint;
    dotted_name(input).map(JoinTarget::Path)
}

// === Order by ===

fn order_by_clause(input: &mut Input<'_>) -> PResult<OrderByClause> {
    let mut items = vec![sort_specification(input)?];
    while punct(",").parse_next(input).is_ok() {
        items.push(sort_specification(input)?);
    }
    Ok(OrderByClause { items })
}

fn sort_specification(input: &mut Input<'_>) -> PResult<SortSpecification> {
    let expression = expression(input)?;
    let collation = if padded_keyword("collate").parse_next(input).is_ok() {
        Some(dotted_name(input)?.to_string())
    } else {
        None
    };
    let ordering = identifier(input).ok();
    Ok(SortSpecification {
        expression,
        collation,
        ordering,
    })
}

// === DML ===

fn update_statement(input: &mut Input<'_>) -> PResult<UpdateStatement> {
    let target = entity_root(input)?;
    padded_keyword("set").parse_next(input)?;
    let mut assignments = vec![assignment(input)?];
    while punct(",").parse_next(input).is_ok() {
        assignments.push(assignment(input)?);
    }
    let where_clause = where_clause(input)?;
    Ok(UpdateStatement {
        target,
        assignments,
        where_clause,
    })
}

fn assignment(input: &mut Input<'_>) -> PResult<Assignment> {
    let path = dotted_identifier(input)?;
    punct("=").parse_next(input)?;
    let value = expression(input)?;
    Ok(Assignment { path, value })
}

fn delete_statement(input: &mut Input<'_>) -> PResult<DeleteStatement> {
    let _ = padded_keyword("from").parse_next(input);
    let target = entity_root(input)?;
    let where_clause = where_clause(input)?;
    Ok(DeleteStatement {
        target,
        where_clause,
    })
}

fn insert_statement(input: &mut Input<'_>) -> PResult<InsertStatement> {
    padded_keyword("into").parse_next(input)?;
    let target = dotted_name(input)?;
    punct("(").parse_next(input)?;
    let mut state_fields = vec![dotted_identifier(input)?];
    while punct(",").parse_next(input).is_ok() {
        state_fields.push(dotted_identifier(input)?);
    }
    punct(")").parse_next(input)?;
    if !peek_keyword(input, "select") {
        return Err(backtrack());
    }
    let query = query_expression(input)?;
    Ok(InsertStatement {
        target,
        state_fields,
        query,
    })
}
