//! Expression building

use super::SemanticQueryBuilder;
use crate::functions::{
    arithmetic_result_type, function_result_type, is_niladic_function, is_standard_function,
};
use crate::literal::build_literal;
use crate::tree::{
    BinaryArithmetic, CollectionFunction, CollectionFunctionKind, Concatenation,
    DynamicInstantiation, Expression, FunctionExpression, InstantiationArgument,
    InstantiationTarget, MapEntryFunction, MapEntryReference, Parameter, SearchedCase,
    SearchedCaseWhen, SimpleCase, SimpleCaseWhen, SubQueryExpression, UnaryExpression,
};
use hql_diagnostics::{
    ComplianceViolationKind, HQL0108, HQL0112, HQL0114, HQL0115, HQL0203, HQL0204, HQL0401,
    HqlError, Result,
};
use hql_model::{BasicType, CollectionKind, TypeDescriptor};
use hql_syntax as syntax;
use hql_syntax::DotIdentifier;

fn binary_operands<'e>(
    operands: &'e [syntax::Expression],
    what: &str,
) -> Result<(&'e syntax::Expression, &'e syntax::Expression)> {
    match operands {
        [left, right] => Ok((left, right)),
        _ => Err(HqlError::parsing(
            HQL0401,
            format!("Expecting 2 operands to {}, found {}", what, operands.len()),
        )),
    }
}

impl<'a> SemanticQueryBuilder<'a> {
    pub(super) fn build_expression(&mut self, expression: &syntax::Expression) -> Result<Expression> {
        match expression {
            syntax::Expression::Literal(literal) => build_literal(literal).map(Expression::Literal),
            syntax::Expression::Parameter(parameter) => self.build_parameter(parameter),
            syntax::Expression::Path(path) => self.build_path(path),
            syntax::Expression::Arithmetic(arithmetic) => self.build_arithmetic(arithmetic),
            syntax::Expression::Concatenation(concatenation) => {
                self.build_concatenation(concatenation)
            }
            syntax::Expression::Unary(unary) => Ok(Expression::Unary(UnaryExpression {
                operator: unary.operator,
                operand: Box::new(self.build_expression(&unary.operand)?),
            })),
            syntax::Expression::Grouped(inner) => self.build_expression(inner),
            syntax::Expression::Function(call) => self.build_function(call),
            syntax::Expression::Case(case) => self.build_case(case),
            syntax::Expression::SubQuery(query) => self.build_subquery(query).map(Expression::SubQuery),
        }
    }

    fn build_parameter(&mut self, parameter: &syntax::Parameter) -> Result<Expression> {
        let parameter = match parameter {
            syntax::Parameter::Named(name) => {
                self.context.register_parameter(None)?;
                Parameter::Named(name.clone())
            }
            syntax::Parameter::Positional(position) => {
                self.context.register_parameter(Some(*position))?;
                Parameter::Positional(*position)
            }
        };
        Ok(Expression::Parameter(parameter))
    }

    fn build_path(&mut self, path: &syntax::Path) -> Result<Expression> {
        match path {
            syntax::Path::Simple(dotted) => {
                if dotted.is_simple()
                    && is_niladic_function(dotted.first())
                    && self
                        .context
                        .alias_registry()
                        .find_from_element(dotted.first())
                        .is_none()
                {
                    return Ok(self.niladic_function(dotted.first()));
                }
                self.path_resolver().resolve_path(dotted)
            }
            syntax::Path::Indexed {
                base,
                index,
                remainder,
            } => {
                let index = self.build_expression(index)?;
                self.path_resolver()
                    .resolve_indexed(base, index, remainder.as_ref())
            }
            syntax::Path::Treated {
                base,
                target,
                remainder,
            } => self
                .path_resolver()
                .resolve_treated(base, target, remainder.as_ref()),
            syntax::Path::MapFunction { function, argument } => {
                self.build_map_function(*function, argument)
            }
        }
    }

    fn niladic_function(&self, name: &str) -> Expression {
        Expression::Function(FunctionExpression {
            name: name.to_ascii_lowercase(),
            arguments: Vec::new(),
            distinct: false,
            star: false,
            standard: true,
            result_type: function_result_type(name, &[]),
        })
    }

    fn build_map_function(
        &mut self,
        function: syntax::MapFunction,
        argument: &DotIdentifier,
    ) -> Result<Expression> {
        let join = self.path_resolver().resolve_from_element_path(argument)?;
        let map_type = join
            .collection_type()
            .filter(|ty| ty.collection_kind() == Some(CollectionKind::Map))
            .cloned();

        let (function, result_type) = match (function, map_type) {
            (syntax::MapFunction::Value, Some(map)) => {
                (MapEntryFunction::Value, map.element_type().cloned())
            }
            (syntax::MapFunction::Value, None) => {
                self.ensure_compliant(true, ComplianceViolationKind::ValueFunctionOnNonMap, || {
                    format!("VALUE() applied to non-map reference {}", join)
                })?;
                return Ok(Expression::FromElement(join));
            }
            (syntax::MapFunction::Key, Some(map)) => {
                (MapEntryFunction::Key, map.index_type().cloned())
            }
            (syntax::MapFunction::Entry, Some(_)) => (MapEntryFunction::Entry, None),
            (function @ (syntax::MapFunction::Key | syntax::MapFunction::Entry), None) => {
                return Err(HqlError::semantic(
                    HQL0112,
                    format!(
                        "{:?}() requires a map-valued join, found {}",
                        function, join
                    ),
                ));
            }
        };
        Ok(Expression::MapEntry(MapEntryReference {
            function,
            join,
            result_type,
        }))
    }

    fn build_arithmetic(&mut self, arithmetic: &syntax::ArithmeticExpression) -> Result<Expression> {
        let (left, right) = binary_operands(&arithmetic.operands, "arithmetic expression")?;
        let left = self.build_expression(left)?;
        let right = self.build_expression(right)?;
        let result_type = arithmetic_result_type(left.expression_type(), right.expression_type());
        Ok(Expression::Arithmetic(BinaryArithmetic {
            operator: arithmetic.operator,
            left: Box::new(left),
            right: Box::new(right),
            result_type,
        }))
    }

    fn build_concatenation(
        &mut self,
        concatenation: &syntax::ConcatenationExpression,
    ) -> Result<Expression> {
        let (left, right) = binary_operands(&concatenation.operands, "concatenation")?;
        Ok(Expression::Concatenation(Concatenation {
            left: Box::new(self.build_expression(left)?),
            right: Box::new(self.build_expression(right)?),
        }))
    }

    fn build_function(&mut self, call: &syntax::FunctionCall) -> Result<Expression> {
        if !call.generic
            && let Some(function) = CollectionFunctionKind::from_name(&call.name)
        {
            return self.build_collection_function(function, call);
        }

        let standard = !call.generic && is_standard_function(&call.name);
        if !standard {
            // `function('name', ...)` is how JPQL itself calls out to the database
            self.ensure_compliant(!call.generic, ComplianceViolationKind::FunctionCall, || {
                format!("Encountered non-JPQL function call '{}'", call.name)
            })?;
            self.context.warn(
                HQL0203,
                format!("Function '{}' is passed through unresolved", call.name),
            );
        }

        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.build_expression(argument))
            .collect::<Result<Vec<_>>>()?;
        let result_type = if standard {
            let types: Vec<_> = arguments.iter().map(Expression::expression_type).collect();
            function_result_type(&call.name, &types)
        } else {
            None
        };
        Ok(Expression::Function(FunctionExpression {
            name: call.name.clone(),
            arguments,
            distinct: call.distinct,
            star: call.star,
            standard,
            result_type,
        }))
    }

    fn build_collection_function(
        &mut self,
        function: CollectionFunctionKind,
        call: &syntax::FunctionCall,
    ) -> Result<Expression> {
        if function.is_hql_only() {
            self.ensure_compliant(true, ComplianceViolationKind::HqlCollectionFunction, || {
                format!("Encountered HQL collection function {}()", function)
            })?;
            self.context.warn(
                HQL0204,
                format!("HQL collection function {}() is deprecated", function),
            );
        }

        let [argument] = call.arguments.as_slice() else {
            return Err(HqlError::parsing(
                HQL0401,
                format!(
                    "Expecting 1 argument to {}(), found {}",
                    function,
                    call.arguments.len()
                ),
            ));
        };

        if function == CollectionFunctionKind::Index {
            return self.build_index_function(argument);
        }

        let argument = self.build_expression(argument)?;
        let Some(collection) = argument.as_attribute().filter(|attribute| attribute.is_plural())
        else {
            return Err(HqlError::semantic(
                HQL0115,
                format!("{}() requires a plural attribute reference", function),
            ));
        };
        let collection_type = &collection.attribute_type;
        let result_type = match function {
            CollectionFunctionKind::Size | CollectionFunctionKind::Index => {
                Some(TypeDescriptor::Basic(BasicType::Integer))
            }
            CollectionFunctionKind::Elements
            | CollectionFunctionKind::MaxElement
            | CollectionFunctionKind::MinElement => collection_type.element_type().cloned(),
            CollectionFunctionKind::Indices
            | CollectionFunctionKind::MaxIndex
            | CollectionFunctionKind::MinIndex => {
                let index = collection_type.index_type().cloned().ok_or_else(|| {
                    HqlError::semantic(
                        HQL0115,
                        format!(
                            "{}() requires an indexed collection, found {}",
                            function, collection_type
                        ),
                    )
                })?;
                Some(index)
            }
        };
        Ok(Expression::CollectionFunction(CollectionFunction {
            function,
            argument: Box::new(argument),
            result_type,
        }))
    }

    /// `index(x)` where `x` is the alias of an indexed plural join
    fn build_index_function(&mut self, argument: &syntax::Expression) -> Result<Expression> {
        let syntax::Expression::Path(syntax::Path::Simple(path)) = argument else {
            return Err(HqlError::semantic(
                HQL0115,
                "index() requires an identification variable argument",
            ));
        };
        let join = self.path_resolver().resolve_from_element_path(path)?;
        let index_type = join
            .collection_type()
            .and_then(TypeDescriptor::index_type)
            .cloned()
            .ok_or_else(|| {
                HqlError::semantic(
                    HQL0115,
                    format!("index() requires an indexed plural join, found {}", join),
                )
            })?;
        Ok(Expression::CollectionFunction(CollectionFunction {
            function: CollectionFunctionKind::Index,
            argument: Box::new(Expression::FromElement(join)),
            result_type: Some(index_type),
        }))
    }

    fn build_case(&mut self, case: &syntax::CaseExpression) -> Result<Expression> {
        match case {
            syntax::CaseExpression::Simple {
                operand,
                whens,
                otherwise,
            } => {
                let operand = Box::new(self.build_expression(operand)?);
                let whens = whens
                    .iter()
                    .map(|when| {
                        Ok(SimpleCaseWhen {
                            value: self.build_expression(&when.value)?,
                            result: self.build_expression(&when.result)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut case = SimpleCase {
                    operand,
                    whens,
                    otherwise: self.build_otherwise(otherwise.as_deref())?,
                    result_type: None,
                };
                case.result_type = case.first_result_type();
                Ok(Expression::SimpleCase(case))
            }
            syntax::CaseExpression::Searched { whens, otherwise } => {
                let whens = whens
                    .iter()
                    .map(|when| {
                        Ok(SearchedCaseWhen {
                            condition: self.build_predicate(&when.condition)?,
                            result: self.build_expression(&when.result)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                let mut case = SearchedCase {
                    whens,
                    otherwise: self.build_otherwise(otherwise.as_deref())?,
                    result_type: None,
                };
                case.result_type = case.first_result_type();
                Ok(Expression::SearchedCase(case))
            }
        }
    }

    fn build_otherwise(
        &mut self,
        otherwise: Option<&syntax::Expression>,
    ) -> Result<Option<Box<Expression>>> {
        otherwise
            .map(|expression| self.build_expression(expression).map(Box::new))
            .transpose()
    }

    pub(super) fn build_subquery(
        &mut self,
        query: &syntax::QueryExpression,
    ) -> Result<SubQueryExpression> {
        let select = self.build_query_expression(query, true)?;
        let expression_type = select.selection_type(0);
        Ok(SubQueryExpression {
            query: Box::new(select),
            expression_type,
        })
    }

    pub(super) fn build_select_expression(
        &mut self,
        expression: &syntax::SelectExpression,
    ) -> Result<Expression> {
        match expression {
            syntax::SelectExpression::DynamicInstantiation(instantiation) => self
                .build_dynamic_instantiation(instantiation)
                .map(Expression::DynamicInstantiation),
            syntax::SelectExpression::Object(alias) => self
                .resolve_identification_variable(alias)
                .map(Expression::FromElement),
            syntax::SelectExpression::Expression(expression) => self.build_expression(expression),
        }
    }

    fn build_dynamic_instantiation(
        &mut self,
        instantiation: &syntax::DynamicInstantiation,
    ) -> Result<DynamicInstantiation> {
        let target = match &instantiation.target {
            syntax::InstantiationTarget::List => InstantiationTarget::List,
            syntax::InstantiationTarget::Map => {
                if let Some(position) = instantiation
                    .arguments
                    .iter()
                    .position(|argument| argument.alias.is_none())
                {
                    return Err(HqlError::semantic(
                        HQL0114,
                        format!(
                            "Map instantiation argument {} must declare an alias to use as its key",
                            position + 1
                        ),
                    ));
                }
                InstantiationTarget::Map
            }
            syntax::InstantiationTarget::Class(name) => {
                let class = self
                    .context
                    .consumer()
                    .class_by_name(&name.to_string())
                    .map_err(|err| {
                        HqlError::semantic(
                            HQL0108,
                            format!("Could not resolve dynamic instantiation target: {}", err),
                        )
                    })?;
                InstantiationTarget::Class(class)
            }
        };

        let arguments = instantiation
            .arguments
            .iter()
            .map(|argument| {
                Ok(InstantiationArgument {
                    expression: self.build_select_expression(&argument.expression)?,
                    alias: argument.alias.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DynamicInstantiation { target, arguments })
    }
}
