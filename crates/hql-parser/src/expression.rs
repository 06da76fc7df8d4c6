//! Expression and predicate parser using recursive descent with precedence climbing
//!
//! Precedence, lowest first: `or`, `and`, `not`, predicate operators,
//! `||`, additive, multiplicative, unary sign, primary.

use crate::combinators::{
    Input, PResult, any_identifier, backtrack, identifier, keyword, lit, padded_keyword,
    peek_keyword, peek_punct, punct, ws,
};
use crate::literal::literal_token;
use crate::statement::query_expression;
use hql_syntax::{
    ArithmeticOperator, CaseExpression, ComparisonOperator, DotIdentifier, Expression,
    FunctionCall, InList, MapFunction, Parameter, Path, Predicate, SearchedCaseWhen,
    SimpleCaseWhen, UnaryExpression, UnaryOperator,
};
use winnow::prelude::*;
use winnow::token::take_while;

// === Predicates ===

pub fn predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    or_predicate(input)
}

fn or_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    let mut left = and_predicate(input)?;
    while padded_keyword("or").parse_next(input).is_ok() {
        let right = and_predicate(input)?;
        left = Predicate::or(left, right);
    }
    Ok(left)
}

fn and_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    let mut left = not_predicate(input)?;
    while padded_keyword("and").parse_next(input).is_ok() {
        let right = not_predicate(input)?;
        left = Predicate::and(left, right);
    }
    Ok(left)
}

fn not_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    let checkpoint = *input;
    if padded_keyword("not").parse_next(input).is_ok() {
        if padded_keyword("exists").parse_next(input).is_ok() {
            let expression = exists_operand(input)?;
            return Ok(Predicate::Exists {
                expression,
                negated: true,
            });
        }
        match not_predicate(input) {
            Ok(inner) => return Ok(Predicate::Not(Box::new(inner))),
            Err(e) => {
                *input = checkpoint;
                return Err(e);
            }
        }
    }
    primary_predicate(input)
}

fn primary_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    if padded_keyword("exists").parse_next(input).is_ok() {
        let expression = exists_operand(input)?;
        return Ok(Predicate::Exists {
            expression,
            negated: false,
        });
    }

    if peek_punct(input, "(") {
        let checkpoint = *input;
        if let Ok(grouped) = grouped_predicate(input) {
            if !continues_expression(input) {
                return Ok(grouped);
            }
        }
        *input = checkpoint;
    }

    expression_predicate(input)
}

/// `( predicate )`, rejected when the parentheses hold a sub-query
fn grouped_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    punct("(").parse_next(input)?;
    if peek_keyword(input, "select") || peek_keyword(input, "from") {
        return Err(backtrack());
    }
    let inner = predicate(input)?;
    punct(")").parse_next(input)?;
    Ok(Predicate::Grouped(Box::new(inner)))
}

/// After a parenthesized group, whether the text goes on as an expression operand
fn continues_expression(input: &Input<'_>) -> bool {
    let rest = input.trim_start();
    ["=", "<", ">", "!", "^", "+", "-", "*", "/", "|"]
        .iter()
        .any(|op| rest.starts_with(op))
        || ["is", "not", "between", "like", "in", "member"]
            .iter()
            .any(|word| peek_keyword(input, word))
}

fn exists_operand(input: &mut Input<'_>) -> PResult<Expression> {
    expression(input)
}

fn expression_predicate(input: &mut Input<'_>) -> PResult<Predicate> {
    let expression = expression(input)?;

    if padded_keyword("is").parse_next(input).is_ok() {
        let negated = padded_keyword("not").parse_next(input).is_ok();
        if padded_keyword("null").parse_next(input).is_ok() {
            return Ok(Predicate::IsNull {
                expression,
                negated,
            });
        }
        padded_keyword("empty").parse_next(input)?;
        return Ok(Predicate::IsEmpty {
            expression,
            negated,
        });
    }

    let checkpoint = *input;
    let negated = padded_keyword("not").parse_next(input).is_ok();

    if padded_keyword("between").parse_next(input).is_ok() {
        let lower = concatenation(input)?;
        padded_keyword("and").parse_next(input)?;
        let upper = concatenation(input)?;
        return Ok(Predicate::Between {
            expression,
            lower,
            upper,
            negated,
        });
    }

    if padded_keyword("like").parse_next(input).is_ok() {
        let pattern = concatenation(input)?;
        let escape = if padded_keyword("escape").parse_next(input).is_ok() {
            Some(concatenation(input)?)
        } else {
            None
        };
        return Ok(Predicate::Like {
            expression,
            pattern,
            escape,
            negated,
        });
    }

    if padded_keyword("in").parse_next(input).is_ok() {
        let list = in_list(input)?;
        return Ok(Predicate::In {
            expression,
            list,
            negated,
        });
    }

    if padded_keyword("member").parse_next(input).is_ok() {
        let _ = padded_keyword("of").parse_next(input);
        let collection = concatenation(input)?;
        return Ok(Predicate::MemberOf {
            element: expression,
            collection,
            negated,
        });
    }

    if negated {
        *input = checkpoint;
        return Err(backtrack());
    }

    let operator = comparison_operator(input)?;
    let right = self::expression(input)?;
    Ok(Predicate::compare(operator, expression, right))
}

fn comparison_operator(input: &mut Input<'_>) -> PResult<ComparisonOperator> {
    ws(input)?;
    let operators = [
        ("<>", ComparisonOperator::NotEqual),
        ("!=", ComparisonOperator::NotEqual),
        ("^=", ComparisonOperator::NotEqual),
        ("<=", ComparisonOperator::LessThanOrEqual),
        (">=", ComparisonOperator::GreaterThanOrEqual),
        ("=", ComparisonOperator::Equal),
        ("<", ComparisonOperator::LessThan),
        (">", ComparisonOperator::GreaterThan),
    ];
    for (symbol, operator) in operators {
        if lit(symbol).parse_next(input).is_ok() {
            return Ok(operator);
        }
    }
    Err(backtrack())
}

fn in_list(input: &mut Input<'_>) -> PResult<InList> {
    if punct("(").parse_next(input).is_ok() {
        if peek_keyword(input, "select") || peek_keyword(input, "from") {
            let query = query_expression(input)?;
            punct(")").parse_next(input)?;
            return Ok(InList::SubQuery(Box::new(Expression::SubQuery(Box::new(
                query,
            )))));
        }
        let items = expression_list(input)?;
        punct(")").parse_next(input)?;
        return Ok(InList::Expressions(items));
    }
    Ok(InList::Expressions(vec![concatenation(input)?]))
}

fn expression_list(input: &mut Input<'_>) -> PResult<Vec<Expression>> {
    let mut items = vec![expression(input)?];
    while punct(",").parse_next(input).is_ok() {
        items.push(expression(input)?);
    }
    Ok(items)
}

// === Expressions ===

pub fn expression(input: &mut Input<'_>) -> PResult<Expression> {
    concatenation(input)
}

fn concatenation(input: &mut Input<'_>) -> PResult<Expression> {
    let mut left = additive(input)?;
    while punct("||").parse_next(input).is_ok() {
        let right = additive(input)?;
        left = Expression::concat(left, right);
    }
    Ok(left)
}

fn additive(input: &mut Input<'_>) -> PResult<Expression> {
    let mut left = multiplicative(input)?;
    loop {
        let operator = if punct("+").parse_next(input).is_ok() {
            ArithmeticOperator::Add
        } else if punct("-").parse_next(input).is_ok() {
            ArithmeticOperator::Subtract
        } else {
            break;
        };
        let right = multiplicative(input)?;
        left = Expression::arithmetic(operator, left, right);
    }
    Ok(left)
}

fn multiplicative(input: &mut Input<'_>) -> PResult<Expression> {
    let mut left = unary(input)?;
    loop {
        let operator = if punct("*").parse_next(input).is_ok() {
            ArithmeticOperator::Multiply
        } else if punct("/").parse_next(input).is_ok() {
            ArithmeticOperator::Divide
        } else {
            break;
        };
        let right = unary(input)?;
        left = Expression::arithmetic(operator, left, right);
    }
    Ok(left)
}

fn unary(input: &mut Input<'_>) -> PResult<Expression> {
    let operator = if punct("+").parse_next(input).is_ok() {
        Some(UnaryOperator::Plus)
    } else if punct("-").parse_next(input).is_ok() {
        Some(UnaryOperator::Minus)
    } else {
        None
    };
    match operator {
        Some(operator) => Ok(Expression::Unary(UnaryExpression {
            operator,
            operand: Box::new(unary(input)?),
        })),
        None => primary(input),
    }
}

fn primary(input: &mut Input<'_>) -> PResult<Expression> {
    ws(input)?;

    if punct("(").parse_next(input).is_ok() {
        if peek_keyword(input, "select") || peek_keyword(input, "from") {
            let query = query_expression(input)?;
            punct(")").parse_next(input)?;
            return Ok(Expression::SubQuery(Box::new(query)));
        }
        let inner = expression(input)?;
        punct(")").parse_next(input)?;
        return Ok(Expression::Grouped(Box::new(inner)));
    }

    if let Some(parameter) = parameter(input)? {
        return Ok(Expression::Parameter(parameter));
    }

    if let Ok(literal) = literal_token(input) {
        return Ok(Expression::Literal(literal));
    }

    if keyword("case").parse_next(input).is_ok() {
        return case_expression(input).map(Expression::Case);
    }

    path_or_function(input)
}

/// `:name` or `?n`; `Ok(None)` when the input does not start a parameter
fn parameter(input: &mut Input<'_>) -> PResult<Option<Parameter>> {
    if lit(":").parse_next(input).is_ok() {
        let name = any_identifier(input)?;
        return Ok(Some(Parameter::Named(name)));
    }
    if lit("?").parse_next(input).is_ok() {
        let position = position_digits(input)?;
        let position = position.parse::<u32>().map_err(|_| backtrack())?;
        return Ok(Some(Parameter::Positional(position)));
    }
    Ok(None)
}

fn position_digits<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)
}

fn case_expression(input: &mut Input<'_>) -> PResult<CaseExpression> {
    if peek_keyword(input, "when") {
        let mut whens = Vec::new();
        while padded_keyword("when").parse_next(input).is_ok() {
            let condition = predicate(input)?;
            padded_keyword("then").parse_next(input)?;
            let result = expression(input)?;
            whens.push(SearchedCaseWhen { condition, result });
        }
        let otherwise = case_otherwise(input)?;
        return Ok(CaseExpression::Searched { whens, otherwise });
    }

    let operand = Box::new(expression(input)?);
    let mut whens = Vec::new();
    while padded_keyword("when").parse_next(input).is_ok() {
        let value = expression(input)?;
        padded_keyword("then").parse_next(input)?;
        let result = expression(input)?;
        whens.push(SimpleCaseWhen { value, result });
    }
    if whens.is_empty() {
        return Err(backtrack());
    }
    let otherwise = case_otherwise(input)?;
    Ok(CaseExpression::Simple {
        operand,
        whens,
        otherwise,
    })
}

fn case_otherwise(input: &mut Input<'_>) -> PResult<Option<Box<Expression>>> {
    let otherwise = if padded_keyword("else").parse_next(input).is_ok() {
        Some(Box::new(expression(input)?))
    } else {
        None
    };
    padded_keyword("end").parse_next(input)?;
    Ok(otherwise)
}

/// Dotted continuation after the first segment; any identifier-shaped token is accepted
pub fn dotted_tail(input: &mut Input<'_>, first: String) -> PResult<DotIdentifier> {
    let mut parts = vec![first];
    loop {
        let checkpoint = *input;
        if punct(".").parse_next(input).is_err() {
            break;
        }
        match any_identifier(input) {
            Ok(part) => parts.push(part),
            Err(_) => {
                *input = checkpoint;
                break;
            }
        }
    }
    Ok(DotIdentifier::new(parts))
}

/// A dotted path whose first segment is not a reserved word
pub fn dotted_identifier(input: &mut Input<'_>) -> PResult<DotIdentifier> {
    let first = identifier(input)?;
    dotted_tail(input, first)
}

/// A dotted name where even the first segment may be a reserved word (entity and class names)
pub fn dotted_name(input: &mut Input<'_>) -> PResult<DotIdentifier> {
    let first = any_identifier(input)?;
    dotted_tail(input, first)
}

fn optional_remainder(input: &mut Input<'_>) -> PResult<Option<DotIdentifier>> {
    let checkpoint = *input;
    if punct(".").parse_next(input).is_err() {
        return Ok(None);
    }
    match dotted_name(input) {
        Ok(rest) => Ok(Some(rest)),
        Err(_) => {
            *input = checkpoint;
            Ok(None)
        }
    }
}

fn path_or_function(input: &mut Input<'_>) -> PResult<Expression> {
    let first = identifier(input)?;

    if peek_punct(input, "(") {
        let lower = first.to_ascii_lowercase();
        return match lower.as_str() {
            "treat" => treated_path(input).map(Expression::Path),
            "key" | "value" | "entry" => map_function(input, &lower).map(Expression::Path),
            "function" => generic_function(input).map(Expression::Function),
            _ => function_call(input, first).map(Expression::Function),
        };
    }

    let base = dotted_tail(input, first)?;
    if punct("[").parse_next(input).is_ok() {
        let index = expression(input)?;
        punct("]").parse_next(input)?;
        let remainder = optional_remainder(input)?;
        return Ok(Expression::Path(Path::Indexed {
            base,
            index: Box::new(index),
            remainder,
        }));
    }
    Ok(Expression::Path(Path::Simple(base)))
}

/// `treat(base as Target)[.remainder]`
fn treated_path(input: &mut Input<'_>) -> PResult<Path> {
    punct("(").parse_next(input)?;
    let base = dotted_identifier(input)?;
    padded_keyword("as").parse_next(input)?;
    let target = dotted_name(input)?;
    punct(")").parse_next(input)?;
    let remainder = optional_remainder(input)?;
    Ok(Path::Treated {
        base,
        target,
        remainder,
    })
}

fn map_function(input: &mut Input<'_>, name: &str) -> PResult<Path> {
    let function = match name {
        "key" => MapFunction::Key,
        "value" => MapFunction::Value,
        _ => MapFunction::Entry,
    };
    punct("(").parse_next(input)?;
    let argument = dotted_identifier(input)?;
    punct(")").parse_next(input)?;
    Ok(Path::MapFunction { function, argument })
}

/// JPQL `function('name'[, args…])`
fn generic_function(input: &mut Input<'_>) -> PResult<FunctionCall> {
    punct("(").parse_next(input)?;
    ws(input)?;
    let name = literal_token(input)?;
    let arguments = if punct(",").parse_next(input).is_ok() {
        expression_list(input)?
    } else {
        Vec::new()
    };
    punct(")").parse_next(input)?;
    let mut call = FunctionCall::new(name.text, arguments);
    call.generic = true;
    Ok(call)
}

fn function_call(input: &mut Input<'_>, name: String) -> PResult<FunctionCall> {
    punct("(").parse_next(input)?;
    let mut call = FunctionCall::new(name, Vec::new());

    if punct("*").parse_next(input).is_ok() {
        call.star = true;
    } else if !peek_punct(input, ")") {
        call.distinct = padded_keyword("distinct").parse_next(input).is_ok();
        call.arguments = expression_list(input)?;
    }

    punct(")").parse_next(input)?;
    Ok(call)
}
