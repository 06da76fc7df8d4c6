//! Expression parse tree nodes

use crate::{ArithmeticOperator, DotIdentifier, Predicate, QueryExpression, UnaryOperator};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Parameter(Parameter),
    Path(Path),
    /// Binary arithmetic; the grammar yields exactly two operands
    Arithmetic(ArithmeticExpression),
    /// `a || b`; the grammar yields exactly two operands
    Concatenation(ConcatenationExpression),
    Unary(UnaryExpression),
    Grouped(Box<Expression>),
    Function(FunctionCall),
    Case(CaseExpression),
    SubQuery(Box<QueryExpression>),
}

impl Expression {
    pub fn literal(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self::Literal(Literal::new(kind, text))
    }

    pub fn path(dotted: &str) -> Self {
        Self::Path(Path::Simple(DotIdentifier::parse(dotted)))
    }

    pub fn arithmetic(op: ArithmeticOperator, left: Expression, right: Expression) -> Self {
        Self::Arithmetic(ArithmeticExpression {
            operator: op,
            operands: vec![left, right],
        })
    }

    pub fn concat(left: Expression, right: Expression) -> Self {
        Self::Concatenation(ConcatenationExpression {
            operands: vec![left, right],
        })
    }
}

/// A literal token as written, classified by its lexical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Token text including any type suffix; string content is unquoted
    pub text: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    Character,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    /// `0x…`, optionally suffixed with `L`
    Hex,
    /// leading-zero digits, optionally suffixed with `L`
    Octal,
    True,
    False,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// `:name`
    Named(String),
    /// `?n`
    Positional(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Path {
    /// `a.b.c`
    Simple(DotIdentifier),
    /// `a.items[index].rest`
    Indexed {
        base: DotIdentifier,
        index: Box<Expression>,
        remainder: Option<DotIdentifier>,
    },
    /// `treat(a as Sub).rest`
    Treated {
        base: DotIdentifier,
        target: DotIdentifier,
        remainder: Option<DotIdentifier>,
    },
    /// `key(m)`, `value(m)`, `entry(m)`
    MapFunction {
        function: MapFunction,
        argument: DotIdentifier,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapFunction {
    Key,
    Value,
    Entry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticExpression {
    pub operator: ArithmeticOperator,
    pub operands: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConcatenationExpression {
    pub operands: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
}

/// `name([distinct] args…)`, `count(*)` or JPQL `function('name', args…)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// Written through the JPQL `function(…)` escape
    pub generic: bool,
    pub distinct: bool,
    /// `count(*)`
    pub star: bool,
    pub arguments: Vec<Expression>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            generic: false,
            distinct: false,
            star: false,
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaseExpression {
    /// `case operand when value then result … [else result] end`
    Simple {
        operand: Box<Expression>,
        whens: Vec<SimpleCaseWhen>,
        otherwise: Option<Box<Expression>>,
    },
    /// `case when predicate then result … [else result] end`
    Searched {
        whens: Vec<SearchedCaseWhen>,
        otherwise: Option<Box<Expression>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleCaseWhen {
    pub value: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchedCaseWhen {
    pub condition: Predicate,
    pub result: Expression,
}
