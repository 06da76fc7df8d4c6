//! Typed expression nodes

use crate::tree::{FromElement, Predicate, SelectStatement};
use hql_model::{AttributeDescriptor, BasicType, ClassHandle, EntityTypeDescriptor, TypeDescriptor};
use hql_syntax::{ArithmeticOperator, UnaryOperator};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Parameter(Parameter),
    /// An alias used as a value, e.g. `select p`
    FromElement(Arc<FromElement>),
    /// An entity name used as a value
    EntityType(EntityTypeDescriptor),
    Attribute(AttributeReference),
    Indexed(IndexedReference),
    Constant(ConstantReference),
    MapEntry(MapEntryReference),
    CollectionFunction(CollectionFunction),
    Function(FunctionExpression),
    Arithmetic(BinaryArithmetic),
    Concatenation(Concatenation),
    Unary(UnaryExpression),
    SimpleCase(SimpleCase),
    SearchedCase(SearchedCase),
    SubQuery(SubQueryExpression),
    /// Order-by reference to a result variable
    SelectionReference(SelectionReference),
    DynamicInstantiation(DynamicInstantiation),
}

impl Expression {
    /// Inferred type; `None` where inference is left to a later stage
    pub fn expression_type(&self) -> Option<TypeDescriptor> {
        match self {
            Self::Literal(literal) => literal.value.literal_type().map(TypeDescriptor::Basic),
            Self::Parameter(_) => None,
            Self::FromElement(element) => Some(element.bound_type().clone()),
            Self::EntityType(entity) => Some(entity.to_type()),
            Self::Attribute(attribute) => Some(attribute.attribute_type.clone()),
            Self::Indexed(indexed) => Some(indexed.element_type.clone()),
            Self::Constant(constant) => Some(TypeDescriptor::Basic(constant.constant_type.clone())),
            Self::MapEntry(entry) => entry.result_type.clone(),
            Self::CollectionFunction(function) => function.result_type.clone(),
            Self::Function(function) => function.result_type.clone(),
            Self::Arithmetic(arithmetic) => arithmetic.result_type.clone(),
            Self::Concatenation(_) => Some(TypeDescriptor::Basic(BasicType::String)),
            Self::Unary(unary) => unary.operand.expression_type(),
            Self::SimpleCase(case) => case.result_type.clone(),
            Self::SearchedCase(case) => case.result_type.clone(),
            Self::SubQuery(subquery) => subquery.expression_type.clone(),
            Self::SelectionReference(reference) => reference.expression_type.clone(),
            Self::DynamicInstantiation(instantiation) => instantiation.result_type(),
        }
    }

    /// The attribute reference when this expression is one
    pub fn as_attribute(&self) -> Option<&AttributeReference> {
        match self {
            Self::Attribute(attribute) => Some(attribute),
            _ => None,
        }
    }
}

/// Literal with its parsed value and original text
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Character(char),
    Integer(i32),
    Long(i64),
    BigInteger(BigInt),
    Float(f32),
    Double(f64),
    BigDecimal(Decimal),
    Boolean(bool),
    Null,
}

impl LiteralValue {
    pub fn literal_type(&self) -> Option<BasicType> {
        Some(match self {
            Self::String(_) => BasicType::String,
            Self::Character(_) => BasicType::Character,
            Self::Integer(_) => BasicType::Integer,
            Self::Long(_) => BasicType::Long,
            Self::BigInteger(_) => BasicType::BigInteger,
            Self::Float(_) => BasicType::Float,
            Self::Double(_) => BasicType::Double,
            Self::BigDecimal(_) => BasicType::BigDecimal,
            Self::Boolean(_) => BasicType::Boolean,
            Self::Null => return None,
        })
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Character(c) => write!(f, "'{}'", c),
            Self::Integer(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}L", v),
            Self::BigInteger(v) => write!(f, "{}BI", v),
            Self::Float(v) => write!(f, "{}F", v),
            Self::Double(v) => write!(f, "{}D", v),
            Self::BigDecimal(v) => write!(f, "{}BD", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    Named(String),
    /// 1-based
    Positional(u32),
}

/// Where an attribute reference navigates from
#[derive(Debug, Clone)]
pub enum PathSource {
    FromElement(Arc<FromElement>),
    Indexed(Box<IndexedReference>),
    Attribute(Box<AttributeReference>),
}

/// `source.attribute`
#[derive(Debug, Clone)]
pub struct AttributeReference {
    pub source: PathSource,
    pub attribute: AttributeDescriptor,
    pub attribute_type: TypeDescriptor,
}

impl AttributeReference {
    pub fn is_plural(&self) -> bool {
        self.attribute_type.is_collection()
    }

    /// The from element this reference is rooted at, if any
    pub fn source_element(&self) -> Option<&Arc<FromElement>> {
        match &self.source {
            PathSource::FromElement(element) => Some(element),
            PathSource::Indexed(indexed) => indexed.collection.source_element(),
            PathSource::Attribute(attribute) => attribute.source_element(),
        }
    }
}

/// `collection[index]`
#[derive(Debug, Clone)]
pub struct IndexedReference {
    pub collection: AttributeReference,
    pub index: Box<Expression>,
    pub element_type: TypeDescriptor,
}

/// A static field or enum constant of a host class
#[derive(Debug, Clone)]
pub struct ConstantReference {
    pub class: ClassHandle,
    pub member: String,
    pub constant_type: BasicType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEntryFunction {
    Key,
    Value,
    Entry,
}

/// `key(m)`, `value(m)` or `entry(m)` over a map join
#[derive(Debug, Clone)]
pub struct MapEntryReference {
    pub function: MapEntryFunction,
    pub join: Arc<FromElement>,
    pub result_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFunctionKind {
    Size,
    Index,
    Elements,
    Indices,
    MaxElement,
    MinElement,
    MaxIndex,
    MinIndex,
}

impl CollectionFunctionKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "size" => Self::Size,
            "index" => Self::Index,
            "elements" => Self::Elements,
            "indices" => Self::Indices,
            "maxelement" => Self::MaxElement,
            "minelement" => Self::MinElement,
            "maxindex" => Self::MaxIndex,
            "minindex" => Self::MinIndex,
            _ => return None,
        })
    }

    /// Functions HQL carries beyond JPQL
    pub fn is_hql_only(&self) -> bool {
        !matches!(self, Self::Size | Self::Index)
    }
}

impl fmt::Display for CollectionFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Size => "size",
            Self::Index => "index",
            Self::Elements => "elements",
            Self::Indices => "indices",
            Self::MaxElement => "maxelement",
            Self::MinElement => "minelement",
            Self::MaxIndex => "maxindex",
            Self::MinIndex => "minindex",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct CollectionFunction {
    pub function: CollectionFunctionKind,
    pub argument: Box<Expression>,
    pub result_type: Option<TypeDescriptor>,
}

/// A function call; `result_type` is `None` when resolution is left downstream
#[derive(Debug, Clone)]
pub struct FunctionExpression {
    pub name: String,
    pub arguments: Vec<Expression>,
    pub distinct: bool,
    pub star: bool,
    pub standard: bool,
    pub result_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone)]
pub struct BinaryArithmetic {
    pub operator: ArithmeticOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub result_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone)]
pub struct Concatenation {
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone)]
pub struct SimpleCase {
    pub operand: Box<Expression>,
    pub whens: Vec<SimpleCaseWhen>,
    pub otherwise: Option<Box<Expression>>,
    pub result_type: Option<TypeDescriptor>,
}

impl SimpleCase {
    /// Type of the first result that has one
    pub fn first_result_type(&self) -> Option<TypeDescriptor> {
        first_typed(
            self.whens
                .iter()
                .map(|when| &when.result)
                .chain(self.otherwise.as_deref()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct SimpleCaseWhen {
    pub value: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone)]
pub struct SearchedCase {
    pub whens: Vec<SearchedCaseWhen>,
    pub otherwise: Option<Box<Expression>>,
    pub result_type: Option<TypeDescriptor>,
}

impl SearchedCase {
    pub fn first_result_type(&self) -> Option<TypeDescriptor> {
        first_typed(
            self.whens
                .iter()
                .map(|when| &when.result)
                .chain(self.otherwise.as_deref()),
        )
    }
}

fn first_typed<'e>(results: impl IntoIterator<Item = &'e Expression>) -> Option<TypeDescriptor> {
    results.into_iter().find_map(Expression::expression_type)
}

#[derive(Debug, Clone)]
pub struct SearchedCaseWhen {
    pub condition: Predicate,
    pub result: Expression,
}

#[derive(Debug, Clone)]
pub struct SubQueryExpression {
    pub query: Box<SelectStatement>,
    /// Type of the first selection
    pub expression_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone)]
pub struct SelectionReference {
    pub alias: String,
    /// 0-based position in the select list
    pub position: usize,
    pub expression_type: Option<TypeDescriptor>,
}

#[derive(Debug, Clone)]
pub enum InstantiationTarget {
    List,
    Map,
    Class(ClassHandle),
}

/// `new list(…)`, `new map(…)` or `new a.b.C(…)`
#[derive(Debug, Clone)]
pub struct DynamicInstantiation {
    pub target: InstantiationTarget,
    pub arguments: Vec<InstantiationArgument>,
}

impl DynamicInstantiation {
    pub fn result_type(&self) -> Option<TypeDescriptor> {
        match &self.target {
            InstantiationTarget::Class(class) => {
                Some(TypeDescriptor::Basic(BasicType::Named(class.name.clone())))
            }
            InstantiationTarget::List | InstantiationTarget::Map => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstantiationArgument {
    pub expression: Expression,
    pub alias: Option<String>,
}
