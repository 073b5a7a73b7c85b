//! Token sequences for single predicates and mutations.
//!
//! Every function is pure: it describes one operation on one path and leaves placeholder
//! allocation to the compiler.

use crate::expression::token::{OperatorToken, ValueMode};

use serde_json::Value;

/// Binary comparison between an operand and a value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl ComparisonOperator {
    /// Operator text surrounded by spaces.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => " = ",
            Self::Ne => " <> ",
            Self::Lt => " < ",
            Self::Le => " <= ",
            Self::Gt => " > ",
            Self::Ge => " >= ",
        }
    }

    /// The comparison holding exactly when this one does not.
    pub fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Le => Self::Gt,
            Self::Gt => Self::Le,
            Self::Ge => Self::Lt,
        }
    }
}

/// Wire type names accepted by `attribute_type`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeType {
    /// Binary.
    B,
    /// Boolean.
    Bool,
    /// Binary set.
    Bs,
    /// List.
    L,
    /// Map.
    M,
    /// Number.
    N,
    /// Number set.
    Ns,
    /// Null.
    Null,
    /// String.
    S,
    /// String set.
    Ss,
}

impl AttributeType {
    /// Name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::Bool => "BOOL",
            Self::Bs => "BS",
            Self::L => "L",
            Self::M => "M",
            Self::N => "N",
            Self::Ns => "NS",
            Self::Null => "NULL",
            Self::S => "S",
            Self::Ss => "SS",
        }
    }
}

fn not(mut tokens: Vec<OperatorToken>) -> Vec<OperatorToken> {
    tokens.insert(0, OperatorToken::Literal("NOT "));
    tokens
}

fn not_grouped(tokens: Vec<OperatorToken>) -> Vec<OperatorToken> {
    let mut negated = vec![OperatorToken::Literal("NOT ")];
    negated.extend(parenthesis(tokens));
    negated
}

/// `path <operator> :value`
pub fn compare(path: &str, operator: ComparisonOperator, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(operator.as_str()),
        OperatorToken::value(path, value),
    ]
}

/// `begins_with(path, :value)`
pub fn begins_with(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("begins_with("),
        OperatorToken::name(path),
        OperatorToken::Literal(", "),
        OperatorToken::value_with_mode(path, value, ValueMode::Prefixed),
        OperatorToken::Literal(")"),
    ]
}

/// `NOT begins_with(path, :value)`
pub fn not_begins_with(path: &str, value: Value) -> Vec<OperatorToken> {
    not(begins_with(path, value))
}

/// `path BETWEEN :low AND :high`
pub fn between(path: &str, low: Value, high: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" BETWEEN "),
        OperatorToken::value(path, low),
        OperatorToken::Literal(" AND "),
        OperatorToken::value(path, high),
    ]
}

/// `NOT (path BETWEEN :low AND :high)`
pub fn not_between(path: &str, low: Value, high: Value) -> Vec<OperatorToken> {
    not_grouped(between(path, low, high))
}

/// `contains(path, :value)`
pub fn contains(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("contains("),
        OperatorToken::name(path),
        OperatorToken::Literal(", "),
        OperatorToken::value_with_mode(path, value, ValueMode::Plain),
        OperatorToken::Literal(")"),
    ]
}

/// `NOT contains(path, :value)`
pub fn not_contains(path: &str, value: Value) -> Vec<OperatorToken> {
    not(contains(path, value))
}

/// `path IN (:a, :b, ...)`
pub fn is_in(path: &str, values: Vec<Value>) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" IN ("),
        OperatorToken::Values {
            path: path.to_string(),
            values,
        },
        OperatorToken::Literal(")"),
    ]
}

/// `NOT (path IN (:a, :b, ...))`
pub fn not_in(path: &str, values: Vec<Value>) -> Vec<OperatorToken> {
    not_grouped(is_in(path, values))
}

/// `attribute_type(path, :type)`
pub fn attribute_type(path: &str, attribute_type: AttributeType) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("attribute_type("),
        OperatorToken::name(path),
        OperatorToken::Literal(", "),
        OperatorToken::value_with_mode(path, attribute_type.as_str(), ValueMode::Plain),
        OperatorToken::Literal(")"),
    ]
}

/// `NOT attribute_type(path, :type)`
pub fn not_attribute_type(path: &str, attribute_type: AttributeType) -> Vec<OperatorToken> {
    not(self::attribute_type(path, attribute_type))
}

/// `attribute_exists(path)`
pub fn exists(path: &str) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("attribute_exists("),
        OperatorToken::name(path),
        OperatorToken::Literal(")"),
    ]
}

/// `attribute_not_exists(path)`
pub fn not_exists(path: &str) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("attribute_not_exists("),
        OperatorToken::name(path),
        OperatorToken::Literal(")"),
    ]
}

/// `size(path) <operator> :value`
pub fn size(path: &str, operator: ComparisonOperator, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::Literal("size("),
        OperatorToken::name(path),
        OperatorToken::Literal(")"),
        OperatorToken::Literal(operator.as_str()),
        OperatorToken::value_with_mode(path, value, ValueMode::Plain),
    ]
}

/// `(tokens)`
pub fn parenthesis(tokens: Vec<OperatorToken>) -> Vec<OperatorToken> {
    let mut grouped = Vec::with_capacity(tokens.len() + 2);
    grouped.push(OperatorToken::Literal("("));
    grouped.extend(tokens);
    grouped.push(OperatorToken::Literal(")"));
    grouped
}

/// `path = :value`
pub fn set(path: &str, value: Value) -> Vec<OperatorToken> {
    compare(path, ComparisonOperator::Eq, value)
}

/// `path = if_not_exists(path, :value)`
pub fn set_if_not_exists(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" = if_not_exists("),
        OperatorToken::name(path),
        OperatorToken::Literal(", "),
        OperatorToken::value(path, value),
        OperatorToken::Literal(")"),
    ]
}

/// `path = list_append(path, :value)`
pub fn list_append(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" = list_append("),
        OperatorToken::name(path),
        OperatorToken::Literal(", "),
        OperatorToken::value(path, value),
        OperatorToken::Literal(")"),
    ]
}

/// `path = list_append(:value, path)`
pub fn list_prepend(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" = list_append("),
        OperatorToken::value(path, value),
        OperatorToken::Literal(", "),
        OperatorToken::name(path),
        OperatorToken::Literal(")"),
    ]
}

/// `path = path + :value`
pub fn increment(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" = "),
        OperatorToken::name(path),
        OperatorToken::Literal(" + "),
        OperatorToken::value_with_mode(path, value, ValueMode::Plain),
    ]
}

/// `path = path - :value`
pub fn decrement(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" = "),
        OperatorToken::name(path),
        OperatorToken::Literal(" - "),
        OperatorToken::value_with_mode(path, value, ValueMode::Plain),
    ]
}

/// `path :value`, the element form shared by `ADD` and `DELETE`.
pub fn add_or_delete(path: &str, value: Value) -> Vec<OperatorToken> {
    vec![
        OperatorToken::name(path),
        OperatorToken::Literal(" "),
        OperatorToken::value(path, value),
    ]
}

/// `path`, the element form of `REMOVE`.
pub fn remove(path: &str) -> Vec<OperatorToken> {
    vec![OperatorToken::name(path)]
}

/// `keyword item, item, ...`; an empty clause yields no tokens.
pub fn clause(keyword: &'static str, items: Vec<Vec<OperatorToken>>) -> Vec<OperatorToken> {
    let mut tokens = Vec::new();
    for (position, item) in items.into_iter().enumerate() {
        tokens.push(OperatorToken::Literal(if position == 0 { keyword } else { ", " }));
        tokens.extend(item);
    }
    tokens
}
