use crate::expression::{
    operator::{self, AttributeType, ComparisonOperator},
    token::OperatorToken,
};

use serde_json::Value;
use std::ops;

/// Logical operator for combining conditions.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LogicalOperator {
    /// Logical AND - all conditions must be true.
    #[default]
    And,
    /// Logical OR - at least one condition must be true.
    Or,
}

impl LogicalOperator {
    fn as_str(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

impl ops::Deref for LogicalOperator {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

/// Condition built one predicate at a time.
///
/// Predicates are joined with the pending logical operator, `AND` until [`Condition::or`] is
/// called; the choice stays in effect until changed again.
///
/// ```rust
/// use dynamodb_entity::expression::{compiler::ExpressionCompiler, condition::Condition};
///
/// let condition = Condition::new()
///     .attribute("status").eq("open")
///     .or()
///     .attribute("total").size().gt(3);
/// let mut compiler = ExpressionCompiler::default();
/// assert_eq!(
///     compiler.render(condition).unwrap(),
///     "#status = :status OR size(total) > :total"
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Condition {
    tokens: Vec<OperatorToken>,
    pending: LogicalOperator,
}

impl Condition {
    /// Empty condition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the following predicates with `AND`.
    pub fn and(mut self) -> Self {
        self.pending = LogicalOperator::And;
        self
    }

    /// Join the following predicates with `OR`.
    pub fn or(mut self) -> Self {
        self.pending = LogicalOperator::Or;
        self
    }

    /// Start a predicate on `path`.
    pub fn attribute(self, path: impl Into<String>) -> AttributeCondition {
        AttributeCondition {
            condition: self,
            path: path.into(),
        }
    }

    /// Append `other` wrapped in parentheses.
    pub fn parenthesis(self, other: Condition) -> Self {
        if other.is_empty() {
            return self;
        }
        self.push(operator::parenthesis(other.tokens))
    }

    /// Append the predicates of `other` as they are.
    pub fn condition(self, other: Condition) -> Self {
        if other.is_empty() {
            return self;
        }
        self.push(other.tokens)
    }

    /// Whether no predicate was added.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens accumulated so far.
    pub fn tokens(&self) -> &[OperatorToken] {
        &self.tokens
    }

    fn push(mut self, tokens: Vec<OperatorToken>) -> Self {
        if !self.tokens.is_empty() {
            self.tokens.push(OperatorToken::Literal(self.pending.as_str()));
        }
        self.tokens.extend(tokens);
        self
    }
}

impl IntoIterator for Condition {
    type Item = OperatorToken;
    type IntoIter = std::vec::IntoIter<OperatorToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// A condition waiting for the predicate on one path.
#[derive(Clone, Debug, PartialEq)]
#[must_use = "a predicate must be chosen to extend the condition"]
pub struct AttributeCondition {
    condition: Condition,
    path: String,
}

impl AttributeCondition {
    fn compare(self, comparison: ComparisonOperator, value: impl Into<Value>) -> Condition {
        let tokens = operator::compare(&self.path, comparison, value.into());
        self.condition.push(tokens)
    }

    /// `path = value`
    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Eq, value)
    }

    /// `path <> value`
    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Ne, value)
    }

    /// `path < value`
    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Lt, value)
    }

    /// `path <= value`
    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Le, value)
    }

    /// `path > value`
    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Gt, value)
    }

    /// `path >= value`
    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.compare(ComparisonOperator::Ge, value)
    }

    /// `begins_with(path, prefix)`; the attribute's own prefix is prepended to `prefix`.
    pub fn begins_with(self, prefix: impl Into<String>) -> Condition {
        let tokens = operator::begins_with(&self.path, Value::String(prefix.into()));
        self.condition.push(tokens)
    }

    /// `path BETWEEN low AND high`
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
        let tokens = operator::between(&self.path, low.into(), high.into());
        self.condition.push(tokens)
    }

    /// `contains(path, value)`
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        let tokens = operator::contains(&self.path, value.into());
        self.condition.push(tokens)
    }

    /// `path IN (values...)`
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Condition {
        let values = values.into_iter().map(Into::into).collect();
        let tokens = operator::is_in(&self.path, values);
        self.condition.push(tokens)
    }

    /// `attribute_type(path, type)`
    pub fn attribute_type(self, attribute_type: AttributeType) -> Condition {
        let tokens = operator::attribute_type(&self.path, attribute_type);
        self.condition.push(tokens)
    }

    /// `attribute_exists(path)`
    pub fn exists(self) -> Condition {
        let tokens = operator::exists(&self.path);
        self.condition.push(tokens)
    }

    /// Negate the next predicate.
    pub fn not(self) -> NegatedCondition {
        NegatedCondition { inner: self }
    }

    /// Compare the size of the attribute instead of its value.
    pub fn size(self) -> SizeCondition {
        SizeCondition { inner: self }
    }
}

/// A negated predicate on one path.
///
/// Comparisons flip to their complement; functions are prefixed with `NOT`.
#[derive(Clone, Debug, PartialEq)]
#[must_use = "a predicate must be chosen to extend the condition"]
pub struct NegatedCondition {
    inner: AttributeCondition,
}

impl NegatedCondition {
    /// `path <> value`
    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Eq.negate(), value)
    }

    /// `path = value`
    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Ne.negate(), value)
    }

    /// `path >= value`
    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Lt.negate(), value)
    }

    /// `path > value`
    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Le.negate(), value)
    }

    /// `path <= value`
    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Gt.negate(), value)
    }

    /// `path < value`
    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.inner.compare(ComparisonOperator::Ge.negate(), value)
    }

    /// `NOT begins_with(path, prefix)`
    pub fn begins_with(self, prefix: impl Into<String>) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::not_begins_with(&path, Value::String(prefix.into())))
    }

    /// `NOT (path BETWEEN low AND high)`
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::not_between(&path, low.into(), high.into()))
    }

    /// `NOT contains(path, value)`
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::not_contains(&path, value.into()))
    }

    /// `NOT (path IN (values...))`
    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        let values = values.into_iter().map(Into::into).collect();
        condition.push(operator::not_in(&path, values))
    }

    /// `NOT attribute_type(path, type)`
    pub fn attribute_type(self, attribute_type: AttributeType) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::not_attribute_type(&path, attribute_type))
    }

    /// `attribute_not_exists(path)`
    pub fn exists(self) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::not_exists(&path))
    }
}

/// A numeric comparison against `size(path)`.
#[derive(Clone, Debug, PartialEq)]
#[must_use = "a comparison must be chosen to extend the condition"]
pub struct SizeCondition {
    inner: AttributeCondition,
}

impl SizeCondition {
    fn compare(self, comparison: ComparisonOperator, size: u64) -> Condition {
        let AttributeCondition { condition, path } = self.inner;
        condition.push(operator::size(&path, comparison, Value::from(size)))
    }

    /// `size(path) = size`
    pub fn eq(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Eq, size)
    }

    /// `size(path) <> size`
    pub fn ne(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Ne, size)
    }

    /// `size(path) < size`
    pub fn lt(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Lt, size)
    }

    /// `size(path) <= size`
    pub fn le(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Le, size)
    }

    /// `size(path) > size`
    pub fn gt(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Gt, size)
    }

    /// `size(path) >= size`
    pub fn ge(self, size: u64) -> Condition {
        self.compare(ComparisonOperator::Ge, size)
    }
}
