use crate::{
    converter::EntityConverter,
    error::{Error, Result},
    expression::{
        operator::{self, ComparisonOperator},
        token::OperatorToken,
    },
    metadata::entity::Entity,
    read,
};

use aws_sdk_dynamodb::types;
use serde_json::Value;
use std::marker;

/// Condition on the sort key of a query.
///
/// ```rust
/// use dynamodb_entity::read::query::SortKeyCondition;
///
/// let prefix = SortKeyCondition::BeginsWith("2024-".to_string());
/// let range = SortKeyCondition::Between(1.into(), 10.into());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SortKeyCondition {
    /// Checks if the sort key begins with a prefix (string keys only).
    BeginsWith(String),
    /// Checks if the sort key is between two values (inclusive).
    Between(Value, Value),
    /// Checks if the sort key equals a value.
    Equals(Value),
    /// Checks if the sort key is greater than a value.
    GreaterThan(Value),
    /// Checks if the sort key is greater than or equal to a value.
    GreaterThanOrEqual(Value),
    /// Checks if the sort key is less than a value.
    LessThan(Value),
    /// Checks if the sort key is less than or equal to a value.
    LessThanOrEqual(Value),
}

impl SortKeyCondition {
    fn into_tokens(self, path: &str) -> Vec<OperatorToken> {
        match self {
            Self::BeginsWith(prefix) => operator::begins_with(path, Value::String(prefix)),
            Self::Between(low, high) => operator::between(path, low, high),
            Self::Equals(value) => operator::compare(path, ComparisonOperator::Eq, value),
            Self::GreaterThan(value) => operator::compare(path, ComparisonOperator::Gt, value),
            Self::GreaterThanOrEqual(value) => {
                operator::compare(path, ComparisonOperator::Ge, value)
            }
            Self::LessThan(value) => operator::compare(path, ComparisonOperator::Lt, value),
            Self::LessThanOrEqual(value) => operator::compare(path, ComparisonOperator::Le, value),
        }
    }
}

/// Request fields of a Query call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryInput {
    /// Key condition on the table or index keys.
    pub key_condition_expression: String,
    /// Table, index, filter and projection settings, with the placeholders of every expression.
    pub multiple_read_input: read::common::MultipleReadInput,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to read in ascending sort key order.
    pub scan_index_forward: Option<bool>,
}

/// Query operation.
///
/// The key condition addresses the table keys, or the keys of `index_name` when set. Key
/// values are decorated like any other value bound to their attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Query<E> {
    /// Secondary index to query instead of the table.
    pub index_name: Option<String>,
    /// Additional read operation arguments (filter, projection, pagination).
    pub multiple_read_args: read::common::MultipleReadArgs,
    /// The partition key value to query for.
    pub partition_key: Value,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to scan the index forward (ascending) or backward (descending).
    pub scan_index_forward: Option<bool>,
    /// Optional condition to apply to the sort key.
    pub sort_key_condition: Option<SortKeyCondition>,
    entity: marker::PhantomData<fn() -> E>,
}

impl<E: Entity> Query<E> {
    /// Query the items of `E` sharing `partition_key`.
    pub fn new(partition_key: impl Into<Value>) -> Self {
        Self {
            index_name: None,
            multiple_read_args: Default::default(),
            partition_key: partition_key.into(),
            return_consumed_capacity: None,
            scan_index_forward: None,
            sort_key_condition: None,
            entity: marker::PhantomData,
        }
    }

    /// Query `index_name` instead of the table.
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Restrict the sort key.
    pub fn with_sort_key_condition(mut self, condition: SortKeyCondition) -> Self {
        self.sort_key_condition = Some(condition);
        self
    }

    /// Replace the read arguments.
    pub fn with_args(mut self, multiple_read_args: read::common::MultipleReadArgs) -> Self {
        self.multiple_read_args = multiple_read_args;
        self
    }

    /// Read in descending sort key order.
    pub fn descending(mut self) -> Self {
        self.scan_index_forward = Some(false);
        self
    }

    /// Resolve the table and index keys and compile the request fields.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.query", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<QueryInput> {
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        let (partition_key, sort_key) = match &self.index_name {
            Some(index_name) => table
                .index_keys(index_name)
                .ok_or_else(|| Error::not_registered(E::NAME, format!("index `{index_name}`")))?,
            None => (table.partition_key.as_str(), table.sort_key.as_deref()),
        };
        let mut tokens =
            operator::compare(partition_key, ComparisonOperator::Eq, self.partition_key);
        if let Some(condition) = self.sort_key_condition {
            let sort_key = sort_key.ok_or_else(|| {
                Error::invalid_parameter(
                    partition_key,
                    format!("no sort key to apply the condition to for entity `{}`", E::NAME),
                )
            })?;
            tokens.push(OperatorToken::Literal(" AND "));
            tokens.extend(condition.into_tokens(sort_key));
        }
        let mut compiler = converter.compiler::<E>();
        let key_condition_expression = compiler.render(tokens)?;
        let mut multiple_read_input = self.multiple_read_args.into_input(
            table.name.clone(),
            self.index_name,
            &mut compiler,
        )?;
        (
            multiple_read_input.expression_attribute_names,
            multiple_read_input.expression_attribute_values,
        ) = compiler.finish();
        Ok(QueryInput {
            key_condition_expression,
            multiple_read_input,
            return_consumed_capacity: self.return_consumed_capacity,
            scan_index_forward: self.scan_index_forward,
        })
    }
}
