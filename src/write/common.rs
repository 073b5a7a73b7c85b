use crate::{
    error::Result,
    expression::{compiler::ExpressionCompiler, condition::Condition},
};

use aws_sdk_dynamodb::types;
use std::collections;

/// Request fields shared by every write operation.
///
/// Holds the resolved table name, the condition expression and the placeholders of every
/// expression of the request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteInput {
    /// Condition the item must satisfy for the write to happen.
    pub condition_expression: Option<String>,
    /// Name placeholders of every expression of the request.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Value placeholders of every expression of the request.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which item attributes to return in the response.
    pub return_values: Option<types::ReturnValue>,
    /// Which item attributes to return if the condition check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// Table the entity is stored in.
    pub table_name: String,
}

/// Arguments common to all write operations (Put, Update, Delete).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs {
    /// Condition expression that must be true for the operation to succeed.
    ///
    /// If the condition is false, the operation fails with a conditional check error.
    pub condition: Option<Condition>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    ///
    /// Item collection metrics describe the collections (local secondary indexes)
    /// affected by the operation.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which item attributes to return in the response.
    ///
    /// Options: `AllOld`, `AllNew`, `UpdatedOld`, `UpdatedNew`, or `None`.
    pub return_values: Option<types::ReturnValue>,
    /// Which item attributes to return if a condition check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
}

impl WriteArgs {
    /// Render the condition with `compiler`. Placeholders are collected by [`WriteInput::finish`].
    pub(crate) fn into_input(
        self,
        table_name: String,
        compiler: &mut ExpressionCompiler,
    ) -> Result<WriteInput> {
        let condition_expression = self
            .condition
            .filter(|condition| !condition.is_empty())
            .map(|condition| compiler.render(condition))
            .transpose()?;
        Ok(WriteInput {
            condition_expression,
            return_consumed_capacity: self.return_consumed_capacity,
            return_item_collection_metrics: self.return_item_collection_metrics,
            return_values: self.return_values,
            return_values_on_condition_check_failure: self.return_values_on_condition_check_failure,
            table_name,
            ..Default::default()
        })
    }
}

impl WriteInput {
    /// Take the placeholders accumulated by `compiler` over every expression of the request.
    pub(crate) fn finish(mut self, compiler: ExpressionCompiler) -> Self {
        (
            self.expression_attribute_names,
            self.expression_attribute_values,
        ) = compiler.finish();
        self
    }
}

/// apply common write input settings to a builder
#[macro_export]
macro_rules! apply_write_input {
    ($builder:expr, $write_input:expr) => {
        $builder
            .set_condition_expression($write_input.condition_expression)
            .set_expression_attribute_names($write_input.expression_attribute_names)
            .set_expression_attribute_values($write_input.expression_attribute_values)
            .set_return_consumed_capacity($write_input.return_consumed_capacity)
            .set_return_item_collection_metrics($write_input.return_item_collection_metrics)
            .set_return_values($write_input.return_values)
            .set_return_values_on_condition_check_failure(
                $write_input.return_values_on_condition_check_failure,
            )
            .table_name($write_input.table_name)
    };
}
