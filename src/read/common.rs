use crate::{
    converter::Item,
    error::{Error, Result},
    expression::{compiler::ExpressionCompiler, condition::Condition, projection::Projection},
    metadata::{registry::Registry, table::TableMetadata},
};

use aws_sdk_dynamodb::types;
use std::collections;

/// Table of `entity`, or `NotRegistered` when none was declared along its chain.
pub(crate) fn resolve_table(registry: &Registry, entity: &str) -> Result<TableMetadata> {
    registry
        .table_for_entity(entity)
        .ok_or_else(|| Error::not_registered(entity, "table"))
}

/// Request fields shared by single-item reads (GetItem).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SingleReadInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Name placeholders of every expression of the request.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Attributes to retrieve.
    pub projection_expression: Option<String>,
    /// Table the entity is stored in.
    pub table_name: String,
}

/// Arguments for single-item read operations (GetItem).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SingleReadArgs {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    pub consistent_read: Option<bool>,
    /// Which attributes to retrieve. All attributes are retrieved when `None`.
    pub projection: Option<Projection>,
}

impl SingleReadArgs {
    pub(crate) fn into_input(
        self,
        table_name: String,
        compiler: &mut ExpressionCompiler,
    ) -> Result<SingleReadInput> {
        let projection_expression = self
            .projection
            .filter(|projection| !projection.is_empty())
            .map(|projection| compiler.render(projection))
            .transpose()?;
        Ok(SingleReadInput {
            consistent_read: self.consistent_read,
            projection_expression,
            table_name,
            ..Default::default()
        })
    }
}

/// Request fields shared by multiple-item reads (Query, Scan).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadInput {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Key to continue a previous read from.
    pub exclusive_start_key: Option<Item>,
    /// Name placeholders of every expression of the request.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Value placeholders of every expression of the request.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Condition applied to the items read.
    pub filter_expression: Option<String>,
    /// Secondary index to read instead of the table.
    pub index_name: Option<String>,
    /// Maximum number of items to evaluate.
    pub limit: Option<i32>,
    /// Attributes to retrieve.
    pub projection_expression: Option<String>,
    /// Which attributes to return.
    pub select: Option<types::Select>,
    /// Table the entity is stored in.
    pub table_name: String,
}

/// Arguments for multiple-item read operations (Query, Scan).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadArgs {
    /// Filter condition applied after the items are read.
    pub condition: Option<Condition>,
    /// Whether to use a consistent read.
    pub consistent_read: Option<bool>,
    /// The exclusive start key for pagination, usually the previous `last_evaluated_key`.
    pub exclusive_start_key: Option<Item>,
    /// The maximum number of items to evaluate (not necessarily the number of matching items).
    pub limit: Option<i32>,
    /// Which attributes to return.
    pub select: Option<types::Select>,
    /// Which attributes to retrieve. All attributes are retrieved when `None`.
    pub projection: Option<Projection>,
}

impl MultipleReadArgs {
    pub(crate) fn into_input(
        self,
        table_name: String,
        index_name: Option<String>,
        compiler: &mut ExpressionCompiler,
    ) -> Result<MultipleReadInput> {
        let filter_expression = self
            .condition
            .filter(|condition| !condition.is_empty())
            .map(|condition| compiler.render(condition))
            .transpose()?;
        let projection_expression = self
            .projection
            .filter(|projection| !projection.is_empty())
            .map(|projection| compiler.render(projection))
            .transpose()?;
        Ok(MultipleReadInput {
            consistent_read: self.consistent_read,
            exclusive_start_key: self.exclusive_start_key,
            filter_expression,
            index_name,
            limit: self.limit,
            projection_expression,
            select: self.select,
            table_name,
            ..Default::default()
        })
    }
}

/// apply common single read input settings to a builder
#[macro_export]
macro_rules! apply_single_read_input {
    ($builder:expr, $single_read_input:expr) => {
        $builder
            .set_consistent_read($single_read_input.consistent_read)
            .set_expression_attribute_names($single_read_input.expression_attribute_names)
            .set_projection_expression($single_read_input.projection_expression)
            .table_name($single_read_input.table_name)
    };
}

/// apply common multiple read input settings to a builder
#[macro_export]
macro_rules! apply_multiple_read_input {
    ($builder:expr, $multiple_read_input:expr) => {
        $builder
            .set_consistent_read($multiple_read_input.consistent_read)
            .set_exclusive_start_key($multiple_read_input.exclusive_start_key)
            .set_expression_attribute_names($multiple_read_input.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_input.expression_attribute_values)
            .set_filter_expression($multiple_read_input.filter_expression)
            .set_index_name($multiple_read_input.index_name)
            .set_limit($multiple_read_input.limit)
            .set_projection_expression($multiple_read_input.projection_expression)
            .set_select($multiple_read_input.select)
            .table_name($multiple_read_input.table_name)
    };
}
