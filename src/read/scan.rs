use crate::{
    converter::EntityConverter,
    error::{Error, Result},
    metadata::entity::Entity,
    read,
};

use aws_sdk_dynamodb::types;
use std::marker;

/// Request fields of a Scan call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanInput {
    /// Table, index, filter and projection settings, with the placeholders of every expression.
    pub multiple_read_input: read::common::MultipleReadInput,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The segment read by this request in a parallel scan.
    pub segment: Option<i32>,
    /// The number of segments of a parallel scan.
    pub total_segments: Option<i32>,
}

/// Scan operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Scan<E> {
    /// Secondary index to scan instead of the table.
    pub index_name: Option<String>,
    /// Additional read operation arguments (filter, projection, pagination).
    pub multiple_read_args: read::common::MultipleReadArgs,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The segment number for parallel scans (0-indexed).
    pub segment: Option<i32>,
    /// The total number of segments for parallel scans.
    pub total_segments: Option<i32>,
    entity: marker::PhantomData<fn() -> E>,
}

impl<E: Entity> Default for Scan<E> {
    fn default() -> Self {
        Self {
            index_name: None,
            multiple_read_args: Default::default(),
            return_consumed_capacity: None,
            segment: None,
            total_segments: None,
            entity: marker::PhantomData,
        }
    }
}

impl<E: Entity> Scan<E> {
    /// Scan the table of `E`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `index_name` instead of the table.
    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Replace the read arguments.
    pub fn with_args(mut self, multiple_read_args: read::common::MultipleReadArgs) -> Self {
        self.multiple_read_args = multiple_read_args;
        self
    }

    /// Read one segment of a parallel scan.
    pub fn with_segment(mut self, segment: i32, total_segments: i32) -> Self {
        self.segment = Some(segment);
        self.total_segments = Some(total_segments);
        self
    }

    /// Resolve the table and compile the request fields.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.scan", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<ScanInput> {
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        if let Some(index_name) = &self.index_name {
            if !table.indexes.contains_key(index_name) {
                return Err(Error::not_registered(E::NAME, format!("index `{index_name}`")));
            }
        }
        let mut compiler = converter.compiler::<E>();
        let mut multiple_read_input =
            self.multiple_read_args
                .into_input(table.name, self.index_name, &mut compiler)?;
        (
            multiple_read_input.expression_attribute_names,
            multiple_read_input.expression_attribute_values,
        ) = compiler.finish();
        Ok(ScanInput {
            multiple_read_input,
            return_consumed_capacity: self.return_consumed_capacity,
            segment: self.segment,
            total_segments: self.total_segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::ValueCodec,
        expression::{condition::Condition, projection::Projection},
        fixtures::{self, Order},
    };

    use aws_sdk_dynamodb::operation;
    use rstest::rstest;
    use std::collections;

    #[rstest]
    #[case::empty(
        Scan::<Order>::new(),
        ScanInput {
            multiple_read_input: read::common::MultipleReadInput {
                table_name: "orders".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    )]
    #[case::full(
        Scan::<Order>::new()
            .with_index("byStatus")
            .with_segment(1, 4)
            .with_args(read::common::MultipleReadArgs {
                condition: Some(
                    Condition::new()
                        .attribute("customer").begins_with("c")
                        .or()
                        .attribute("total").size().gt(2)
                ),
                consistent_read: Some(true),
                projection: Some(Projection::new().attribute("customer")),
                select: Some(types::Select::SpecificAttributes),
                ..Default::default()
            }),
        ScanInput {
            multiple_read_input: read::common::MultipleReadInput {
                consistent_read: Some(true),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":customer".to_string(),
                                types::AttributeValue::S(
                                    "CUSTOMER#c".to_string()
                                )
                            ),
                            (
                                ":total".to_string(),
                                types::AttributeValue::N(
                                    "2".to_string()
                                )
                            ),
                        ]
                    )
                ),
                filter_expression: Some(
                    "begins_with(customer, :customer) OR size(total) > :total".to_string()
                ),
                index_name: Some("byStatus".to_string()),
                projection_expression: Some(
                    "customer".to_string()
                ),
                select: Some(types::Select::SpecificAttributes),
                table_name: "orders".to_string(),
                ..Default::default()
            },
            segment: Some(1),
            total_segments: Some(4),
            ..Default::default()
        }
    )]
    fn test_scan(#[case] scan: Scan<Order>, #[case] expected: ScanInput) {
        let registry = fixtures::registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        assert_eq!(scan.build(&converter).unwrap(), expected);
    }

    #[test]
    fn test_scan_unknown_index() {
        let registry = fixtures::registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let error = Scan::<Order>::new().with_index("missing").build(&converter).unwrap_err();
        assert!(matches!(error, Error::NotRegistered { .. }));
    }

    #[test]
    fn test_apply_to_request_builder() {
        let registry = fixtures::registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let scan = Scan::<Order>::new()
            .with_args(read::common::MultipleReadArgs {
                condition: Some(Condition::new().attribute("status").eq("open")),
                limit: Some(25),
                ..Default::default()
            })
            .build(&converter)
            .unwrap();
        let builder = operation::scan::ScanInput::builder()
            .set_segment(scan.segment)
            .set_total_segments(scan.total_segments);
        let request = crate::apply_multiple_read_input!(builder, scan.multiple_read_input)
            .build()
            .unwrap();
        assert_eq!(request.filter_expression(), Some("#status = :status"));
        assert_eq!(request.limit(), Some(25));
        assert_eq!(
            request.expression_attribute_names(),
            Some(&collections::HashMap::from([(
                "#status".to_string(),
                "status".to_string()
            )]))
        );
    }
}
