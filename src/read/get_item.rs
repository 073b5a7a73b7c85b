use crate::{
    converter::{EntityConverter, Item, PrimaryKey},
    error::Result,
    metadata::entity::Entity,
    read,
};

use aws_sdk_dynamodb::types;
use std::marker;

/// Request fields of a GetItem call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItemInput {
    /// Wire key of the item.
    pub key: Item,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Table, projection and consistency settings.
    pub single_read_input: read::common::SingleReadInput,
}

/// Get item operation.
///
/// ```rust
/// use aws_sdk_dynamodb::operation::get_item::GetItemInput;
/// use dynamodb_entity::{
///     codec::ValueCodec,
///     converter::{EntityConverter, PrimaryKey},
///     metadata::{
///         attribute::{AttributeKind, AttributeMetadata},
///         entity::{Entity, EntityDefinition},
///         registry::Registry,
///         table::TableMetadata,
///     },
///     read::get_item::GetItem,
/// };
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Deserialize, Serialize)]
/// # struct User { id: String }
/// # impl Entity for User { const NAME: &'static str = "User"; }
///
/// let registry = Registry::new();
/// EntityDefinition::of::<User>()
///     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String))
///     .table(TableMetadata::new("users", "id"))
///     .register(&registry)?;
///
/// let converter = EntityConverter::new(&registry, ValueCodec::default());
/// let get_item = GetItem::<User>::new(PrimaryKey::new("1")).build(&converter)?;
/// let request = dynamodb_entity::apply_single_read_input!(
///     GetItemInput::builder().set_key(Some(get_item.key)),
///     get_item.single_read_input
/// )
/// .build()?;
/// assert_eq!(request.table_name(), Some("users"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GetItem<E> {
    /// The primary key of the item to retrieve.
    pub key: PrimaryKey,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Additional read arguments (consistent read, projection).
    pub single_read_args: read::common::SingleReadArgs,
    entity: marker::PhantomData<fn() -> E>,
}

impl<E: Entity> GetItem<E> {
    /// Read the item of `E` addressed by `key`.
    pub fn new(key: PrimaryKey) -> Self {
        Self {
            key,
            return_consumed_capacity: None,
            single_read_args: Default::default(),
            entity: marker::PhantomData,
        }
    }

    /// Replace the read arguments.
    pub fn with_args(mut self, single_read_args: read::common::SingleReadArgs) -> Self {
        self.single_read_args = single_read_args;
        self
    }

    /// Ask for the consumed capacity.
    pub fn with_return_consumed_capacity(
        mut self,
        return_consumed_capacity: types::ReturnConsumedCapacity,
    ) -> Self {
        self.return_consumed_capacity = Some(return_consumed_capacity);
        self
    }

    /// Resolve the table and compile the request fields.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.get_item", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<GetItemInput> {
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        let key = converter.key_to_wire::<E>(self.key)?;
        let mut compiler = converter.compiler::<E>();
        let mut single_read_input = self.single_read_args.into_input(table.name, &mut compiler)?;
        (single_read_input.expression_attribute_names, _) = compiler.finish();
        Ok(GetItemInput {
            key,
            return_consumed_capacity: self.return_consumed_capacity,
            single_read_input,
        })
    }
}
