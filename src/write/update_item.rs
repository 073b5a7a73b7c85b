use crate::{
    converter::{EntityConverter, Item, PrimaryKey},
    error::{Error, Result},
    expression::update::Update,
    metadata::entity::Entity,
    read, write,
};

use std::marker;

/// Request fields of an UpdateItem call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateItemInput {
    /// Wire key of the item.
    pub key: Item,
    /// Rendered `SET`, `ADD`, `DELETE` and `REMOVE` clauses.
    pub update_expression: String,
    /// Table, condition and return settings, with the placeholders of both expressions.
    pub write_input: write::common::WriteInput,
}

/// Update item operation.
///
/// The update and the condition share one set of placeholders, so a path bound to two
/// different values gets two value placeholders.
///
/// ```rust
/// use aws_sdk_dynamodb::operation::update_item::UpdateItemInput;
/// use dynamodb_entity::{
///     codec::ValueCodec,
///     converter::{EntityConverter, PrimaryKey},
///     expression::update::Update,
///     metadata::{
///         attribute::{AttributeKind, AttributeMetadata},
///         entity::{Entity, EntityDefinition},
///         registry::Registry,
///         table::TableMetadata,
///     },
///     write::update_item::UpdateItem,
/// };
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Deserialize, Serialize)]
/// # struct User { id: String, visits: u32 }
/// # impl Entity for User { const NAME: &'static str = "User"; }
///
/// let registry = Registry::new();
/// EntityDefinition::of::<User>()
///     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String))
///     .table(TableMetadata::new("users", "id"))
///     .register(&registry)?;
///
/// let converter = EntityConverter::new(&registry, ValueCodec::default());
/// let update_item = UpdateItem::<User>::new(PrimaryKey::new("1"), Update::new().increment("visits", 1))
///     .build(&converter)?;
/// let request = dynamodb_entity::apply_write_input!(
///     UpdateItemInput::builder()
///         .set_key(Some(update_item.key))
///         .update_expression(update_item.update_expression),
///     update_item.write_input
/// )
/// .build()?;
/// assert_eq!(request.update_expression(), Some("SET visits = visits + :visits"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem<E> {
    /// The primary key of the item to update.
    pub key: PrimaryKey,
    /// The mutations to apply.
    pub update: Update,
    /// Additional write operation arguments (condition, return values, etc.).
    pub write_args: write::common::WriteArgs,
    entity: marker::PhantomData<fn() -> E>,
}

impl<E: Entity> UpdateItem<E> {
    /// Apply `update` to the item of `E` addressed by `key`.
    pub fn new(key: PrimaryKey, update: Update) -> Self {
        Self {
            key,
            update,
            write_args: Default::default(),
            entity: marker::PhantomData,
        }
    }

    /// Replace the write arguments.
    pub fn with_args(mut self, write_args: write::common::WriteArgs) -> Self {
        self.write_args = write_args;
        self
    }

    /// Resolve the table and compile the update, then the condition.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.update_item", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<UpdateItemInput> {
        if self.update.is_empty() {
            return Err(Error::invalid_parameter(
                E::NAME,
                "an update needs at least one SET, ADD, DELETE or REMOVE action",
            ));
        }
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        let key = converter.key_to_wire::<E>(self.key)?;
        let mut compiler = converter.compiler::<E>();
        let update_expression = compiler.render(self.update)?;
        let write_input = self.write_args.into_input(table.name, &mut compiler)?;
        Ok(UpdateItemInput {
            key,
            update_expression,
            write_input: write_input.finish(compiler),
        })
    }
}
