use crate::{
    converter::{EntityConverter, Item, PrimaryKey},
    error::Result,
    metadata::entity::Entity,
    read, write,
};

use std::marker;

/// Request fields of a DeleteItem call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteItemInput {
    /// Wire key of the item.
    pub key: Item,
    /// Table, condition and return settings, with the placeholders of the condition.
    pub write_input: write::common::WriteInput,
}

/// Delete item operation.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteItem<E> {
    /// The primary key of the item to delete.
    pub key: PrimaryKey,
    /// Additional write operation arguments (condition, return values, etc.).
    pub write_args: write::common::WriteArgs,
    entity: marker::PhantomData<fn() -> E>,
}

impl<E: Entity> DeleteItem<E> {
    /// Delete the item of `E` addressed by `key`.
    pub fn new(key: PrimaryKey) -> Self {
        Self {
            key,
            write_args: Default::default(),
            entity: marker::PhantomData,
        }
    }

    /// Replace the write arguments.
    pub fn with_args(mut self, write_args: write::common::WriteArgs) -> Self {
        self.write_args = write_args;
        self
    }

    /// Resolve the table, encode the key and compile the condition.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.delete_item", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<DeleteItemInput> {
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        let key = converter.key_to_wire::<E>(self.key)?;
        let mut compiler = converter.compiler::<E>();
        let write_input = self.write_args.into_input(table.name, &mut compiler)?;
        Ok(DeleteItemInput {
            key,
            write_input: write_input.finish(compiler),
        })
    }
}
