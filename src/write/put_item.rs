use crate::{
    converter::{EntityConverter, Item},
    error::Result,
    metadata::entity::Entity,
    read, write,
};

/// Request fields of a PutItem call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PutItemInput {
    /// Wire form of the whole entity.
    pub item: Item,
    /// Table, condition and return settings, with the placeholders of the condition.
    pub write_input: write::common::WriteInput,
}

/// Put item operation.
///
/// ```rust
/// use aws_sdk_dynamodb::operation::put_item::PutItemInput;
/// use dynamodb_entity::{
///     codec::ValueCodec,
///     converter::EntityConverter,
///     expression::condition::Condition,
///     metadata::{
///         attribute::{AttributeKind, AttributeMetadata},
///         entity::{Entity, EntityDefinition},
///         registry::Registry,
///         table::TableMetadata,
///     },
///     write::{common::WriteArgs, put_item::PutItem},
/// };
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Deserialize, Serialize)]
/// # struct User { id: String, name: String }
/// # impl Entity for User { const NAME: &'static str = "User"; }
///
/// let registry = Registry::new();
/// EntityDefinition::of::<User>()
///     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("USER"))
///     .table(TableMetadata::new("users", "id"))
///     .register(&registry)?;
///
/// let converter = EntityConverter::new(&registry, ValueCodec::default());
/// let put_item = PutItem::new(User { id: "1".to_string(), name: "John".to_string() })
///     .with_args(WriteArgs {
///         condition: Some(Condition::new().attribute("id").not().exists()),
///         ..Default::default()
///     })
///     .build(&converter)?;
/// let request = dynamodb_entity::apply_write_input!(
///     PutItemInput::builder().set_item(Some(put_item.item)),
///     put_item.write_input
/// )
/// .build()?;
/// assert_eq!(request.condition_expression(), Some("attribute_not_exists(id)"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PutItem<E> {
    /// The entity to write.
    pub item: E,
    /// Additional write operation arguments (condition, return values, etc.).
    pub write_args: write::common::WriteArgs,
}

impl<E: Entity> PutItem<E> {
    /// Write `item`, replacing any item with the same key.
    pub fn new(item: E) -> Self {
        Self {
            item,
            write_args: Default::default(),
        }
    }

    /// Replace the write arguments.
    pub fn with_args(mut self, write_args: write::common::WriteArgs) -> Self {
        self.write_args = write_args;
        self
    }

    /// Resolve the table, encode the entity and compile the condition.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_entity.put_item", skip_all, fields(entity = E::NAME), err)
    )]
    pub fn build(self, converter: &EntityConverter<'_>) -> Result<PutItemInput> {
        let table = read::common::resolve_table(converter.registry(), E::NAME)?;
        let item = converter.to_wire(&self.item)?;
        let mut compiler = converter.compiler::<E>();
        let write_input = self.write_args.into_input(table.name, &mut compiler)?;
        Ok(PutItemInput {
            item,
            write_input: write_input.finish(compiler),
        })
    }
}
