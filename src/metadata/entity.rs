use crate::{
    error::Result,
    metadata::{attribute::AttributeMetadata, registry::Registry, table::TableMetadata},
};

use serde::{Serialize, de::DeserializeOwned};

/// A typed record stored in a table.
///
/// `NAME` is the stable identifier its metadata is registered under; the serde field names
/// are the attribute names on the wire.
pub trait Entity: Serialize + DeserializeOwned {
    /// Registry key of the entity.
    const NAME: &'static str;
}

/// Declaration of an entity's attributes, parent and table, registered in one call.
///
/// ```rust
/// use dynamodb_entity::metadata::{
///     attribute::{AttributeKind, AttributeMetadata},
///     entity::EntityDefinition,
///     registry::Registry,
///     table::TableMetadata,
/// };
///
/// let registry = Registry::new();
/// EntityDefinition::new("Order")
///     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String))
///     .attribute(AttributeMetadata::attribute("total", AttributeKind::Number))
///     .table(TableMetadata::new("orders", "id"))
///     .register(&registry)
///     .unwrap();
/// assert_eq!(registry.table_for_entity("Order").unwrap().name, "orders");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDefinition {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) attributes: Vec<AttributeMetadata>,
    pub(crate) table: Option<TableMetadata>,
}

impl EntityDefinition {
    /// Start declaring the entity `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
            table: None,
        }
    }

    /// Start declaring the entity `E`.
    pub fn of<E: Entity>() -> Self {
        Self::new(E::NAME)
    }

    /// Inherit the attributes and table of `parent`.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare one attribute.
    pub fn attribute(mut self, metadata: AttributeMetadata) -> Self {
        self.attributes.push(metadata);
        self
    }

    /// Store the entity in `table`.
    pub fn table(mut self, table: TableMetadata) -> Self {
        self.table = Some(table);
        self
    }

    /// Record the declaration. The table, if any, is validated against the merged attributes.
    ///
    /// Nothing is recorded if any part of the declaration is rejected.
    pub fn register(self, registry: &Registry) -> Result<()> {
        registry.register_definition(self)
    }
}
