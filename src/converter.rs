//! Conversion of whole entities to and from wire items.

use crate::{
    codec::ValueCodec,
    error::{Error, Result},
    expression::compiler::ExpressionCompiler,
    metadata::{
        attribute::{AttributeKind, AttributeMetadata, AttributeRole},
        entity::Entity,
        registry::{AttributeMap, Registry},
    },
};

use aws_sdk_dynamodb::types;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections;

/// Wire item: attribute names to wire values.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Raw (undecorated) primary key values of one item.
///
/// ```rust
/// use dynamodb_entity::converter::PrimaryKey;
///
/// let key = PrimaryKey::new("o1").with_sort(7);
/// assert_eq!(key.sort, Some(7.into()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PrimaryKey {
    /// Partition key value.
    pub partition: Value,
    /// Sort key value, required when the entity declares a sort key.
    pub sort: Option<Value>,
}

impl PrimaryKey {
    /// Key made of a partition key value only.
    pub fn new(partition: impl Into<Value>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    /// Add the sort key value.
    pub fn with_sort(mut self, sort: impl Into<Value>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}

/// The partition and sort key attributes of an entity.
pub(crate) struct KeyAttributes {
    pub(crate) partition: AttributeMetadata,
    pub(crate) sort: Option<AttributeMetadata>,
}

impl KeyAttributes {
    pub(crate) fn resolve(entity: &str, attributes: &AttributeMap) -> Result<Self> {
        let find = |role| {
            attributes
                .values()
                .find(|metadata| metadata.role == role)
                .cloned()
        };
        let partition = find(AttributeRole::PartitionKey)
            .ok_or_else(|| Error::not_registered(entity, "partition key"))?;
        Ok(Self {
            partition,
            sort: find(AttributeRole::SortKey),
        })
    }

    fn iter(&self) -> impl Iterator<Item = &AttributeMetadata> {
        std::iter::once(&self.partition).chain(self.sort.as_ref())
    }
}

/// Maps entity instances to wire items and back, using the metadata in a [`Registry`].
///
/// Registered attributes go through the [`ValueCodec`]; other fields are marshaled as they
/// are. Absent and `null` values are left out of the item.
///
/// ```rust
/// use dynamodb_entity::{
///     codec::ValueCodec,
///     converter::EntityConverter,
///     metadata::{
///         attribute::{AttributeKind, AttributeMetadata},
///         entity::{Entity, EntityDefinition},
///         registry::Registry,
///     },
/// };
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Deserialize, PartialEq, Serialize)]
/// struct Order {
///     id: String,
///     total: u32,
/// }
///
/// impl Entity for Order {
///     const NAME: &'static str = "Order";
/// }
///
/// let registry = Registry::new();
/// EntityDefinition::of::<Order>()
///     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("ORDER"))
///     .attribute(AttributeMetadata::attribute("total", AttributeKind::Number))
///     .register(&registry)
///     .unwrap();
///
/// let converter = EntityConverter::new(&registry, ValueCodec::default());
/// let order = Order { id: "o1".to_string(), total: 5 };
/// let item = converter.to_wire(&order).unwrap();
/// assert_eq!(item["id"], AttributeValue::S("ORDER#o1".to_string()));
/// assert_eq!(converter.from_wire::<Order>(item).unwrap(), order);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EntityConverter<'a> {
    registry: &'a Registry,
    codec: ValueCodec,
}

impl<'a> EntityConverter<'a> {
    /// Converter reading metadata from `registry`.
    pub fn new(registry: &'a Registry, codec: ValueCodec) -> Self {
        Self { registry, codec }
    }

    /// Registry the metadata is read from.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Codec applied to registered attributes.
    pub fn codec(&self) -> ValueCodec {
        self.codec
    }

    /// Encode every field of `entity`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(entity = E::NAME), err))]
    pub fn to_wire<E: Entity>(&self, entity: &E) -> Result<Item> {
        let attributes = self.registry.attributes_for_entity(E::NAME);
        let fields = fields::<E>(serde_json::to_value(entity)?)?;
        let mut item = Item::with_capacity(fields.len());
        for (name, value) in fields {
            let wire = match attributes.get(&name) {
                Some(metadata) => self.codec.to_wire(metadata, value)?,
                None if value.is_null() => None,
                None => Some(self.codec.marshal(value)?),
            };
            if let Some(wire) = wire {
                item.insert(name, wire);
            }
        }
        Ok(item)
    }

    /// Decode `item` into an `E`.
    ///
    /// Set attributes missing from the item decode as empty sets, since empty sets are never
    /// written.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(entity = E::NAME), err))]
    pub fn from_wire<E: Entity>(&self, item: Item) -> Result<E> {
        let attributes = self.registry.attributes_for_entity(E::NAME);
        let mut fields = Map::with_capacity(item.len());
        for (name, wire) in item {
            let value = match attributes.get(&name) {
                Some(metadata) => self.codec.from_wire(metadata, wire)?,
                None => self.codec.unmarshal(wire)?,
            };
            fields.insert(name, value);
        }
        for metadata in attributes.values() {
            if metadata.kind == AttributeKind::Set && !fields.contains_key(&metadata.property_name) {
                fields.insert(metadata.property_name.clone(), Value::Array(Vec::new()));
            }
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Encode only the key attributes of `entity`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(entity = E::NAME), err))]
    pub fn primary_key_to_wire<E: Entity>(&self, entity: &E) -> Result<Item> {
        let keys = KeyAttributes::resolve(E::NAME, &self.registry.attributes_for_entity(E::NAME))?;
        let mut fields = fields::<E>(serde_json::to_value(entity)?)?;
        let mut item = Item::with_capacity(2);
        for metadata in keys.iter() {
            let value = fields.remove(&metadata.property_name).unwrap_or(Value::Null);
            item.insert(
                metadata.property_name.clone(),
                self.key_value(E::NAME, metadata, value)?,
            );
        }
        Ok(item)
    }

    /// Encode a key given as raw values, applying the key attributes' decoration.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(entity = E::NAME), err))]
    pub fn key_to_wire<E: Entity>(&self, key: PrimaryKey) -> Result<Item> {
        let keys = KeyAttributes::resolve(E::NAME, &self.registry.attributes_for_entity(E::NAME))?;
        let mut item = Item::with_capacity(2);
        item.insert(
            keys.partition.property_name.clone(),
            self.key_value(E::NAME, &keys.partition, key.partition)?,
        );
        match (&keys.sort, key.sort) {
            (Some(metadata), Some(sort)) => {
                item.insert(
                    metadata.property_name.clone(),
                    self.key_value(E::NAME, metadata, sort)?,
                );
            }
            (Some(metadata), None) => {
                return Err(Error::invalid_parameter(
                    &metadata.property_name,
                    format!("entity `{}` requires a sort key value", E::NAME),
                ));
            }
            (None, Some(_)) => {
                return Err(Error::not_registered(E::NAME, "sort key"));
            }
            (None, None) => {}
        }
        Ok(item)
    }

    /// Decode the key attributes of `item` into `K`, stripping their decoration.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(entity = E::NAME), err))]
    pub fn primary_key_from_wire<E: Entity, K: DeserializeOwned>(&self, item: &Item) -> Result<K> {
        let keys = KeyAttributes::resolve(E::NAME, &self.registry.attributes_for_entity(E::NAME))?;
        let mut fields = Map::with_capacity(2);
        for metadata in keys.iter() {
            let Some(wire) = item.get(&metadata.property_name) else {
                continue;
            };
            fields.insert(
                metadata.property_name.clone(),
                self.codec.from_wire(metadata, wire.clone())?,
            );
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Compiler decorating values with the attributes of `E`.
    pub fn compiler<E: Entity>(&self) -> ExpressionCompiler {
        ExpressionCompiler::new(self.codec)
            .with_attributes(self.registry.attributes_for_entity(E::NAME))
    }

    fn key_value(
        &self,
        entity: &str,
        metadata: &AttributeMetadata,
        value: Value,
    ) -> Result<types::AttributeValue> {
        self.codec.to_wire(metadata, value)?.ok_or_else(|| {
            Error::invalid_parameter(
                &metadata.property_name,
                format!("key attribute of entity `{entity}` has no value"),
            )
        })
    }
}

fn fields<E: Entity>(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(Error::invalid_type(
            E::NAME,
            "entities must serialize to a map of fields",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        attribute::AttributeKind, entity::EntityDefinition, table::TableMetadata,
    };

    use aws_sdk_dynamodb::primitives::Blob;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use std::collections::{BTreeMap, BTreeSet};

    #[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Order {
        customer: String,
        id: String,
        total: u32,
        created_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        paid: bool,
        labels: BTreeSet<String>,
        attributes: BTreeMap<String, String>,
        lines: Vec<String>,
        signature: Vec<u8>,
    }

    impl Entity for Order {
        const NAME: &'static str = "Order";
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct OrderKey {
        customer: String,
        id: String,
    }

    fn registry() -> Registry {
        let registry = Registry::new();
        EntityDefinition::of::<Order>()
            .attribute(
                AttributeMetadata::partition_key("customer", AttributeKind::String)
                    .with_prefix("CUSTOMER"),
            )
            .attribute(AttributeMetadata::sort_key("id", AttributeKind::String).with_prefix("ORDER"))
            .attribute(AttributeMetadata::attribute("total", AttributeKind::Number))
            .attribute(AttributeMetadata::date("createdAt", AttributeKind::Number))
            .attribute(AttributeMetadata::attribute("note", AttributeKind::String))
            .attribute(AttributeMetadata::attribute("paid", AttributeKind::Boolean))
            .attribute(AttributeMetadata::attribute("labels", AttributeKind::Set))
            .attribute(AttributeMetadata::attribute("attributes", AttributeKind::Map))
            .attribute(AttributeMetadata::attribute("lines", AttributeKind::Array))
            .attribute(AttributeMetadata::attribute("signature", AttributeKind::Binary))
            .table(TableMetadata::new("orders", "customer").with_sort_key("id"))
            .register(&registry)
            .unwrap();
        registry
    }

    fn order() -> Order {
        Order {
            customer: "c1".to_string(),
            id: "o1".to_string(),
            total: 5,
            created_at: Utc.timestamp_millis_opt(1_000_000_000_000).unwrap(),
            note: None,
            paid: true,
            labels: BTreeSet::from(["gift".to_string(), "rush".to_string()]),
            attributes: BTreeMap::from([("color".to_string(), "red".to_string())]),
            lines: vec!["a".to_string(), "b".to_string()],
            signature: vec![0, 1, 255],
        }
    }

    #[test]
    fn test_round_trip() {
        let registry = registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let item = converter.to_wire(&order()).unwrap();
        assert_eq!(item["customer"], types::AttributeValue::S("CUSTOMER#c1".to_string()));
        assert_eq!(item["id"], types::AttributeValue::S("ORDER#o1".to_string()));
        assert_eq!(item["total"], types::AttributeValue::N("5".to_string()));
        assert_eq!(
            item["createdAt"],
            types::AttributeValue::N("1000000000000".to_string())
        );
        assert_eq!(
            item["labels"],
            types::AttributeValue::Ss(vec!["gift".to_string(), "rush".to_string()])
        );
        assert_eq!(
            item["attributes"],
            types::AttributeValue::M(
                [("color".to_string(), types::AttributeValue::S("red".to_string()))].into()
            )
        );
        assert_eq!(item["signature"], types::AttributeValue::B(Blob::new(vec![0, 1, 255])));
        assert!(!item.contains_key("note"));
        assert_eq!(converter.from_wire::<Order>(item).unwrap(), order());
    }

    #[test]
    fn test_sparse_item() {
        let registry = registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let order = Order {
            labels: BTreeSet::new(),
            ..order()
        };
        let item = converter.to_wire(&order).unwrap();
        assert!(!item.contains_key("labels"));
        assert!(!item.contains_key("note"));
        assert_eq!(converter.from_wire::<Order>(item).unwrap(), order);
    }

    #[test]
    fn test_primary_key_round_trip() {
        let registry = registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let item = converter.primary_key_to_wire(&order()).unwrap();
        assert_eq!(
            item,
            Item::from([
                ("customer".to_string(), types::AttributeValue::S("CUSTOMER#c1".to_string())),
                ("id".to_string(), types::AttributeValue::S("ORDER#o1".to_string())),
            ])
        );
        assert_eq!(
            converter.key_to_wire::<Order>(PrimaryKey::new("c1").with_sort("o1")).unwrap(),
            item
        );
        let key: OrderKey = converter.primary_key_from_wire::<Order, _>(&item).unwrap();
        assert_eq!(
            key,
            OrderKey {
                customer: "c1".to_string(),
                id: "o1".to_string(),
            }
        );
    }

    #[test]
    fn test_key_requires_sort_value() {
        let registry = registry();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let error = converter.key_to_wire::<Order>(PrimaryKey::new("c1")).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter { ref path, .. } if path == "id"));
    }

    #[test]
    fn test_invalid_date_kind() {
        #[derive(Debug, Deserialize, Serialize)]
        struct Event {
            id: String,
            at: DateTime<Utc>,
        }

        impl Entity for Event {
            const NAME: &'static str = "Event";
        }

        let registry = Registry::new();
        EntityDefinition::of::<Event>()
            .attribute(AttributeMetadata::partition_key("id", AttributeKind::String))
            .attribute(AttributeMetadata::date("at", AttributeKind::Boolean))
            .register(&registry)
            .unwrap();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let event = Event {
            id: "e1".to_string(),
            at: Utc::now(),
        };
        let error = converter.to_wire(&event).unwrap_err();
        assert!(matches!(error, Error::InvalidType { ref attribute, .. } if attribute == "at"));
    }

    #[test]
    fn test_unregistered_entity_has_no_key() {
        #[derive(Debug, Deserialize, Serialize)]
        struct Loose {
            id: String,
            extra: Option<u8>,
        }

        impl Entity for Loose {
            const NAME: &'static str = "Loose";
        }

        let registry = Registry::new();
        let converter = EntityConverter::new(&registry, ValueCodec::default());
        let loose = Loose {
            id: "l1".to_string(),
            extra: None,
        };
        let item = converter.to_wire(&loose).unwrap();
        assert_eq!(
            item,
            Item::from([("id".to_string(), types::AttributeValue::S("l1".to_string()))])
        );
        let error = converter.primary_key_to_wire(&loose).unwrap_err();
        assert!(matches!(error, Error::NotRegistered { .. }));
    }
}
