use crate::{
    error::{Error, Result},
    metadata::{
        attribute::{AttributeKind, AttributeMetadata, AttributeRole, IndexRole},
        entity::EntityDefinition,
        table::TableMetadata,
    },
};

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections;

/// Attributes merged from an entity and its ancestors, child first.
pub type AttributeMap = IndexMap<String, AttributeMetadata>;

#[derive(Clone, Debug, Default)]
struct EntityEntry {
    parent: Option<String>,
    attributes: AttributeMap,
    table: Option<TableMetadata>,
}

type Entities = collections::HashMap<String, EntityEntry>;

/// Walk from `entity` up to its root. Unknown links end the walk.
fn ancestry<'a>(entities: &'a Entities, entity: &str) -> Vec<(&'a str, &'a EntityEntry)> {
    let mut chain = Vec::new();
    let mut current = entities.get_key_value(entity);
    while let Some((name, entry)) = current {
        // a cycle can only be introduced by a rename; stop once every entity was visited
        if chain.len() > entities.len() {
            break;
        }
        chain.push((name.as_str(), entry));
        current = entry
            .parent
            .as_deref()
            .and_then(|parent| entities.get_key_value(parent));
    }
    chain
}

fn merged_attributes(entities: &Entities, entity: &str) -> AttributeMap {
    let mut attributes = AttributeMap::new();
    for (_, entry) in ancestry(entities, entity).into_iter().rev() {
        for (name, metadata) in &entry.attributes {
            attributes.insert(name.clone(), metadata.clone());
        }
    }
    attributes
}

fn inherited_table<'a>(entities: &'a Entities, entity: &str) -> Option<&'a TableMetadata> {
    ancestry(entities, entity)
        .into_iter()
        .find_map(|(_, entry)| entry.table.as_ref())
}

fn validate_attribute(entity: &str, metadata: &AttributeMetadata) -> Result<()> {
    let name = &metadata.property_name;
    if name.is_empty() {
        return Err(Error::validation(entity, "attribute name must not be empty"));
    }
    if metadata.role == AttributeRole::Index && metadata.indexes.is_empty() {
        return Err(Error::validation(
            entity,
            format!("index attribute `{name}` is not associated with any index"),
        ));
    }
    if metadata.indexes.iter().any(|index| index.index_name.is_empty()) {
        return Err(Error::validation(
            entity,
            format!("attribute `{name}` names an index without a name"),
        ));
    }
    if metadata.is_decorated() && metadata.kind != AttributeKind::String {
        return Err(Error::validation(
            entity,
            format!(
                "attribute `{name}` declares a prefix or suffix but is of type {}",
                metadata.kind
            ),
        ));
    }
    Ok(())
}

/// At most one partition key and one sort key across the merged chain.
fn validate_key_roles(entity: &str, attributes: &AttributeMap) -> Result<()> {
    for (role, description) in [
        (AttributeRole::PartitionKey, "partition key"),
        (AttributeRole::SortKey, "sort key"),
    ] {
        let mut keys = attributes
            .values()
            .filter(|attribute| attribute.role == role)
            .map(|attribute| attribute.property_name.as_str());
        if let (Some(first), Some(second)) = (keys.next(), keys.next()) {
            return Err(Error::validation(
                entity,
                format!("attributes `{first}` and `{second}` are both declared as the {description}"),
            ));
        }
    }
    Ok(())
}

fn check_key(
    entity: &str,
    attributes: &AttributeMap,
    name: &str,
    description: &str,
    matches: impl Fn(&AttributeMetadata) -> bool,
) -> Result<()> {
    let attribute = attributes.get(name).ok_or_else(|| {
        Error::validation(entity, format!("{description} `{name}` has no matching attribute"))
    })?;
    if !matches(attribute) {
        return Err(Error::validation(
            entity,
            format!("attribute `{name}` is not declared as the {description}"),
        ));
    }
    if !attribute.kind.is_key_type() {
        return Err(Error::validation(
            entity,
            format!(
                "{description} `{name}` must be String or Number, found {}",
                attribute.kind
            ),
        ));
    }
    Ok(())
}

fn validate_shape(entity: &str, attributes: &AttributeMap, table: &TableMetadata) -> Result<()> {
    let count_role = |role: AttributeRole| {
        attributes
            .values()
            .filter(|attribute| attribute.role == role)
            .count()
    };
    let partition_keys = count_role(AttributeRole::PartitionKey);
    if partition_keys != 1 {
        return Err(Error::validation(
            entity,
            format!("expected exactly one partition key, found {partition_keys}"),
        ));
    }
    let sort_keys = count_role(AttributeRole::SortKey);
    if sort_keys > 1 {
        return Err(Error::validation(
            entity,
            format!("expected at most one sort key, found {sort_keys}"),
        ));
    }
    check_key(
        entity,
        attributes,
        &table.partition_key,
        "partition key",
        |attribute| attribute.role == AttributeRole::PartitionKey,
    )?;
    match &table.sort_key {
        Some(sort_key) => check_key(entity, attributes, sort_key, "sort key", |attribute| {
            attribute.role == AttributeRole::SortKey
        })?,
        None if sort_keys > 0 => {
            return Err(Error::validation(
                entity,
                format!("table `{}` has no sort key but a sort key attribute is declared", table.name),
            ));
        }
        None => {}
    }
    for (index_name, index) in &table.indexes {
        let mut key_roles = Vec::with_capacity(2);
        match (&index.partition_key, &index.sort_key) {
            (Some(partition_key), sort_key) => {
                key_roles.push((partition_key, IndexRole::GsiPartitionKey));
                if let Some(sort_key) = sort_key {
                    key_roles.push((sort_key, IndexRole::GsiSortKey));
                }
            }
            (None, Some(sort_key)) => key_roles.push((sort_key, IndexRole::LsiSortKey)),
            (None, None) => {
                return Err(Error::validation(
                    entity,
                    format!("index `{index_name}` declares no key attribute"),
                ));
            }
        }
        for (key, role) in key_roles {
            let description = format!("{role} of index `{index_name}`");
            check_key(entity, attributes, key, &description, |attribute| {
                attribute.keys_index(index_name, role)
            })?;
        }
    }
    for attribute in attributes.values() {
        if let Some(index) = attribute
            .indexes
            .iter()
            .find(|index| !table.indexes.contains_key(&index.index_name))
        {
            return Err(Error::validation(
                entity,
                format!(
                    "attribute `{}` keys index `{}` which table `{}` does not declare",
                    attribute.property_name, index.index_name, table.name
                ),
            ));
        }
    }
    for timestamp in [&table.created_at, &table.updated_at].into_iter().flatten() {
        check_key(entity, attributes, timestamp, "timestamp", |attribute| {
            attribute.role == AttributeRole::Date
        })?;
    }
    Ok(())
}

fn link_parent(entities: &mut Entities, entity: &str, parent: Option<&str>) -> Result<()> {
    if let Some(parent) = parent {
        let introduces_cycle = parent == entity
            || ancestry(entities, parent).iter().any(|(name, entry)| {
                *name == entity || entry.parent.as_deref() == Some(entity)
            });
        if introduces_cycle {
            return Err(Error::validation(
                entity,
                format!("extending `{parent}` would make the entity its own ancestor"),
            ));
        }
    }
    entities.entry(entity.to_string()).or_default().parent = parent.map(str::to_string);
    Ok(())
}

fn insert_attribute(entities: &mut Entities, entity: &str, metadata: AttributeMetadata) -> Result<()> {
    let entry = entities.entry(entity.to_string()).or_default();
    if entry.attributes.contains_key(&metadata.property_name) {
        return Err(Error::DuplicateAttribute {
            entity: entity.to_string(),
            attribute: metadata.property_name,
        });
    }
    validate_attribute(entity, &metadata)?;
    entry
        .attributes
        .insert(metadata.property_name.clone(), metadata);
    Ok(())
}

fn insert_table(entities: &mut Entities, entity: &str, table: TableMetadata) -> Result<()> {
    validate_shape(entity, &merged_attributes(entities, entity), &table)?;
    entities.entry(entity.to_string()).or_default().table = Some(table);
    Ok(())
}

/// Re-check `entity` and every entity extending it: key roles across each merged chain, and
/// the shape of the table each one stores into.
fn validate_lineage(entities: &Entities, entity: &str) -> Result<()> {
    let affected = entities.keys().filter(|name| {
        ancestry(entities, name)
            .iter()
            .any(|(ancestor, _)| *ancestor == entity)
    });
    for name in affected {
        let attributes = merged_attributes(entities, name);
        validate_key_roles(name, &attributes)?;
        if let Some(table) = inherited_table(entities, name) {
            validate_shape(name, &attributes, table)?;
        }
    }
    Ok(())
}

/// Process-wide store of attribute and table metadata, keyed by entity name.
///
/// Entities are registered once at start-up; lookups return owned snapshots so they can run
/// concurrently once registration is over. Registration takes a write lock and is safe to call
/// from several threads, although it is meant to happen before any lookup.
///
/// Every mutation is applied to a staged copy and validated against the whole inheritance
/// chain before it is committed, so a rejected registration leaves the registry unchanged.
///
/// ```rust
/// use dynamodb_entity::metadata::{
///     attribute::{AttributeKind, AttributeMetadata},
///     registry::Registry,
/// };
///
/// let registry = Registry::new();
/// registry
///     .register_attribute("Order", AttributeMetadata::partition_key("id", AttributeKind::String))
///     .unwrap();
/// assert!(registry.attributes_for_entity("Order").contains_key("id"));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    entities: RwLock<Entities>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `mutate` to a copy of the entities, validate what `entity` and its descendants
    /// end up with, then commit.
    fn stage(&self, entity: &str, mutate: impl FnOnce(&mut Entities) -> Result<()>) -> Result<()> {
        let mut entities = self.entities.write();
        let mut staged = entities.clone();
        mutate(&mut staged)?;
        validate_lineage(&staged, entity)?;
        *entities = staged;
        Ok(())
    }

    /// Record `entity`, optionally linking it to the entity it extends.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn register_entity(&self, entity: &str, parent: Option<&str>) -> Result<()> {
        self.stage(entity, |entities| link_parent(entities, entity, parent))
    }

    /// Record one attribute of `entity`. Attributes are append-only.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn register_attribute(&self, entity: &str, metadata: AttributeMetadata) -> Result<()> {
        self.stage(entity, |entities| insert_attribute(entities, entity, metadata))
    }

    /// Record a whole declaration: parent link, attributes, then table. Either all of it is
    /// recorded or none of it.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(entity = %definition.name), err)
    )]
    pub fn register_definition(&self, definition: EntityDefinition) -> Result<()> {
        let EntityDefinition {
            name,
            parent,
            attributes,
            table,
        } = definition;
        self.stage(&name, |entities| {
            link_parent(entities, &name, parent.as_deref())?;
            for metadata in attributes {
                insert_attribute(entities, &name, metadata)?;
            }
            if let Some(table) = table {
                insert_table(entities, &name, table)?;
            }
            Ok(())
        })
    }

    /// Attributes of `entity` merged with its ancestors', nearer entities winning.
    ///
    /// Unknown entities yield an empty map.
    pub fn attributes_for_entity(&self, entity: &str) -> AttributeMap {
        merged_attributes(&self.entities.read(), entity)
    }

    /// Metadata of a single attribute, resolved through the entity chain.
    pub fn attribute(&self, entity: &str, property_name: &str) -> Option<AttributeMetadata> {
        ancestry(&self.entities.read(), entity)
            .into_iter()
            .find_map(|(_, entry)| entry.attributes.get(property_name).cloned())
    }

    /// Replace the value prefix of a registered attribute.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn update_attribute_prefix(
        &self,
        entity: &str,
        property_name: &str,
        prefix: &str,
    ) -> Result<()> {
        self.update_attribute(entity, property_name, |metadata| {
            metadata.prefix = Some(prefix.to_string());
        })
    }

    /// Replace the value suffix of a registered attribute.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn update_attribute_suffix(
        &self,
        entity: &str,
        property_name: &str,
        suffix: &str,
    ) -> Result<()> {
        self.update_attribute(entity, property_name, |metadata| {
            metadata.suffix = Some(suffix.to_string());
        })
    }

    /// Mutate an attribute of `entity`. An attribute inherited from an ancestor is copied onto
    /// `entity` first, so the ancestor keeps its own metadata.
    fn update_attribute(
        &self,
        entity: &str,
        property_name: &str,
        update: impl FnOnce(&mut AttributeMetadata),
    ) -> Result<()> {
        self.stage(entity, |entities| {
            let mut metadata = ancestry(entities, entity)
                .into_iter()
                .find_map(|(_, entry)| entry.attributes.get(property_name).cloned())
                .ok_or_else(|| {
                    Error::not_registered(entity, format!("attribute `{property_name}`"))
                })?;
            update(&mut metadata);
            validate_attribute(entity, &metadata)?;
            entities
                .entry(entity.to_string())
                .or_default()
                .attributes
                .insert(property_name.to_string(), metadata);
            Ok(())
        })
    }

    /// Move everything registered under `old_name` to `new_name`.
    ///
    /// Entities extending `old_name` follow the rename.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn rename_entity(&self, old_name: &str, new_name: &str) -> Result<()> {
        if old_name == new_name {
            return Ok(());
        }
        self.stage(new_name, |entities| {
            let old = entities
                .remove(old_name)
                .ok_or_else(|| Error::not_registered(old_name, "entity"))?;
            let target = entities.entry(new_name.to_string()).or_default();
            if let Some(attribute) = old
                .attributes
                .keys()
                .find(|attribute| target.attributes.contains_key(*attribute))
            {
                return Err(Error::DuplicateAttribute {
                    entity: new_name.to_string(),
                    attribute: attribute.clone(),
                });
            }
            target.attributes.extend(old.attributes);
            if target.parent.is_none() {
                target.parent = old.parent;
            }
            if target.table.is_none() {
                target.table = old.table;
            }
            for entry in entities.values_mut() {
                if entry.parent.as_deref() == Some(old_name) {
                    entry.parent = Some(new_name.to_string());
                }
            }
            Ok(())
        })
    }

    /// Check that `table` can store `entity`: every table and index key must match an attribute
    /// declared with the same role and a String or Number type.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn validate_table_shape(&self, entity: &str, table: &TableMetadata) -> Result<()> {
        validate_shape(entity, &self.attributes_for_entity(entity), table)
    }

    /// Validate `table` against `entity` and record it.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub fn register_table(&self, entity: &str, table: TableMetadata) -> Result<()> {
        self.stage(entity, |entities| insert_table(entities, entity, table))
    }

    /// Table of `entity` or of its nearest ancestor that has one.
    pub fn table_for_entity(&self, entity: &str) -> Option<TableMetadata> {
        inherited_table(&self.entities.read(), entity).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{attribute::IndexKey, table::IndexMetadata};

    use rstest::rstest;

    fn order_registry() -> Registry {
        let registry = Registry::new();
        for metadata in [
            AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("ORDER"),
            AttributeMetadata::sort_key("sk", AttributeKind::String),
            AttributeMetadata::index(
                "status",
                AttributeKind::String,
                IndexKey::gsi_partition_key("byStatus"),
            ),
            AttributeMetadata::index("total", AttributeKind::Number, IndexKey::lsi_sort_key("byTotal")),
            AttributeMetadata::date("createdAt", AttributeKind::Number),
            AttributeMetadata::attribute("tags", AttributeKind::Set),
        ] {
            registry.register_attribute("Order", metadata).unwrap();
        }
        registry
    }

    fn order_table() -> TableMetadata {
        TableMetadata::new("orders", "id")
            .with_sort_key("sk")
            .with_index("byStatus", IndexMetadata::global("status", None))
            .with_index("byTotal", IndexMetadata::local("total"))
            .with_created_at("createdAt")
    }

    #[test]
    fn test_inheritance_merge() {
        let registry = Registry::new();
        registry.register_entity("Parent", None).unwrap();
        registry.register_entity("Child", Some("Parent")).unwrap();
        registry
            .register_attribute("Parent", AttributeMetadata::attribute("a", AttributeKind::String))
            .unwrap();
        registry
            .register_attribute("Child", AttributeMetadata::attribute("b", AttributeKind::Number))
            .unwrap();
        let attributes = registry.attributes_for_entity("Child");
        assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(registry.attributes_for_entity("Parent").len(), 1);
    }

    #[test]
    fn test_inheritance_child_overrides_parent() {
        let registry = Registry::new();
        registry.register_entity("Child", Some("Parent")).unwrap();
        registry
            .register_attribute("Parent", AttributeMetadata::attribute("a", AttributeKind::String))
            .unwrap();
        registry
            .register_attribute("Child", AttributeMetadata::attribute("a", AttributeKind::Number))
            .unwrap();
        assert_eq!(
            registry.attributes_for_entity("Child")["a"].kind,
            AttributeKind::Number
        );
        assert_eq!(
            registry.attributes_for_entity("Parent")["a"].kind,
            AttributeKind::String
        );
    }

    fn parent_registry() -> Registry {
        let registry = Registry::new();
        registry
            .register_attribute("Parent", AttributeMetadata::partition_key("id", AttributeKind::String))
            .unwrap();
        registry
            .register_table("Parent", TableMetadata::new("items", "id"))
            .unwrap();
        registry.register_entity("Child", Some("Parent")).unwrap();
        registry
            .register_attribute("Child", AttributeMetadata::attribute("title", AttributeKind::String))
            .unwrap();
        registry
    }

    #[rstest]
    #[case::child_second_partition_key(|registry: &Registry| -> Result<()> {
        registry.register_attribute("Child", AttributeMetadata::partition_key("pk", AttributeKind::String))
    })]
    #[case::parent_second_partition_key(|registry: &Registry| -> Result<()> {
        registry.register_attribute("Parent", AttributeMetadata::partition_key("pk", AttributeKind::String))
    })]
    #[case::linked_entity_with_own_partition_key(|registry: &Registry| -> Result<()> {
        registry.register_attribute("Other", AttributeMetadata::partition_key("pk", AttributeKind::String))?;
        registry.register_entity("Other", Some("Parent"))
    })]
    #[case::child_sort_key_without_table_sort_key(|registry: &Registry| -> Result<()> {
        registry.register_attribute("Child", AttributeMetadata::sort_key("sk", AttributeKind::String))
    })]
    #[case::child_key_of_undeclared_index(|registry: &Registry| -> Result<()> {
        registry.register_attribute(
            "Child",
            AttributeMetadata::index("x", AttributeKind::String, IndexKey::gsi_partition_key("missing")),
        )
    })]
    #[case::child_overrides_key_with_wrong_type(|registry: &Registry| -> Result<()> {
        registry.register_attribute("Child", AttributeMetadata::partition_key("id", AttributeKind::Boolean))
    })]
    fn test_chain_keys_rejected(#[case] register: fn(&Registry) -> Result<()>) {
        let registry = parent_registry();
        let error = register(&registry).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }), "{error}");
        assert_eq!(
            registry.attributes_for_entity("Child").keys().collect::<Vec<_>>(),
            vec!["id", "title"]
        );
        assert_eq!(registry.attributes_for_entity("Parent").len(), 1);
    }

    #[test]
    fn test_child_overrides_partition_key() {
        let registry = parent_registry();
        registry
            .register_attribute(
                "Child",
                AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("BOOK"),
            )
            .unwrap();
        assert_eq!(
            registry.attribute("Child", "id").unwrap().prefix.as_deref(),
            Some("BOOK")
        );
        assert_eq!(registry.attribute("Parent", "id").unwrap().prefix, None);
    }

    #[test]
    fn test_unknown_entity_is_empty() {
        assert!(Registry::new().attributes_for_entity("Nope").is_empty());
    }

    #[test]
    fn test_duplicate_attribute() {
        let registry = order_registry();
        let error = registry
            .register_attribute("Order", AttributeMetadata::attribute("tags", AttributeKind::Array))
            .unwrap_err();
        assert!(matches!(
            error,
            Error::DuplicateAttribute { entity, attribute } if entity == "Order" && attribute == "tags"
        ));
    }

    #[rstest]
    #[case::second_partition_key(AttributeMetadata::partition_key("other", AttributeKind::String))]
    #[case::index_without_index(AttributeMetadata::new("x", AttributeRole::Index, AttributeKind::String))]
    #[case::empty_index_name(AttributeMetadata::index("x", AttributeKind::String, IndexKey::gsi_sort_key("")))]
    #[case::prefix_on_number(AttributeMetadata::attribute("x", AttributeKind::Number).with_prefix("P"))]
    fn test_register_attribute_rejects(#[case] metadata: AttributeMetadata) {
        let error = order_registry()
            .register_attribute("Order", metadata)
            .unwrap_err();
        assert!(matches!(error, Error::Validation { .. }), "{error}");
    }

    #[test]
    fn test_update_prefix_and_suffix() {
        let registry = order_registry();
        registry.update_attribute_prefix("Order", "sk", "LINE").unwrap();
        registry.update_attribute_suffix("Order", "sk", "V1").unwrap();
        let sk = registry.attribute("Order", "sk").unwrap();
        assert_eq!(sk.prefix.as_deref(), Some("LINE"));
        assert_eq!(sk.suffix.as_deref(), Some("V1"));
    }

    #[test]
    fn test_update_inherited_attribute_copies_onto_child() {
        let registry = order_registry();
        registry.register_entity("SpecialOrder", Some("Order")).unwrap();
        registry
            .update_attribute_prefix("SpecialOrder", "id", "SPECIAL")
            .unwrap();
        assert_eq!(
            registry.attribute("SpecialOrder", "id").unwrap().prefix.as_deref(),
            Some("SPECIAL")
        );
        assert_eq!(
            registry.attribute("Order", "id").unwrap().prefix.as_deref(),
            Some("ORDER")
        );
    }

    #[rstest]
    #[case::unknown_attribute("Order", "missing")]
    #[case::unknown_entity("Nope", "id")]
    fn test_update_prefix_not_registered(#[case] entity: &str, #[case] attribute: &str) {
        let error = order_registry()
            .update_attribute_prefix(entity, attribute, "P")
            .unwrap_err();
        assert!(matches!(error, Error::NotRegistered { .. }), "{error}");
    }

    #[test]
    fn test_update_prefix_on_number_rejected() {
        let error = order_registry()
            .update_attribute_prefix("Order", "total", "P")
            .unwrap_err();
        assert!(matches!(error, Error::Validation { .. }), "{error}");
    }

    #[test]
    fn test_rename_entity() {
        let registry = order_registry();
        registry.register_entity("SpecialOrder", Some("Order")).unwrap();
        registry.register_table("Order", order_table()).unwrap();
        registry.rename_entity("Order", "PurchaseOrder").unwrap();
        assert!(registry.attributes_for_entity("Order").is_empty());
        assert_eq!(registry.attributes_for_entity("PurchaseOrder").len(), 6);
        assert_eq!(registry.attributes_for_entity("SpecialOrder").len(), 6);
        assert_eq!(
            registry.table_for_entity("PurchaseOrder").unwrap().name,
            "orders"
        );
    }

    #[test]
    fn test_rename_unknown_entity() {
        let error = Registry::new().rename_entity("A", "B").unwrap_err();
        assert!(matches!(error, Error::NotRegistered { .. }));
    }

    #[test]
    fn test_register_entity_rejects_cycle() {
        let registry = Registry::new();
        registry.register_entity("B", Some("A")).unwrap();
        let error = registry.register_entity("A", Some("B")).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn test_validate_table_shape_ok() {
        let registry = order_registry();
        registry.validate_table_shape("Order", &order_table()).unwrap();
        registry.register_table("Order", order_table()).unwrap();
        registry.register_entity("SpecialOrder", Some("Order")).unwrap();
        assert_eq!(
            registry.table_for_entity("SpecialOrder"),
            Some(order_table())
        );
    }

    #[rstest]
    #[case::missing_partition_key(TableMetadata::new("orders", "nope").with_sort_key("sk"), "nope")]
    #[case::partition_key_wrong_role(TableMetadata::new("orders", "sk").with_sort_key("sk"), "sk")]
    #[case::missing_sort_key(TableMetadata::new("orders", "id"), "sort key")]
    #[case::gsi_wrong_index(
        order_table().with_index("other", IndexMetadata::global("status", None)),
        "other"
    )]
    #[case::lsi_key_not_associated(
        order_table().with_index("byTags", IndexMetadata::local("tags")),
        "byTags"
    )]
    #[case::index_without_keys(order_table().with_index("empty", IndexMetadata::default()), "empty")]
    #[case::undeclared_index(
        TableMetadata::new("orders", "id")
            .with_sort_key("sk")
            .with_index("byStatus", IndexMetadata::global("status", None)),
        "byTotal"
    )]
    #[case::timestamp_not_date(order_table().with_updated_at("status"), "status")]
    fn test_validate_table_shape_rejects(#[case] table: TableMetadata, #[case] mentions: &str) {
        let error = order_registry()
            .validate_table_shape("Order", &table)
            .unwrap_err();
        assert!(matches!(error, Error::Validation { .. }), "{error}");
        assert!(error.to_string().contains(mentions), "{error}");
    }

    #[test]
    fn test_validate_table_shape_rejects_key_type() {
        let registry = order_registry();
        registry
            .register_attribute(
                "Order",
                AttributeMetadata::index("flag", AttributeKind::Boolean, IndexKey::gsi_partition_key("byFlag")),
            )
            .unwrap();
        let table = order_table().with_index("byFlag", IndexMetadata::global("flag", None));
        let error = registry.validate_table_shape("Order", &table).unwrap_err();
        assert!(error.to_string().contains("must be String or Number"), "{error}");
        assert!(registry.register_table("Order", table).is_err());
        assert_eq!(registry.table_for_entity("Order"), None);
    }

    #[test]
    fn test_validate_table_shape_requires_partition_key() {
        let registry = Registry::new();
        registry
            .register_attribute("Thing", AttributeMetadata::attribute("id", AttributeKind::String))
            .unwrap();
        let error = registry
            .validate_table_shape("Thing", &TableMetadata::new("things", "id"))
            .unwrap_err();
        assert!(error.to_string().contains("exactly one partition key"), "{error}");
    }
}
