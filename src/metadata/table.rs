use indexmap::IndexMap;

/// Key attributes of one secondary index.
///
/// An index with a partition key is global; an index with only a sort key is local and
/// shares the table's partition key.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexMetadata {
    /// Partition key attribute (global indexes only).
    pub partition_key: Option<String>,
    /// Sort key attribute.
    pub sort_key: Option<String>,
}

impl IndexMetadata {
    /// Global secondary index.
    pub fn global(partition_key: impl Into<String>, sort_key: Option<String>) -> Self {
        Self {
            partition_key: Some(partition_key.into()),
            sort_key,
        }
    }

    /// Local secondary index.
    pub fn local(sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: None,
            sort_key: Some(sort_key.into()),
        }
    }

    /// Whether the index is global.
    pub fn is_global(&self) -> bool {
        self.partition_key.is_some()
    }
}

/// Shape of the table an entity is stored in.
///
/// ```rust
/// use dynamodb_entity::metadata::table::{IndexMetadata, TableMetadata};
///
/// let table = TableMetadata::new("orders", "id")
///     .with_sort_key("sk")
///     .with_index("byStatus", IndexMetadata::global("status", None))
///     .with_created_at("createdAt");
/// assert!(table.indexes["byStatus"].is_global());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Partition key attribute.
    pub partition_key: String,
    /// Sort key attribute, for composite primary keys.
    pub sort_key: Option<String>,
    /// Secondary indexes keyed by index name.
    pub indexes: IndexMap<String, IndexMetadata>,
    /// Attribute holding the creation timestamp.
    ///
    /// Registration checks that it names a date attribute. Request builders never stamp it,
    /// the entity carries its own value.
    pub created_at: Option<String>,
    /// Attribute holding the last update timestamp.
    ///
    /// Validated like `created_at` and likewise never stamped.
    pub updated_at: Option<String>,
}

impl TableMetadata {
    /// Table keyed by `partition_key` only.
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            ..Default::default()
        }
    }

    /// Set the sort key.
    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Declare a secondary index.
    pub fn with_index(mut self, name: impl Into<String>, index: IndexMetadata) -> Self {
        self.indexes.insert(name.into(), index);
        self
    }

    /// Set the creation timestamp attribute. This is metadata only.
    pub fn with_created_at(mut self, attribute: impl Into<String>) -> Self {
        self.created_at = Some(attribute.into());
        self
    }

    /// Set the update timestamp attribute. This is metadata only.
    pub fn with_updated_at(mut self, attribute: impl Into<String>) -> Self {
        self.updated_at = Some(attribute.into());
        self
    }

    /// Partition and sort key attribute names used to address `index_name`.
    ///
    /// Local indexes reuse the table partition key. `None` means no such index.
    pub fn index_keys(&self, index_name: &str) -> Option<(&str, Option<&str>)> {
        let index = self.indexes.get(index_name)?;
        let partition_key = index
            .partition_key
            .as_deref()
            .unwrap_or(&self.partition_key);
        Some((partition_key, index.sort_key.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keys() {
        let table = TableMetadata::new("t", "pk")
            .with_sort_key("sk")
            .with_index("gsi", IndexMetadata::global("gpk", Some("gsk".to_string())))
            .with_index("lsi", IndexMetadata::local("lsk"));
        assert_eq!(table.index_keys("gsi"), Some(("gpk", Some("gsk"))));
        assert_eq!(table.index_keys("lsi"), Some(("pk", Some("lsk"))));
        assert_eq!(table.index_keys("missing"), None);
        assert!(!table.indexes["lsi"].is_global());
    }
}
