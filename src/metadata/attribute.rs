use std::fmt;

/// Declared kind of an attribute's value.
///
/// ```rust
/// use dynamodb_entity::metadata::attribute::AttributeKind;
///
/// assert!(AttributeKind::String.is_key_type());
/// assert!(!AttributeKind::Map.is_key_type());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeKind {
    /// Nested list of arbitrary values (`L`).
    Array,
    /// Raw bytes (`B`).
    Binary,
    /// Boolean (`BOOL`).
    Boolean,
    /// String-keyed map whose values share a shape (`M`).
    Map,
    /// Number (`N`).
    Number,
    /// Nested structure (`M`).
    Object,
    /// Homogeneous set of strings, numbers or binaries (`SS`, `NS`, `BS`).
    Set,
    /// String (`S`).
    String,
}

impl AttributeKind {
    /// Whether the kind may back a table or index key.
    pub fn is_key_type(self) -> bool {
        matches!(self, Self::String | Self::Number)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Array => "Array",
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Map => "Map",
            Self::Number => "Number",
            Self::Object => "Object",
            Self::Set => "Set",
            Self::String => "String",
        };
        f.write_str(name)
    }
}

/// Structural role an attribute plays for its entity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AttributeRole {
    /// Table partition key.
    PartitionKey,
    /// Table sort key.
    SortKey,
    /// Key of one or more secondary indexes only.
    Index,
    /// Timestamp stored as a string or a number.
    Date,
    /// Plain attribute.
    Attribute,
}

/// Role an attribute plays inside one secondary index.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IndexRole {
    /// Partition key of a global secondary index.
    GsiPartitionKey,
    /// Sort key of a global secondary index.
    GsiSortKey,
    /// Sort key of a local secondary index.
    LsiSortKey,
}

impl fmt::Display for IndexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GsiPartitionKey => "GSI partition key",
            Self::GsiSortKey => "GSI sort key",
            Self::LsiSortKey => "LSI sort key",
        };
        f.write_str(name)
    }
}

/// Association between an attribute and a secondary index.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IndexKey {
    /// Name of the index.
    pub index_name: String,
    /// Role inside the index.
    pub role: IndexRole,
}

impl IndexKey {
    /// Partition key of the global secondary index `index_name`.
    pub fn gsi_partition_key(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            role: IndexRole::GsiPartitionKey,
        }
    }

    /// Sort key of the global secondary index `index_name`.
    pub fn gsi_sort_key(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            role: IndexRole::GsiSortKey,
        }
    }

    /// Sort key of the local secondary index `index_name`.
    pub fn lsi_sort_key(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            role: IndexRole::LsiSortKey,
        }
    }
}

/// Metadata recorded for one property of an entity.
///
/// ```rust
/// use dynamodb_entity::metadata::attribute::{AttributeKind, AttributeMetadata};
///
/// let id = AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("ORDER");
/// assert_eq!(id.prefix.as_deref(), Some("ORDER"));
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeMetadata {
    /// Property name, also the attribute name on the wire.
    pub property_name: String,
    /// Structural role.
    pub role: AttributeRole,
    /// Declared value kind.
    pub kind: AttributeKind,
    /// Secondary indexes the attribute keys.
    pub indexes: Vec<IndexKey>,
    /// Segment prepended to string values.
    pub prefix: Option<String>,
    /// Segment appended to string values.
    pub suffix: Option<String>,
}

impl AttributeMetadata {
    /// Attribute with an explicit role.
    pub fn new(property_name: impl Into<String>, role: AttributeRole, kind: AttributeKind) -> Self {
        Self {
            property_name: property_name.into(),
            role,
            kind,
            indexes: Vec::new(),
            prefix: None,
            suffix: None,
        }
    }

    /// Table partition key.
    pub fn partition_key(property_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self::new(property_name, AttributeRole::PartitionKey, kind)
    }

    /// Table sort key.
    pub fn sort_key(property_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self::new(property_name, AttributeRole::SortKey, kind)
    }

    /// Key of the given secondary index.
    pub fn index(property_name: impl Into<String>, kind: AttributeKind, index: IndexKey) -> Self {
        Self::new(property_name, AttributeRole::Index, kind).with_index(index)
    }

    /// Timestamp attribute.
    pub fn date(property_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self::new(property_name, AttributeRole::Date, kind)
    }

    /// Plain attribute.
    pub fn attribute(property_name: impl Into<String>, kind: AttributeKind) -> Self {
        Self::new(property_name, AttributeRole::Attribute, kind)
    }

    /// Associate the attribute with one more secondary index.
    pub fn with_index(mut self, index: IndexKey) -> Self {
        self.indexes.push(index);
        self
    }

    /// Set the value prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the value suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Whether the attribute keys the table itself.
    pub fn is_primary_key(&self) -> bool {
        matches!(self.role, AttributeRole::PartitionKey | AttributeRole::SortKey)
    }

    /// Whether the attribute plays `role` in the index `index_name`.
    pub fn keys_index(&self, index_name: &str, role: IndexRole) -> bool {
        self.indexes
            .iter()
            .any(|index| index.index_name == index_name && index.role == role)
    }

    pub(crate) fn is_decorated(&self) -> bool {
        self.prefix.as_deref().is_some_and(|prefix| !prefix.is_empty())
            || self.suffix.as_deref().is_some_and(|suffix| !suffix.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::string(AttributeKind::String, true)]
    #[case::number(AttributeKind::Number, true)]
    #[case::boolean(AttributeKind::Boolean, false)]
    #[case::binary(AttributeKind::Binary, false)]
    #[case::set(AttributeKind::Set, false)]
    fn test_is_key_type(#[case] kind: AttributeKind, #[case] expected: bool) {
        assert_eq!(kind.is_key_type(), expected);
    }

    #[test]
    fn test_keys_index() {
        let metadata = AttributeMetadata::index(
            "status",
            AttributeKind::String,
            IndexKey::gsi_partition_key("byStatus"),
        )
        .with_index(IndexKey::lsi_sort_key("byStatusLocal"));
        assert!(metadata.keys_index("byStatus", IndexRole::GsiPartitionKey));
        assert!(metadata.keys_index("byStatusLocal", IndexRole::LsiSortKey));
        assert!(!metadata.keys_index("byStatus", IndexRole::GsiSortKey));
        assert!(!metadata.is_primary_key());
    }

    #[rstest]
    #[case::none(AttributeMetadata::attribute("a", AttributeKind::String), false)]
    #[case::empty_prefix(AttributeMetadata::attribute("a", AttributeKind::String).with_prefix(""), false)]
    #[case::prefix(AttributeMetadata::attribute("a", AttributeKind::String).with_prefix("P"), true)]
    #[case::suffix(AttributeMetadata::attribute("a", AttributeKind::String).with_suffix("S"), true)]
    fn test_is_decorated(#[case] metadata: AttributeMetadata, #[case] expected: bool) {
        assert_eq!(metadata.is_decorated(), expected);
    }
}
