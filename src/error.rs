//! Error type shared by the registry, codec, compiler and converter.

/// Errors raised while registering metadata, compiling expressions or converting entities.
///
/// None of these are retried: they describe programmer errors or data that does not
/// match its declared shape, and are surfaced before any request is sent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The attribute was already registered on the entity (attributes are append-only).
    #[error("attribute `{attribute}` is already registered on entity `{entity}`")]
    DuplicateAttribute {
        /// The entity the attribute was registered on.
        entity: String,
        /// The duplicated attribute.
        attribute: String,
    },
    /// The entity, attribute, table or index is unknown to the registry.
    #[error("{item} is not registered for entity `{entity}`")]
    NotRegistered {
        /// The entity the lookup was made for.
        entity: String,
        /// What was looked up, e.g. "attribute `total`" or "table".
        item: String,
    },
    /// Declared metadata is inconsistent with itself or with the table shape.
    #[error("invalid metadata for entity `{entity}`: {message}")]
    Validation {
        /// The entity whose metadata is inconsistent.
        entity: String,
        /// What is inconsistent.
        message: String,
    },
    /// A value conflicts with the type declared for its attribute.
    #[error("invalid type for attribute `{attribute}`: {message}")]
    InvalidType {
        /// The attribute whose value did not match.
        attribute: String,
        /// What was expected and what was found.
        message: String,
    },
    /// A malformed attribute path or operand was handed to the compiler.
    #[error("invalid parameter `{path}`: {message}")]
    InvalidParameter {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        message: String,
    },
    /// One path accumulated more distinct literal values than placeholders available.
    #[error("no free value placeholder left for path `{path}`")]
    PlaceholderExhausted {
        /// The path whose placeholders ran out.
        path: String,
    },
    /// Marshaling to or from the wire representation failed.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),
    /// Converting an entity to or from its intermediate JSON form failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn not_registered(entity: &str, item: impl Into<String>) -> Self {
        Self::NotRegistered {
            entity: entity.to_string(),
            item: item.into(),
        }
    }

    pub(crate) fn validation(entity: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_type(attribute: &str, message: impl Into<String>) -> Self {
        Self::InvalidType {
            attribute: attribute.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_parameter(path: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
