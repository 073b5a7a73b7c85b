#![doc(
    html_logo_url = "https://raw.githubusercontent.com/dariocurr/dynamodb-entity/main/assets/logo.png",
    html_favicon_url = "https://raw.githubusercontent.com/dariocurr/dynamodb-entity/main/assets/logo.png"
)]
#![deny(missing_docs)]

//! # DynamoDB Entity
//!
//! A typed entity-mapping layer and expression compiler for Amazon DynamoDB.
//!
//! ## Overview
//!
//! Entities are plain serde types. Their attributes are described once in a [`Registry`]
//! (key roles, index membership, prefix and suffix decoration, date encoding), and every
//! request built for them follows that metadata:
//! - Entities are converted to and from wire items, decorating keys on the way out and
//!   stripping the decoration on the way back
//! - Conditions, filters, updates and projections are built from typed operators and
//!   compiled into expression strings with collision-free name and value placeholders
//! - Get, Query, Scan, Put, Update and Delete builders resolve the entity's table and
//!   yield the fields of the matching SDK request
//!
//! Sending the requests stays with the caller's `aws_sdk_dynamodb::Client`.
//!
//! ## Quick Example
//!
//! ```rust
//! use aws_sdk_dynamodb::operation::update_item::UpdateItemInput;
//! use dynamodb_entity::{
//!     codec::ValueCodec,
//!     converter::{EntityConverter, PrimaryKey},
//!     expression::{condition::Condition, update::Update},
//!     metadata::{
//!         attribute::{AttributeKind, AttributeMetadata},
//!         entity::{Entity, EntityDefinition},
//!         registry::Registry,
//!         table::TableMetadata,
//!     },
//!     write::{common::WriteArgs, update_item::UpdateItem},
//! };
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Serialize)]
//! struct User {
//!     id: String,
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Entity for User {
//!     const NAME: &'static str = "User";
//! }
//!
//! let registry = Registry::new();
//! EntityDefinition::of::<User>()
//!     .attribute(AttributeMetadata::partition_key("id", AttributeKind::String).with_prefix("USER"))
//!     .attribute(AttributeMetadata::attribute("age", AttributeKind::Number))
//!     .table(TableMetadata::new("users", "id"))
//!     .register(&registry)?;
//!
//! let converter = EntityConverter::new(&registry, ValueCodec::default());
//! let update_item = UpdateItem::<User>::new(
//!     PrimaryKey::new("1"),
//!     Update::new().set("name", "Jane").increment("age", 1),
//! )
//! .with_args(WriteArgs {
//!     condition: Some(Condition::new().attribute("age").lt(120)),
//!     ..Default::default()
//! })
//! .build(&converter)?;
//!
//! assert_eq!(update_item.update_expression, "SET #name = :name, age = age + :age");
//! assert_eq!(
//!     update_item.write_input.condition_expression.as_deref(),
//!     Some("age < :age__1")
//! );
//!
//! let request = dynamodb_entity::apply_write_input!(
//!     UpdateItemInput::builder()
//!         .set_key(Some(update_item.key))
//!         .update_expression(update_item.update_expression),
//!     update_item.write_input
//! )
//! .build()?;
//! assert_eq!(request.table_name(), Some("users"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`mod@metadata`] - Attribute, table and entity metadata, and the registry holding it
//! - [`mod@codec`] - Per-attribute value encoding
//! - [`mod@expression`] - Operators, conditions, updates, projections and their compiler
//! - [`mod@converter`] - Entity and key conversion
//! - [`mod@read`] - Read operations (GetItem, Query, Scan)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem)
//!
//! [`Registry`]: metadata::registry::Registry

/// Per-attribute value encoding: decoration, dates, sets and generic marshaling.
pub mod codec;

/// Process-level mapper settings.
pub mod config;

/// Conversion of whole entities and primary keys to and from wire items.
pub mod converter;

/// Error type of the crate.
pub mod error;

/// Typed expression building and compilation.
///
/// This module provides:
/// - Comparison, function and update operators
/// - Condition and filter chaining with AND, OR and NOT
/// - Update and projection builders
/// - The compiler turning all of them into expression strings and placeholders
pub mod expression;

/// Attribute, table and entity metadata, and the registry holding it.
pub mod metadata;

/// Read operations for retrieving data from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items with key conditions
/// - Scanning entire tables or indexes
pub mod read;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items with SET, ADD, DELETE and REMOVE actions
/// - Deleting items by key
pub mod write;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
