//! Read requests: a single item by key, a query on key conditions, or a scan.
//!
//! Each builder resolves the entity's table from the registry and compiles all of its
//! expressions with one compiler, then yields plain input fields for the SDK request builders.

/// Table resolution and the settings shared by the read builders.
pub mod common;

/// One item addressed by its primary key.
pub mod get_item;

/// Items sharing a partition key, narrowed by a sort key condition.
pub mod query;

/// Every item of a table or index, optionally in parallel segments.
pub mod scan;
