//! Write requests: putting a whole entity, updating or deleting an item by key.
//!
//! The condition and update expressions of one request share a single compiler, so their
//! placeholders never collide.

/// Conditions and return settings shared by the write builders.
pub mod common;

/// Conditional removal of one item.
pub mod delete_item;

/// Creation or replacement of a whole entity.
pub mod put_item;

/// In-place mutation of one item.
pub mod update_item;
