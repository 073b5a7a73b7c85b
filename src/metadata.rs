//! Attribute and table metadata.
//!
//! Every entity records which of its properties play which structural role. Entities may
//! extend other entities; lookups merge the chain with nearer entities winning.

/// Attribute kinds, roles and per-attribute metadata.
pub mod attribute;

/// Entity trait and the declaration builder that feeds the registry.
pub mod entity;

/// Process-wide metadata registry.
pub mod registry;

/// Table and secondary index shapes.
pub mod table;
