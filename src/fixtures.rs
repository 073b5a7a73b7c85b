//! Entities shared by the command tests.

use crate::metadata::{
    attribute::{AttributeKind, AttributeMetadata, IndexKey},
    entity::{Entity, EntityDefinition},
    registry::Registry,
    table::{IndexMetadata, TableMetadata},
};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Order {
    pub(crate) customer: String,
    pub(crate) id: String,
    pub(crate) status: String,
    pub(crate) total: u32,
}

impl Entity for Order {
    const NAME: &'static str = "Order";
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct Customer {
    pub(crate) id: String,
    pub(crate) email: String,
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";
}

/// `Order` keyed by customer and order id, with a GSI on status and an LSI on total.
/// `Customer` is registered without a table.
pub(crate) fn registry() -> Registry {
    let registry = Registry::new();
    EntityDefinition::of::<Order>()
        .attribute(
            AttributeMetadata::partition_key("customer", AttributeKind::String)
                .with_prefix("CUSTOMER"),
        )
        .attribute(AttributeMetadata::sort_key("id", AttributeKind::String).with_prefix("ORDER"))
        .attribute(AttributeMetadata::index(
            "status",
            AttributeKind::String,
            IndexKey::gsi_partition_key("byStatus"),
        ))
        .attribute(
            AttributeMetadata::index("total", AttributeKind::Number, IndexKey::gsi_sort_key("byStatus"))
                .with_index(IndexKey::lsi_sort_key("byTotal")),
        )
        .table(
            TableMetadata::new("orders", "customer")
                .with_sort_key("id")
                .with_index("byStatus", IndexMetadata::global("status", Some("total".to_string())))
                .with_index("byTotal", IndexMetadata::local("total")),
        )
        .register(&registry)
        .unwrap();
    EntityDefinition::of::<Customer>()
        .attribute(AttributeMetadata::partition_key("id", AttributeKind::String))
        .attribute(AttributeMetadata::attribute("email", AttributeKind::String))
        .register(&registry)
        .unwrap();
    registry
}

pub(crate) fn order() -> Order {
    Order {
        customer: "c1".to_string(),
        id: "o1".to_string(),
        status: "open".to_string(),
        total: 5,
    }
}
