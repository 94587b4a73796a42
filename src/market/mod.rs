//! Marketplace integration.
//!
//! Defines the `Marketplace` trait the engine is written against, and the
//! warframe.market implementation built on the rate-limited `FetchClient`.

pub mod fetch;
pub mod warframe;
pub mod wire;

use async_trait::async_trait;

use crate::types::{Component, Item, Order};

/// Read-only view of an upstream item marketplace.
///
/// Every method returns `None` when the answer cannot be determined
/// (upstream absence, exhausted retries, undecodable payload). `None` is
/// never a stand-in for zero.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Full item catalog, in upstream order.
    async fn catalog(&self) -> Option<Vec<Item>>;

    /// Part identifiers listed in a set's manifest. The set itself is
    /// normally one of them.
    async fn set_parts(&self, set_slug: &str) -> Option<Vec<String>>;

    /// Slug and quantity-per-set for one manifest entry.
    async fn part(&self, part_id: &str) -> Option<Component>;

    /// All open orders for an item.
    async fn orders(&self, item_slug: &str) -> Option<Vec<Order>>;
}
