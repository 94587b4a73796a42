//! warframe.market v2 integration.
//!
//! API docs: https://42bytes.notion.site/WFM-Api-v2-Documentation
//! Base URL: https://api.warframe.market/v2
//! Rate limit: roughly 3 requests/second per IP (enforced with 429s)
//! Auth: Not required for reads.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::fetch::FetchClient;
use super::wire::{decode_each, WireItem, WireOrder, WirePart, WireSetManifest};
use super::Marketplace;
use crate::types::{Component, Item, Order};

/// Marketplace adapter over the shared rate-limited client.
pub struct WarframeMarket {
    client: FetchClient,
}

impl WarframeMarket {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    fn path(prefix: &str, key: &str) -> String {
        format!("{prefix}/{}", urlencoding::encode(key))
    }
}

#[async_trait]
impl Marketplace for WarframeMarket {
    async fn catalog(&self) -> Option<Vec<Item>> {
        let raw: Vec<Value> = self.client.fetch_data("/items").await?;
        let total = raw.len();
        let (entries, _) = decode_each::<WireItem>(raw);
        let items: Vec<Item> = entries.into_iter().filter_map(WireItem::into_item).collect();

        if items.len() < total {
            warn!(skipped = total - items.len(), "Malformed catalog entries skipped");
        }
        debug!(count = items.len(), "Catalog fetched");
        Some(items)
    }

    async fn set_parts(&self, set_slug: &str) -> Option<Vec<String>> {
        let manifest: WireSetManifest = self
            .client
            .fetch_data(&Self::path("/items", set_slug))
            .await?;
        Some(manifest.set_parts)
    }

    async fn part(&self, part_id: &str) -> Option<Component> {
        let part: WirePart = self
            .client
            .fetch_data(&Self::path("/item", part_id))
            .await?;
        part.into_component()
    }

    async fn orders(&self, item_slug: &str) -> Option<Vec<Order>> {
        let raw: Vec<Value> = self
            .client
            .fetch_data(&Self::path("/orders/item", item_slug))
            .await?;
        let (entries, dropped) = decode_each::<WireOrder>(raw);
        if dropped > 0 {
            debug!(item = %item_slug, dropped, "Malformed orders skipped");
        }
        Some(entries.into_iter().filter_map(WireOrder::into_order).collect())
    }
}
