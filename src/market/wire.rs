//! warframe.market v2 response shapes.
//!
//! Every payload is wrapped in `{"data": ...}`. Fields are optional on the
//! Rust side; each accessor documents what a missing or malformed value
//! turns into.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{Component, Item, Order, OrderSide, SellerStatus};

/// Top-level wrapper shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Decode list entries one at a time so a single malformed entry only costs
/// itself. Returns the decoded entries and how many were dropped.
pub fn decode_each<T: DeserializeOwned>(values: Vec<Value>) -> (Vec<T>, usize) {
    let total = values.len();
    let decoded: Vec<T> = values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    let dropped = total - decoded.len();
    (decoded, dropped)
}

/// Entry of `GET /items`.
#[derive(Debug, Deserialize)]
pub struct WireItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl WireItem {
    /// `None` when the entry has no (or an empty) slug. A missing id
    /// becomes an empty string; only part lookups use it.
    pub fn into_item(self) -> Option<Item> {
        let slug = self.slug.filter(|s| !s.is_empty())?;
        Some(Item::new(self.id.unwrap_or_default(), slug))
    }
}

/// Payload of `GET /items/{slug}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSetManifest {
    /// Part ids; absent means the item has no manifest entries.
    #[serde(default)]
    pub set_parts: Vec<String>,
}

/// Payload of `GET /item/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub quantity_in_set: Option<Value>,
}

impl WirePart {
    /// Quantity per set: positive integers (or integer strings) are taken
    /// as-is, anything else counts as 1.
    pub fn quantity(&self) -> u32 {
        let parsed = match &self.quantity_in_set {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .filter(|q| *q >= 1)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1)
    }

    /// `None` when the part has no slug; the set cannot be priced then.
    pub fn into_component(self) -> Option<Component> {
        let quantity = self.quantity();
        let slug = self.slug.filter(|s| !s.is_empty())?;
        Some(Component::new(slug, quantity))
    }
}

/// Entry of `GET /orders/item/{slug}`.
#[derive(Debug, Deserialize)]
pub struct WireOrder {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub platinum: Option<Value>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub user: Option<WireUser>,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(default)]
    pub status: Option<String>,
}

impl WireOrder {
    /// Price in whole platinum. Fractional or negative values are rejected.
    pub fn price(&self) -> Option<u64> {
        match &self.platinum {
            Some(Value::Number(n)) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            }),
            _ => None,
        }
    }

    /// `None` for orders with an unknown side or no usable price. Missing
    /// visibility counts as hidden, missing seller status as unknown, and
    /// missing quantity as 1.
    pub fn into_order(self) -> Option<Order> {
        let side = match self.kind.as_deref() {
            Some("sell") => OrderSide::Sell,
            Some("buy") => OrderSide::Buy,
            _ => return None,
        };
        let price = self.price()?;
        let seller = self
            .user
            .and_then(|u| u.status)
            .map(|s| SellerStatus::parse(&s))
            .unwrap_or(SellerStatus::Unknown);

        Some(Order {
            side,
            price,
            quantity: self.quantity.unwrap_or(1),
            visible: self.visible.unwrap_or(false),
            seller,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
