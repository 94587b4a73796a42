//! Table-driven `MockMarketplace` fixtures shared by engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::shutdown::ShutdownTrigger;
use crate::market::MockMarketplace;
use crate::types::{Component, Item, Order, OrderSide, SellerStatus};

pub fn order(side: OrderSide, price: u64, visible: bool, seller: SellerStatus) -> Order {
    Order {
        side,
        price,
        quantity: 1,
        visible,
        seller,
    }
}

/// A valid sell order plus some cheaper noise that must be filtered out.
pub fn book(price: u64) -> Vec<Order> {
    vec![
        order(OrderSide::Sell, price + 3, true, SellerStatus::Ingame),
        order(OrderSide::Sell, price, true, SellerStatus::Ingame),
        order(OrderSide::Buy, price.saturating_sub(1).max(1), true, SellerStatus::Ingame),
        order(OrderSide::Sell, price.saturating_sub(1).max(1), true, SellerStatus::Offline),
        order(OrderSide::Sell, price.saturating_sub(1).max(1), false, SellerStatus::Ingame),
    ]
}

#[derive(Default)]
pub struct Fixture {
    pub catalog: Option<Vec<Item>>,
    /// set slug -> part ids
    pub manifests: HashMap<String, Vec<String>>,
    /// part id -> component
    pub parts: HashMap<String, Component>,
    /// item slug -> order book
    pub orders: HashMap<String, Vec<Order>>,
    /// Raise shutdown when this slug's orders are requested.
    pub shutdown_on_orders: Option<(String, ShutdownTrigger)>,
    /// Slugs whose orders were requested, in order.
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl Fixture {
    /// Add a set whose parts are `(slug, quantity, price)`; the set itself
    /// is listed first in its manifest at `set_price`.
    pub fn with_set(mut self, set_slug: &str, set_price: u64, parts: &[(&str, u32, u64)]) -> Self {
        let catalog = self.catalog.get_or_insert_with(Vec::new);
        let set_id = format!("id-{set_slug}");
        catalog.push(Item::new(set_id.clone(), set_slug));

        let mut ids = vec![set_id.clone()];
        self.parts.insert(set_id, Component::new(set_slug, 1));
        self.orders.insert(set_slug.to_string(), book(set_price));

        for (slug, quantity, price) in parts {
            let id = format!("id-{slug}");
            catalog.push(Item::new(id.clone(), *slug));
            ids.push(id.clone());
            self.parts.insert(id, Component::new(*slug, *quantity));
            self.orders.insert(slug.to_string(), book(*price));
        }
        self.manifests.insert(set_slug.to_string(), ids);
        self
    }

    pub fn into_mock(self) -> MockMarketplace {
        let mut mock = MockMarketplace::new();

        let catalog = self.catalog;
        mock.expect_catalog().returning(move || catalog.clone());

        let manifests = self.manifests;
        mock.expect_set_parts()
            .returning(move |slug| manifests.get(slug).cloned());

        let parts = self.parts;
        mock.expect_part().returning(move |id| parts.get(id).cloned());

        let orders = self.orders;
        let hook = self.shutdown_on_orders;
        let requested = self.requested;
        mock.expect_orders().returning(move |slug| {
            requested.lock().unwrap().push(slug.to_string());
            if let Some((trigger_slug, trigger)) = &hook {
                if trigger_slug == slug {
                    trigger.trigger();
                }
            }
            orders.get(slug).cloned()
        });

        mock
    }
}

/// `foo_set` = blueprint x1 @5 + chassis x1 @10 + systems x2 @3, set @25.
pub fn foo_set_fixture() -> Fixture {
    let mut fx = Fixture::default();
    fx.catalog = Some(vec![
        Item::new("s0", "foo_set"),
        Item::new("b1", "foo_blueprint"),
        Item::new("c1", "foo_chassis"),
        Item::new("y1", "foo_systems"),
    ]);
    fx.manifests.insert(
        "foo_set".into(),
        vec!["s0".into(), "b1".into(), "c1".into(), "y1".into()],
    );
    fx.parts.insert("s0".into(), Component::new("foo_set", 1));
    fx.parts.insert("b1".into(), Component::new("foo_blueprint", 1));
    fx.parts.insert("c1".into(), Component::new("foo_chassis", 1));
    fx.parts.insert("y1".into(), Component::new("foo_systems", 2));
    fx.orders.insert("foo_set".into(), book(25));
    fx.orders.insert("foo_blueprint".into(), book(5));
    fx.orders.insert("foo_chassis".into(), book(10));
    fx.orders.insert("foo_systems".into(), book(3));
    fx
}
