//! Arbitrage evaluation for a single set.
//!
//! The verdict is computed from completely known prices only: the set's own
//! quote and every component quote must be available, otherwise the set
//! yields nothing this cycle.

use chrono::Utc;
use tracing::{debug, info};

use super::catalog::resolve_manifest;
use super::pricing::lowest_sell_price;
use crate::config::ScanConfig;
use crate::market::Marketplace;
use crate::types::{ArbitrageOpportunity, Item};

/// Acceptance thresholds.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Minimum `set_price - total_part_price` to accept.
    pub min_arbitrage_value: i64,
    /// Minimum units listed for the set itself.
    pub min_set_volume: Option<u64>,
    pub market_url_base: String,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        let scan = ScanConfig::default();
        Self {
            min_arbitrage_value: scan.min_arbitrage_value,
            min_set_volume: scan.min_set_volume,
            market_url_base: scan.market_url_base,
        }
    }
}

impl From<&ScanConfig> for EvaluatorConfig {
    fn from(scan: &ScanConfig) -> Self {
        Self {
            min_arbitrage_value: scan.min_arbitrage_value,
            min_set_volume: scan.min_set_volume,
            market_url_base: scan.market_url_base.clone(),
        }
    }
}

pub struct ArbitrageEvaluator {
    config: EvaluatorConfig,
}

impl ArbitrageEvaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn market_url(&self, slug: &str) -> String {
        format!("{}/{}", self.config.market_url_base.trim_end_matches('/'), slug)
    }

    /// Evaluate one set. `None` means no opportunity this cycle, whether
    /// because data was missing or the margin is below threshold.
    pub async fn evaluate(
        &self,
        market: &dyn Marketplace,
        set: &Item,
    ) -> Option<ArbitrageOpportunity> {
        let components = resolve_manifest(market, set).await?;

        let set_quote = lowest_sell_price(market, &set.slug).await?;
        if let Some(min_volume) = self.config.min_set_volume {
            if set_quote.volume < min_volume {
                debug!(set = %set, volume = set_quote.volume, min_volume, "Set volume too thin");
                return None;
            }
        }

        let mut total_part_price: u64 = 0;
        for component in components.iter().filter(|c| c.slug != set.slug) {
            let Some(quote) = lowest_sell_price(market, &component.slug).await else {
                debug!(set = %set, part = %component.slug, "Part price unavailable, skipping set");
                return None;
            };
            let Some(total) = quote
                .price
                .checked_mul(u64::from(component.quantity))
                .and_then(|cost| total_part_price.checked_add(cost))
            else {
                debug!(set = %set, part = %component.slug, "Part cost overflows, skipping set");
                return None;
            };
            total_part_price = total;
        }

        let arbitrage_value =
            i64::try_from(set_quote.price).ok()? - i64::try_from(total_part_price).ok()?;

        if arbitrage_value < self.config.min_arbitrage_value {
            debug!(
                set = %set,
                arbitrage_value,
                threshold = self.config.min_arbitrage_value,
                "Below threshold"
            );
            return None;
        }

        let opportunity = ArbitrageOpportunity {
            set: set.slug.clone(),
            arbitrage_value,
            set_price: set_quote.price,
            total_part_price,
            market_url: self.market_url(&set.slug),
            last_updated: Utc::now(),
        };
        info!(opportunity = %opportunity, "Profit found");
        Some(opportunity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{book, foo_set_fixture, Fixture};
    use crate::types::{Component, OrderSide, SellerStatus};

    fn evaluator(threshold: i64) -> ArbitrageEvaluator {
        ArbitrageEvaluator::new(EvaluatorConfig {
            min_arbitrage_value: threshold,
            ..EvaluatorConfig::default()
        })
    }

    fn foo_set() -> Item {
        Item::new("s0", "foo_set")
    }

    #[tokio::test]
    async fn test_foo_set_rejected_at_default_threshold() {
        let market = foo_set_fixture().into_mock();
        assert!(evaluator(10).evaluate(&market, &foo_set()).await.is_none());
    }

    #[tokio::test]
    async fn test_foo_set_accepted_at_low_threshold() {
        let market = foo_set_fixture().into_mock();
        let opp = evaluator(3).evaluate(&market, &foo_set()).await.unwrap();

        assert_eq!(opp.set, "foo_set");
        assert_eq!(opp.set_price, 25);
        assert_eq!(opp.total_part_price, 21);
        assert_eq!(opp.arbitrage_value, 4);
        assert_eq!(opp.market_url, "https://warframe.market/items/foo_set");
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let market = foo_set_fixture().into_mock();
        assert!(evaluator(4).evaluate(&market, &foo_set()).await.is_some());
        let market = foo_set_fixture().into_mock();
        assert!(evaluator(5).evaluate(&market, &foo_set()).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_component_price_abandons_set() {
        let mut fx = foo_set_fixture();
        // Only offline / hidden sellers for the chassis.
        fx.orders.insert(
            "foo_chassis".into(),
            vec![
                crate::engine::testutil::order(OrderSide::Sell, 1, true, SellerStatus::Offline),
                crate::engine::testutil::order(OrderSide::Sell, 1, false, SellerStatus::Ingame),
            ],
        );
        let requested = fx.requested.clone();
        let market = fx.into_mock();

        assert!(evaluator(-1000).evaluate(&market, &foo_set()).await.is_none());
        // Stops at the first unavailable part.
        let seen = requested.lock().unwrap().clone();
        assert_eq!(seen, vec!["foo_set", "foo_blueprint", "foo_chassis"]);
    }

    #[tokio::test]
    async fn test_missing_set_price_abandons_set() {
        let mut fx = foo_set_fixture();
        fx.orders.remove("foo_set");
        let market = fx.into_mock();
        assert!(evaluator(-1000).evaluate(&market, &foo_set()).await.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_manifest_abandons_set() {
        let mut fx = foo_set_fixture();
        fx.parts.remove("y1");
        let market = fx.into_mock();
        assert!(evaluator(-1000).evaluate(&market, &foo_set()).await.is_none());
    }

    #[tokio::test]
    async fn test_set_without_parts_has_zero_cost() {
        let mut fx = Fixture::default();
        fx.manifests.insert("lone_set".into(), vec!["l0".into()]);
        fx.parts.insert("l0".into(), Component::new("lone_set", 1));
        fx.orders.insert("lone_set".into(), book(40));
        let market = fx.into_mock();

        let opp = evaluator(10)
            .evaluate(&market, &Item::new("l0", "lone_set"))
            .await
            .unwrap();
        assert_eq!(opp.total_part_price, 0);
        assert_eq!(opp.arbitrage_value, 40);
    }

    #[tokio::test]
    async fn test_part_cost_overflow_abandons_set() {
        let mut fx = Fixture::default().with_set("huge_set", 100, &[("huge_a", 2, 1), ("huge_b", 1, 1)]);
        fx.orders.insert(
            "huge_a".into(),
            vec![crate::engine::testutil::order(
                OrderSide::Sell,
                u64::MAX / 2 + 1,
                true,
                SellerStatus::Ingame,
            )],
        );
        let requested = fx.requested.clone();
        let market = fx.into_mock();

        let set = Item::new("id-huge_set", "huge_set");
        assert!(evaluator(i64::MIN).evaluate(&market, &set).await.is_none());
        assert!(!requested.lock().unwrap().contains(&"huge_b".to_string()));
    }

    #[tokio::test]
    async fn test_negative_arbitrage() {
        let fx = Fixture::default().with_set("neg_set", 10, &[("neg_a", 1, 30)]);
        let market = fx.into_mock();

        let opp = evaluator(-50)
            .evaluate(&market, &Item::new("id-neg_set", "neg_set"))
            .await
            .unwrap();
        assert_eq!(opp.arbitrage_value, -20);
        assert_eq!(opp.arbitrage_value, opp.set_price as i64 - opp.total_part_price as i64);
    }

    #[tokio::test]
    async fn test_min_set_volume_filter() {
        // book() lists two valid sell orders for every item.
        let strict = ArbitrageEvaluator::new(EvaluatorConfig {
            min_arbitrage_value: 3,
            min_set_volume: Some(3),
            ..EvaluatorConfig::default()
        });
        let market = foo_set_fixture().into_mock();
        assert!(strict.evaluate(&market, &foo_set()).await.is_none());

        let lenient = ArbitrageEvaluator::new(EvaluatorConfig {
            min_arbitrage_value: 3,
            min_set_volume: Some(2),
            ..EvaluatorConfig::default()
        });
        let market = foo_set_fixture().into_mock();
        assert!(lenient.evaluate(&market, &foo_set()).await.is_some());
    }

    #[test]
    fn test_market_url_trailing_slash() {
        let ev = ArbitrageEvaluator::new(EvaluatorConfig {
            market_url_base: "https://example.test/items/".into(),
            ..EvaluatorConfig::default()
        });
        assert_eq!(ev.market_url("x_set"), "https://example.test/items/x_set");
    }
}
