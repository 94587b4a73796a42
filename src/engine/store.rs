//! Snapshot store: latest accepted opportunity per set.
//!
//! Written only by the scan loop, read by any number of query handlers.
//! Each record is replaced whole under the write lock, so readers see
//! either the previous or the new record for a slug, never a mix.
//! Entries are never evicted; a set that stops qualifying keeps its last
//! accepted record until it qualifies again.

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::ArbitrageOpportunity;

#[derive(Default)]
pub struct SnapshotStore {
    entries: RwLock<HashMap<String, ArbitrageOpportunity>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `opportunity.set`.
    pub async fn replace(&self, opportunity: ArbitrageOpportunity) {
        let slug = opportunity.set.clone();
        let previous = self.entries.write().await.insert(slug.clone(), opportunity);
        debug!(set = %slug, replaced = previous.is_some(), "Snapshot updated");
    }

    /// Point-in-time copy, best arbitrage first, ties by slug ascending.
    pub async fn read_all(&self) -> Vec<ArbitrageOpportunity> {
        let mut all: Vec<ArbitrageOpportunity> =
            self.entries.read().await.values().cloned().collect();
        sort_opportunities(&mut all);
        all
    }

    pub async fn get(&self, slug: &str) -> Option<ArbitrageOpportunity> {
        self.entries.read().await.get(slug).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Arbitrage value descending, then slug ascending.
fn sort_opportunities(opportunities: &mut [ArbitrageOpportunity]) {
    opportunities.sort_by(|a, b| {
        b.arbitrage_value
            .cmp(&a.arbitrage_value)
            .then_with(|| a.set.cmp(&b.set))
    });
}
