//! Catalog resolution: which items are sets, and what goes into each.

use tracing::{debug, info};

use crate::market::Marketplace;
use crate::types::{Component, Item, ScanError};

/// Fetch the catalog once and keep the set items, in catalog order.
pub async fn list_sets(market: &dyn Marketplace) -> Result<Vec<Item>, ScanError> {
    let items = market.catalog().await.ok_or(ScanError::CatalogUnavailable)?;
    if items.is_empty() {
        return Err(ScanError::EmptyCatalog);
    }

    let total = items.len();
    let sets: Vec<Item> = items.into_iter().filter(Item::is_set).collect();
    info!(items = total, sets = sets.len(), "Catalog resolved");
    Ok(sets)
}

/// Resolve every manifest entry of `set` to a (slug, quantity) pair.
///
/// All or nothing: one unresolvable part abandons the whole set.
pub async fn resolve_manifest(market: &dyn Marketplace, set: &Item) -> Option<Vec<Component>> {
    let Some(part_ids) = market.set_parts(&set.slug).await else {
        debug!(set = %set.slug, "Manifest unavailable");
        return None;
    };

    let mut components = Vec::with_capacity(part_ids.len());
    for id in &part_ids {
        match market.part(id).await {
            Some(component) => components.push(component),
            None => {
                debug!(set = %set.slug, part = %id, "Part unresolvable, abandoning set");
                return None;
            }
        }
    }
    Some(components)
}
