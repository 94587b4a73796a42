//! Price sampling from the live order book.

use tracing::debug;

use crate::market::Marketplace;
use crate::types::{Order, PriceQuote};

/// Lowest price among valid sell orders (sell-side, visible, seller in
/// game). `None` when no order qualifies.
pub fn lowest_valid_price(orders: &[Order]) -> Option<PriceQuote> {
    let mut valid = orders.iter().filter(|o| o.is_valid_sell());
    let first = valid.next()?;

    let mut quote = PriceQuote {
        price: first.price,
        volume: u64::from(first.quantity),
    };
    for order in valid {
        quote.price = quote.price.min(order.price);
        quote.volume += u64::from(order.quantity);
    }
    Some(quote)
}

/// Quote the current lowest valid sell price for `slug`.
pub async fn lowest_sell_price(market: &dyn Marketplace, slug: &str) -> Option<PriceQuote> {
    let Some(orders) = market.orders(slug).await else {
        debug!(item = slug, "Order book unavailable");
        return None;
    };

    let quote = lowest_valid_price(&orders);
    if quote.is_none() {
        debug!(item = slug, orders = orders.len(), "No valid sell orders");
    }
    quote
}
