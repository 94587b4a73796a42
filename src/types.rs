//! Shared types for the SETARB scanner.
//!
//! These types form the data model used across all modules. The market
//! adapter produces `Item`, `Component` and `Order`; the engine turns them
//! into `PriceQuote`s and finally `ArbitrageOpportunity` records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Slug suffix the upstream catalog uses for composite items.
pub const SET_SUFFIX: &str = "_set";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A tradable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Upstream identifier (used by part lookups).
    pub id: String,
    /// Stable, human-readable identifier.
    pub slug: String,
}

impl Item {
    pub fn new(id: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
        }
    }

    /// Whether this item is a composite set (naming convention upstream).
    pub fn is_set(&self) -> bool {
        self.slug.ends_with(SET_SUFFIX)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug)
    }
}

/// One part required to assemble a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub slug: String,
    /// Units of this part needed to craft one set. Always >= 1.
    pub quantity: u32,
}

impl Component {
    pub fn new(slug: impl Into<String>, quantity: u32) -> Self {
        Self {
            slug: slug.into(),
            quantity: quantity.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Sell,
    Buy,
}

/// Seller presence as reported by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerStatus {
    Ingame,
    Online,
    Offline,
    Unknown,
}

impl SellerStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ingame" => Self::Ingame,
            "online" => Self::Online,
            "offline" => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

/// A single live listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub side: OrderSide,
    /// Price in platinum.
    pub price: u64,
    /// Units offered by this listing.
    pub quantity: u32,
    pub visible: bool,
    pub seller: SellerStatus,
}

impl Order {
    /// Sell-side, visible, seller in game, and a positive price.
    pub fn is_valid_sell(&self) -> bool {
        self.side == OrderSide::Sell
            && self.visible
            && self.seller == SellerStatus::Ingame
            && self.price > 0
    }
}

/// Lowest valid sell price for one item at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: u64,
    /// Total units listed across all valid sell orders.
    pub volume: u64,
}

// ---------------------------------------------------------------------------
// Opportunities
// ---------------------------------------------------------------------------

/// Format used for `last_updated` on the wire.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted arbitrage result for one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbitrageOpportunity {
    pub set: String,
    pub arbitrage_value: i64,
    pub set_price: u64,
    pub total_part_price: u64,
    pub market_url: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Same record ignoring when it was computed.
    pub fn same_verdict(&self, other: &Self) -> bool {
        self.set == other.set
            && self.arbitrage_value == other.arbitrage_value
            && self.set_price == other.set_price
            && self.total_part_price == other.total_part_price
            && self.market_url == other.market_url
    }
}

impl fmt::Display for ArbitrageOpportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:+}p | set {}p | parts {}p)",
            self.set, self.arbitrage_value, self.set_price, self.total_part_price,
        )
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

// ---------------------------------------------------------------------------
// Scheduler status
// ---------------------------------------------------------------------------

/// Lifecycle of the background scan loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Scanning,
    Waiting,
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Scanning => write!(f, "SCANNING"),
            Self::Waiting => write!(f, "WAITING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Summary of one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub sets_found: usize,
    pub sets_evaluated: usize,
    pub opportunities: usize,
    /// True when shutdown cut the cycle short.
    pub interrupted: bool,
}

/// Snapshot of scheduler progress, published for the query transport.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub state: SchedulerState,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub last_cycle: Option<CycleReport>,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl Default for ScanStatus {
    fn default() -> Self {
        Self {
            state: SchedulerState::Idle,
            cycles_completed: 0,
            cycles_failed: 0,
            last_cycle: None,
            last_cycle_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Cycle-level failures. Anything below set evaluation is absorbed.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Catalog unavailable from upstream")]
    CatalogUnavailable,

    #[error("Catalog contained no usable items")]
    EmptyCatalog,

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
