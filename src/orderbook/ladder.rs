//! Kalshi bid ladders.
//!
//! Kalshi publishes only bids: `{"yes": [[price, qty], ...], "no": [[price, qty], ...]}`.
//! The YES ask is implied by the best NO bid (`100 - no_top`) and vice versa.
//! Ladders are not sorted and may repeat a price, so readers scan for the
//! maximum and sum quantities per price.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::fields::{pick_obj, parse_i64ish};
use crate::domain::Side;

/// Highest bid that still leaves room for a one-cent queue jump.
const MAX_JUMPABLE_BID: i64 = 98;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price_cents: i64,
    pub quantity: i64,
}

impl PriceLevel {
    /// A real quote: price strictly inside (0, 100) and no negative size.
    pub fn is_quotable(&self) -> bool {
        (1..=99).contains(&self.price_cents) && self.quantity >= 0
    }
}

/// One side of a book as received: unsorted, duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceLadder {
    levels: Vec<PriceLevel>,
}

impl PriceLadder {
    pub fn new(levels: Vec<PriceLevel>) -> Self {
        Self { levels }
    }

    pub fn from_pairs(pairs: &[(i64, i64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(price_cents, quantity)| PriceLevel {
                    price_cents,
                    quantity,
                })
                .collect(),
        )
    }

    /// Parse a raw ladder. Entries that are not `[price, qty, ...]` pairs
    /// (or `{price, quantity}` objects) with numeric fields are skipped, as
    /// are levels priced outside 1..=99.
    pub fn from_value(value: &Value) -> Self {
        let Some(entries) = value.as_array() else {
            return Self::default();
        };

        let levels = entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Array(pair) if pair.len() >= 2 => Some(PriceLevel {
                    price_cents: parse_i64ish(&pair[0])?,
                    quantity: parse_i64ish(&pair[1])?,
                }),
                Value::Object(_) => Some(PriceLevel {
                    price_cents: pick_obj(entry, &["price", "price_cents"]).and_then(parse_i64ish)?,
                    quantity: pick_obj(entry, &["quantity", "count", "size"])
                        .and_then(parse_i64ish)?,
                }),
                _ => None,
            })
            .filter(PriceLevel::is_quotable)
            .collect();

        Self { levels }
    }

    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Both bid ladders of one market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    pub yes: PriceLadder,
    pub no: PriceLadder,
}

impl OrderBook {
    pub fn from_pairs(yes: &[(i64, i64)], no: &[(i64, i64)]) -> Self {
        Self {
            yes: PriceLadder::from_pairs(yes),
            no: PriceLadder::from_pairs(no),
        }
    }

    /// Parse the `/markets/{ticker}/orderbook` payload, with or without the
    /// `orderbook` wrapper. Absent or null ladders are empty.
    pub fn from_value(value: &Value) -> Self {
        let root = pick_obj(value, &["orderbook", "book"]).unwrap_or(value);
        let ladder = |keys: &[&str]| {
            pick_obj(root, keys)
                .map(PriceLadder::from_value)
                .unwrap_or_default()
        };

        Self {
            yes: ladder(&["yes", "yes_orders"]),
            no: ladder(&["no", "no_orders"]),
        }
    }

    pub fn ladder(&self, side: Side) -> &PriceLadder {
        match side {
            Side::Yes => &self.yes,
            Side::No => &self.no,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.yes.is_empty() && self.no.is_empty()
    }

    pub fn top(&self, side: Side) -> TopOfBook {
        top_of_book_and_liquidity(self.ladder(side))
    }

    /// Ask for `side` implied by the best bid on the other side.
    pub fn implied_ask(&self, side: Side) -> Option<i64> {
        self.top(side.opposite()).top_price.map(implied_opposite_ask)
    }
}

/// Best bid of one ladder plus the aggregated depth map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopOfBook {
    pub top_price: Option<i64>,
    pub top_liquidity: Option<i64>,
    pub by_price: BTreeMap<i64, i64>,
}

impl TopOfBook {
    /// Aggregated quantity resting at `price_cents` (0 if none).
    pub fn liquidity_at(&self, price_cents: i64) -> i64 {
        self.by_price.get(&price_cents).copied().unwrap_or(0)
    }
}

pub fn top_of_book_and_liquidity(ladder: &PriceLadder) -> TopOfBook {
    let mut by_price: BTreeMap<i64, i64> = BTreeMap::new();
    let mut top_price: Option<i64> = None;

    for level in ladder.levels() {
        let depth = by_price.entry(level.price_cents).or_insert(0);
        *depth = depth.saturating_add(level.quantity);
        if top_price.map_or(true, |top| level.price_cents > top) {
            top_price = Some(level.price_cents);
        }
    }

    let top_liquidity = top_price.map(|top| by_price.get(&top).copied().unwrap_or(0));

    TopOfBook {
        top_price,
        top_liquidity,
        by_price,
    }
}

/// YES + NO = 100, so the best bid on one side implies the ask on the other.
pub fn implied_opposite_ask(bid_top_cents: i64) -> i64 {
    100 - bid_top_cents
}

/// `top + 1`, only while the result stays a valid quote.
pub fn queue_jump_price(top_cents: i64) -> Option<i64> {
    (top_cents <= MAX_JUMPABLE_BID).then_some(top_cents + 1)
}

/// A one-cent improvement on the best bid. It rests nowhere in the book, so
/// it never carries liquidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueJump {
    pub price: Option<i64>,
    pub crossed: bool,
}

/// Queue-jump price for `top_cents`, discarded when it would meet or exceed
/// the implied ask.
pub fn queue_jump(top_cents: i64, implied_ask: Option<i64>) -> QueueJump {
    match (queue_jump_price(top_cents), implied_ask) {
        (Some(jump), Some(ask)) if jump >= ask => QueueJump {
            price: None,
            crossed: true,
        },
        (price, _) => QueueJump {
            price,
            crossed: false,
        },
    }
}
