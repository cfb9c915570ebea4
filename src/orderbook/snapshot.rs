use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ladder::{implied_opposite_ask, queue_jump, OrderBook};
use crate::domain::Side;
use crate::pricing::FeeSchedule;

/// What it costs to take exposure to one side by joining (or jumping) its
/// best bid as a maker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureQuote {
    pub side: Side,
    pub bid_cents: Option<i64>,
    pub liquidity: Option<i64>,
    pub break_even: Option<f64>,
    pub jump_cents: Option<i64>,
    /// Always `None`: the jump price is not resting in the book
    pub jump_liquidity: Option<i64>,
    pub jump_break_even: Option<f64>,
    pub crossed: bool,
}

impl ExposureQuote {
    pub fn empty(side: Side) -> Self {
        Self {
            side,
            bid_cents: None,
            liquidity: None,
            break_even: None,
            jump_cents: None,
            jump_liquidity: None,
            jump_break_even: None,
            crossed: false,
        }
    }

    pub fn from_book(book: &OrderBook, side: Side, fees: &FeeSchedule) -> Self {
        let top = book.top(side);
        let Some(bid) = top.top_price else {
            return Self::empty(side);
        };

        let jump = queue_jump(bid, book.implied_ask(side));

        Self {
            side,
            bid_cents: Some(bid),
            liquidity: top.top_liquidity,
            break_even: fees.break_even_prob(bid),
            jump_cents: jump.price,
            jump_liquidity: None,
            jump_break_even: jump.price.and_then(|p| fees.break_even_prob(p)),
            crossed: jump.crossed,
        }
    }

    /// Same quote, read from a cached snapshot of the side.
    pub fn from_snapshot(snapshot: &OrderbookSnapshot, fees: &FeeSchedule) -> Self {
        let Some(bid) = snapshot.best_bid_cents else {
            return Self::empty(snapshot.side);
        };

        let jump = queue_jump(bid, snapshot.best_ask_cents);

        Self {
            side: snapshot.side,
            bid_cents: Some(bid),
            liquidity: snapshot.best_bid_liq,
            break_even: snapshot.effective_prob_bid,
            jump_cents: jump.price,
            jump_liquidity: None,
            jump_break_even: jump.price.and_then(|p| fees.break_even_prob(p)),
            crossed: jump.crossed,
        }
    }
}

/// Best bid and implied ask of one side of a market at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub market_ticker: String,
    pub side: Side,
    pub best_bid_cents: Option<i64>,
    pub best_ask_cents: Option<i64>,
    pub best_bid_liq: Option<i64>,
    /// Not tracked: the opposite ladder's depth is not carried over
    pub best_ask_liq: Option<i64>,
    pub effective_prob_bid: Option<f64>,
    pub effective_prob_ask: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl OrderbookSnapshot {
    pub fn empty(market_ticker: &str, side: Side) -> Self {
        Self {
            market_ticker: market_ticker.to_string(),
            side,
            best_bid_cents: None,
            best_ask_cents: None,
            best_bid_liq: None,
            best_ask_liq: None,
            effective_prob_bid: None,
            effective_prob_ask: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn from_book(market_ticker: &str, side: Side, book: &OrderBook, fees: &FeeSchedule) -> Self {
        let top = book.top(side);
        let best_ask_cents = book.implied_ask(side);

        Self {
            market_ticker: market_ticker.to_string(),
            side,
            best_bid_cents: top.top_price,
            best_ask_cents,
            best_bid_liq: top.top_liquidity,
            best_ask_liq: None,
            effective_prob_bid: top.top_price.and_then(|p| fees.break_even_prob(p)),
            effective_prob_ask: best_ask_cents.and_then(|p| fees.break_even_prob(p)),
            fetched_at: Utc::now(),
        }
    }
}

/// Seller view of the YES side: where a resting YES offer would sit.
///
/// The best YES ask is implied by the best NO bid. Posting one cent inside it
/// improves the offer; its break-even assumes the maker fee is charged on the
/// winning fill only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PostQuote {
    pub best_ask_cents: Option<i64>,
    pub best_ask_liq: Option<i64>,
    pub best_ask_break_even: Option<f64>,
    pub inside_ask_cents: Option<i64>,
    pub inside_liq: Option<i64>,
    pub inside_break_even: Option<f64>,
}

impl PostQuote {
    pub fn from_book(book: &OrderBook, fees: &FeeSchedule) -> Self {
        let no_top = book.top(Side::No);
        let Some(no_bid) = no_top.top_price else {
            return Self::default();
        };

        let best_ask = implied_opposite_ask(no_bid);
        let inside_ask = (best_ask >= 2).then_some(best_ask - 1);

        Self {
            best_ask_cents: Some(best_ask),
            best_ask_liq: no_top.top_liquidity,
            best_ask_break_even: fees.maker_post_break_even_prob(best_ask),
            inside_ask_cents: inside_ask,
            inside_liq: inside_ask.map(|p| no_top.liquidity_at(implied_opposite_ask(p))),
            inside_break_even: inside_ask.and_then(|p| fees.maker_post_break_even_prob(p)),
        }
    }
}
