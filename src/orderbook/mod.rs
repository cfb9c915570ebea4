//! Orderbook reader: top-of-book extraction, implied asks, queue-jump
//! pricing and the per-run snapshot cache.

pub mod cache;
pub mod ladder;
pub mod snapshot;

pub use cache::{CacheStats, OrderbookCache};
pub use ladder::{
    implied_opposite_ask, queue_jump, queue_jump_price, top_of_book_and_liquidity, OrderBook,
    PriceLadder, PriceLevel, QueueJump, TopOfBook,
};
pub use snapshot::{ExposureQuote, OrderbookSnapshot, PostQuote};
