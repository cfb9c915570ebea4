pub mod kalshi_rest;
pub mod team_xref;
pub mod unabated;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{KalshiEvent, KalshiMarket};
use crate::error::Result;
use crate::orderbook::OrderBook;

pub use kalshi_rest::KalshiClient;
pub use team_xref::TeamXref;
pub use unabated::UnabatedClient;

/// Source of the consensus odds snapshot.
#[async_trait]
pub trait OddsSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Value>;
}

/// Read-only prediction-market data.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// An unknown or empty book is an empty `OrderBook`, not an error.
    async fn fetch_orderbook(&self, ticker: &str) -> Result<OrderBook>;

    async fn fetch_markets_for_event(&self, event_ticker: &str) -> Result<Vec<KalshiMarket>>;

    /// Every open event of a series, across all pages.
    async fn fetch_events(&self, series_ticker: &str) -> Result<Vec<KalshiEvent>>;
}

/// Odds-feed team name to Kalshi team code.
pub trait TeamLookup: Send + Sync {
    fn lookup(&self, league: &str, name: &str) -> Option<String>;
}
