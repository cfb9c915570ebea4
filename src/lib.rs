pub mod adapters;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod ev;
pub mod orderbook;
pub mod pricing;
pub mod rows;
pub mod scanner;
pub mod slate;
pub mod strike;

pub use adapters::{KalshiClient, MarketSource, OddsSource, TeamLookup, TeamXref, UnabatedClient};
pub use bundle::{Bundle, GameMarkets, Telemetry};
pub use config::AppConfig;
pub use dashboard::{render_html, Dashboard, OutputMode};
pub use domain::{Game, GameConsensus, KalshiEvent, KalshiMarket, Side, TeamSide};
pub use error::{EdgeError, Result};
pub use ev::{buyer_ev, seller_ev, EvConvention};
pub use orderbook::{ExposureQuote, OrderBook, OrderbookCache, PostQuote};
pub use pricing::FeeSchedule;
pub use rows::{build_moneyline_rows, build_spread_rows, build_total_rows, MoneylineRow, SpreadRow, TotalRow};
pub use scanner::{event_book_summary, EventBookSummary, ScanSettings, Scanner};
