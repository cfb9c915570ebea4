//! Matching continuous consensus lines to discrete Kalshi strikes.

pub mod selector;
pub mod spread;
pub mod total;

pub use selector::{select_closest, Strike, DEFAULT_STRIKE_COUNT};
pub use spread::{
    canonical_spread, map_team_spread_to_market, parse_spread_markets, select_spread_strikes,
    CanonicalSpread, SpreadMarket, TeamRef,
};
pub use total::{parse_total_markets, select_over_strikes, TotalDirection, TotalMarket};
