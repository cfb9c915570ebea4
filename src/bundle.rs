//! Everything the row builders read, gathered by one scan.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::domain::{Game, Side, TeamSide};
use crate::orderbook::{ExposureQuote, OrderBook, OrderbookCache};
use crate::pricing::FeeSchedule;
use crate::strike::{
    canonical_spread, select_over_strikes, select_spread_strikes, CanonicalSpread, SpreadMarket,
    TotalMarket, DEFAULT_STRIKE_COUNT,
};

/// Parsed spread and total markets of one game.
#[derive(Debug, Clone, Default)]
pub struct GameMarkets {
    pub spread: Vec<SpreadMarket>,
    pub total: Vec<TotalMarket>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    pub unabated_calls: usize,
    pub kalshi_event_calls: usize,
    pub kalshi_market_calls: usize,
    pub orderbook_requests: usize,
    pub orderbook_failures: usize,
    pub unique_tickers: usize,
    /// `(ticker, side)` snapshots derived after the orderbook pass
    pub cached_snapshots: usize,
    pub unique_markets: usize,
}

/// Canonical spread of a game and the strikes picked for it.
#[derive(Debug, Clone)]
pub struct SpreadSelection<'a> {
    pub canonical: CanonicalSpread,
    pub team_code: &'a str,
    pub opponent_code: &'a str,
    pub strikes: Vec<(&'a SpreadMarket, Side)>,
}

#[derive(Debug)]
pub struct Bundle {
    /// Local date of the slate
    pub today: NaiveDate,
    pub games: Vec<Game>,
    /// Keyed by `Game::game_id`
    pub markets: HashMap<String, GameMarkets>,
    pub cache: OrderbookCache,
    pub fees: FeeSchedule,
    pub strike_count: usize,
    pub telemetry: Telemetry,
}

impl Bundle {
    pub fn new(today: NaiveDate, fees: FeeSchedule) -> Self {
        Self {
            today,
            games: Vec::new(),
            markets: HashMap::new(),
            cache: OrderbookCache::new(),
            fees,
            strike_count: DEFAULT_STRIKE_COUNT,
            telemetry: Telemetry::default(),
        }
    }

    pub fn game_markets(&self, game: &Game) -> Option<&GameMarkets> {
        self.markets.get(&game.game_id())
    }

    /// Stored book, or an empty one for tickers that were never fetched.
    pub fn book(&self, ticker: &str) -> OrderBook {
        self.cache.book(ticker).cloned().unwrap_or_default()
    }

    /// Exposure quote for one side, from the snapshot cache when the scan
    /// warmed it, otherwise derived from the stored book.
    pub fn exposure(&self, ticker: &str, side: Side) -> ExposureQuote {
        match self.cache.get(ticker, side) {
            Some(snapshot) => ExposureQuote::from_snapshot(snapshot, &self.fees),
            None => ExposureQuote::from_book(&self.book(ticker), side, &self.fees),
        }
    }

    /// `None` when the game has no spread line, team codes or markets.
    pub fn spread_selection<'a>(&'a self, game: &'a Game) -> Option<SpreadSelection<'a>> {
        let canonical = canonical_spread(&game.consensus)?;
        let team_code = game.code(canonical.team)?;
        let opponent_code = game.code(canonical.team.opposite())?;
        let markets = self.game_markets(game)?;

        let strikes = select_spread_strikes(
            canonical.spread,
            team_code,
            opponent_code,
            &markets.spread,
            self.strike_count,
        );

        Some(SpreadSelection {
            canonical,
            team_code,
            opponent_code,
            strikes,
        })
    }

    pub fn total_selection<'a>(&'a self, game: &Game) -> Vec<&'a TotalMarket> {
        let (Some(total), Some(markets)) = (game.consensus.total, self.game_markets(game)) else {
            return Vec::new();
        };
        select_over_strikes(total.total, &markets.total, self.strike_count)
    }

    /// Every market the row builders will read: both moneyline markets of
    /// each matched game plus the selected spread and total strikes.
    pub fn required_tickers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();

        for game in &self.games {
            for side in [TeamSide::Away, TeamSide::Home] {
                if let Some(ticker) = game.moneyline_ticker(side) {
                    out.insert(ticker);
                }
            }
            if let Some(selection) = self.spread_selection(game) {
                out.extend(selection.strikes.iter().map(|(m, _)| m.ticker.clone()));
            }
            out.extend(self.total_selection(game).iter().map(|m| m.ticker.clone()));
        }

        out
    }
}
