//! One-shot pull of everything a dashboard needs.
//!
//! The pass is strictly ordered: snapshot, events, per-game markets, then a
//! single bounded fan-out over every orderbook the row builders will read.

use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapters::{MarketSource, OddsSource, TeamLookup};
use crate::bundle::{Bundle, GameMarkets};
use crate::config::AppConfig;
use crate::domain::{Game, KalshiMarket, Side, TeamSide};
use crate::error::{EdgeError, Result};
use crate::orderbook::{OrderBook, PostQuote};
use crate::pricing::FeeSchedule;
use crate::slate::{
    assemble_games, parse_event_ticker, parse_snapshot, series_event_ticker, today_in,
    todays_events,
};
use crate::strike::{parse_spread_markets, parse_total_markets, TeamRef};

/// Scanner knobs resolved from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub game_series: String,
    pub spread_series: String,
    pub total_series: String,
    pub league_id: u32,
    pub xref_league: String,
    pub tz: Tz,
    pub concurrency: usize,
    pub strike_count: usize,
    pub fees: FeeSchedule,
}

impl ScanSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tz = config.scan.tz().map_err(EdgeError::Validation)?;
        Ok(Self {
            game_series: config.kalshi.game_series.clone(),
            spread_series: config.kalshi.spread_series.clone(),
            total_series: config.kalshi.total_series.clone(),
            league_id: config.unabated.league_id,
            xref_league: config.xref.league.clone(),
            tz,
            concurrency: config.kalshi.concurrency.max(1),
            strike_count: config.scan.strike_count,
            fees: FeeSchedule::with_taker_rate(config.scan.taker_fee_rate),
        })
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            game_series: "KXNBAGAME".to_string(),
            spread_series: "KXNBASPREAD".to_string(),
            total_series: "KXNBATOTAL".to_string(),
            league_id: 3,
            xref_league: "NBA".to_string(),
            tz: chrono_tz::America::Los_Angeles,
            concurrency: 8,
            strike_count: crate::strike::DEFAULT_STRIKE_COUNT,
            fees: FeeSchedule::kalshi(),
        }
    }
}

/// Posting view of both moneyline markets of a single event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBookSummary {
    pub event_ticker: String,
    pub away_code: String,
    pub home_code: String,
    pub away_market: String,
    pub home_market: String,
    pub away: PostQuote,
    pub home: PostQuote,
}

fn fmt_prob4(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |p| format!("{p:.4}"))
}

impl fmt::Display for EventBookSummary {
    /// `KXNBAGAME-26JAN08MIACHI | away=MIA top=0.4150 top-1=0.4050 | home=CHI top=... top-1=...`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | away={} top={} top-1={} | home={} top={} top-1={}",
            self.event_ticker,
            self.away_code,
            fmt_prob4(self.away.best_ask_break_even),
            fmt_prob4(self.away.inside_break_even),
            self.home_code,
            fmt_prob4(self.home.best_ask_break_even),
            fmt_prob4(self.home.inside_break_even),
        )
    }
}

pub struct Scanner {
    odds: Arc<dyn OddsSource>,
    markets: Arc<dyn MarketSource>,
    teams: Arc<dyn TeamLookup>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        odds: Arc<dyn OddsSource>,
        markets: Arc<dyn MarketSource>,
        teams: Arc<dyn TeamLookup>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            odds,
            markets,
            teams,
            settings,
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan the slate of the current local date.
    pub async fn scan_today(&self) -> Result<Bundle> {
        self.build_bundle(today_in(self.settings.tz)).await
    }

    /// Build the full bundle for `today`.
    ///
    /// The snapshot and event list are required; per-game market lists and
    /// orderbooks degrade to empty on failure.
    pub async fn build_bundle(&self, today: NaiveDate) -> Result<Bundle> {
        let settings = &self.settings;
        let mut bundle = Bundle::new(today, settings.fees);
        bundle.strike_count = settings.strike_count;

        let snapshot = self.odds.fetch_snapshot().await?;
        bundle.telemetry.unabated_calls += 1;

        let all_events = parse_snapshot(&snapshot, settings.league_id);
        let events = todays_events(all_events, settings.tz, today);
        info!(date = %today, events = events.len(), "unabated slate loaded");

        let kalshi_events = self.markets.fetch_events(&settings.game_series).await?;
        bundle.telemetry.kalshi_event_calls += 1;
        info!(series = %settings.game_series, events = kalshi_events.len(), "kalshi events loaded");

        bundle.games = assemble_games(
            &events,
            &kalshi_events,
            self.teams.as_ref(),
            &settings.xref_league,
            settings.tz,
        );
        let matched = bundle.games.iter().filter(|g| g.event_ticker.is_some()).count();
        info!(games = bundle.games.len(), matched, "games assembled");

        for game in &bundle.games {
            let Some(markets) = self.load_game_markets(game, &mut bundle.telemetry.kalshi_market_calls).await else {
                continue;
            };
            bundle.markets.insert(game.game_id(), markets);
        }

        let tickers: Vec<String> = bundle.required_tickers().into_iter().collect();
        bundle.telemetry.unique_tickers = tickers.len();
        bundle.telemetry.orderbook_requests = tickers.len();
        info!(
            tickers = tickers.len(),
            concurrency = settings.concurrency,
            "fetching orderbooks"
        );

        let fees = bundle.fees;
        let books = self.fetch_books(tickers).await;
        for (ticker, book) in books {
            let book = match book {
                Ok(book) => book,
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "orderbook fetch failed, treating as empty");
                    bundle.telemetry.orderbook_failures += 1;
                    OrderBook::default()
                }
            };
            bundle.cache.put_book(&ticker, book);
            for side in [Side::Yes, Side::No] {
                bundle.cache.snapshot(&ticker, side, &fees);
            }
        }

        let stats = bundle.cache.stats();
        bundle.telemetry.cached_snapshots = stats.cached_snapshots;
        bundle.telemetry.unique_markets = stats.unique_markets;
        info!(
            books = bundle.cache.book_count(),
            snapshots = stats.cached_snapshots,
            failures = bundle.telemetry.orderbook_failures,
            "scan complete"
        );
        Ok(bundle)
    }

    async fn load_game_markets(&self, game: &Game, calls: &mut usize) -> Option<GameMarkets> {
        let event = game.event_ticker.as_deref()?;
        let spread_event = series_event_ticker(event, &self.settings.spread_series)?;
        let total_event = series_event_ticker(event, &self.settings.total_series)?;

        let (spread, total) = futures::join!(
            self.fetch_markets_or_empty(&spread_event),
            self.fetch_markets_or_empty(&total_event)
        );
        *calls += 2;

        let away = TeamRef {
            name: &game.away_team_name,
            code: game.code(TeamSide::Away),
        };
        let home = TeamRef {
            name: &game.home_team_name,
            code: game.code(TeamSide::Home),
        };

        let markets = GameMarkets {
            spread: parse_spread_markets(&spread, away, home),
            total: parse_total_markets(&total),
        };
        debug!(
            event,
            spread = markets.spread.len(),
            total = markets.total.len(),
            "game markets parsed"
        );
        Some(markets)
    }

    async fn fetch_markets_or_empty(&self, event_ticker: &str) -> Vec<KalshiMarket> {
        match self.markets.fetch_markets_for_event(event_ticker).await {
            Ok(markets) => markets,
            Err(e) => {
                warn!(event = event_ticker, error = %e, "market list fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch_books(&self, tickers: Vec<String>) -> Vec<(String, Result<OrderBook>)> {
        let source = &self.markets;
        stream::iter(tickers)
            .map(|ticker| async move {
                let book = source.fetch_orderbook(&ticker).await;
                (ticker, book)
            })
            .buffer_unordered(self.settings.concurrency)
            .collect::<Vec<_>>()
            .await
    }
}

/// Posting break-evens for both moneyline markets of one event.
pub async fn event_book_summary(
    source: &dyn MarketSource,
    event_ticker: &str,
    fees: &FeeSchedule,
) -> Result<EventBookSummary> {
    let event_ticker = event_ticker.trim().to_uppercase();
    let parsed = parse_event_ticker(&event_ticker).ok_or_else(|| {
        EdgeError::Validation(format!("cannot parse team codes from event ticker {event_ticker}"))
    })?;

    let away_market = format!("{event_ticker}-{}", parsed.away_code);
    let home_market = format!("{event_ticker}-{}", parsed.home_code);

    let (away_book, home_book) = futures::join!(
        source.fetch_orderbook(&away_market),
        source.fetch_orderbook(&home_market)
    );

    Ok(EventBookSummary {
        away: PostQuote::from_book(&away_book?, fees),
        home: PostQuote::from_book(&home_book?, fees),
        event_ticker,
        away_code: parsed.away_code,
        home_code: parsed.home_code,
        away_market,
        home_market,
    })
}
