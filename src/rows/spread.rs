use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use super::{fair_at_line, format_strike_number, sort_rows, GameRow};
use crate::bundle::Bundle;
use crate::domain::{Game, TeamSide};
use crate::ev::buyer_ev;

/// One strike of a game's spread, written from the canonical team's side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadRow {
    pub game_date: NaiveDate,
    pub event_start: DateTime<Utc>,
    pub away_roto: Option<i64>,
    pub away_team: String,
    pub home_team: String,
    /// `PHI -3 -107`
    pub consensus: String,
    /// `PHI -3.5`
    pub strike: String,
    pub kalshi_ticker: String,
    pub kalshi_title: String,
    pub canonical_team: TeamSide,
    pub unabated_spread: f64,
    pub away_kalshi_prob: Option<f64>,
    pub away_kalshi_liq: Option<i64>,
    pub away_kalshi_price_cents: Option<i64>,
    pub home_kalshi_prob: Option<f64>,
    pub home_kalshi_liq: Option<i64>,
    pub home_kalshi_price_cents: Option<i64>,
    pub away_fair: Option<f64>,
    pub home_fair: Option<f64>,
    pub away_ev: Option<f64>,
    pub home_ev: Option<f64>,
}

impl GameRow for SpreadRow {
    fn away_roto(&self) -> Option<i64> {
        self.away_roto
    }

    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
}

/// `PHI -3 -107`; whole-number spreads drop the decimal.
pub fn format_spread_consensus(code: &str, spread: f64, juice: Option<i64>) -> String {
    let spread_str = if spread.fract() == 0.0 {
        format!("{:+}", spread as i64)
    } else {
        format!("{spread:+.1}")
    };
    match juice {
        Some(juice) => format!("{code} {spread_str} {juice:+}"),
        None => format!("{code} {spread_str}"),
    }
}

/// `NOP -6.5` when the team lays points, `WAS +6.5` when it takes them.
pub fn format_spread_strike(code: &str, spread: f64, strike: f64) -> String {
    let sign = if spread < 0.0 { '-' } else { '+' };
    format!("{code} {sign}{}", format_strike_number(strike))
}

fn build_game_rows(bundle: &Bundle, game: &Game, out: &mut Vec<SpreadRow>) {
    let Some(selection) = bundle.spread_selection(game) else {
        debug!(game = %game.game_id(), "no spread selection");
        return;
    };
    if selection.strikes.is_empty() {
        debug!(game = %game.game_id(), code = selection.team_code, "no spread strikes for canonical team");
        return;
    }

    let canonical = selection.canonical;
    let consensus = format_spread_consensus(selection.team_code, canonical.spread, canonical.juice);

    for (market, side) in selection.strikes {
        let own = bundle.exposure(&market.ticker, side);
        let other = bundle.exposure(&market.ticker, side.opposite());
        let (fair, other_fair) = fair_at_line(market.strike, canonical.spread, canonical.juice);

        let (away, home, away_fair, home_fair) = match canonical.team {
            TeamSide::Away => (own, other, fair, other_fair),
            TeamSide::Home => (other, own, other_fair, fair),
        };

        out.push(SpreadRow {
            game_date: game.game_date,
            event_start: game.event_start,
            away_roto: game.away_roto,
            away_team: game.away_team_name.clone(),
            home_team: game.home_team_name.clone(),
            consensus: consensus.clone(),
            strike: format_spread_strike(selection.team_code, canonical.spread, market.strike),
            kalshi_ticker: market.ticker.clone(),
            kalshi_title: market.title.clone(),
            canonical_team: canonical.team,
            unabated_spread: canonical.spread,
            away_kalshi_prob: away.break_even,
            away_kalshi_liq: away.liquidity,
            away_kalshi_price_cents: away.bid_cents,
            home_kalshi_prob: home.break_even,
            home_kalshi_liq: home.liquidity,
            home_kalshi_price_cents: home.bid_cents,
            away_fair,
            home_fair,
            away_ev: buyer_ev(away_fair, away.break_even),
            home_ev: buyer_ev(home_fair, home.break_even),
        });
    }
}

/// Up to `strike_count` rows per game with a spread line and markets.
pub fn build_spread_rows(bundle: &Bundle) -> Vec<SpreadRow> {
    let mut rows = Vec::new();
    for game in bundle.games.iter().filter(|g| g.event_ticker.is_some()) {
        build_game_rows(bundle, game, &mut rows);
    }
    sort_rows(&mut rows);
    rows
}
