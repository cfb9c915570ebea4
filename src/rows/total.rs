use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{fair_at_line, sort_rows, GameRow};
use crate::bundle::Bundle;
use crate::domain::{Game, Side};
use crate::ev::buyer_ev;

/// One Over strike of a game total. Over trades YES, Under trades NO of the
/// same market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalRow {
    pub game_date: NaiveDate,
    pub event_start: DateTime<Utc>,
    pub away_roto: Option<i64>,
    pub away_team: String,
    pub home_team: String,
    /// `221.5 -110`
    pub consensus: String,
    /// `Over 222.0`
    pub strike: String,
    pub kalshi_ticker: String,
    pub kalshi_title: String,
    pub unabated_total: f64,
    pub over_kalshi_prob: Option<f64>,
    pub over_kalshi_liq: Option<i64>,
    pub over_kalshi_price_cents: Option<i64>,
    pub under_kalshi_prob: Option<f64>,
    pub under_kalshi_liq: Option<i64>,
    pub under_kalshi_price_cents: Option<i64>,
    pub over_fair: Option<f64>,
    pub under_fair: Option<f64>,
    pub over_ev: Option<f64>,
    pub under_ev: Option<f64>,
}

impl GameRow for TotalRow {
    fn away_roto(&self) -> Option<i64> {
        self.away_roto
    }

    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
}

pub fn format_total_consensus(total: f64, juice: Option<i64>) -> String {
    match juice {
        Some(juice) => format!("{total} {juice:+}"),
        None => format!("{total}"),
    }
}

pub fn format_total_strike(strike: f64) -> String {
    format!("Over {strike:.1}")
}

fn build_game_rows(bundle: &Bundle, game: &Game, out: &mut Vec<TotalRow>) {
    let Some(line) = game.consensus.total else {
        return;
    };

    for market in bundle.total_selection(game) {
        let over = bundle.exposure(&market.ticker, Side::Yes);
        let under = bundle.exposure(&market.ticker, Side::No);
        let (over_fair, under_fair) = fair_at_line(market.strike, line.total, line.juice);

        out.push(TotalRow {
            game_date: game.game_date,
            event_start: game.event_start,
            away_roto: game.away_roto,
            away_team: game.away_team_name.clone(),
            home_team: game.home_team_name.clone(),
            consensus: format_total_consensus(line.total, line.juice),
            strike: format_total_strike(market.strike),
            kalshi_ticker: market.ticker.clone(),
            kalshi_title: market.title.clone(),
            unabated_total: line.total,
            over_kalshi_prob: over.break_even,
            over_kalshi_liq: over.liquidity,
            over_kalshi_price_cents: over.bid_cents,
            under_kalshi_prob: under.break_even,
            under_kalshi_liq: under.liquidity,
            under_kalshi_price_cents: under.bid_cents,
            over_fair,
            under_fair,
            over_ev: buyer_ev(over_fair, over.break_even),
            under_ev: buyer_ev(under_fair, under.break_even),
        });
    }
}

pub fn build_total_rows(bundle: &Bundle) -> Vec<TotalRow> {
    let mut rows = Vec::new();
    for game in bundle.games.iter().filter(|g| g.event_ticker.is_some()) {
        build_game_rows(bundle, game, &mut rows);
    }
    sort_rows(&mut rows);
    rows
}
