use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{sort_rows, GameRow};
use crate::bundle::Bundle;
use crate::domain::{Game, Side, TeamSide};
use crate::ev::{ev, EvConvention};
use crate::orderbook::{ExposureQuote, PostQuote};
use crate::pricing::american_to_probability;

/// One game of the moneyline table.
///
/// `*_top_*` is the best resting price, `*_topm1_*` the one-cent improvement
/// (queue-jump when buying, inside ask when posting).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneylineRow {
    pub game_date: NaiveDate,
    pub event_start: DateTime<Utc>,
    pub away_roto: Option<i64>,
    pub away_team: String,
    pub home_team: String,
    pub away_fair: Option<f64>,
    pub home_fair: Option<f64>,
    pub event_ticker: Option<String>,
    pub away_ticker: Option<String>,
    pub home_ticker: Option<String>,
    pub away_top_prob: Option<f64>,
    pub away_topm1_prob: Option<f64>,
    pub home_top_prob: Option<f64>,
    pub home_topm1_prob: Option<f64>,
    pub away_top_liq: Option<i64>,
    pub away_topm1_liq: Option<i64>,
    pub home_top_liq: Option<i64>,
    pub home_topm1_liq: Option<i64>,
    /// Price of the top level: bid when buying, ask when posting
    pub away_top_price_cents: Option<i64>,
    pub home_top_price_cents: Option<i64>,
    pub away_ev_top: Option<f64>,
    pub away_ev_topm1: Option<f64>,
    pub home_ev_top: Option<f64>,
    pub home_ev_topm1: Option<f64>,
    pub convention: EvConvention,
}

impl GameRow for MoneylineRow {
    fn away_roto(&self) -> Option<i64> {
        self.away_roto
    }

    fn game_date(&self) -> NaiveDate {
        self.game_date
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TeamQuote {
    top_price_cents: Option<i64>,
    top_prob: Option<f64>,
    topm1_prob: Option<f64>,
    top_liq: Option<i64>,
    topm1_liq: Option<i64>,
}

impl From<ExposureQuote> for TeamQuote {
    fn from(q: ExposureQuote) -> Self {
        Self {
            top_price_cents: q.bid_cents,
            top_prob: q.break_even,
            topm1_prob: q.jump_break_even,
            top_liq: q.liquidity,
            topm1_liq: q.jump_liquidity,
        }
    }
}

impl From<PostQuote> for TeamQuote {
    fn from(q: PostQuote) -> Self {
        Self {
            top_price_cents: q.best_ask_cents,
            top_prob: q.best_ask_break_even,
            topm1_prob: q.inside_break_even,
            top_liq: q.best_ask_liq,
            topm1_liq: q.inside_liq,
        }
    }
}

/// Buyer view: a team wins exactly when its opponent's market settles NO,
/// so the team's exposure is bought on the NO bids of the opponent market.
fn buyer_quote(bundle: &Bundle, game: &Game, side: TeamSide) -> TeamQuote {
    match game.moneyline_ticker(side.opposite()) {
        Some(ticker) => bundle.exposure(&ticker, Side::No).into(),
        None => TeamQuote::default(),
    }
}

/// Seller view: posting YES offers on the team's own market.
fn post_quote(bundle: &Bundle, game: &Game, side: TeamSide) -> TeamQuote {
    match game.moneyline_ticker(side) {
        Some(ticker) => PostQuote::from_book(&bundle.book(&ticker), &bundle.fees).into(),
        None => TeamQuote::default(),
    }
}

fn build_row(bundle: &Bundle, game: &Game, convention: EvConvention) -> MoneylineRow {
    let quote = |side| match convention {
        EvConvention::Buyer => buyer_quote(bundle, game, side),
        EvConvention::Seller => post_quote(bundle, game, side),
    };
    let away = quote(TeamSide::Away);
    let home = quote(TeamSide::Home);

    let away_fair = game.consensus.away_moneyline.and_then(american_to_probability);
    let home_fair = game.consensus.home_moneyline.and_then(american_to_probability);

    MoneylineRow {
        game_date: game.game_date,
        event_start: game.event_start,
        away_roto: game.away_roto,
        away_team: game.away_team_name.clone(),
        home_team: game.home_team_name.clone(),
        away_fair,
        home_fair,
        event_ticker: game.event_ticker.clone(),
        away_ticker: game.moneyline_ticker(TeamSide::Away),
        home_ticker: game.moneyline_ticker(TeamSide::Home),
        away_top_prob: away.top_prob,
        away_topm1_prob: away.topm1_prob,
        home_top_prob: home.top_prob,
        home_topm1_prob: home.topm1_prob,
        away_top_liq: away.top_liq,
        away_topm1_liq: away.topm1_liq,
        home_top_liq: home.top_liq,
        home_topm1_liq: home.topm1_liq,
        away_top_price_cents: away.top_price_cents,
        home_top_price_cents: home.top_price_cents,
        away_ev_top: ev(convention, away_fair, away.top_prob),
        away_ev_topm1: ev(convention, away_fair, away.topm1_prob),
        home_ev_top: ev(convention, home_fair, home.top_prob),
        home_ev_topm1: ev(convention, home_fair, home.topm1_prob),
        convention,
    }
}

/// One row per game on the slate, sorted by rotation number.
pub fn build_moneyline_rows(bundle: &Bundle, convention: EvConvention) -> Vec<MoneylineRow> {
    let mut rows: Vec<MoneylineRow> = bundle
        .games
        .iter()
        .map(|game| build_row(bundle, game, convention))
        .collect();
    sort_rows(&mut rows);
    rows
}
