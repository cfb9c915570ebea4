//! Console output for `nba-edge scan`.
//!
//! Two modes: human-readable tables (default) and JSON (`--json`).

use chrono_tz::Tz;
use serde::Serialize;
use tabled::{Table, Tabled};

use super::{fmt_opt, fmt_prob, format_game_time, format_liq_k, Dashboard};
use crate::ev::format_ev_percent;
use crate::rows::{MoneylineRow, SpreadRow, TotalRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a slice of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
pub struct MoneylineDisplay {
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Roto")]
    pub roto: String,
    #[tabled(rename = "Away")]
    pub away: String,
    #[tabled(rename = "Home")]
    pub home: String,
    #[tabled(rename = "Away Fair")]
    pub away_fair: String,
    #[tabled(rename = "Home Fair")]
    pub home_fair: String,
    #[tabled(rename = "Away Kalshi")]
    pub away_kalshi: String,
    #[tabled(rename = "Home Kalshi")]
    pub home_kalshi: String,
    #[tabled(rename = "Away +1c")]
    pub away_kalshi_m1: String,
    #[tabled(rename = "Home +1c")]
    pub home_kalshi_m1: String,
    #[tabled(rename = "Away Liq")]
    pub away_liq: String,
    #[tabled(rename = "Home Liq")]
    pub home_liq: String,
    #[tabled(rename = "Away EV")]
    pub away_ev: String,
    #[tabled(rename = "Home EV")]
    pub home_ev: String,
}

impl MoneylineDisplay {
    pub fn from_row(row: &MoneylineRow, tz: Tz) -> Self {
        Self {
            time: format_game_time(row.event_start, tz),
            roto: fmt_opt(row.away_roto),
            away: row.away_team.clone(),
            home: row.home_team.clone(),
            away_fair: fmt_prob(row.away_fair, 3),
            home_fair: fmt_prob(row.home_fair, 3),
            away_kalshi: fmt_prob(row.away_top_prob, 4),
            home_kalshi: fmt_prob(row.home_top_prob, 4),
            away_kalshi_m1: fmt_prob(row.away_topm1_prob, 4),
            home_kalshi_m1: fmt_prob(row.home_topm1_prob, 4),
            away_liq: format_liq_k(row.away_top_liq),
            home_liq: format_liq_k(row.home_top_liq),
            away_ev: format_ev_percent(row.away_ev_top),
            home_ev: format_ev_percent(row.home_ev_top),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SpreadDisplay {
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Roto")]
    pub roto: String,
    #[tabled(rename = "Away")]
    pub away: String,
    #[tabled(rename = "Home")]
    pub home: String,
    #[tabled(rename = "Consensus")]
    pub consensus: String,
    #[tabled(rename = "Strike")]
    pub strike: String,
    #[tabled(rename = "Away Kalshi")]
    pub away_kalshi: String,
    #[tabled(rename = "Home Kalshi")]
    pub home_kalshi: String,
    #[tabled(rename = "Away Liq")]
    pub away_liq: String,
    #[tabled(rename = "Home Liq")]
    pub home_liq: String,
    #[tabled(rename = "Away EV")]
    pub away_ev: String,
    #[tabled(rename = "Home EV")]
    pub home_ev: String,
}

impl SpreadDisplay {
    pub fn from_row(row: &SpreadRow, tz: Tz) -> Self {
        Self {
            time: format_game_time(row.event_start, tz),
            roto: fmt_opt(row.away_roto),
            away: row.away_team.clone(),
            home: row.home_team.clone(),
            consensus: row.consensus.clone(),
            strike: row.strike.clone(),
            away_kalshi: fmt_prob(row.away_kalshi_prob, 4),
            home_kalshi: fmt_prob(row.home_kalshi_prob, 4),
            away_liq: format_liq_k(row.away_kalshi_liq),
            home_liq: format_liq_k(row.home_kalshi_liq),
            away_ev: format_ev_percent(row.away_ev),
            home_ev: format_ev_percent(row.home_ev),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct TotalDisplay {
    #[tabled(rename = "Time")]
    pub time: String,
    #[tabled(rename = "Roto")]
    pub roto: String,
    #[tabled(rename = "Away")]
    pub away: String,
    #[tabled(rename = "Home")]
    pub home: String,
    #[tabled(rename = "Consensus")]
    pub consensus: String,
    #[tabled(rename = "Strike")]
    pub strike: String,
    #[tabled(rename = "Over Kalshi")]
    pub over_kalshi: String,
    #[tabled(rename = "Under Kalshi")]
    pub under_kalshi: String,
    #[tabled(rename = "Over Liq")]
    pub over_liq: String,
    #[tabled(rename = "Under Liq")]
    pub under_liq: String,
    #[tabled(rename = "Over EV")]
    pub over_ev: String,
    #[tabled(rename = "Under EV")]
    pub under_ev: String,
}

impl TotalDisplay {
    pub fn from_row(row: &TotalRow, tz: Tz) -> Self {
        Self {
            time: format_game_time(row.event_start, tz),
            roto: fmt_opt(row.away_roto),
            away: row.away_team.clone(),
            home: row.home_team.clone(),
            consensus: row.consensus.clone(),
            strike: row.strike.clone(),
            over_kalshi: fmt_prob(row.over_kalshi_prob, 4),
            under_kalshi: fmt_prob(row.under_kalshi_prob, 4),
            over_liq: format_liq_k(row.over_kalshi_liq),
            under_liq: format_liq_k(row.under_kalshi_liq),
            over_ev: format_ev_percent(row.over_ev),
            under_ev: format_ev_percent(row.under_ev),
        }
    }
}

/// JSON mode prints the raw rows; table mode prints one table per market type.
pub fn print_dashboard(dashboard: &Dashboard, mode: OutputMode, tz: Tz) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(dashboard)?);
        return Ok(());
    }

    println!("MONEYLINES {} ({:?} view)", dashboard.date, dashboard.convention);
    let lines: Vec<MoneylineDisplay> = dashboard.moneyline.iter().map(|r| MoneylineDisplay::from_row(r, tz)).collect();
    print_items(&lines, mode)?;

    println!("\nSPREADS");
    let lines: Vec<SpreadDisplay> = dashboard.spreads.iter().map(|r| SpreadDisplay::from_row(r, tz)).collect();
    print_items(&lines, mode)?;

    println!("\nTOTALS");
    let lines: Vec<TotalDisplay> = dashboard.totals.iter().map(|r| TotalDisplay::from_row(r, tz)).collect();
    print_items(&lines, mode)?;

    let t = &dashboard.telemetry;
    println!(
        "\nunabated calls={} kalshi market calls={} orderbooks={} (failed {}) unique tickers={} snapshots={}",
        t.unabated_calls,
        t.kalshi_market_calls,
        t.orderbook_requests,
        t.orderbook_failures,
        t.unique_tickers,
        t.cached_snapshots
    );
    Ok(())
}
