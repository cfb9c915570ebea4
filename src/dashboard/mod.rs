//! Presentation of a scan: console tables, JSON and a standalone HTML page.

pub mod console;
pub mod html;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::bundle::{Bundle, Telemetry};
use crate::ev::EvConvention;
use crate::rows::{build_moneyline_rows, build_spread_rows, build_total_rows, MoneylineRow, SpreadRow, TotalRow};

pub use console::{print_dashboard, print_items, OutputMode};
pub use html::render_html;

/// All three tables of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub convention: EvConvention,
    pub moneyline: Vec<MoneylineRow>,
    pub spreads: Vec<SpreadRow>,
    pub totals: Vec<TotalRow>,
    pub telemetry: Telemetry,
}

impl Dashboard {
    pub fn from_bundle(bundle: &Bundle, convention: EvConvention) -> Self {
        Self {
            date: bundle.today,
            generated_at: Utc::now(),
            convention,
            moneyline: build_moneyline_rows(bundle, convention),
            spreads: build_spread_rows(bundle),
            totals: build_total_rows(bundle),
            telemetry: bundle.telemetry,
        }
    }
}

pub fn fmt_prob(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(p) => format!("{p:.decimals$}"),
        None => "N/A".to_string(),
    }
}

pub fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Contracts, `1.5K` above a thousand.
pub fn format_liq_k(liq: Option<i64>) -> String {
    match liq {
        None => "N/A".to_string(),
        Some(l) if l >= 1000 => format!("{:.1}K", l as f64 / 1000.0),
        Some(l) => l.to_string(),
    }
}

pub fn dollar_liquidity(price_cents: Option<i64>, contracts: Option<i64>) -> Option<f64> {
    Some(price_cents? as f64 / 100.0 * contracts? as f64)
}

/// Notional at one level: `$1.7K`, `$2.50M`, `$680`.
pub fn format_liq_dollars(price_cents: Option<i64>, contracts: Option<i64>) -> String {
    match dollar_liquidity(price_cents, contracts) {
        None => "N/A".to_string(),
        Some(d) if d >= 1_000_000.0 => format!("${:.2}M", d / 1_000_000.0),
        Some(d) if d >= 1000.0 => format!("${:.1}K", d / 1000.0),
        Some(d) => format!("${d:.0}"),
    }
}

/// `7:30 PM` in the display zone.
pub fn format_game_time(event_start: DateTime<Utc>, tz: Tz) -> String {
    let local = event_start.with_timezone(&tz).format("%I:%M %p").to_string();
    match local.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => local,
    }
}

pub fn is_game_started(event_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= event_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_liquidity_formats() {
        assert_eq!(format_liq_k(Some(1500)), "1.5K");
        assert_eq!(format_liq_k(Some(999)), "999");
        assert_eq!(format_liq_k(None), "N/A");

        assert_eq!(format_liq_dollars(Some(56), Some(3000)), "$1.7K");
        assert_eq!(format_liq_dollars(Some(50), Some(1000)), "$500");
        assert_eq!(format_liq_dollars(Some(50), Some(5_000_000)), "$2.50M");
        assert_eq!(format_liq_dollars(None, Some(10)), "N/A");
    }

    #[test]
    fn test_game_time_strips_leading_zero() {
        let tz: Tz = "America/Los_Angeles".parse().unwrap();
        // 2026-01-09 03:30 UTC is 7:30 PM the previous evening in LA
        let start = Utc.with_ymd_and_hms(2026, 1, 9, 3, 30, 0).unwrap();
        assert_eq!(format_game_time(start, tz), "7:30 PM");

        let late = Utc.with_ymd_and_hms(2026, 1, 9, 20, 0, 0).unwrap();
        assert_eq!(format_game_time(late, tz), "12:00 PM");
    }

    #[test]
    fn test_prob_formatting() {
        assert_eq!(fmt_prob(Some(0.56432), 4), "0.5643");
        assert_eq!(fmt_prob(Some(0.6), 3), "0.600");
        assert_eq!(fmt_prob(None, 3), "N/A");
    }
}
