use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Decoded Kalshi event ticker, e.g. `KXNBAGAME-26JAN08MIACHI`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTicker {
    pub series: String,
    /// Local game date; `None` when the date segment does not parse
    pub date: Option<NaiveDate>,
    pub away_code: String,
    pub home_code: String,
}

/// Away and home codes are the last six letters of the last segment.
pub fn parse_event_ticker(event_ticker: &str) -> Option<EventTicker> {
    let ticker = event_ticker.trim().to_uppercase();
    let (series, matchup) = ticker.rsplit_once('-')?;
    if matchup.len() < 6 || !matchup.is_ascii() {
        return None;
    }

    let codes = &matchup[matchup.len() - 6..];
    if !codes.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(EventTicker {
        series: series.to_string(),
        date: parse_ticker_date(matchup),
        away_code: codes[..3].to_string(),
        home_code: codes[3..].to_string(),
    })
}

/// `26JAN08...` -> 2026-01-08
pub fn parse_ticker_date(segment: &str) -> Option<NaiveDate> {
    let head = segment.get(..7)?;
    NaiveDate::parse_from_str(&format!("20{head}"), "%Y%b%d").ok()
}

/// Same game under another series: `KXNBAGAME-X` -> `KXNBASPREAD-X`.
pub fn series_event_ticker(event_ticker: &str, series: &str) -> Option<String> {
    let (_, rest) = event_ticker.trim().split_once('-')?;
    Some(format!("{}-{}", series.trim().to_uppercase(), rest.to_uppercase()))
}
