use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::fields::{pick_f64, pick_obj, pick_str};
use crate::error::EdgeError;

/// Side of a binary Kalshi contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Yes => Side::No,
            Side::No => Side::Yes,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Yes => "YES",
            Side::No => "NO",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = EdgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Side::Yes),
            "NO" => Ok(Side::No),
            other => Err(EdgeError::Validation(format!(
                "invalid side {other:?} (must be YES or NO)"
            ))),
        }
    }
}

/// A Kalshi market as returned by `/markets`, reduced to the fields the
/// strike parsers read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KalshiMarket {
    pub ticker: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub yes_title: Option<String>,
    pub no_title: Option<String>,
    pub market_type: Option<String>,
    /// Strike from `product_metadata`
    pub metadata_strike: Option<f64>,
    /// Strike from top-level strike fields
    pub listed_strike: Option<f64>,
}

impl KalshiMarket {
    /// Parse a raw market object; `None` when it carries no ticker.
    pub fn from_value(value: &Value) -> Option<Self> {
        let ticker = pick_str(value, &["ticker", "market_ticker"])?.to_string();
        let text = |keys: &[&str]| pick_str(value, keys).map(ToString::to_string);

        let metadata_strike = pick_obj(value, &["product_metadata", "productMetadata", "metadata"])
            .filter(|m| m.is_object())
            .and_then(|m| pick_f64(m, &["strike", "strike_price", "strikePrice", "floor", "cap"]));

        Some(Self {
            ticker,
            title: text(&["title", "market_title", "name"]).unwrap_or_default(),
            subtitle: text(&["subtitle", "market_subtitle"]),
            yes_title: text(&["yes_title", "yesTitle", "yes_sub_title"]),
            no_title: text(&["no_title", "noTitle", "no_sub_title"]),
            market_type: text(&["market_type", "marketType", "type"]),
            metadata_strike,
            listed_strike: pick_f64(value, &["strike", "strike_price", "strikePrice", "floor"]),
        })
    }

    /// Last dash-separated ticker segment, e.g. `LAC6` or `OVER2215`.
    ///
    /// `None` for tickers with fewer than three segments.
    pub fn ticker_suffix(&self) -> Option<&str> {
        let mut parts = self.ticker.split('-');
        let count = parts.clone().count();
        if count < 3 {
            return None;
        }
        parts.next_back()
    }

    pub fn title_lower(&self) -> String {
        self.title.to_lowercase()
    }

    pub fn market_type_lower(&self) -> String {
        self.market_type
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }
}

/// An open Kalshi event (one game in a series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KalshiEvent {
    pub event_ticker: String,
    pub title: Option<String>,
}

impl KalshiEvent {
    pub fn from_value(value: &Value) -> Option<Self> {
        let event_ticker = pick_str(value, &["event_ticker", "eventTicker", "ticker"])?.to_uppercase();
        Some(Self {
            event_ticker,
            title: pick_str(value, &["title"]).map(ToString::to_string),
        })
    }
}
