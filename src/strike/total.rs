//! Game-total markets (`KXNBATOTAL`).
//!
//! Rows are written from the Over point of view. Each strike is a single
//! market: YES is Over, NO is Under.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use super::selector::{select_closest, Strike};
use crate::domain::KalshiMarket;

static RE_TOTAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(OVER|UNDER)?(\d+)$").unwrap());
static RE_LABEL_STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:over|under)?\s*([\d.]+)").unwrap());
static RE_TITLE_STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:over|under|total)\s+([\d.]+)").unwrap());

const TOTAL_MARKET_TYPES: [&str; 4] = ["total", "over/under", "ou", "totals"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalDirection {
    Over,
    Under,
}

impl TotalDirection {
    fn in_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("over") {
            Some(TotalDirection::Over)
        } else if lower.contains("under") {
            Some(TotalDirection::Under)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalMarket {
    pub ticker: String,
    pub title: String,
    pub strike: f64,
    pub direction: TotalDirection,
}

impl Strike for TotalMarket {
    fn strike(&self) -> Option<f64> {
        Some(self.strike)
    }
}

/// `OVER2275` / `UNDER2225` / `2275` -> integer strike as float.
pub fn parse_total_ticker(market: &KalshiMarket) -> Option<(Option<TotalDirection>, f64)> {
    let suffix = market.ticker_suffix()?.to_uppercase();
    let caps = RE_TOTAL_SUFFIX.captures(&suffix)?;
    let strike = caps[2].parse::<u64>().ok()? as f64;
    let direction = caps.get(1).map(|m| match m.as_str() {
        "UNDER" => TotalDirection::Under,
        _ => TotalDirection::Over,
    });
    Some((direction, strike))
}

/// `Some(direction)` for total markets, `None` otherwise.
pub fn detect_total_market(market: &KalshiMarket) -> Option<TotalDirection> {
    let title = market.title_lower();
    let by_title = if title.contains("points") {
        if title.contains("over") {
            Some(TotalDirection::Over)
        } else if title.contains("under") {
            Some(TotalDirection::Under)
        } else if title.contains("total") {
            Some(TotalDirection::Over)
        } else {
            None
        }
    } else {
        None
    };

    by_title.or_else(|| {
        TOTAL_MARKET_TYPES
            .contains(&market.market_type_lower().as_str())
            .then_some(TotalDirection::Over)
    })
}

fn strike_in(text: &str, re: &Regex) -> Option<f64> {
    re.captures(text)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|s| s.is_finite())
}

/// Strike and (when the source names one) direction, trying the ticker,
/// subtitle, YES/NO labels, product metadata, listed strike fields and
/// finally the title.
pub fn parse_total_strike(market: &KalshiMarket) -> Option<(f64, Option<TotalDirection>)> {
    if let Some((direction, strike)) = parse_total_ticker(market) {
        return Some((strike, direction));
    }

    let labels = [&market.subtitle, &market.yes_title, &market.no_title];
    for label in labels.into_iter().flatten() {
        if let Some(strike) = strike_in(label, &RE_LABEL_STRIKE) {
            return Some((strike, TotalDirection::in_text(label)));
        }
    }

    if let Some(strike) = market.metadata_strike.or(market.listed_strike) {
        return Some((strike, None));
    }

    strike_in(&market.title, &RE_TITLE_STRIKE).map(|s| (s, TotalDirection::in_text(&market.title)))
}

/// Total markets of one game with a parsed strike.
pub fn parse_total_markets(markets: &[KalshiMarket]) -> Vec<TotalMarket> {
    let mut out = Vec::new();

    for market in markets {
        let Some(detected) = detect_total_market(market) else {
            continue;
        };
        let Some((strike, direction)) = parse_total_strike(market) else {
            debug!(ticker = %market.ticker, title = %market.title, "total market without strike");
            continue;
        };

        out.push(TotalMarket {
            ticker: market.ticker.clone(),
            title: market.title.clone(),
            strike,
            direction: direction.unwrap_or(detected),
        });
    }

    out
}

/// Over strikes closest to the consensus total. Falls back to every market
/// when none is labelled Over.
pub fn select_over_strikes(total: f64, markets: &[TotalMarket], count: usize) -> Vec<&TotalMarket> {
    let overs: Vec<&TotalMarket> = markets
        .iter()
        .filter(|m| m.direction == TotalDirection::Over)
        .collect();

    if overs.is_empty() {
        debug!(markets = markets.len(), "no Over-labelled total markets, using all");
        select_closest(total, markets, count)
    } else {
        select_closest(total, overs.into_iter(), count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(ticker: &str, title: &str) -> KalshiMarket {
        KalshiMarket {
            ticker: ticker.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ticker_strike_is_the_integer() {
        let m = market("KXNBATOTAL-26JAN09TORBOS-OVER246", "Over 245.5 points scored?");
        assert_eq!(parse_total_ticker(&m), Some((Some(TotalDirection::Over), 246.0)));
        let under = market("KXNBATOTAL-26JAN09TORBOS-UNDER2225", "");
        assert_eq!(parse_total_ticker(&under), Some((Some(TotalDirection::Under), 2225.0)));
        let bare = market("KXNBATOTAL-26JAN09TORBOS-240", "");
        assert_eq!(parse_total_ticker(&bare), Some((None, 240.0)));
        assert_eq!(parse_total_ticker(&market("KXNBATOTAL-240", "")), None);
    }

    #[test]
    fn test_strike_source_priority() {
        let mut m = market("KXNBATOTAL-26JAN09TORBOS-T1", "Toronto at Boston: Total Points");
        m.yes_title = Some("Over 227.5 points".to_string());
        m.metadata_strike = Some(230.0);
        assert_eq!(parse_total_strike(&m), Some((227.5, Some(TotalDirection::Over))));

        m.yes_title = None;
        assert_eq!(parse_total_strike(&m), Some((230.0, None)));

        m.metadata_strike = None;
        m.listed_strike = Some(231.0);
        assert_eq!(parse_total_strike(&m), Some((231.0, None)));

        m.listed_strike = None;
        m.title = "Total 219.5 points".to_string();
        assert_eq!(parse_total_strike(&m), Some((219.5, None)));

        m.subtitle = Some("Under 218.5".to_string());
        assert_eq!(parse_total_strike(&m), Some((218.5, Some(TotalDirection::Under))));
    }

    #[test]
    fn test_detection() {
        assert_eq!(
            detect_total_market(&market("T", "Under 218.5 points")),
            Some(TotalDirection::Under)
        );
        assert_eq!(
            detect_total_market(&market("T", "Total points scored")),
            Some(TotalDirection::Over)
        );
        assert_eq!(detect_total_market(&market("T", "Celtics wins by over 4.5")), None);

        let mut typed = market("T", "Combined score");
        typed.market_type = Some("OU".to_string());
        assert_eq!(detect_total_market(&typed), Some(TotalDirection::Over));
    }

    #[test]
    fn test_parse_keeps_only_totals_with_strike() {
        let markets = vec![
            market("KXNBATOTAL-26JAN09TORBOS-OVER221", "Over 220.5 points"),
            market("KXNBATOTAL-26JAN09TORBOS-X", "Total points"),
            market("KXNBATOTAL-26JAN09TORBOS-OVER224", "Over 223.5 points"),
            market("KXNBASPREAD-26JAN09TORBOS-BOS4", "Boston wins by over 3.5"),
        ];
        let parsed = parse_total_markets(&markets);
        let strikes: Vec<f64> = parsed.iter().map(|m| m.strike).collect();
        assert_eq!(strikes, vec![221.0, 224.0]);
    }

    #[test]
    fn test_select_over_strikes() {
        let over = |strike| TotalMarket {
            ticker: format!("T-{strike}"),
            title: String::new(),
            strike,
            direction: TotalDirection::Over,
        };
        let mut under = over(221.0);
        under.direction = TotalDirection::Under;

        let markets = vec![over(218.0), under.clone(), over(222.0), over(225.0)];
        let picked: Vec<f64> = select_over_strikes(221.5, &markets, 2).iter().map(|m| m.strike).collect();
        assert_eq!(picked, vec![222.0, 218.0]);

        let only_under = vec![under];
        assert_eq!(select_over_strikes(221.5, &only_under, 2).len(), 1);
    }
}
