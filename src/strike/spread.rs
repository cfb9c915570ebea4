//! Spread markets (`KXNBASPREAD`).
//!
//! Each market reads "{Team} wins by over {X} points?" and belongs to one
//! team. An underdog covering `+X` is the same outcome as the favorite NOT
//! winning by more than `X`, so a positive consensus spread trades the NO
//! side of the opponent's market and a negative one trades YES on the team's
//! own market.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

use super::selector::{select_closest, Strike};
use crate::domain::{GameConsensus, KalshiMarket, Side, SpreadLine, TeamSide};

static RE_SPREAD_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{3})(\d+)$").unwrap());
static RE_SPREAD_STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)over\s+([\d.]+)\s+points?").unwrap());
static RE_ANCHOR_TEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z\s]+?)\s+wins\s+by").unwrap());

const SPREAD_MARKET_TYPES: [&str; 3] = ["spread", "point spread", "ps"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadMarket {
    pub ticker: String,
    pub title: String,
    /// Points the anchor team must win by, from the title
    pub strike: f64,
    /// Team the market is written on; `None` when no rule could tell
    pub team_code: Option<String>,
    /// Title fragment naming the team, when the ticker did not
    pub anchor_token: Option<String>,
}

impl Strike for SpreadMarket {
    fn strike(&self) -> Option<f64> {
        Some(self.strike)
    }
}

/// A game seat as the spread parser sees it.
#[derive(Debug, Clone, Copy)]
pub struct TeamRef<'a> {
    pub name: &'a str,
    pub code: Option<&'a str>,
}

pub fn is_spread_market(market: &KalshiMarket) -> bool {
    let title = market.title_lower();
    let by_title = title.contains("wins by") && title.contains("points");
    by_title || SPREAD_MARKET_TYPES.contains(&market.market_type_lower().as_str())
}

/// `LAC6` -> `("LAC", 6)`. The number is a bucket index, not the strike.
pub fn parse_spread_ticker(market: &KalshiMarket) -> Option<(String, u32)> {
    let suffix = market.ticker_suffix()?;
    let caps = RE_SPREAD_SUFFIX.captures(suffix)?;
    let bucket = caps[2].parse().ok()?;
    Some((caps[1].to_string(), bucket))
}

/// `"... wins by over 6.5 points?"` -> `6.5`
pub fn parse_spread_strike(title: &str) -> Option<f64> {
    RE_SPREAD_STRIKE
        .captures(title)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .filter(|s| s.is_finite())
}

/// Lower-case spellings Kalshi titles use for a team.
pub fn team_name_variations(team_name: &str) -> Vec<String> {
    let base = team_name.trim().to_lowercase();
    if base.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = base.split_whitespace().collect();
    let last = words.last().copied().unwrap_or_default();
    let mut variations = vec![base.clone()];

    if base.contains("los angeles") {
        variations.push(base.replace("los angeles", "la"));
        variations.push(format!("la {last}"));
    }
    if base.contains("new york") {
        variations.push(base.replace("new york", "ny"));
    }
    if words.len() > 1 {
        variations.push(last.to_string());
    }

    variations.dedup();
    variations
}

/// Length of the longest variation that overlaps the anchor token (one
/// contained in the other); 0 when none does.
fn match_strength(token: &str, variations: &[String]) -> usize {
    variations
        .iter()
        .filter(|v| !v.is_empty())
        .filter_map(|v| {
            if token.contains(v.as_str()) {
                Some(v.len())
            } else if v.contains(token) {
                Some(token.len())
            } else {
                None
            }
        })
        .max()
        .unwrap_or(0)
}

/// Title-based team resolution for tickers without a `{CODE}{n}` suffix.
fn resolve_from_title(
    market: &KalshiMarket,
    away: TeamRef<'_>,
    home: TeamRef<'_>,
) -> (Option<String>, Option<String>) {
    let token = RE_ANCHOR_TEAM
        .captures(&market.title_lower())
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty());

    let mut code = None;
    if let Some(token) = token.as_deref() {
        let away_strength = away.code.map_or(0, |_| match_strength(token, &team_name_variations(away.name)));
        let home_strength = home.code.map_or(0, |_| match_strength(token, &team_name_variations(home.name)));

        let matched = if away_strength > home_strength {
            away.code
        } else if home_strength > away_strength {
            home.code
        } else {
            // Tie (or no name match): look for a code spelled out in the token.
            [away.code, home.code]
                .into_iter()
                .flatten()
                .find(|c| token.contains(&c.to_lowercase()))
        };
        code = matched.map(ToString::to_string);
    }

    if code.is_none() {
        if let Some(suffix) = market.ticker_suffix() {
            code = [away.code, home.code]
                .into_iter()
                .flatten()
                .find(|c| {
                    suffix
                        .strip_prefix(*c)
                        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
                })
                .map(ToString::to_string);
        }
    }

    (code, token)
}

/// Spread markets of one game with parsed strike and owning team.
///
/// Markets without a strike are dropped; markets whose team could not be
/// resolved are kept with `team_code = None` and never selected.
pub fn parse_spread_markets(
    markets: &[KalshiMarket],
    away: TeamRef<'_>,
    home: TeamRef<'_>,
) -> Vec<SpreadMarket> {
    let mut out = Vec::new();

    for market in markets.iter().filter(|m| is_spread_market(m)) {
        let Some(strike) = parse_spread_strike(&market.title) else {
            debug!(ticker = %market.ticker, title = %market.title, "spread market without strike");
            continue;
        };

        let (team_code, anchor_token) = match parse_spread_ticker(market) {
            Some((code, _bucket)) => (Some(code), None),
            None => {
                let (code, token) = resolve_from_title(market, away, home);
                debug!(
                    ticker = %market.ticker,
                    token = token.as_deref().unwrap_or("-"),
                    code = code.as_deref().unwrap_or("-"),
                    "spread team resolved from title"
                );
                (code, token)
            }
        };

        out.push(SpreadMarket {
            ticker: market.ticker.clone(),
            title: market.title.clone(),
            strike,
            team_code,
            anchor_token,
        });
    }

    out
}

/// Strikes nearest to `|team_spread|` on the market that expresses the
/// team's cover, paired with the side to trade.
pub fn select_spread_strikes<'a>(
    team_spread: f64,
    team_code: &str,
    opponent_code: &str,
    markets: &'a [SpreadMarket],
    count: usize,
) -> Vec<(&'a SpreadMarket, Side)> {
    let (target_code, side) = if team_spread < 0.0 {
        (team_code, Side::Yes)
    } else {
        (opponent_code, Side::No)
    };

    let candidates = markets
        .iter()
        .filter(|m| m.team_code.as_deref() == Some(target_code));

    select_closest(team_spread.abs(), candidates, count)
        .into_iter()
        .map(|m| (m, side))
        .collect()
}

/// Single closest market for a team spread; the side is returned even when
/// no market matches.
pub fn map_team_spread_to_market<'a>(
    team_spread: f64,
    team_code: &str,
    opponent_code: &str,
    markets: &'a [SpreadMarket],
) -> (Option<&'a SpreadMarket>, Side) {
    let side = if team_spread < 0.0 { Side::Yes } else { Side::No };
    let market = select_spread_strikes(team_spread, team_code, opponent_code, markets, 1)
        .into_iter()
        .next()
        .map(|(m, _)| m);
    (market, side)
}

/// The seat whose spread the rows are written from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSpread {
    pub team: TeamSide,
    pub spread: f64,
    pub juice: Option<i64>,
}

/// Favorite's point of view when one can be told, otherwise whichever side
/// has a line. A lone underdog line stays with the underdog and keeps its juice.
pub fn canonical_spread(consensus: &GameConsensus) -> Option<CanonicalSpread> {
    let pick = |team: TeamSide, line: SpreadLine| CanonicalSpread {
        team,
        spread: line.spread,
        juice: line.juice,
    };

    let away = consensus.away_spread;
    let home = consensus.home_spread;

    if let Some(a) = away.filter(|a| a.spread < 0.0) {
        return Some(pick(TeamSide::Away, a));
    }
    if let Some(h) = home.filter(|h| h.spread < 0.0) {
        return Some(pick(TeamSide::Home, h));
    }
    // the other seat takes over only when it has its own line
    if let (Some(_), Some(h)) = (away.filter(|a| a.spread > 0.0), home) {
        return Some(pick(TeamSide::Home, h));
    }
    if let (Some(_), Some(a)) = (home.filter(|h| h.spread > 0.0), away) {
        return Some(pick(TeamSide::Away, a));
    }

    away.map(|a| pick(TeamSide::Away, a))
        .or_else(|| home.map(|h| pick(TeamSide::Home, h)))
}
