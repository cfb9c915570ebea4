//! Typed view of the Unabated game-odds snapshot.
//!
//! The snapshot groups events under `gameOddsEvents["lg{league}:pt1:...:pregame"]`.
//! Each event carries its teams under `eventTeams` (keyed by side index) and
//! per-source lines under `gameOddsMarketSourcesLines`. Only the Unabated
//! consensus source (`ms49`) is read.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::fields::{pick_f64, pick_i64, pick_obj, pick_str};
use crate::domain::{SpreadLine, TotalLine};

const CONSENSUS_SOURCE: &str = ":ms49:";
const PRICE_KEYS: [&str; 3] = ["americanPrice", "unabatedPrice", "price"];
const JUICE_KEYS: [&str; 4] = ["americanPrice", "unabatedPrice", "price", "juice"];
const ROTO_KEYS: [&str; 5] = ["rotationNumber", "rotation", "rotoNumber", "roto", "rot"];

/// One team seat of an Unabated event with its consensus lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnabatedTeam {
    /// Key in `eventTeams`; `si{index}` in the lines map
    pub index: u32,
    pub team_id: Option<i64>,
    pub name: String,
    pub roto: Option<i64>,
    pub moneyline: Option<i64>,
    pub spread: Option<SpreadLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnabatedEvent {
    pub event_start: DateTime<Utc>,
    /// Ordered by side index; the order says nothing about away/home
    pub teams: Vec<UnabatedTeam>,
    pub total: Option<TotalLine>,
}

/// Section key holding full-game pregame events of a league.
pub fn find_league_section(snapshot: &Value, league_id: u32) -> Option<&str> {
    let prefix = format!("lg{league_id}:");
    snapshot
        .get("gameOddsEvents")?
        .as_object()?
        .keys()
        .find(|k| k.starts_with(&prefix) && k.contains(":pt1:") && k.contains(":pregame"))
        .map(String::as_str)
}

/// `2026-01-09T00:30:00Z`, with or without offset or fractional seconds.
pub fn parse_event_start(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `teams[id].name | teamName`, else `Team {id}`.
pub fn team_name(snapshot: &Value, team_id: i64) -> String {
    snapshot
        .get("teams")
        .and_then(|teams| teams.get(team_id.to_string()))
        .and_then(|team| pick_str(team, &["name", "teamName"]))
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("Team {team_id}"))
}

/// `si1:ms49:an0` -> 1
fn side_index(key: &str) -> Option<u32> {
    key.split(':').next()?.strip_prefix("si")?.parse().ok()
}

fn event_team_entries(event: &Value) -> Vec<(u32, &Value)> {
    let mut out: Vec<(u32, &Value)> = match event.get("eventTeams") {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<u32>().ok().map(|i| (i, v)))
            .collect(),
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32, v))
            .collect(),
        _ => Vec::new(),
    };
    out.retain(|(_, v)| v.is_object());
    out.sort_by_key(|(i, _)| *i);
    out
}

fn consensus_blocks(event: &Value) -> Vec<(u32, &Value)> {
    let Some(lines) = event
        .get("gameOddsMarketSourcesLines")
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut out: Vec<(u32, &Value)> = lines
        .iter()
        .filter(|(k, v)| k.contains(CONSENSUS_SOURCE) && v.is_object())
        .filter_map(|(k, v)| side_index(k).map(|i| (i, v)))
        .collect();
    out.sort_by_key(|(i, _)| *i);
    out
}

fn parse_moneyline(block: &Value) -> Option<i64> {
    let line = pick_obj(block, &["bt1"]).filter(|v| v.is_object())?;
    pick_i64(line, &PRICE_KEYS).filter(|odds| *odds != 0)
}

fn parse_spread(block: &Value) -> Option<SpreadLine> {
    let line = pick_obj(block, &["bt2", "spread", "spreadLine"]).filter(|v| v.is_object())?;
    let spread = pick_f64(line, &["line", "spread", "value", "points"])?;
    Some(SpreadLine {
        spread,
        juice: pick_i64(line, &JUICE_KEYS),
    })
}

fn parse_total(block: &Value) -> Option<TotalLine> {
    let line = pick_obj(block, &["bt3"]).filter(|v| v.is_object())?;
    let total = pick_f64(line, &["line", "total", "value", "points", "overUnder"])?;
    Some(TotalLine {
        total,
        juice: pick_i64(line, &JUICE_KEYS),
    })
}

/// Parse one raw event; `None` without a usable `eventStart`.
pub fn parse_event(snapshot: &Value, event: &Value) -> Option<UnabatedEvent> {
    let Some(event_start) = pick_str(event, &["eventStart"]).and_then(parse_event_start) else {
        debug!("unabated event without parseable eventStart");
        return None;
    };

    let blocks = consensus_blocks(event);
    let block_for = |index: u32| blocks.iter().find(|(i, _)| *i == index).map(|(_, b)| *b);

    let teams = event_team_entries(event)
        .into_iter()
        .map(|(index, info)| {
            let team_id = pick_i64(info, &["id"]);
            let block = block_for(index);
            UnabatedTeam {
                index,
                team_id,
                name: team_id
                    .map(|id| team_name(snapshot, id))
                    .unwrap_or_else(|| format!("Team {index}")),
                roto: pick_i64(info, &ROTO_KEYS),
                moneyline: block.and_then(parse_moneyline),
                spread: block.and_then(parse_spread),
            }
        })
        .collect();

    let total = blocks.iter().find_map(|(_, block)| parse_total(block));

    Some(UnabatedEvent {
        event_start,
        teams,
        total,
    })
}

/// Every pregame event of the league, in snapshot order.
pub fn parse_snapshot(snapshot: &Value, league_id: u32) -> Vec<UnabatedEvent> {
    let Some(section) = find_league_section(snapshot, league_id) else {
        debug!(league_id, "no pregame section in unabated snapshot");
        return Vec::new();
    };

    snapshot["gameOddsEvents"][section]
        .as_array()
        .map(|events| {
            events
                .iter()
                .filter_map(|event| parse_event(snapshot, event))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn snapshot() -> Value {
        json!({
            "teams": {
                "5": {"name": "Chicago Bulls"},
                "16": {"teamName": "Miami Heat"}
            },
            "gameOddsEvents": {
                "lg1:pt1:pregame": [],
                "lg3:pt1:pregame": [{
                    "eventStart": "2026-01-09T01:00:00Z",
                    "eventTeams": {
                        "0": {"id": 5, "rotationNumber": 502},
                        "1": {"id": 16, "rotationNumber": "501"}
                    },
                    "gameOddsMarketSourcesLines": {
                        "si0:ms49:an0": {
                            "bt1": {"americanPrice": "-150"},
                            "bt2": {"line": 0, "americanPrice": -108},
                            "bt3": {"points": "221.5", "americanPrice": -110}
                        },
                        "si1:ms49:an0": {
                            "bt1": {"americanPrice": " +130 "},
                            "spreadLine": {"spread": "3.5", "juice": "-112"}
                        },
                        "si0:ms1:an0": {"bt1": {"americanPrice": -400}}
                    }
                }]
            }
        })
    }

    #[test]
    fn test_parse_snapshot_reads_consensus_source_only() {
        let events = parse_snapshot(&snapshot(), 3);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_start, Utc.with_ymd_and_hms(2026, 1, 9, 1, 0, 0).unwrap());

        let bulls = &event.teams[0];
        assert_eq!(bulls.name, "Chicago Bulls");
        assert_eq!(bulls.roto, Some(502));
        assert_eq!(bulls.moneyline, Some(-150));
        // pick'em line is kept
        assert_eq!(bulls.spread, Some(SpreadLine { spread: 0.0, juice: Some(-108) }));

        let heat = &event.teams[1];
        assert_eq!(heat.name, "Miami Heat");
        assert_eq!(heat.roto, Some(501));
        assert_eq!(heat.moneyline, Some(130));
        assert_eq!(heat.spread, Some(SpreadLine { spread: 3.5, juice: Some(-112) }));

        assert_eq!(event.total, Some(TotalLine { total: 221.5, juice: Some(-110) }));
    }

    #[test]
    fn test_missing_section_and_team_fallback() {
        assert!(parse_snapshot(&snapshot(), 4).is_empty());

        let snap = json!({"teams": {}});
        let event = json!({
            "eventStart": "2026-01-09T01:00:00",
            "eventTeams": [{"id": 77}, "junk"]
        });
        let parsed = parse_event(&snap, &event).unwrap();
        assert_eq!(parsed.teams.len(), 1);
        assert_eq!(parsed.teams[0].name, "Team 77");
        assert_eq!(parsed.teams[0].moneyline, None);
        assert_eq!(parsed.total, None);

        assert!(parse_event(&snap, &json!({"eventStart": "soon"})).is_none());
    }

    #[test]
    fn test_side_index() {
        assert_eq!(side_index("si1:ms49:an0"), Some(1));
        assert_eq!(side_index("x1:ms49:an0"), None);
    }
}
