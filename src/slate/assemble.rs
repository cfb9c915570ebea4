use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use super::event_ticker::{parse_event_ticker, EventTicker};
use super::snapshot::{UnabatedEvent, UnabatedTeam};
use crate::adapters::TeamLookup;
use crate::domain::{Game, GameConsensus, KalshiEvent};

/// Kalshi dates its event tickers in US/Eastern.
pub const TICKER_TZ: Tz = chrono_tz::US::Eastern;

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn today_in(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

/// Events starting on `today` in `tz`.
pub fn todays_events(events: Vec<UnabatedEvent>, tz: Tz, today: NaiveDate) -> Vec<UnabatedEvent> {
    events
        .into_iter()
        .filter(|e| local_date(e.event_start, tz) == today)
        .collect()
}

/// Open event whose two codes are `{a, b}` in either order. When the ticker
/// carries a date it must equal `game_date`.
pub fn match_event<'a>(
    a: &str,
    b: &str,
    game_date: NaiveDate,
    events: &'a [KalshiEvent],
) -> Option<(&'a KalshiEvent, EventTicker)> {
    events.iter().find_map(|event| {
        let parsed = parse_event_ticker(&event.event_ticker)?;
        let same_pair = (parsed.away_code == a && parsed.home_code == b)
            || (parsed.away_code == b && parsed.home_code == a);
        let same_day = parsed.date.map_or(true, |d| d == game_date);
        (same_pair && same_day).then_some((event, parsed))
    })
}

fn consensus(away: &UnabatedTeam, home: &UnabatedTeam, event: &UnabatedEvent) -> GameConsensus {
    GameConsensus {
        away_moneyline: away.moneyline,
        home_moneyline: home.moneyline,
        away_spread: away.spread,
        home_spread: home.spread,
        total: event.total,
    }
}

fn build_game(
    event: &UnabatedEvent,
    away: (&UnabatedTeam, Option<String>),
    home: (&UnabatedTeam, Option<String>),
    event_ticker: Option<String>,
    tz: Tz,
) -> Game {
    let (away_team, away_code) = away;
    let (home_team, home_code) = home;
    Game {
        game_date: local_date(event.event_start, tz),
        event_start: event.event_start,
        away_roto: away_team.roto,
        away_team_id: away_team.team_id,
        away_team_name: away_team.name.clone(),
        home_team_id: home_team.team_id,
        home_team_name: home_team.name.clone(),
        away_code,
        home_code,
        event_ticker,
        consensus: consensus(away_team, home_team, event),
    }
}

/// Join today's consensus events to open Kalshi events.
///
/// Matched games take their away/home orientation from the event ticker.
/// Unmatched games are kept in feed order without an event ticker so the
/// moneyline table can still show their fairs.
pub fn assemble_games(
    events: &[UnabatedEvent],
    kalshi_events: &[KalshiEvent],
    lookup: &dyn TeamLookup,
    league: &str,
    tz: Tz,
) -> Vec<Game> {
    let mut games = Vec::with_capacity(events.len());

    for event in events {
        let [first, second] = match event.teams.as_slice() {
            [a, b, ..] => [a, b],
            _ => {
                warn!(start = %event.event_start, teams = event.teams.len(), "event without two teams, skipping");
                continue;
            }
        };

        let first_code = lookup.lookup(league, &first.name);
        let second_code = lookup.lookup(league, &second.name);

        let matched = match (&first_code, &second_code) {
            (Some(a), Some(b)) => match_event(a, b, local_date(event.event_start, TICKER_TZ), kalshi_events),
            _ => None,
        };

        let game = match matched {
            Some((kalshi_event, parsed)) => {
                let first_is_away = first_code.as_deref() == Some(parsed.away_code.as_str());
                let (away, home) = if first_is_away {
                    ((first, first_code), (second, second_code))
                } else {
                    ((second, second_code), (first, first_code))
                };
                debug!(
                    event = %kalshi_event.event_ticker,
                    away = %away.0.name,
                    home = %home.0.name,
                    "matched game"
                );
                build_game(event, away, home, Some(kalshi_event.event_ticker.clone()), tz)
            }
            None => {
                warn!(
                    first = %first.name,
                    second = %second.name,
                    first_code = first_code.as_deref().unwrap_or("-"),
                    second_code = second_code.as_deref().unwrap_or("-"),
                    "no open kalshi event for game"
                );
                build_game(event, (first, first_code), (second, second_code), None, tz)
            }
        };

        games.push(game);
    }

    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpreadLine;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct MapLookup(HashMap<&'static str, &'static str>);

    impl TeamLookup for MapLookup {
        fn lookup(&self, _league: &str, name: &str) -> Option<String> {
            self.0.get(name).map(|c| c.to_string())
        }
    }

    fn team(index: u32, name: &str, roto: i64, ml: i64, spread: f64) -> UnabatedTeam {
        UnabatedTeam {
            index,
            team_id: Some(index as i64 + 10),
            name: name.to_string(),
            roto: Some(roto),
            moneyline: Some(ml),
            spread: Some(SpreadLine { spread, juice: Some(-110) }),
        }
    }

    fn event() -> UnabatedEvent {
        // 8pm Eastern on Jan 8, 5pm in Los Angeles
        UnabatedEvent {
            event_start: Utc.with_ymd_and_hms(2026, 1, 9, 1, 0, 0).unwrap(),
            teams: vec![
                team(0, "Chicago Bulls", 502, -150, -3.5),
                team(1, "Miami Heat", 501, 130, 3.5),
            ],
            total: None,
        }
    }

    fn lookup() -> MapLookup {
        MapLookup(HashMap::from([("Chicago Bulls", "CHI"), ("Miami Heat", "MIA")]))
    }

    fn kalshi(ticker: &str) -> KalshiEvent {
        KalshiEvent {
            event_ticker: ticker.to_string(),
            title: None,
        }
    }

    #[test]
    fn test_orientation_follows_event_ticker() {
        let events = vec![kalshi("KXNBAGAME-26JAN08MIACHI")];
        let games = assemble_games(&[event()], &events, &lookup(), "NBA", chrono_tz::America::Los_Angeles);
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.away_team_name, "Miami Heat");
        assert_eq!(game.away_code.as_deref(), Some("MIA"));
        assert_eq!(game.home_code.as_deref(), Some("CHI"));
        assert_eq!(game.away_roto, Some(501));
        assert_eq!(game.consensus.away_moneyline, Some(130));
        assert_eq!(game.consensus.home_spread.map(|s| s.spread), Some(-3.5));
        assert_eq!(game.game_date, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert_eq!(game.event_ticker.as_deref(), Some("KXNBAGAME-26JAN08MIACHI"));
    }

    #[test]
    fn test_rematch_on_another_day_does_not_pair() {
        let events = vec![kalshi("KXNBAGAME-26JAN10MIACHI")];
        let games = assemble_games(&[event()], &events, &lookup(), "NBA", chrono_tz::America::Los_Angeles);
        assert_eq!(games[0].event_ticker, None);
        // feed order is kept when unmatched
        assert_eq!(games[0].away_team_name, "Chicago Bulls");
    }

    #[test]
    fn test_today_filter_uses_local_date() {
        let la = chrono_tz::America::Los_Angeles;
        let jan8 = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(todays_events(vec![event()], la, jan8).len(), 1);
        assert!(todays_events(vec![event()], chrono_tz::UTC, jan8).is_empty());
    }
}
