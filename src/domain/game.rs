use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Away or home seat of a team in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub fn opposite(&self) -> Self {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Away => "away",
            TeamSide::Home => "home",
        }
    }
}

/// Consensus point spread for one team, e.g. `-3.0 @ -107`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadLine {
    pub spread: f64,
    pub juice: Option<i64>,
}

/// Consensus game total, e.g. `221.5 @ -110`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalLine {
    pub total: f64,
    pub juice: Option<i64>,
}

/// Unabated consensus for both seats of a game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConsensus {
    pub away_moneyline: Option<i64>,
    pub home_moneyline: Option<i64>,
    pub away_spread: Option<SpreadLine>,
    pub home_spread: Option<SpreadLine>,
    pub total: Option<TotalLine>,
}

impl GameConsensus {
    pub fn moneyline(&self, side: TeamSide) -> Option<i64> {
        match side {
            TeamSide::Away => self.away_moneyline,
            TeamSide::Home => self.home_moneyline,
        }
    }

    pub fn spread(&self, side: TeamSide) -> Option<SpreadLine> {
        match side {
            TeamSide::Away => self.away_spread,
            TeamSide::Home => self.home_spread,
        }
    }
}

/// One game on today's slate, oriented to the Kalshi event ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Local date in the display timezone
    pub game_date: NaiveDate,
    pub event_start: DateTime<Utc>,
    pub away_roto: Option<i64>,
    pub away_team_id: Option<i64>,
    pub away_team_name: String,
    pub home_team_id: Option<i64>,
    pub home_team_name: String,
    pub away_code: Option<String>,
    pub home_code: Option<String>,
    /// Moneyline event, e.g. `KXNBAGAME-26JAN08MIACHI`
    pub event_ticker: Option<String>,
    pub consensus: GameConsensus,
}

impl Game {
    pub fn code(&self, side: TeamSide) -> Option<&str> {
        match side {
            TeamSide::Away => self.away_code.as_deref(),
            TeamSide::Home => self.home_code.as_deref(),
        }
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Away => &self.away_team_name,
            TeamSide::Home => &self.home_team_name,
        }
    }

    /// Moneyline market of one team: `{event}-{CODE}`.
    pub fn moneyline_ticker(&self, side: TeamSide) -> Option<String> {
        let event = self.event_ticker.as_deref()?;
        let code = self.code(side)?;
        Some(format!("{event}-{code}"))
    }

    /// Stable key used by the bundle maps.
    pub fn game_id(&self) -> String {
        match &self.event_ticker {
            Some(ticker) => ticker.clone(),
            None => format!(
                "{}_{}_{}",
                self.event_start.to_rfc3339(),
                self.away_team_name,
                self.home_team_name
            ),
        }
    }
}
