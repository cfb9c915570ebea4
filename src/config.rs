use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::pricing::{KALSHI_TAKER_RATE, MAX_BUDGET_DOLLARS};
use crate::strike::DEFAULT_STRIKE_COUNT;

pub const UNABATED_PROD_URL: &str = "https://partner-api.unabated.com/api/markets/gameOdds";
pub const KALSHI_BASE_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub unabated: UnabatedConfig,
    pub kalshi: KalshiConfig,
    pub xref: XrefConfig,
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnabatedConfig {
    /// Game odds snapshot endpoint
    pub base_url: String,
    /// Partner API key (falls back to UNABATED_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Unabated league id (NBA = 3)
    pub league_id: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UnabatedConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("UNABATED_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KalshiConfig {
    /// Trade API v2 base URL
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Series holding the moneyline events (e.g. KXNBAGAME)
    pub game_series: String,
    pub spread_series: String,
    pub total_series: String,
    /// Maximum orderbook requests in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_concurrency() -> usize {
    8
}

#[derive(Debug, Clone, Deserialize)]
pub struct XrefConfig {
    /// CSV with league,unabated_name,kalshi_code columns
    pub path: PathBuf,
    pub league: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Strikes emitted per spread/total game
    pub strike_count: usize,
    /// IANA zone used for "today" and game times
    pub timezone: String,
    /// Budget for contract sizing in dollars
    pub max_budget_dollars: Decimal,
    /// Taker fee coefficient
    pub taker_fee_rate: Decimal,
}

impl ScanConfig {
    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone {}: {}", self.timezone, e))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Level for this crate's own targets; dependencies stay at info
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("unabated.base_url", UNABATED_PROD_URL)?
            .set_default("unabated.league_id", 3)?
            .set_default("unabated.timeout_secs", 20)?
            .set_default("kalshi.base_url", KALSHI_BASE_URL)?
            .set_default("kalshi.timeout_secs", 20)?
            .set_default("kalshi.game_series", "KXNBAGAME")?
            .set_default("kalshi.spread_series", "KXNBASPREAD")?
            .set_default("kalshi.total_series", "KXNBATOTAL")?
            .set_default("kalshi.concurrency", 8)?
            .set_default("xref.path", "team_xref_nba.csv")?
            .set_default("xref.league", "NBA")?
            .set_default("scan.strike_count", DEFAULT_STRIKE_COUNT as i64)?
            .set_default("scan.timezone", "America/Los_Angeles")?
            .set_default("scan.max_budget_dollars", MAX_BUDGET_DOLLARS.to_string())?
            .set_default("scan.taker_fee_rate", KALSHI_TAKER_RATE.to_string())?
            .set_default("logging.level", "debug")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("NBA_EDGE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (NBA_EDGE_KALSHI__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("NBA_EDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.scan.strike_count == 0 {
            errors.push("scan.strike_count must be at least 1".to_string());
        }

        if let Err(e) = self.scan.tz() {
            errors.push(e);
        }

        if self.scan.max_budget_dollars <= Decimal::ZERO {
            errors.push("scan.max_budget_dollars must be positive".to_string());
        }

        if self.scan.taker_fee_rate < Decimal::ZERO || self.scan.taker_fee_rate >= Decimal::ONE {
            errors.push("scan.taker_fee_rate must be in [0, 1)".to_string());
        }

        if self.kalshi.concurrency == 0 {
            errors.push("kalshi.concurrency must be at least 1".to_string());
        }

        for (name, url) in [
            ("unabated.base_url", &self.unabated.base_url),
            ("kalshi.base_url", &self.kalshi.base_url),
        ] {
            if url::Url::parse(url).is_err() {
                errors.push(format!("{name} is not a valid URL: {url}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
