use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::adapters::{KalshiClient, TeamXref, UnabatedClient};
use crate::config::AppConfig;
use crate::dashboard::{print_dashboard, render_html, Dashboard, OutputMode};
use crate::ev::EvConvention;
use crate::pricing::FeeSchedule;
use crate::scanner::{event_book_summary, ScanSettings, Scanner};

pub fn build_scanner(config: &AppConfig) -> Result<Scanner> {
    let settings = ScanSettings::from_config(config)?;
    let odds = UnabatedClient::from_config(&config.unabated)?;
    let markets = KalshiClient::from_config(&config.kalshi)?;
    let teams = TeamXref::load(&config.xref.path, &config.xref.league)
        .with_context(|| format!("loading team xref {}", config.xref.path.display()))?;
    info!(teams = teams.len(), league = %config.xref.league, "team xref loaded");

    Ok(Scanner::new(Arc::new(odds), Arc::new(markets), Arc::new(teams), settings))
}

pub async fn run_scan(config: &AppConfig, json: bool, html: Option<PathBuf>, post: bool) -> Result<()> {
    let scanner = build_scanner(config)?;
    let tz = scanner.settings().tz;

    let bundle = scanner.scan_today().await?;
    let convention = if post { EvConvention::Seller } else { EvConvention::Buyer };
    let dashboard = Dashboard::from_bundle(&bundle, convention);

    if let Some(path) = html {
        std::fs::write(&path, render_html(&dashboard, tz, Utc::now()))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "html dashboard written");
    }

    print_dashboard(&dashboard, OutputMode::from_json_flag(json), tz)
}

pub async fn run_book(config: &AppConfig, event_ticker: &str, json: bool) -> Result<()> {
    let client = KalshiClient::from_config(&config.kalshi)?;
    let fees = FeeSchedule::with_taker_rate(config.scan.taker_fee_rate);

    let summary = event_book_summary(&client, event_ticker, &fees).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
