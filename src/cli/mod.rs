//! nba-edge CLI
//!
//! Commands:
//! - `nba-edge scan` - full moneyline/spread/total dashboard
//! - `nba-edge book` - one-line posting summary for a moneyline event
//! - `nba-edge convert` - American odds / probability / cents
//! - `nba-edge fee` - fee and break-even figures at one price

pub mod calc;
pub mod scan;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;

/// NBA consensus vs Kalshi edge scanner
#[derive(Parser, Debug)]
#[command(name = "nba-edge")]
#[command(author, version, about = "Fee-adjusted break-even and EV for NBA Kalshi markets")]
pub struct Cli {
    /// Directory holding default.toml and environment overrides
    #[arg(long, global = true, default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan today's slate and print the dashboard
    Scan {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
        /// Also write an HTML dashboard to this path
        #[arg(long)]
        html: Option<PathBuf>,
        /// Seller view: post YES offers on each team's own market
        #[arg(long)]
        post: bool,
    },

    /// Posting break-evens for both markets of a moneyline event
    Book {
        /// e.g. KXNBAGAME-26JAN08MIACHI
        event_ticker: String,
        #[arg(long)]
        json: bool,
    },

    /// Convert between American odds, probability and cents
    #[command(group(ArgGroup::new("input").required(true).args(["odds", "prob", "cents"])))]
    Convert {
        #[arg(long, allow_hyphen_values = true)]
        odds: Option<i64>,
        #[arg(long)]
        prob: Option<f64>,
        #[arg(long)]
        cents: Option<i64>,
    },

    /// Taker/maker fees and break-even probabilities at one price
    Fee {
        /// Price in cents (1-99)
        #[arg(long)]
        price: i64,
        /// Contracts at that price
        #[arg(long)]
        contracts: Option<i64>,
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Commands that print a single answer run with WARN-level logging.
    pub fn is_quiet(&self) -> bool {
        !matches!(self, Commands::Scan { .. })
    }
}

impl Cli {
    pub async fn run(self, config: AppConfig) -> Result<()> {
        match self.command {
            Commands::Scan { json, html, post } => scan::run_scan(&config, json, html, post).await,
            Commands::Book { event_ticker, json } => scan::run_book(&config, &event_ticker, json).await,
            Commands::Convert { odds, prob, cents } => calc::run_convert(odds, prob, cents),
            Commands::Fee {
                price,
                contracts,
                json,
            } => calc::run_fee(&config, price, contracts, json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_flags() {
        let cli = Cli::try_parse_from(["nba-edge", "scan", "--post", "--html", "out.html"]).unwrap();
        match cli.command {
            Commands::Scan { json, html, post } => {
                assert!(!json);
                assert!(post);
                assert_eq!(html, Some(PathBuf::from("out.html")));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn test_convert_accepts_negative_odds() {
        let cli = Cli::try_parse_from(["nba-edge", "convert", "--odds", "-150"]).unwrap();
        assert!(matches!(cli.command, Commands::Convert { odds: Some(-150), .. }));
        assert!(cli.command.is_quiet());
    }

    #[test]
    fn test_convert_requires_exactly_one_input() {
        assert!(Cli::try_parse_from(["nba-edge", "convert"]).is_err());
        assert!(Cli::try_parse_from(["nba-edge", "convert", "--odds", "120", "--cents", "45"]).is_err());
    }
}
