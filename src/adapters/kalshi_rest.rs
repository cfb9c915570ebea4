//! Kalshi REST adapter for the public market-data endpoints.
//!
//! Only unauthenticated reads are issued: open events of a series, open
//! markets of an event and a market's bid ladders.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::MarketSource;
use crate::config::KalshiConfig;
use crate::domain::fields::{pick_array, pick_str};
use crate::domain::{KalshiEvent, KalshiMarket};
use crate::error::{EdgeError, Result};
use crate::orderbook::OrderBook;

const DEFAULT_KALSHI_API_BASE: &str = "https://api.elections.kalshi.com/trade-api/v2";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
/// Guard against a server that keeps returning the same cursor
const MAX_EVENT_PAGES: usize = 50;

#[derive(Clone)]
pub struct KalshiClient {
    http: Client,
    base_url: String,
}

impl KalshiClient {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or(DEFAULT_KALSHI_API_BASE)
            .trim_end_matches('/')
            .to_string();

        let http = Client::builder()
            .user_agent("nba-edge/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| {
                EdgeError::Internal(format!("failed to build Kalshi HTTP client: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &KalshiConfig) -> Result<Self> {
        Self::new(
            Some(&config.base_url),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);

        if let Some(query) = query {
            req = req.query(query);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.as_u16() == 429 {
            return Err(EdgeError::RateLimited(format!(
                "Kalshi API rate limited for {} {}",
                method, path
            )));
        }

        if !status.is_success() {
            return Err(EdgeError::Internal(format!(
                "Kalshi API {} {} failed: status={} body={}",
                method, path, status, text
            )));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| EdgeError::Internal(format!("invalid Kalshi JSON response: {}", e)))
    }

    fn parse_events(value: &Value) -> Vec<KalshiEvent> {
        pick_array(value, &["events", "data"])
            .map(|events| events.iter().filter_map(KalshiEvent::from_value).collect())
            .unwrap_or_default()
    }

    fn parse_markets(value: &Value) -> Vec<KalshiMarket> {
        pick_array(value, &["markets", "data", "results"])
            .map(|markets| markets.iter().filter_map(KalshiMarket::from_value).collect())
            .unwrap_or_default()
    }

    fn next_cursor(value: &Value) -> Option<String> {
        pick_str(value, &["cursor", "next_cursor"]).map(ToString::to_string)
    }

    pub async fn get_orderbook(&self, ticker: &str) -> Result<OrderBook> {
        let path = format!("/markets/{}/orderbook", ticker.trim());
        let value = self.request_json(Method::GET, &path, None).await?;
        Ok(OrderBook::from_value(&value))
    }

    pub async fn get_markets_for_event(&self, event_ticker: &str) -> Result<Vec<KalshiMarket>> {
        let params = vec![
            ("event_ticker", event_ticker.trim().to_string()),
            ("status", "open".to_string()),
        ];
        let value = self
            .request_json(Method::GET, "/markets", Some(&params))
            .await?;
        Ok(Self::parse_markets(&value))
    }

    pub async fn get_events(&self, series_ticker: &str) -> Result<Vec<KalshiEvent>> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 0..MAX_EVENT_PAGES {
            let mut params = vec![
                ("series_ticker", series_ticker.to_string()),
                ("status", "open".to_string()),
                ("with_nested_markets", "true".to_string()),
            ];
            if let Some(cursor) = &cursor {
                params.push(("cursor", cursor.clone()));
            }

            let value = self
                .request_json(Method::GET, "/events", Some(&params))
                .await?;
            let events = Self::parse_events(&value);
            debug!(series = series_ticker, page, events = events.len(), "fetched kalshi events page");
            out.extend(events);

            match Self::next_cursor(&value) {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(out)
    }
}

#[async_trait]
impl MarketSource for KalshiClient {
    async fn fetch_orderbook(&self, ticker: &str) -> Result<OrderBook> {
        KalshiClient::get_orderbook(self, ticker).await
    }

    async fn fetch_markets_for_event(&self, event_ticker: &str) -> Result<Vec<KalshiMarket>> {
        KalshiClient::get_markets_for_event(self, event_ticker).await
    }

    async fn fetch_events(&self, series_ticker: &str) -> Result<Vec<KalshiEvent>> {
        KalshiClient::get_events(self, series_ticker).await
    }
}
