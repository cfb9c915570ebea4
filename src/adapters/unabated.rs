use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::OddsSource;
use crate::config::UnabatedConfig;
use crate::error::{EdgeError, Result};

/// Unabated partner API: one game-odds snapshot per call.
#[derive(Clone)]
pub struct UnabatedClient {
    http: Client,
    url: String,
    api_key: String,
}

impl UnabatedClient {
    pub fn new(url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(EdgeError::Auth("Unabated API key is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("nba-edge/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| {
                EdgeError::Internal(format!("failed to build Unabated HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            url: url.trim().to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &UnabatedConfig) -> Result<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            EdgeError::Auth("UNABATED_API_KEY (or unabated.api_key) is required".to_string())
        })?;
        Self::new(
            &config.base_url,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub async fn get_snapshot(&self) -> Result<Value> {
        let resp = self
            .http
            .get(&self.url)
            .query(&[("x-api-key", self.api_key.as_str())])
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status.as_u16() == 429 {
            return Err(EdgeError::RateLimited("Unabated snapshot rate limited".to_string()));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(EdgeError::Auth(format!("Unabated rejected the API key: status={}", status)));
        }
        if !status.is_success() {
            return Err(EdgeError::Internal(format!(
                "Unabated snapshot failed: status={} body={}",
                status, text
            )));
        }

        debug!(bytes = text.len(), "fetched unabated snapshot");
        serde_json::from_str(&text)
            .map_err(|e| EdgeError::Internal(format!("invalid Unabated JSON response: {}", e)))
    }
}

#[async_trait]
impl OddsSource for UnabatedClient {
    async fn fetch_snapshot(&self) -> Result<Value> {
        self.get_snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_rejected() {
        let err = UnabatedClient::new("http://localhost", "  ".to_string(), Duration::from_secs(1));
        assert!(matches!(err, Err(EdgeError::Auth(_))));
    }
}
