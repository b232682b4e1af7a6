//! Pool status endpoint client

use crate::error::MonitorError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PoolClient {
    client: reqwest::Client,
    url: String,
}

impl PoolClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swarm-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url: url.into() })
    }

    /// GET the status document. Any failure here ends the run.
    pub async fn fetch_status(&self) -> Result<Value, MonitorError> {
        info!("Fetching pool status from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(MonitorError::Status(response.status()));
        }

        let body = response.bytes().await?;
        debug!("Pool answered {} bytes", body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}
