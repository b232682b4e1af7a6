//! Best-effort JSON webhook (run log)

use crate::classifier::Classification;
use crate::trigger::{AlertDecision, AlertReason};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// One run, as posted to the logging endpoint
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub timestamp: DateTime<Utc>,
    pub pool: String,
    pub offline_count: usize,
    pub online_count: usize,
    pub offline: Vec<String>,
    pub threshold: Option<u32>,
    pub alert: bool,
    pub reasons: Vec<AlertReason>,
}

impl WebhookPayload {
    pub fn new(
        pool: &str,
        result: &Classification,
        decision: &AlertDecision,
        threshold: Option<u32>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            pool: pool.to_string(),
            offline_count: result.offline_count(),
            online_count: result.active_count(),
            offline: result.offline.clone(),
            threshold,
            alert: decision.fires(),
            reasons: decision.reasons().to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swarm-monitor/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Webhook client config rejected ({e}), using defaults");
                reqwest::Client::new()
            });
        Self { client, url: url.into() }
    }

    /// POST the payload; failures are logged and reported as `false`
    pub async fn post(&self, payload: &WebhookPayload) -> bool {
        match self.client.post(&self.url).json(payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Webhook accepted ({})", response.status());
                true
            }
            Ok(response) => {
                warn!("Webhook {} answered {}", self.url, response.status());
                false
            }
            Err(e) => {
                warn!("Webhook post to {} failed: {}", self.url, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::evaluate;

    #[test]
    fn test_payload_shape() {
        let result = Classification {
            workers: Vec::new(),
            offline: vec!["rig2".into()],
            online: vec!["rig1".into()],
        };
        let decision = evaluate(&result, Some(3));
        let payload = WebhookPayload::new("Swarm ALPHA", &result, &decision, Some(3), Utc::now());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["offline_count"], 1);
        assert_eq!(json["online_count"], 1);
        assert_eq!(json["offline"][0], "rig2");
        assert_eq!(json["alert"], true);
        assert_eq!(json["reasons"][0]["kind"], "offline_workers");
        assert_eq!(json["reasons"][1]["kind"], "below_threshold");
        assert_eq!(json["reasons"][1]["threshold"], 3);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_swallowed() {
        // discard port, closed on loopback
        let client = WebhookClient::new("http://127.0.0.1:9/hook", Duration::from_secs(2));
        let payload = WebhookPayload::new(
            "Swarm ALPHA",
            &Classification::default(),
            &AlertDecision::default(),
            None,
            Utc::now(),
        );
        assert!(!client.post(&payload).await);
    }
}
