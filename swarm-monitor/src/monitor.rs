//! One monitoring run: fetch, classify, decide, notify

use crate::classifier::{classify, Classification};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::notify::{AlertReport, Mailer, SmtpMailer, WebhookClient, WebhookPayload};
use crate::pool::PoolClient;
use crate::trigger::{evaluate, AlertDecision};
use chrono::{Local, Utc};
use tracing::{debug, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub classification: Classification,
    pub decision: AlertDecision,
    pub emailed: bool,
    pub webhook_posted: bool,
}

pub struct Monitor<M> {
    config: MonitorConfig,
    pool: PoolClient,
    mailer: M,
    webhook: Option<WebhookClient>,
    dry_run: bool,
}

impl Monitor<SmtpMailer> {
    /// Monitor wired to the real SMTP relay from `config.smtp`
    pub fn from_config(config: MonitorConfig) -> Result<Self, MonitorError> {
        let mailer = SmtpMailer::new(config.smtp.clone()).with_timeout(config.http_timeout() * 3);
        Self::new(config, mailer)
    }
}

impl<M: Mailer> Monitor<M> {
    pub fn new(config: MonitorConfig, mailer: M) -> Result<Self, MonitorError> {
        let pool = PoolClient::new(config.pool_url.clone(), config.http_timeout())?;
        let webhook = config
            .webhook_url()
            .map(|url| WebhookClient::new(url, config.http_timeout()));

        Ok(Self {
            config,
            pool,
            mailer,
            webhook,
            dry_run: false,
        })
    }

    /// Fetch/classify/decide only, no email nor webhook
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Run once.
    ///
    /// A fetch failure aborts before any notification. The webhook is
    /// attempted even when the email failed; the email error is returned
    /// afterwards.
    pub async fn run_once(&self) -> Result<RunSummary, MonitorError> {
        let document = self.pool.fetch_status().await?;

        let classification = classify(&document);
        info!(
            "Workers: {} offline {:?}, {} online {:?}",
            classification.offline_count(),
            classification.offline,
            classification.active_count(),
            classification.online
        );

        let threshold = self.config.threshold();
        let decision = evaluate(&classification, threshold);
        if decision.fires() {
            for reason in decision.reasons() {
                warn!("Alert condition: {}", reason);
            }
        } else {
            info!("All workers healthy, no alert");
        }

        let mut summary = RunSummary {
            classification,
            decision,
            emailed: false,
            webhook_posted: false,
        };

        if self.dry_run {
            info!("Dry run: skipping email and webhook");
            return Ok(summary);
        }

        let email_outcome = if summary.decision.fires() {
            let report = AlertReport::build(
                &self.config.pool_label,
                &summary.classification,
                &summary.decision,
                &Local::now(),
            );
            debug!("Sending alert email: {}", report.subject);
            let outcome = self.mailer.send(&report).await;
            summary.emailed = outcome.is_ok();
            outcome
        } else {
            Ok(())
        };

        if let Some(webhook) = &self.webhook {
            let payload = WebhookPayload::new(
                &self.config.pool_label,
                &summary.classification,
                &summary.decision,
                threshold,
                Utc::now(),
            );
            summary.webhook_posted = webhook.post(&payload).await;
        }

        email_outcome?;
        Ok(summary)
    }
}
