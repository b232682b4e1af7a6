/*!
Test Harness pour le monitor

Facilite l'écriture de tests de bout en bout avec:
- Faux pool HTTP démarré automatiquement
- Mailer mock pour vérifier les alertes
- Config pointant vers le faux pool
*/

use crate::mailer_stub::MockMailer;
use crate::pool_stub::StubPool;
use anyhow::Result;
use serde_json::Value;
use swarm_monitor::notify::AlertReport;
use swarm_monitor::{Monitor, MonitorConfig, SmtpConfig};

/// Harness de test complet: faux pool + mailer mock
pub struct TestHarness {
    pub pool: StubPool,
    pub mailer: MockMailer,
}

impl TestHarness {
    /// Crée un harness servant `document` sur /status
    pub async fn start(document: Value) -> Result<Self> {
        env_logger::try_init().ok(); // Init logging pour tests

        Ok(Self {
            pool: StubPool::start(document).await?,
            mailer: MockMailer::new(),
        })
    }

    /// Harness dont le relais SMTP est en panne
    pub async fn with_failing_mailer(document: Value) -> Result<Self> {
        let mut harness = Self::start(document).await?;
        harness.mailer = MockMailer::failing();
        Ok(harness)
    }

    /// Config de test: faux pool, seuil par défaut, pas de webhook
    pub fn config(&self) -> MonitorConfig {
        MonitorConfig {
            pool_url: self.pool.status_url(),
            http_timeout_secs: 5,
            smtp: SmtpConfig {
                username: Some("monitor@example.com".to_string()),
                password: Some("test-app-password".to_string()),
                recipients: vec!["ops@example.com".to_string()],
                ..SmtpConfig::default()
            },
            ..MonitorConfig::default()
        }
    }

    /// Config de test avec le webhook du faux pool activé
    pub fn config_with_webhook(&self) -> MonitorConfig {
        MonitorConfig {
            webhook_url: Some(self.pool.webhook_url()),
            ..self.config()
        }
    }

    /// Monitor branché sur le mailer mock (les clones partagent l'historique)
    pub fn monitor(&self, config: MonitorConfig) -> Result<Monitor<MockMailer>> {
        Ok(Monitor::new(config, self.mailer.clone())?)
    }

    /// Assert qu'une alerte contenant `fragment` dans le sujet a été envoyée
    pub fn assert_alert_sent(&self, fragment: &str) -> Result<AlertReport> {
        let Some(report) = self.mailer.last_report() else {
            anyhow::bail!("Expected an alert email, none was sent");
        };
        if !report.subject.contains(fragment) {
            anyhow::bail!("Alert subject '{}' does not contain '{}'", report.subject, fragment);
        }
        log::info!("✅ Alert sent: {}", report.subject);
        Ok(report)
    }

    /// Assert qu'aucune alerte n'a été tentée
    pub fn assert_no_alert(&self) -> Result<()> {
        let attempts = self.mailer.attempts();
        if attempts != 0 {
            anyhow::bail!("Expected no alert email, got {} attempt(s)", attempts);
        }
        Ok(())
    }
}
