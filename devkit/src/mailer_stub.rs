/*!
Mock Mailer pour tests sans relais SMTP

Enregistre tous les rapports d'alerte "envoyés" et permet de simuler
une panne du relais.
*/

use parking_lot::Mutex;
use std::sync::Arc;
use swarm_monitor::notify::{AlertReport, Mailer};
use swarm_monitor::MonitorError;

/// Mock Mailer qui simule swarm_monitor::notify::SmtpMailer
#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<AlertReport>>>,
    attempts: Arc<Mutex<usize>>,
    failing: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mailer dont chaque envoi échoue (relais injoignable)
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Rapports envoyés avec succès (pour assertions de tests)
    pub fn sent_reports(&self) -> Vec<AlertReport> {
        self.sent.lock().clone()
    }

    /// Dernier rapport envoyé
    pub fn last_report(&self) -> Option<AlertReport> {
        self.sent.lock().last().cloned()
    }

    /// Nombre de tentatives, échecs compris
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Reset des envois enregistrés
    pub fn clear(&self) {
        self.sent.lock().clear();
        *self.attempts.lock() = 0;
    }
}

impl Mailer for MockMailer {
    async fn send(&self, report: &AlertReport) -> Result<(), MonitorError> {
        *self.attempts.lock() += 1;

        if self.failing {
            log::warn!("📪 [MOCK] SMTP relay down, dropping '{}'", report.subject);
            return Err(MonitorError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock SMTP relay unreachable",
            )));
        }

        self.sent.lock().push(report.clone());
        log::info!("📧 [MOCK] Sent '{}'", report.subject);
        Ok(())
    }
}
