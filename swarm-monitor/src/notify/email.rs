//! SMTP delivery of alert reports (STARTTLS relay + login)

use super::{AlertReport, Mailer};
use crate::config::SmtpConfig;
use crate::error::MonitorError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the MIME message; credentials are checked here, not at startup
    pub fn build_message(&self, report: &AlertReport) -> Result<Message, MonitorError> {
        let username = self
            .config
            .username
            .as_deref()
            .ok_or(MonitorError::MissingSetting("EMAIL_USER"))?;
        if self.config.recipients.is_empty() {
            return Err(MonitorError::MissingSetting("EMAIL_TO"));
        }

        let mut builder = Message::builder()
            .from(parse_mailbox(username)?)
            .subject(report.subject.clone());
        for recipient in &self.config.recipients {
            builder = builder.to(parse_mailbox(recipient)?);
        }

        let body = MultiPart::alternative_plain_html(report.text.clone(), report.html.clone());
        Ok(builder.multipart(body)?)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MonitorError> {
        let username = self
            .config
            .username
            .clone()
            .ok_or(MonitorError::MissingSetting("EMAIL_USER"))?;
        let password = self
            .config
            .password
            .clone()
            .ok_or(MonitorError::MissingSetting("EMAIL_PASS"))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(self.timeout))
            .build();
        Ok(transport)
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, report: &AlertReport) -> Result<(), MonitorError> {
        let message = self.build_message(report)?;
        let transport = self.transport()?;

        transport.send(message).await?;
        info!(
            "Alert email sent to {} recipient(s) via {}:{}",
            self.config.recipients.len(),
            self.config.server,
            self.config.port
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MonitorError> {
    address.parse().map_err(|source| MonitorError::Address {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> AlertReport {
        AlertReport {
            subject: "Swarm ALPHA – Offline Worker Alert".into(),
            text: "Offline workers (1): rig2".into(),
            html: "<p>Offline workers (1): rig2</p>".into(),
        }
    }

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            username: Some("ops@example.com".into()),
            password: Some("app-password".into()),
            recipients: vec!["a@example.com".into(), "b@example.com".into()],
            ..SmtpConfig::default()
        }
    }

    #[test]
    fn test_message_addresses_every_recipient() {
        let message = SmtpMailer::new(smtp()).build_message(&report()).unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 2);
        assert_eq!(envelope.from().map(|a| a.to_string()).as_deref(), Some("ops@example.com"));

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_missing_sender_fails_at_send_time() {
        let mut config = smtp();
        config.username = None;
        let err = SmtpMailer::new(config).build_message(&report()).unwrap_err();
        assert!(matches!(err, MonitorError::MissingSetting("EMAIL_USER")));
    }

    #[test]
    fn test_missing_recipients() {
        let mut config = smtp();
        config.recipients.clear();
        let err = SmtpMailer::new(config).build_message(&report()).unwrap_err();
        assert!(matches!(err, MonitorError::MissingSetting("EMAIL_TO")));
    }

    #[test]
    fn test_invalid_recipient() {
        let mut config = smtp();
        config.recipients.push("not-an-address".into());
        let err = SmtpMailer::new(config).build_message(&report()).unwrap_err();
        assert!(matches!(err, MonitorError::Address { ref address, .. } if address == "not-an-address"));
    }

    #[tokio::test]
    async fn test_missing_password_is_a_send_error() {
        let mut config = smtp();
        config.password = None;
        let err = SmtpMailer::new(config).send(&report()).await.unwrap_err();
        assert!(matches!(err, MonitorError::MissingSetting("EMAIL_PASS")));
    }
}
