//! Alert dispatch: email report and run-log webhook

pub mod email;
pub mod report;
pub mod webhook;

use crate::error::MonitorError;
use std::future::Future;

pub use email::SmtpMailer;
pub use report::AlertReport;
pub use webhook::{WebhookClient, WebhookPayload};

/// Delivers an alert report to humans
pub trait Mailer {
    fn send(&self, report: &AlertReport) -> impl Future<Output = Result<(), MonitorError>> + Send;
}
