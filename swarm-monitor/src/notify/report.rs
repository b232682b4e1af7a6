//! Alert message rendering (subject, plain text, HTML)

use crate::classifier::Classification;
use crate::trigger::AlertDecision;
use askama::Template;
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertReport {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl AlertReport {
    pub fn build<Tz>(
        pool_label: &str,
        result: &Classification,
        decision: &AlertDecision,
        at: &DateTime<Tz>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let now = at.format("%Y-%m-%d %H:%M:%S").to_string();
        let subject = if decision.has_offline() {
            format!("{pool_label} – Offline Worker Alert")
        } else {
            format!("{pool_label} – Low Active Worker Alert")
        };

        let mut text = format!("⚠️ {pool_label} alert – {now}\n\n");
        for reason in decision.reasons() {
            text.push_str(&format!("• {reason}\n"));
        }
        if !decision.reasons().is_empty() {
            text.push('\n');
        }
        text.push_str(&format!(
            "Offline workers ({}): {}\n",
            result.offline.len(),
            join_or_none(&result.offline)
        ));
        text.push_str(&format!(
            "Online  workers ({}): {}",
            result.online.len(),
            join_or_none(&result.online)
        ));

        let html = render(AlertHtml {
            label: pool_label,
            now: &now,
            reasons: decision.reasons().iter().map(|r| r.to_string()).collect(),
            offline_count: result.offline.len(),
            offline: join_or_none(&result.offline),
            online_count: result.online.len(),
            online: join_or_none(&result.online),
        });

        Self { subject, text, html }
    }
}

/// HTML alternative of the alert email; askama escapes every field
#[derive(Template)]
#[template(path = "alert.html")]
struct AlertHtml<'a> {
    label: &'a str,
    now: &'a str,
    reasons: Vec<String>,
    offline_count: usize,
    offline: String,
    online_count: usize,
    online: String,
}

fn render<T: Template>(tmpl: T) -> String {
    tmpl.render().unwrap_or_else(|e| {
        tracing::warn!("Alert template failed to render: {e}");
        format!("<pre>Template error: {e}</pre>")
    })
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "None".to_string()
    } else {
        ids.join(", ")
    }
}
