//! Alert trigger policy
//!
//! Two independent reasons, both reported when both hold:
//! - at least one worker is offline
//! - fewer workers online than the configured threshold

use crate::classifier::Classification;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertReason {
    OfflineWorkers { count: usize },
    BelowThreshold { active: usize, threshold: u32 },
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertReason::OfflineWorkers { count } => write!(f, "{count} worker(s) offline"),
            AlertReason::BelowThreshold { active, threshold } => {
                write!(f, "only {active} active worker(s), minimum is {threshold}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertDecision {
    reasons: Vec<AlertReason>,
}

impl AlertDecision {
    pub fn fires(&self) -> bool {
        !self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[AlertReason] {
        &self.reasons
    }

    pub fn has_offline(&self) -> bool {
        self.reasons
            .iter()
            .any(|r| matches!(r, AlertReason::OfflineWorkers { .. }))
    }

    pub fn below_threshold(&self) -> bool {
        self.reasons
            .iter()
            .any(|r| matches!(r, AlertReason::BelowThreshold { .. }))
    }
}

/// Decide whether this snapshot warrants an alert
pub fn evaluate(result: &Classification, threshold: Option<u32>) -> AlertDecision {
    let mut reasons = Vec::new();

    if !result.offline.is_empty() {
        reasons.push(AlertReason::OfflineWorkers { count: result.offline_count() });
    }

    if let Some(threshold) = threshold {
        let active = result.active_count();
        if active < threshold as usize {
            reasons.push(AlertReason::BelowThreshold { active, threshold });
        }
    }

    AlertDecision { reasons }
}
