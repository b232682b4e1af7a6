//! Swarm Monitor - mining pool worker-liveness monitor
//!
//! One run:
//! - fetches the pool's JSON status document
//! - classifies workers online/offline from their hashrate
//! - emails an alert when workers are offline or too few are active
//! - posts a best-effort JSON record to an optional webhook

pub mod classifier;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod pool;
pub mod trigger;

pub use classifier::{classify, Classification, WorkerStatus};
pub use config::{MonitorConfig, SmtpConfig};
pub use error::MonitorError;
pub use monitor::{Monitor, RunSummary};
pub use trigger::{evaluate, AlertDecision, AlertReason};
