//! Configuration loading
//!
//! Sources, later ones overriding earlier ones:
//! - built-in defaults
//! - TOML file (`--config`, `SWARM_MONITOR_CONFIG`, or the OS config dir)
//! - process environment (`.env` is loaded by the binary beforehand)

use crate::error::MonitorError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_THRESHOLD: u32 = 3;
pub const DEFAULT_POOL_LABEL: &str = "Swarm ALPHA";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub pool_url: String,
    /// Name shown in alert subjects and bodies
    pub pool_label: String,
    /// Minimum number of online workers; 0 disables the count trigger
    pub threshold: u32,
    pub webhook_url: Option<String>,
    pub http_timeout_secs: u64,
    pub smtp: SmtpConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub recipients: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pool_url: String::new(),
            pool_label: DEFAULT_POOL_LABEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            webhook_url: None,
            http_timeout_secs: 10,
            smtp: SmtpConfig::default(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "smtp.gmail.com".to_string(),
            port: 587,
            username: None,
            password: None,
            recipients: Vec::new(),
        }
    }
}

// Never print the app password
impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("recipients", &self.recipients)
            .finish()
    }
}

impl MonitorConfig {
    /// Load config from file + process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, MonitorError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::load_with(explicit, &vars)
    }

    /// Same as [`MonitorConfig::load`] with an explicit environment map
    pub fn load_with(explicit: Option<&Path>, vars: &HashMap<String, String>) -> Result<Self, MonitorError> {
        let mut config = match Self::resolve_file(explicit, vars) {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// Get OS-specific config file path
    pub fn default_file_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("swarm-monitor");
        path.push("config.toml");
        Some(path)
    }

    fn resolve_file(explicit: Option<&Path>, vars: &HashMap<String, String>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = lookup(vars, "SWARM_MONITOR_CONFIG") {
            return Some(PathBuf::from(path));
        }
        Self::default_file_path().filter(|p| p.exists())
    }

    /// Override fields from environment values; empty values count as unset
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), MonitorError> {
        if let Some(v) = lookup(vars, "POOL_URL") {
            self.pool_url = v.to_string();
        }
        if let Some(v) = lookup(vars, "POOL_LABEL") {
            self.pool_label = v.to_string();
        }
        if let Some(v) = lookup(vars, "ACTIVE_WORKER_THRESHOLD") {
            self.threshold = parse_threshold(v)?;
        }
        if let Some(v) = lookup(vars, "WEBHOOK_URL") {
            self.webhook_url = Some(v.to_string());
        }
        if let Some(v) = lookup(vars, "HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = v.parse().map_err(|_| MonitorError::InvalidSetting {
                key: "HTTP_TIMEOUT_SECS",
                value: v.to_string(),
            })?;
        }
        if let Some(v) = lookup(vars, "SMTP_SERVER") {
            self.smtp.server = v.to_string();
        }
        if let Some(v) = lookup(vars, "SMTP_PORT") {
            self.smtp.port = v.parse().map_err(|_| MonitorError::InvalidSetting {
                key: "SMTP_PORT",
                value: v.to_string(),
            })?;
        }
        if let Some(v) = lookup(vars, "EMAIL_USER") {
            self.smtp.username = Some(v.to_string());
        }
        if let Some(v) = lookup(vars, "EMAIL_PASS") {
            self.smtp.password = Some(v.to_string());
        }
        if let Some(v) = lookup(vars, "EMAIL_TO") {
            self.smtp.recipients = split_recipients(v);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.pool_url.trim().is_empty() {
            return Err(MonitorError::MissingSetting("POOL_URL"));
        }
        if self.http_timeout_secs == 0 {
            return Err(MonitorError::InvalidSetting {
                key: "HTTP_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Active-worker threshold, `None` when the count trigger is disabled
    pub fn threshold(&self) -> Option<u32> {
        (self.threshold > 0).then_some(self.threshold)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_threshold(raw: &str) -> Result<u32, MonitorError> {
    match raw.to_ascii_lowercase().as_str() {
        "off" | "none" | "disabled" => Ok(0),
        other => other.parse().map_err(|_| MonitorError::InvalidSetting {
            key: "ACTIVE_WORKER_THRESHOLD",
            value: raw.to_string(),
        }),
    }
}

/// Split a comma-separated recipient list
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
