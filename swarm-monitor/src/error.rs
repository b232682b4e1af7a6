//! Error type shared by the monitor's collaborators

/// Failures that end a monitoring run.
///
/// Webhook failures never show up here: they are logged and swallowed
/// by [`crate::notify::webhook::WebhookClient`].
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Pool returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid JSON from pool: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),
    #[error("Invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },
    #[error("Invalid email address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("Failed to build email: {0}")]
    EmailBuild(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
