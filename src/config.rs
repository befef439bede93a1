use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the converter client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the converter backend API
    pub base_url: String,

    /// Poll cadence for job status checks, in milliseconds
    pub poll_interval_ms: u64,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file. Missing fields fall back to
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.poll_interval(), Duration::from_millis(1000));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: ClientConfig =
            toml::from_str(r#"base_url = "https://converter.example.com/api""#).unwrap();
        assert_eq!(config.base_url, "https://converter.example.com/api");
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.request_timeout_secs, 30);
    }
}
