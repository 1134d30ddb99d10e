//! Serializable fetch configuration.

use crate::data::provider::{DataError, Window};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for the HTTP collaborators (reference pages and pricing API).
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Trailing history window requested per symbol.
    pub window: Window,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Base URL of the chart API (no trailing slash).
    pub chart_base_url: String,

    /// Optional HTTP client timeout. Unset means no timeout is imposed.
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            window: Window::TenYears,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            chart_base_url: "https://query2.finance.yahoo.com".into(),
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        toml::from_str(content).map_err(|e| DataError::Config(format!("parse config TOML: {e}")))
    }

    /// Build a blocking HTTP client honoring the user agent and timeout.
    pub(crate) fn http_client(&self) -> Result<reqwest::blocking::Client, reqwest::Error> {
        let timeout: Option<Duration> = self.timeout_secs.map(Duration::from_secs);
        reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(timeout)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = FetchConfig::from_toml("").unwrap();
        assert_eq!(cfg, FetchConfig::default());
        assert_eq!(cfg.window, Window::TenYears);
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    fn toml_overrides_fields() {
        let cfg = FetchConfig::from_toml(
            r#"
window = "5y"
timeout_secs = 20
chart_base_url = "http://localhost:9999"
"#,
        )
        .unwrap();
        assert_eq!(cfg.window, Window::FiveYears);
        assert_eq!(cfg.timeout_secs, Some(20));
        assert_eq!(cfg.chart_base_url, "http://localhost:9999");
    }

    #[test]
    fn bad_window_is_config_error() {
        let err = FetchConfig::from_toml(r#"window = "7y""#).unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }
}
