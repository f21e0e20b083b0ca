//! Client configuration
//!
//! ```toml
//! default_index = "orders"
//! refresh = "wait_for"
//! error_trace = true
//! track_total_hits = true
//! ```

use anyhow::{Context, Result};
use quarry::bulk::Refresh;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Index used by searches without target indices and bulk requests
    /// without a default index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_index: Option<String>,

    /// Refresh policy for bulk requests that do not set one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<Refresh>,

    /// Ask the store for stack traces in error responses
    #[serde(default = "default_error_trace")]
    pub error_trace: bool,

    /// `track_total_hits` for searches that do not set it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,
}

fn default_error_trace() -> bool {
    false
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_index: None,
            refresh: None,
            error_trace: default_error_trace(),
            track_total_hits: None,
        }
    }
}

impl ClientConfig {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read client config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid client config {}", path.display()))
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert!(config.default_index.is_none());
        assert!(config.refresh.is_none());
        assert!(!config.error_trace);
        assert_eq!(ClientConfig::from_toml_str("").unwrap(), config);
    }

    #[test]
    fn test_parse_all_fields() {
        let config = ClientConfig::from_toml_str(
            r#"
default_index = "orders"
refresh = "wait_for"
error_trace = true
track_total_hits = false
"#,
        )
        .unwrap();
        assert_eq!(config.default_index.as_deref(), Some("orders"));
        assert_eq!(config.refresh, Some(Refresh::WaitFor));
        assert!(config.error_trace);
        assert_eq!(config.track_total_hits, Some(false));
    }

    #[test]
    fn test_unknown_refresh_policy_is_rejected() {
        assert!(ClientConfig::from_toml_str(r#"refresh = "sometimes""#).is_err());
    }
}
