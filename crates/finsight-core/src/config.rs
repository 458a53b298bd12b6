//! Client configuration
//!
//! Resolution order, lowest to highest priority:
//! 1. Built-in defaults (`http://localhost:8000`, session under the data dir)
//! 2. Optional TOML file (`~/.local/share/finsight/config.toml`)
//! 3. Environment (`FINSIGHT_API_URL`)
//! 4. Explicit overrides from the caller (CLI flags)
//!
//! ```toml
//! api_url = "https://finance.example.com"
//! session_file = "/home/me/.finsight-session.json"
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default finance API address
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the API address
pub const API_URL_ENV: &str = "FINSIGHT_API_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base address prefixed to every request path
    pub api_url: String,
    /// Where the session token is persisted
    pub session_file: PathBuf,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_path(),
            timeout: None,
        }
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Load defaults, the config file (if present) and the environment
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from a specific TOML file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        parse_config(&content)
    }

    /// Apply `FINSIGHT_API_URL` if set and non-empty
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Directory holding the session file and config
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finsight")
}

/// Default session file location
pub fn default_session_path() -> PathBuf {
    data_dir().join("session.json")
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config.toml"))
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ClientConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ClientConfig::default();

    if let Some(url) = raw.api_url.filter(|u| !u.trim().is_empty()) {
        config.api_url = url.trim().to_string();
    }
    if let Some(path) = raw.session_file {
        config.session_file = path;
    }
    if let Some(secs) = raw.timeout_secs {
        if secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }
        config.timeout = Some(Duration::from_secs(secs));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.session_file.ends_with("session.json"));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            api_url = "https://finance.example.com/"
            session_file = "/tmp/finsight-session.json"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.api_url, "https://finance.example.com/");
        assert_eq!(config.session_file, PathBuf::from("/tmp/finsight-session.json"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_empty_config_keeps_defaults() {
        assert_eq!(parse_config("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(matches!(parse_config("api_url = "), Err(Error::Config(_))));
        assert!(matches!(parse_config("unknown = 1"), Err(Error::Config(_))));
        assert!(matches!(parse_config("timeout_secs = 0"), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = \"http://10.0.0.2:9000\"\n").unwrap();
        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2:9000");

        assert!(ClientConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::default()
            .with_api_url("http://api.local")
            .with_session_file("/tmp/s.json")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.api_url, "http://api.local");
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
