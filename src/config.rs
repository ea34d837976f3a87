use anyhow::{Context, Result, ensure};
use std::path::PathBuf;
use std::time::Duration;

use crate::infra::canvas::DEFAULT_CANVAS_BASE_URL;
use crate::infra::proxy::DEFAULT_PROXY_URL;

pub const DEFAULT_SESSION_PATH: &str = ".gradebook/session.json";
pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/gradebook_analytics.log";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env`, once loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root of the REST proxy, `GRADEBOOK_API_URL`.
    pub api_base_url: String,
    /// Canvas host used by the direct backend, `CANVAS_BASE_URL`.
    pub canvas_base_url: String,
    pub session_path: PathBuf,
    pub export_dir: PathBuf,
    pub http_timeout: Duration,
    pub log_file_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_PROXY_URL.to_string(),
            canvas_base_url: DEFAULT_CANVAS_BASE_URL.to_string(),
            session_path: PathBuf::from(DEFAULT_SESSION_PATH),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_file_path: PathBuf::from(DEFAULT_LOG_FILE_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset or blank keys
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = get("GRADEBOOK_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = get("CANVAS_BASE_URL") {
            config.canvas_base_url = url;
        }
        if let Some(path) = get("GRADEBOOK_SESSION_PATH") {
            config.session_path = PathBuf::from(path);
        }
        if let Some(dir) = get("GRADEBOOK_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("GRADEBOOK_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().with_context(|| {
                format!("GRADEBOOK_HTTP_TIMEOUT_SECS must be whole seconds, got {secs:?}")
            })?;
            ensure!(secs > 0, "GRADEBOOK_HTTP_TIMEOUT_SECS must be at least 1 second");
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("LOG_FILE_PATH") {
            config.log_file_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api_base_url, "http://localhost:8765/api");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GRADEBOOK_API_URL", "https://dash.example.edu/api"),
            ("CANVAS_BASE_URL", "https://canvas.example.edu"),
            ("GRADEBOOK_EXPORT_DIR", "/tmp/out"),
            ("GRADEBOOK_HTTP_TIMEOUT_SECS", " 5 "),
            ("LOG_FILE_PATH", ""),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "https://dash.example.edu/api");
        assert_eq!(config.canvas_base_url, "https://canvas.example.edu");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.log_file_path, PathBuf::from(DEFAULT_LOG_FILE_PATH));
    }

    #[test]
    fn test_bad_timeout_is_an_error() {
        let err = config_from(&[("GRADEBOOK_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("GRADEBOOK_HTTP_TIMEOUT_SECS"));
    }

    #[test]
    fn test_zero_timeout_is_an_error() {
        let err = config_from(&[("GRADEBOOK_HTTP_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("at least 1 second"));
    }
}
