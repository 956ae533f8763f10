//! Configuration management for the gateway.
//!
//! Configuration comes from a JSON file (`~/.whatsapp-gateway/gateway.json` or
//! an explicit path) and falls back to environment variables, with `.env`
//! files honoured through `dotenvy`.

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3100;

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("gateway.json")
}

/// Get the gateway config directory path.
fn config_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".whatsapp-gateway"))
        .unwrap_or_else(|| PathBuf::from(".whatsapp-gateway"))
}

// ============================================================================
// File Format
// ============================================================================

/// JSON configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    webhook_urls: Vec<String>,
    #[serde(default)]
    timeouts: TimeoutsConfig,
}

/// Timeouts, in seconds.
#[derive(Debug, Deserialize)]
struct TimeoutsConfig {
    #[serde(default = "default_fetch_timeout")]
    fetch_seconds: u64,
    #[serde(default = "default_webhook_timeout")]
    webhook_seconds: u64,
    #[serde(default = "default_send_timeout")]
    send_seconds: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            fetch_seconds: default_fetch_timeout(),
            webhook_seconds: default_webhook_timeout(),
            send_seconds: default_send_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_webhook_timeout() -> u64 {
    30
}

fn default_send_timeout() -> u64 {
    60
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Webhook receivers for inbound messages, blanks removed
    pub webhook_urls: Vec<String>,
    /// Timeout for downloading media referenced by send requests
    pub fetch_timeout: Duration,
    /// Timeout for each webhook POST
    pub webhook_timeout: Duration,
    /// Timeout for a single send through the messaging client
    pub send_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            webhook_urls: Vec::new(),
            fetch_timeout: Duration::from_secs(default_fetch_timeout()),
            webhook_timeout: Duration::from_secs(default_webhook_timeout()),
            send_timeout: Duration::from_secs(default_send_timeout()),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to environment variables.
    ///
    /// Search order:
    /// 1. Provided config_path (if any)
    /// 2. `~/.whatsapp-gateway/gateway.json`
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::from_json(&path);
        }

        let default_path = default_config_path();
        if default_path.exists() {
            return Self::from_json(&default_path);
        }

        Self::from_env()
    }

    /// Load configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        Ok(Self {
            host: file.host,
            port: file.port,
            webhook_urls: clean_urls(file.webhook_urls),
            fetch_timeout: Duration::from_secs(file.timeouts.fetch_seconds),
            webhook_timeout: Duration::from_secs(file.timeouts.webhook_seconds),
            send_timeout: Duration::from_secs(file.timeouts.send_seconds),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// `TEST_WEBHOOK_URL` and `PROD_WEBHOOK_URL` are each optional; extra
    /// receivers can be listed comma-separated in `WEBHOOK_URLS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file (silently ignore if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut urls: Vec<String> = ["TEST_WEBHOOK_URL", "PROD_WEBHOOK_URL"]
            .iter()
            .filter_map(|key| lookup(*key))
            .collect();
        if let Some(extra) = lookup("WEBHOOK_URLS") {
            urls.extend(extra.split(',').map(str::to_string));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(default_host),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            webhook_urls: clean_urls(urls),
            fetch_timeout: Duration::from_secs(parse_var(
                &lookup,
                "FETCH_TIMEOUT_SECONDS",
                default_fetch_timeout(),
            )?),
            webhook_timeout: Duration::from_secs(parse_var(
                &lookup,
                "WEBHOOK_TIMEOUT_SECONDS",
                default_webhook_timeout(),
            )?),
            send_timeout: Duration::from_secs(parse_var(
                &lookup,
                "SEND_TIMEOUT_SECONDS",
                default_send_timeout(),
            )?),
        })
    }

    /// Socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a numeric variable, using `default` when unset or blank.
fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: key.to_string(),
                    value,
                })
        }
        _ => Ok(default),
    }
}

/// Trim URLs, drop blanks and duplicates while keeping order.
fn clean_urls(urls: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for url in urls {
        let url = url.trim();
        if !url.is_empty() && !cleaned.iter().any(|u| u == url) {
            cleaned.push(url.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // =========================================================================
    // Environment Tests
    // =========================================================================

    #[test]
    fn test_env_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3100);
        assert!(config.webhook_urls.is_empty());
    }

    #[test]
    fn test_env_both_webhooks() {
        let config = Config::from_lookup(lookup_from(&[
            ("TEST_WEBHOOK_URL", "http://test.local/hook"),
            ("PROD_WEBHOOK_URL", "https://prod.example.com/hook"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(
            config.webhook_urls,
            vec!["http://test.local/hook", "https://prod.example.com/hook"]
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_env_blank_webhook_is_skipped() {
        let config = Config::from_lookup(lookup_from(&[
            ("TEST_WEBHOOK_URL", "  "),
            ("PROD_WEBHOOK_URL", "https://prod.example.com/hook"),
        ]))
        .unwrap();
        assert_eq!(config.webhook_urls, vec!["https://prod.example.com/hook"]);
    }

    #[test]
    fn test_env_extra_webhooks_deduplicated() {
        let config = Config::from_lookup(lookup_from(&[
            ("PROD_WEBHOOK_URL", "https://a/hook"),
            ("WEBHOOK_URLS", "https://a/hook, https://b/hook,,"),
        ]))
        .unwrap();
        assert_eq!(config.webhook_urls, vec!["https://a/hook", "https://b/hook"]);
    }

    #[test]
    fn test_env_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_env_timeouts() {
        let config = Config::from_lookup(lookup_from(&[
            ("SEND_TIMEOUT_SECONDS", "5"),
            ("FETCH_TIMEOUT_SECONDS", "7"),
        ]))
        .unwrap();
        assert_eq!(config.send_timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, Duration::from_secs(7));
        assert_eq!(config.webhook_timeout, Duration::from_secs(30));
    }

    // =========================================================================
    // File Tests
    // =========================================================================

    #[test]
    fn test_json_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("gateway.json");
        fs::write(
            &config_path,
            r#"{
                "port": 4000,
                "webhook_urls": ["https://a/hook", ""],
                "timeouts": { "send_seconds": 10 }
            }"#,
        )
        .unwrap();

        let config = Config::from_json(&config_path).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.webhook_urls, vec!["https://a/hook"]);
        assert_eq!(config.send_timeout, Duration::from_secs(10));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_json_config_invalid() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("gateway.json");
        fs::write(&config_path, r#"{"port": "many"}"#).unwrap();

        let result = Config::from_json(&config_path);
        assert!(matches!(result, Err(ConfigError::InvalidJson(_))));
    }

    #[test]
    fn test_config_file_not_found() {
        let result = Config::from_json(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let result = Config::load(Some(PathBuf::from("/nonexistent/gateway.json")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
