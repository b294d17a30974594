//! Configuration management
//!
//! Settings live in `<data dir>/settings.json`:
//! ```json
//! {
//!   "database": "/home/me/.bankline/bank.duckdb",
//!   "retry": { "maxAttempts": 10, "initialBackoffMs": 50, "maxBackoffMs": 1000 },
//!   "transferAmount": 100,
//!   "seedRows": 5,
//!   "log": { "level": "info", "json": false }
//! }
//! ```
//! Every field is optional. Environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::services::RetryPolicy;

const SETTINGS_FILE: &str = "settings.json";

/// Retry settings as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub max_elapsed_ms: Option<u64>,
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            max_elapsed_ms: None,
            jitter: policy.jitter,
        }
    }
}

impl RetrySettings {
    /// Convert to a validated retry policy
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let policy = RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_elapsed: self.max_elapsed_ms.map(Duration::from_millis),
            jitter: self.jitter,
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Bankline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Database file; `None` means "ask, or use the default location"
    pub database: Option<PathBuf>,
    pub retry: RetrySettings,
    /// Amount moved by the demo transfer, also the seed balance floor
    pub transfer_amount: i64,
    /// Accounts created by the demo
    pub seed_rows: usize,
    pub log: LogSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            retry: RetrySettings::default(),
            transfer_amount: 100,
            seed_rows: 5,
            log: LogSettings::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Overrides, in order of precedence:
    /// 1. Environment variables (BANKLINE_DB, BANKLINE_MAX_ATTEMPTS, BANKLINE_LOG_JSON)
    /// 2. settings.json
    /// 3. Built-in defaults
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut config = Self::read(data_dir)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read settings.json alone, without environment overrides
    pub fn read(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);
        if !settings_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&settings_path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("invalid {}: {}", settings_path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup("BANKLINE_DB").filter(|v| !v.trim().is_empty()) {
            self.database = Some(PathBuf::from(db));
        }

        if let Some(attempts) = lookup("BANKLINE_MAX_ATTEMPTS") {
            self.retry.max_attempts = attempts.trim().parse().map_err(|_| {
                Error::config(format!("BANKLINE_MAX_ATTEMPTS is not a number: {}", attempts))
            })?;
        }

        match lookup("BANKLINE_LOG_JSON").as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => self.log.json = true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => self.log.json = false,
            _ => {}
        }

        Ok(())
    }

    /// Save config to the data directory
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Validated retry policy for this configuration
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry.to_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let mut config: Config = serde_json::from_str("{}").unwrap();
        config.apply_env(env(&[])).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.transfer_amount, 100);
        assert_eq!(config.seed_rows, 5);
        assert!(config.retry_policy().is_ok());
        assert!(!dir.path().join(SETTINGS_FILE).exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.database = Some(dir.path().join("bank.duckdb"));
        config.retry.max_attempts = 3;
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(content.contains("\"maxAttempts\": 3"));

        let loaded = Config::read(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_read_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::read(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "retry": { "maxAttempts": 2 }, "seedRows": 9 }"#).unwrap();

        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.initial_backoff_ms, 50);
        assert_eq!(config.seed_rows, 9);
        assert_eq!(config.transfer_amount, 100);
    }

    #[test]
    fn test_invalid_settings_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert!(matches!(Config::read(dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("BANKLINE_DB", "/tmp/other.duckdb"),
                ("BANKLINE_MAX_ATTEMPTS", "7"),
                ("BANKLINE_LOG_JSON", "yes"),
            ]))
            .unwrap();

        assert_eq!(config.database, Some(PathBuf::from("/tmp/other.duckdb")));
        assert_eq!(config.retry.max_attempts, 7);
        assert!(config.log.json);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[("BANKLINE_MAX_ATTEMPTS", "many")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_retry_settings_rejected() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.retry_policy(), Err(Error::Config(_))));

        config.retry.max_attempts = 3;
        config.retry.initial_backoff_ms = 0;
        assert!(config.retry_policy().is_err());
    }
}
