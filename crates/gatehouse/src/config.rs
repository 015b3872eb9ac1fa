//! Application configuration.
//!
//! One JSON document covers every layer:
//!
//! ```json
//! {
//!   "session": { "token_key": "token" },
//!   "guard":   { "login_path": "/login", "landing_path": "/dashboard" },
//!   "log":     { "filter": "info", "format": "compact" }
//! }
//! ```
//!
//! Every key is optional. Environment variables override the file:
//! `GATEHOUSE_TOKEN_KEY`, `GATEHOUSE_LOGIN_PATH`, `GATEHOUSE_LANDING_PATH`,
//! `GATEHOUSE_LOG`.

use std::path::Path;

use gatehouse_guard::GuardConfig;
use gatehouse_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const ENV_TOKEN_KEY: &str = "GATEHOUSE_TOKEN_KEY";
pub const ENV_LOGIN_PATH: &str = "GATEHOUSE_LOGIN_PATH";
pub const ENV_LANDING_PATH: &str = "GATEHOUSE_LANDING_PATH";
pub const ENV_LOG: &str = "GATEHOUSE_LOG";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Logging configuration. `RUST_LOG`, when set, wins over `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// An `EnvFilter` directive, e.g. `"info,gatehouse_session=debug"`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Configuration for a whole client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub guard: GuardConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the JSON file at `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Self::from_json_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies the `GATEHOUSE_*` environment variables.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a `GATEHOUSE_*` variable
    /// name to its value. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(key) = get(ENV_TOKEN_KEY) {
            self.session.token_key = key;
        }
        if let Some(path) = get(ENV_LOGIN_PATH) {
            self.guard.login_path = path;
        }
        if let Some(path) = get(ENV_LANDING_PATH) {
            self.guard.landing_path = path;
        }
        if let Some(filter) = get(ENV_LOG) {
            self.log.filter = filter;
        }
        self
    }

    /// Rejects values no client can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.token_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "session.token_key",
                reason: "must not be empty".into(),
            });
        }
        for (field, path) in [
            ("guard.login_path", &self.guard.login_path),
            ("guard.landing_path", &self.guard.landing_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{path:?} must start with '/'"),
                });
            }
        }
        if self.guard.login_path == self.guard.landing_path {
            return Err(ConfigError::Invalid {
                field: "guard.landing_path",
                reason: "must differ from guard.login_path".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.session.token_key, "token");
        assert_eq!(config.guard.login_path, "/login");
        assert_eq!(config.guard.landing_path, "/dashboard");
        assert_eq!(config.log.filter, "info");
        assert_eq!(config.log.format, LogFormat::Compact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_str_empty_object_is_default() {
        assert_eq!(AppConfig::from_json_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_from_json_str_partial_sections_keep_defaults() {
        let config = AppConfig::from_json_str(
            r#"{ "guard": { "landing_path": "/home" }, "log": { "format": "pretty" } }"#,
        )
        .unwrap();
        assert_eq!(config.guard.landing_path, "/home");
        assert_eq!(config.guard.login_path, "/login");
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_from_json_str_malformed_is_parse_error() {
        let err = AppConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_json_str_relative_path_is_invalid() {
        let err = AppConfig::from_json_str(r#"{ "guard": { "login_path": "login" } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "guard.login_path", .. }
        ));
    }

    #[test]
    fn test_validate_empty_token_key_is_invalid() {
        let mut config = AppConfig::default();
        config.session.token_key = "  ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "session.token_key", .. })
        ));
    }

    #[test]
    fn test_validate_same_login_and_landing_is_invalid() {
        let mut config = AppConfig::default();
        config.guard.landing_path = "/login".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join(format!(
            "gatehouse-config-missing-{}.json",
            std::process::id()
        ));
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "gatehouse-config-load-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "session": { "token_key": "auth" } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.session.token_key, "auth");
    }

    #[test]
    fn test_with_overrides_applies_each_variable() {
        let config = AppConfig::default().with_overrides(env(&[
            (ENV_TOKEN_KEY, "jwt"),
            (ENV_LOGIN_PATH, "/signin"),
            (ENV_LANDING_PATH, "/home"),
            (ENV_LOG, "debug"),
        ]));
        assert_eq!(config.session.token_key, "jwt");
        assert_eq!(config.guard.login_path, "/signin");
        assert_eq!(config.guard.landing_path, "/home");
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn test_with_overrides_ignores_empty_and_missing() {
        let config = AppConfig::default().with_overrides(env(&[(ENV_TOKEN_KEY, "")]));
        assert_eq!(config, AppConfig::default());
    }
}
