//! Application configuration.
//!
//! This module provides configuration management for the booking assistant,
//! including server settings, calendar credentials, model settings, and the
//! date assumptions injected into tool descriptions.
//!
//! Secrets (calendar token, model API key) are normally supplied through the
//! environment rather than the config file; [`AppConfig::apply_env`] folds
//! them in after loading.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable holding the calendar API bearer token.
pub const ENV_CALENDAR_TOKEN: &str = "CALENDAR_API_TOKEN";

/// Environment variable holding the model provider API key.
pub const ENV_LLM_API_KEY: &str = "OPENAI_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote calendar configuration
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Language-model provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Date assumptions for underspecified user requests
    #[serde(default)]
    pub assume: DateAssumptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

/// Remote calendar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the calendar REST API
    #[serde(default = "default_calendar_api_base")]
    pub api_base: String,

    /// Calendar identifier events are booked against
    #[serde(default)]
    pub calendar_id: String,

    /// Default timezone for all operations (IANA name)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Bearer token; usually injected from CALENDAR_API_TOKEN
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
}

/// Language-model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; usually injected from OPENAI_API_KEY
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Maximum reason/invoke iterations per chat turn
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

/// Year/month assumed when the user leaves them unspecified.
///
/// These feed the tool descriptions so the model resolves "the 15th at 3pm"
/// against a known year and month instead of guessing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateAssumptions {
    /// Assumed current year
    #[serde(default = "default_year")]
    pub year: i32,

    /// Assumed current month (1-12)
    #[serde(default = "default_month")]
    pub month: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_calendar_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_llm_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_iterations() -> usize {
    10
}

fn default_year() -> i32 {
    2025
}

fn default_month() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            calendar: CalendarConfig::default(),
            llm: LlmConfig::default(),
            assume: DateAssumptions::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            api_base: default_calendar_api_base(),
            calendar_id: String::new(),
            timezone: default_timezone(),
            api_token: String::new(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_model(),
            api_key: String::new(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for DateAssumptions {
    fn default() -> Self {
        Self {
            year: default_year(),
            month: default_month(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        serde_json::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Fold secrets from the environment into the configuration.
    ///
    /// Environment values win over the config file so tokens never need to
    /// live on disk.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(ENV_CALENDAR_TOKEN) {
            self.calendar.api_token = token;
        }
        if let Ok(key) = std::env::var(ENV_LLM_API_KEY) {
            self.llm.api_key = key;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Note: port 0 is valid - it means "let the OS assign a port"

        if self.calendar.calendar_id.is_empty() {
            return Err(ConfigError::MissingRequired(
                "calendar.calendar_id".to_string(),
            ));
        }

        if self.calendar.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidValue {
                key: "calendar.timezone".to_string(),
                reason: format!("'{}' is not a known IANA timezone", self.calendar.timezone),
            });
        }

        if self.assume.month < 1 || self.assume.month > 12 {
            return Err(ConfigError::InvalidValue {
                key: "assume.month".to_string(),
                reason: "Month must be between 1 and 12".to_string(),
            });
        }

        if self.llm.max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "llm.max_iterations".to_string(),
                reason: "At least one reasoning iteration is required".to_string(),
            });
        }

        Ok(())
    }

    /// Parsed default timezone.
    ///
    /// Call [`AppConfig::validate`] first; an unknown zone falls back to UTC
    /// here rather than failing twice.
    pub fn timezone(&self) -> chrono_tz::Tz {
        self.calendar.timezone.parse().unwrap_or(chrono_tz::Tz::UTC)
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Create a configuration for testing.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // OS will assign a port
                cors_enabled: true,
            },
            calendar: CalendarConfig {
                calendar_id: "primary".to_string(),
                api_token: "test-token".to_string(),
                ..CalendarConfig::default()
            },
            llm: LlmConfig {
                api_key: "test-key".to_string(),
                ..LlmConfig::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.calendar.timezone, "Asia/Kolkata");
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::for_testing();
        assert!(config.validate().is_ok());

        config.calendar.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        config = AppConfig::for_testing();
        config.assume.month = 13;
        assert!(config.validate().is_err());

        config = AppConfig::for_testing();
        config.calendar.calendar_id.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        assert_eq!(config.server_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = AppConfig::for_testing();
        config.save(&path).unwrap();

        let restored = AppConfig::load(&path).unwrap();
        assert_eq!(config.server.port, restored.server.port);
        assert_eq!(config.calendar.calendar_id, restored.calendar.calendar_id);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_timezone_parse() {
        let config = AppConfig::for_testing();
        assert_eq!(config.timezone(), chrono_tz::Asia::Kolkata);
    }
}
