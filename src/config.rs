//! Configuration management for the `trekplan` service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::TrekPlanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Environment variable consulted when no completion key is configured
pub const FALLBACK_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Root configuration structure for the `trekplan` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrekPlanConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Completion provider configuration
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Trip planner behaviour
    #[serde(default)]
    pub planner: PlannerConfig,
    /// External trek/blog catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body in KiB
    pub body_limit_kb: usize,
    /// Directory with a built frontend, served for unmatched paths
    pub static_dir: Option<PathBuf>,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
}

/// Chat-completion provider settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Label used in log lines and relayed error messages
    pub provider_name: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Bearer credential, never logged
    pub api_key: Option<String>,
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound for a single completion call
    pub timeout_seconds: u32,
}

/// How inbound trip requests are checked before reaching the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Reject malformed requests with a 400
    #[default]
    Strict,
    /// Coerce every field and always call the provider
    Lenient,
}

/// Trip planner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub validation: ValidationMode,
    /// Longest trip accepted in strict mode
    pub max_trip_days: u32,
    /// Currency symbol printed in front of the budget
    pub currency_symbol: String,
}

/// External catalog settings used by the featured endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the trek/blog backend. Featured endpoints are disabled without it.
    pub base_url: Option<String>,
    pub timeout_seconds: u32,
    /// Retries for transient upstream failures
    pub max_retries: u32,
    /// Lifetime of cached listings
    pub cache_ttl_seconds: u64,
    /// Location of the persistent listing cache. No caching when unset.
    pub cache_path: Option<PathBuf>,
    /// Number of items returned when the caller gives no limit
    pub featured_limit: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint for span export
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit_kb() -> usize {
    64
}

fn default_provider_name() -> String {
    "Groq".to_string()
}

fn default_completion_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_completion_timeout() -> u32 {
    60
}

fn default_max_trip_days() -> u32 {
    60
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_catalog_timeout() -> u32 {
    10
}

fn default_catalog_max_retries() -> u32 {
    2
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_featured_limit() -> usize {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_kb: default_body_limit_kb(),
            static_dir: None,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_completion_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: default_completion_timeout(),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider_name", &self.provider_name)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl CompletionConfig {
    /// The configured credential, or a configuration error when it is missing
    pub fn api_key(&self) -> std::result::Result<&str, TrekPlanError> {
        self.api_key.as_deref().ok_or_else(|| {
            TrekPlanError::config(format!(
                "No completion API key configured. Set completion.api_key, \
                 TREKPLAN_COMPLETION__API_KEY or {FALLBACK_API_KEY_VAR}."
            ))
        })
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::default(),
            max_trip_days: default_max_trip_days(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_catalog_timeout(),
            max_retries: default_catalog_max_retries(),
            cache_ttl_seconds: default_cache_ttl(),
            cache_path: None,
            featured_limit: default_featured_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl TrekPlanConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TREKPLAN_COMPLETION__API_KEY -> completion.api_key
        builder = builder.add_source(
            Environment::with_prefix("TREKPLAN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TrekPlanConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.completion.api_key.is_none() {
            config.completion.api_key = std::env::var(FALLBACK_API_KEY_VAR)
                .ok()
                .filter(|key| !key.trim().is_empty());
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trekplan").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.body_limit_kb == 0 {
            self.server.body_limit_kb = default_body_limit_kb();
        }
        if self.completion.provider_name.is_empty() {
            self.completion.provider_name = default_provider_name();
        }
        if self.completion.base_url.is_empty() {
            self.completion.base_url = default_completion_base_url();
        }
        if self.completion.model.is_empty() {
            self.completion.model = default_model();
        }
        if self.completion.timeout_seconds == 0 {
            self.completion.timeout_seconds = default_completion_timeout();
        }
        if self.planner.max_trip_days == 0 {
            self.planner.max_trip_days = default_max_trip_days();
        }
        if self.catalog.timeout_seconds == 0 {
            self.catalog.timeout_seconds = default_catalog_timeout();
        }
        if self.catalog.featured_limit == 0 {
            self.catalog.featured_limit = default_featured_limit();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the completion credential if one is present
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.completion.api_key {
            if api_key.trim().is_empty() {
                return Err(TrekPlanError::config(
                    "Completion API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }

            if api_key.len() < 8 {
                return Err(TrekPlanError::config(
                    "Completion API key appears to be invalid (too short). Please check your API key."
                ).into());
            }

            if api_key.len() > 200 {
                return Err(TrekPlanError::config(
                    "Completion API key appears to be invalid (too long). Please check your API key."
                ).into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.completion.timeout_seconds > 300 {
            return Err(TrekPlanError::config(
                "Completion timeout cannot exceed 300 seconds"
            ).into());
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(TrekPlanError::config(
                "Completion temperature must be between 0.0 and 2.0"
            ).into());
        }

        if self.planner.max_trip_days > 365 {
            return Err(TrekPlanError::config(
                "Maximum trip length cannot exceed 365 days"
            ).into());
        }

        if self.catalog.timeout_seconds > 300 {
            return Err(TrekPlanError::config(
                "Catalog timeout cannot exceed 300 seconds"
            ).into());
        }

        if self.catalog.max_retries > 10 {
            return Err(TrekPlanError::config(
                "Catalog max retries cannot exceed 10"
            ).into());
        }

        if self.catalog.featured_limit > 50 {
            return Err(TrekPlanError::config(
                "Featured limit cannot exceed 50"
            ).into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TrekPlanError::config(
                format!("Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_log_levels.join(", ")
                )
            ).into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TrekPlanError::config(
                format!("Invalid log format '{}'. Must be one of: {}",
                    self.logging.format,
                    valid_log_formats.join(", ")
                )
            ).into());
        }

        if !is_http_url(&self.completion.base_url) {
            return Err(TrekPlanError::config(
                "Completion base URL must be a valid HTTP or HTTPS URL"
            ).into());
        }

        if let Some(url) = &self.catalog.base_url {
            if !is_http_url(url) {
                return Err(TrekPlanError::config(
                    "Catalog base URL must be a valid HTTP or HTTPS URL"
                ).into());
            }
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(TrekPlanError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL"
                ).into());
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(TrekPlanError::config(
                "TLS requires both server.tls_cert and server.tls_key"
            ).into());
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TrekPlanConfig::default();
        assert_eq!(config.completion.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.completion.model, "llama3-70b-8192");
        assert_eq!(config.completion.timeout_seconds, 60);
        assert_eq!(config.planner.validation, ValidationMode::Strict);
        assert_eq!(config.planner.currency_symbol, "₹");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 3000);
        assert!(config.completion.api_key.is_none());
        assert!(config.catalog.base_url.is_none());
    }

    #[test]
    fn test_missing_api_key_is_reported_on_use() {
        let config = TrekPlanConfig::default();
        assert!(config.validate().is_ok());
        let err = config.completion.api_key().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = TrekPlanConfig::default();
        config.completion.api_key = Some("short".to_string());
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TrekPlanConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TrekPlanConfig::default();
        config.completion.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = TrekPlanConfig::default();
        config.completion.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_tls_pair() {
        let mut config = TrekPlanConfig::default();
        config.server.tls_cert = Some(PathBuf::from("cert.pem"));
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("tls_key"));
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let mut config = TrekPlanConfig::default();
        config.completion.api_key = Some("gsk_supersecretvalue".to_string());
        let rendered = format!("{:?}", config.completion);
        assert!(!rendered.contains("supersecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[completion]
api_key = "test_key_from_file"
model = "llama-3.3-70b-versatile"

[planner]
validation = "lenient"
"#
        )
        .unwrap();

        let config = TrekPlanConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.completion.model, "llama-3.3-70b-versatile");
        assert_eq!(config.completion.api_key().unwrap(), "test_key_from_file");
        assert_eq!(config.planner.validation, ValidationMode::Lenient);
        // untouched sections keep their defaults
        assert_eq!(config.completion.temperature, 0.7);
        assert_eq!(config.catalog.featured_limit, 6);
    }

    #[test]
    fn test_config_path_generation() {
        let path = TrekPlanConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("trekplan"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
