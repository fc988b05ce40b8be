//! Configuration management for weatherboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherboardError;
use crate::models::PresetLocation;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherboardConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Forecast store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Dashboard server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the Open-Meteo API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Total request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Connect timeout in milliseconds
    #[serde(default = "default_weather_connect_timeout")]
    pub connect_timeout_ms: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Base delay of the exponential backoff in milliseconds
    #[serde(default = "default_weather_retry_backoff")]
    pub retry_backoff_ms: u32,
    /// Number of forecast days requested
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Upper bound on one refresh including all retries, in seconds.
    /// Must stay below `server.request_timeout_seconds`.
    #[serde(default = "default_fetch_deadline")]
    pub fetch_deadline_seconds: u32,
}

/// Forecast store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory of the embedded database
    #[serde(default = "default_store_path")]
    pub path: String,
}

/// Dashboard server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Location shown when the dashboard opens
    #[serde(default = "default_location")]
    pub location: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_weather_connect_timeout() -> u32 {
    1000
}

fn default_weather_max_retries() -> u32 {
    5
}

fn default_weather_retry_backoff() -> u32 {
    200
}

fn default_forecast_days() -> u32 {
    7
}

fn default_fetch_deadline() -> u32 {
    20
}

fn default_store_path() -> String {
    "weather_data".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_request_timeout() -> u32 {
    30
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_location() -> String {
    "london".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            connect_timeout_ms: default_weather_connect_timeout(),
            max_retries: default_weather_max_retries(),
            retry_backoff_ms: default_weather_retry_backoff(),
            forecast_days: default_forecast_days(),
            fetch_deadline_seconds: default_fetch_deadline(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
        }
    }
}

impl WeatherboardConfig {
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

        // WEATHERBOARD_SERVER__PORT=8080 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("WEATHERBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherboardConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weatherboard").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.connect_timeout_ms == 0 {
            self.weather.connect_timeout_ms = default_weather_connect_timeout();
        }
        if self.weather.forecast_days == 0 {
            self.weather.forecast_days = default_forecast_days();
        }
        if self.weather.fetch_deadline_seconds == 0 {
            self.weather.fetch_deadline_seconds = default_fetch_deadline();
        }
        if self.store.path.is_empty() {
            self.store.path = default_store_path();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.location.is_empty() {
            self.defaults.location = default_location();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// The preset opened by default
    pub fn default_location(&self) -> Result<PresetLocation> {
        Ok(self.defaults.location.parse::<PresetLocation>()?)
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                WeatherboardError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.weather.max_retries > 10 {
            return Err(WeatherboardError::config("Weather API max retries cannot exceed 10").into());
        }

        if !(1..=7).contains(&self.weather.forecast_days) {
            return Err(
                WeatherboardError::config("Forecast days must be between 1 and 7").into(),
            );
        }

        if self.weather.fetch_deadline_seconds >= self.server.request_timeout_seconds {
            return Err(WeatherboardError::config(format!(
                "Fetch deadline ({}s) must be shorter than the request timeout ({}s)",
                self.weather.fetch_deadline_seconds, self.server.request_timeout_seconds
            ))
            .into());
        }

        if self.server.port == 0 {
            return Err(WeatherboardError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherboardError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherboardError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(WeatherboardError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.defaults.location.parse::<PresetLocation>().is_err() {
            return Err(WeatherboardError::config(format!(
                "Unknown default location '{}'",
                self.defaults.location
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WeatherboardConfig::default();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.max_retries, 5);
        assert_eq!(config.weather.forecast_days, 7);
        assert_eq!(config.weather.fetch_deadline_seconds, 20);
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.default_location().unwrap(), PresetLocation::London);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherboardConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherboardConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_forecast_days() {
        let mut config = WeatherboardConfig::default();
        config.weather.forecast_days = 14;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Forecast days"));
    }

    #[test]
    fn test_config_validation_fetch_deadline_below_request_timeout() {
        let mut config = WeatherboardConfig::default();
        assert!(config.weather.fetch_deadline_seconds < config.server.request_timeout_seconds);

        config.weather.fetch_deadline_seconds = config.server.request_timeout_seconds;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Fetch deadline"));
    }

    #[test]
    fn test_config_validation_unknown_location() {
        let mut config = WeatherboardConfig::default();
        config.defaults.location = "atlantis".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("atlantis"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = WeatherboardConfig::default();
        config.weather.base_url.clear();
        config.weather.forecast_days = 0;
        config.defaults.location.clear();
        config.apply_defaults();
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.forecast_days, 7);
        assert_eq!(config.defaults.location, "london");
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[defaults]\nlocation = \"vienna\"\n\n[weather]\nmax_retries = 2"
        )
        .unwrap();

        let config = WeatherboardConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.weather.max_retries, 2);
        assert_eq!(config.default_location().unwrap(), PresetLocation::Vienna);
        assert_eq!(config.store.path, "weather_data");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();

        let result = WeatherboardConfig::load_from_path(Some(file.path().to_path_buf()));
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherboardConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weatherboard"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
