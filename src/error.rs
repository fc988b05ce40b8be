//! Error types and handling for `weatherboard`

use thiserror::Error;

/// Main error type for the weatherboard library
#[derive(Error, Debug)]
pub enum WeatherboardError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather API communication or response errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Forecast store errors
    #[error("Store error: {message}")]
    Store { message: String },

    /// Nothing stored for the requested location or day
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl WeatherboardError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherboardError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            WeatherboardError::Api { message } => {
                format!("Error connecting to the weather API: {message}")
            }
            WeatherboardError::Validation { message } => format!("Invalid input: {message}"),
            WeatherboardError::Store { .. } => {
                "Forecast store operation failed. You may need to delete the store directory."
                    .to_string()
            }
            WeatherboardError::NotFound { message } => message.clone(),
            WeatherboardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            WeatherboardError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest_middleware::Error> for WeatherboardError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::api(err.to_string())
    }
}

impl From<reqwest::Error> for WeatherboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::api(err.to_string())
    }
}

impl From<fjall::Error> for WeatherboardError {
    fn from(err: fjall::Error) -> Self {
        Self::store(err.to_string())
    }
}

impl From<postcard::Error> for WeatherboardError {
    fn from(err: postcard::Error) -> Self {
        Self::store(format!("corrupt forecast entry: {err}"))
    }
}
