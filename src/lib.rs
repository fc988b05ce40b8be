//! `weatherboard` - seven-day weather dashboard
//!
//! Fetches hourly forecasts from Open-Meteo for a fixed set of locations,
//! keeps the latest forecast per location in an embedded store and serves
//! a browser dashboard charting temperature, wind and weather per day.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod store;
pub mod weather;
pub mod weather_code;
pub mod web;

// Re-export core types for public API
pub use config::WeatherboardConfig;
pub use error::WeatherboardError;
pub use models::{DailyForecast, HourlyReading, Location, PresetLocation, WeeklyForecast};
pub use service::{ForecastService, LoadedForecast};
pub use store::ForecastStore;
pub use weather::{ForecastProvider, OpenMeteoClient};
pub use weather_code::{WeatherCode, WeatherIcon};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherboardError>;
