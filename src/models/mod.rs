//! Data models for weatherboard
//!
//! - Location: preset locations and their coordinates
//! - Forecast: hourly readings grouped into days and a forecast window

pub mod forecast;
pub mod location;

pub use forecast::{DailyForecast, HourlyReading, WeeklyForecast};
pub use location::{Location, PresetLocation};
