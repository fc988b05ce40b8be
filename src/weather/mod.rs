//! Weather data sources

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;
use crate::models::{PresetLocation, WeeklyForecast};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Source of forecast windows for the preset locations
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the forecast window starting at `start` (the local date at the location).
    async fn fetch_week(&self, location: PresetLocation, start: NaiveDate)
    -> Result<WeeklyForecast>;
}
