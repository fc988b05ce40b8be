//! Forecast models: hourly readings grouped into a week of days

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PresetLocation;
use crate::weather_code::{WeatherCode, WeatherIcon};

/// One hourly data point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyReading {
    /// Local time at the location
    pub timestamp: NaiveDateTime,
    /// Temperature in Celsius
    pub temperature_c: f32,
    /// Probability of precipitation in percent
    pub precipitation_probability: Option<u8>,
    /// Precipitation amount in mm
    pub precipitation_mm: f32,
    /// Wind speed at 10m in km/h
    pub wind_speed_kmh: f32,
    pub weather_code: WeatherCode,
}

impl HourlyReading {
    #[must_use]
    pub fn icon(&self) -> WeatherIcon {
        self.weather_code.icon()
    }

    /// `HH:MM` label used on the chart axis
    #[must_use]
    pub fn hour_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// All readings for a single calendar day plus their summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub temperature_min_c: f32,
    pub temperature_max_c: f32,
    pub wind_speed_max_kmh: f32,
    /// Most frequent code of the day, ties go to the more severe code
    pub weather_code: WeatherCode,
    /// Readings sorted by timestamp
    pub hours: Vec<HourlyReading>,
}

impl DailyForecast {
    /// Build a day from its readings. Returns `None` when `hours` is empty.
    #[must_use]
    pub fn from_hours(date: NaiveDate, mut hours: Vec<HourlyReading>) -> Option<Self> {
        if hours.is_empty() {
            return None;
        }
        hours.sort_by_key(|h| h.timestamp);

        let temperature_min_c = hours
            .iter()
            .map(|h| h.temperature_c)
            .fold(f32::INFINITY, f32::min);
        let temperature_max_c = hours
            .iter()
            .map(|h| h.temperature_c)
            .fold(f32::NEG_INFINITY, f32::max);
        let wind_speed_max_kmh = hours
            .iter()
            .map(|h| h.wind_speed_kmh)
            .fold(f32::NEG_INFINITY, f32::max);

        let mut counts: HashMap<WeatherCode, usize> = HashMap::new();
        for hour in &hours {
            *counts.entry(hour.weather_code).or_default() += 1;
        }
        let weather_code = counts
            .into_iter()
            .max_by_key(|(code, count)| (*count, *code))
            .map(|(code, _)| code)?;

        Some(Self {
            date,
            temperature_min_c,
            temperature_max_c,
            wind_speed_max_kmh,
            weather_code,
            hours,
        })
    }

    #[must_use]
    pub fn icon(&self) -> WeatherIcon {
        self.weather_code.icon()
    }

    /// `dd/mm` label used for the day tabs
    #[must_use]
    pub fn tab_label(&self) -> String {
        self.date.format("%d/%m").to_string()
    }
}

/// Forecast window for one preset location, as returned by a single poll
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeeklyForecast {
    pub location: PresetLocation,
    /// First date of the window
    pub fetched_on: NaiveDate,
    /// When the forecast was retrieved from the API
    pub retrieved_at: DateTime<Utc>,
    /// At most one entry per date, ascending
    pub days: Vec<DailyForecast>,
}

impl WeeklyForecast {
    /// Group hourly readings into days, keeping only dates inside
    /// `[start, start + window_days)`.
    #[must_use]
    pub fn from_readings(
        location: PresetLocation,
        start: NaiveDate,
        window_days: u32,
        readings: Vec<HourlyReading>,
        retrieved_at: DateTime<Utc>,
    ) -> Self {
        let end = start
            .checked_add_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MAX);

        let mut by_date: BTreeMap<NaiveDate, Vec<HourlyReading>> = BTreeMap::new();
        for reading in readings {
            let date = reading.timestamp.date();
            if date >= start && date < end {
                by_date.entry(date).or_default().push(reading);
            }
        }

        let days = by_date
            .into_iter()
            .filter_map(|(date, hours)| DailyForecast::from_hours(date, hours))
            .collect();

        Self {
            location,
            fetched_on: start,
            retrieved_at,
            days,
        }
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DailyForecast> {
        self.days.iter().find(|d| d.date == date)
    }

    /// True when the forecast window starts on `today`
    #[must_use]
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.fetched_on == today
    }

    #[must_use]
    pub fn hour_count(&self) -> usize {
        self.days.iter().map(|d| d.hours.len()).sum()
    }
}
