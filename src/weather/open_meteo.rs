//! Open-Meteo forecast client

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::ForecastProvider;
use crate::config::WeatherConfig;
use crate::models::{HourlyReading, Location, PresetLocation, WeeklyForecast};
use crate::weather_code::WeatherCode;
use crate::{Result, WeatherboardError};

const HOURLY_VARIABLES: &str =
    "temperature_2m,precipitation_probability,precipitation,weather_code,wind_speed_10m";

/// HTTP client for the Open-Meteo forecast endpoint
pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
    forecast_days: u32,
}

impl OpenMeteoClient {
    /// Build a client with retry and timeouts taken from `config`
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("weatherboard/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_millis(u64::from(config.connect_timeout_ms)))
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .build()?;

        let min_backoff = Duration::from_millis(u64::from(config.retry_backoff_ms));
        let max_backoff = min_backoff.max(Duration::from_secs(u64::from(config.timeout_seconds)));
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(min_backoff, max_backoff)
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
        })
    }

    /// Full request URL for the hourly forecast at `location`
    pub fn forecast_url(&self, location: &Location, timezone: &str) -> Result<Url> {
        let endpoint = format!("{}/forecast", self.base_url);
        let params = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("timezone", timezone.to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ];
        Url::parse_with_params(&endpoint, &params)
            .map_err(|e| WeatherboardError::config(format!("Invalid forecast URL {endpoint}: {e}")))
    }

    async fn get_body(&self, url: Url) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(WeatherboardError::api(format!(
                "HTTP error status code: {}",
                status.as_u16()
            )));
        }
        debug!("Request successful");
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn fetch_week(
        &self,
        location: PresetLocation,
        start: NaiveDate,
    ) -> Result<WeeklyForecast> {
        let url = self.forecast_url(&location.location(), location.timezone().name())?;
        debug!(%url, "Calling the forecast API");
        let body = self.get_body(url).await?;
        parse_forecast(location, start, self.forecast_days, &body)
    }
}

/// Parse a forecast response body into a forecast window
pub fn parse_forecast(
    location: PresetLocation,
    start: NaiveDate,
    forecast_days: u32,
    body: &str,
) -> Result<WeeklyForecast> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| WeatherboardError::api(format!("Malformed forecast response: {e}")))?;

    let hourly = response
        .hourly
        .ok_or_else(|| WeatherboardError::api("Malformed forecast response: no hourly data"))?;
    let readings = hourly.into_readings()?;

    Ok(WeeklyForecast::from_readings(
        location,
        start,
        forecast_days,
        readings,
        Utc::now(),
    ))
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlyData>,
}

#[derive(Debug, Deserialize)]
struct HourlyData {
    time: Vec<String>,
    temperature_2m: Vec<Option<f32>>,
    #[serde(default)]
    precipitation_probability: Option<Vec<Option<u8>>>,
    #[serde(default)]
    precipitation: Option<Vec<Option<f32>>>,
    weather_code: Vec<Option<u8>>,
    wind_speed_10m: Vec<Option<f32>>,
}

fn check_len(name: &str, len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(WeatherboardError::api(format!(
            "Malformed forecast response: {name} has {len} values, expected {expected}"
        )));
    }
    Ok(())
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

impl HourlyData {
    fn into_readings(self) -> Result<Vec<HourlyReading>> {
        let expected = self.time.len();
        if expected == 0 {
            return Err(WeatherboardError::api(
                "Malformed forecast response: empty time series",
            ));
        }
        check_len("temperature_2m", self.temperature_2m.len(), expected)?;
        check_len("weather_code", self.weather_code.len(), expected)?;
        check_len("wind_speed_10m", self.wind_speed_10m.len(), expected)?;
        if let Some(values) = &self.precipitation_probability {
            check_len("precipitation_probability", values.len(), expected)?;
        }
        if let Some(values) = &self.precipitation {
            check_len("precipitation", values.len(), expected)?;
        }

        let mut readings = Vec::with_capacity(expected);
        for (i, time) in self.time.iter().enumerate() {
            let timestamp = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M").map_err(|e| {
                WeatherboardError::api(format!(
                    "Malformed forecast response: bad timestamp '{time}': {e}"
                ))
            })?;

            let (Some(temperature), Some(wind_speed), Some(code)) = (
                self.temperature_2m[i],
                self.wind_speed_10m[i],
                self.weather_code[i],
            ) else {
                warn!(%timestamp, "Skipping hour with missing values");
                continue;
            };

            let precipitation_probability = self
                .precipitation_probability
                .as_ref()
                .and_then(|values| values[i]);
            let precipitation = self
                .precipitation
                .as_ref()
                .and_then(|values| values[i])
                .unwrap_or(0.0);

            readings.push(HourlyReading {
                timestamp,
                temperature_c: round1(temperature),
                precipitation_probability,
                precipitation_mm: round1(precipitation),
                wind_speed_kmh: round1(wind_speed),
                weather_code: WeatherCode(code),
            });
        }
        Ok(readings)
    }
}
