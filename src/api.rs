use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::WeatherboardError;
use crate::models::{DailyForecast, HourlyReading, PresetLocation, WeeklyForecast};
use crate::service::LoadedForecast;
use crate::web::AppState;

/// Error returned from HTTP handlers
#[derive(Debug)]
pub struct ApiError(pub WeatherboardError);

impl From<WeatherboardError> for ApiError {
    fn from(err: WeatherboardError) -> Self {
        Self(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0 {
            WeatherboardError::Validation { .. } => StatusCode::BAD_REQUEST,
            WeatherboardError::NotFound { .. } => StatusCode::NOT_FOUND,
            WeatherboardError::Api { .. } => StatusCode::BAD_GATEWAY,
            WeatherboardError::Config { .. }
            | WeatherboardError::Store { .. }
            | WeatherboardError::Io { .. }
            | WeatherboardError::General { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiLocation {
    pub slug: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub timezone: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiHour {
    pub time: NaiveDateTime,
    pub temperature_c: f32,
    pub precipitation_probability: Option<u8>,
    pub precipitation_mm: f32,
    pub wind_speed_kmh: f32,
    pub weather_code: u8,
    pub icon: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiDay {
    pub date: NaiveDate,
    pub temperature_min_c: f32,
    pub temperature_max_c: f32,
    pub wind_speed_max_kmh: f32,
    pub weather_code: u8,
    pub description: String,
    pub icon: String,
    pub hours: Vec<ApiHour>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiForecast {
    pub location: String,
    pub fetched_on: NaiveDate,
    pub retrieved_at: DateTime<Utc>,
    /// True when the data is older than today because the last refresh failed
    pub stale: bool,
    pub error: Option<String>,
    pub days: Vec<ApiDay>,
}

impl From<PresetLocation> for ApiLocation {
    fn from(preset: PresetLocation) -> Self {
        let location = preset.location();
        Self {
            slug: preset.slug().to_string(),
            name: location.name,
            latitude: location.latitude,
            longitude: location.longitude,
            country: location.country,
            timezone: preset.timezone().name().to_string(),
        }
    }
}

impl From<&HourlyReading> for ApiHour {
    fn from(hour: &HourlyReading) -> Self {
        Self {
            time: hour.timestamp,
            temperature_c: hour.temperature_c,
            precipitation_probability: hour.precipitation_probability,
            precipitation_mm: hour.precipitation_mm,
            wind_speed_kmh: hour.wind_speed_kmh,
            weather_code: hour.weather_code.0,
            icon: hour.icon().name().to_string(),
        }
    }
}

impl From<&DailyForecast> for ApiDay {
    fn from(day: &DailyForecast) -> Self {
        Self {
            date: day.date,
            temperature_min_c: day.temperature_min_c,
            temperature_max_c: day.temperature_max_c,
            wind_speed_max_kmh: day.wind_speed_max_kmh,
            weather_code: day.weather_code.0,
            description: day.weather_code.description().to_string(),
            icon: day.icon().name().to_string(),
            hours: day.hours.iter().map(ApiHour::from).collect(),
        }
    }
}

impl ApiForecast {
    fn new(forecast: &WeeklyForecast, error: Option<&WeatherboardError>) -> Self {
        Self {
            location: forecast.location.slug().to_string(),
            fetched_on: forecast.fetched_on,
            retrieved_at: forecast.retrieved_at,
            stale: error.is_some(),
            error: error.map(WeatherboardError::user_message),
            days: forecast.days.iter().map(ApiDay::from).collect(),
        }
    }
}

impl From<&LoadedForecast> for ApiForecast {
    fn from(loaded: &LoadedForecast) -> Self {
        Self::new(&loaded.forecast, loaded.refresh_error.as_ref())
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(list_locations))
        .route("/forecast/{slug}", get(get_forecast))
        .route("/forecast/{slug}/refresh", post(refresh_forecast))
}

async fn list_locations() -> Json<Vec<ApiLocation>> {
    Json(PresetLocation::ALL.into_iter().map(ApiLocation::from).collect())
}

async fn get_forecast(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiForecast>, ApiError> {
    let location: PresetLocation = slug.parse()?;
    let loaded = state.service.load(location, location.today()).await?;
    Ok(Json(ApiForecast::from(&loaded)))
}

async fn refresh_forecast(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiForecast>, ApiError> {
    let location: PresetLocation = slug.parse()?;
    let forecast = state.service.refresh(location, location.today()).await?;
    Ok(Json(ApiForecast::new(&forecast, None)))
}
