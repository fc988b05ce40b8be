//! Fetch → store → load orchestration for the dashboard
//!
//! A fetch that fails never touches the store, so whatever was rendered before
//! can still be rendered afterwards.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::models::{PresetLocation, WeeklyForecast};
use crate::store::ForecastStore;
use crate::weather::ForecastProvider;
use crate::{Result, WeatherboardError};

/// Forecast for a location together with the error of a failed refresh, if any
#[derive(Debug)]
pub struct LoadedForecast {
    pub forecast: WeeklyForecast,
    /// Set when the stored forecast is stale because refreshing it failed
    pub refresh_error: Option<WeatherboardError>,
}

impl LoadedForecast {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.refresh_error.is_some()
    }
}

/// Refresh deadline used unless [`ForecastService::with_fetch_deadline`] sets one
pub const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(20);

pub struct ForecastService {
    provider: Arc<dyn ForecastProvider>,
    store: ForecastStore,
    refresh_lock: Mutex<()>,
    fetch_deadline: Duration,
}

impl ForecastService {
    pub fn new(provider: Arc<dyn ForecastProvider>, store: ForecastStore) -> Self {
        Self {
            provider,
            store,
            refresh_lock: Mutex::new(()),
            fetch_deadline: DEFAULT_FETCH_DEADLINE,
        }
    }

    /// Give up on a fetch, retries included, after `deadline`
    #[must_use]
    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    /// Fetch a fresh window for `location` and supersede the stored one.
    #[instrument(skip(self))]
    pub async fn refresh(&self, location: PresetLocation, today: NaiveDate) -> Result<WeeklyForecast> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked(location, today).await
    }

    /// Caller holds `refresh_lock`
    async fn refresh_locked(
        &self,
        location: PresetLocation,
        today: NaiveDate,
    ) -> Result<WeeklyForecast> {
        let fetched = timeout(self.fetch_deadline, self.provider.fetch_week(location, today))
            .await
            .unwrap_or_else(|_| {
                Err(WeatherboardError::api(format!(
                    "Weather API did not answer within {}s",
                    self.fetch_deadline.as_secs()
                )))
            });

        let forecast = match fetched {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!(error = %e, "Forecast fetch failed, keeping stored data");
                return Err(e);
            }
        };
        if forecast.days.is_empty() {
            return Err(WeatherboardError::api(format!(
                "No forecast data returned for {location} from {today}"
            )));
        }

        self.store.put(&forecast).await?;
        info!(days = forecast.days.len(), "Forecast refreshed");
        Ok(forecast)
    }

    /// Stored forecast if it is from `today`, otherwise a refreshed one.
    ///
    /// When the refresh fails but an older forecast is stored, that forecast
    /// is returned with the error attached.
    #[instrument(skip(self))]
    pub async fn load(&self, location: PresetLocation, today: NaiveDate) -> Result<LoadedForecast> {
        if let Some(forecast) = self.current(location, today).await? {
            return Ok(LoadedForecast {
                forecast,
                refresh_error: None,
            });
        }

        let _guard = self.refresh_lock.lock().await;
        // a concurrent load may have refreshed while we waited
        let stored = self.store.get(location).await?;
        if let Some(forecast) = stored.as_ref().filter(|f| f.is_current(today)) {
            return Ok(LoadedForecast {
                forecast: forecast.clone(),
                refresh_error: None,
            });
        }

        match (self.refresh_locked(location, today).await, stored) {
            (Ok(forecast), _) => Ok(LoadedForecast {
                forecast,
                refresh_error: None,
            }),
            (Err(e), Some(forecast)) => Ok(LoadedForecast {
                forecast,
                refresh_error: Some(e),
            }),
            (Err(e), None) => Err(e),
        }
    }

    async fn current(
        &self,
        location: PresetLocation,
        today: NaiveDate,
    ) -> Result<Option<WeeklyForecast>> {
        Ok(self
            .store
            .get(location)
            .await?
            .filter(|f| f.is_current(today)))
    }

    /// Stored forecast without contacting the API
    pub async fn stored(&self, location: PresetLocation) -> Result<WeeklyForecast> {
        self.store.get(location).await?.ok_or_else(|| {
            WeatherboardError::not_found(format!("No forecast stored for {location}"))
        })
    }

    /// Refresh every preset, returning one result per location in sidebar order
    pub async fn refresh_all(
        &self,
        today_for: impl Fn(PresetLocation) -> NaiveDate,
    ) -> Vec<(PresetLocation, Result<WeeklyForecast>)> {
        let refreshes = PresetLocation::ALL
            .into_iter()
            .map(|location| {
                let today = today_for(location);
                async move { (location, self.refresh(location, today).await) }
            });
        join_all(refreshes).await
    }
}
