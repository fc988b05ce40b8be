use fjall::Keyspace;
use std::path::Path;
use tokio::task;

use crate::models::{PresetLocation, WeeklyForecast};
use crate::{Result, WeatherboardError};

/// Persistent store holding the latest forecast window per location.
///
/// Each location has exactly one entry. Writing a new forecast replaces the
/// previous one in a single insert, so readers see either the old or the new
/// window and never a mix of both.
#[derive(Clone)]
pub struct ForecastStore {
    forecasts: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl ForecastStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(path.as_ref()).open()?;
        let forecasts = db.keyspace("forecasts", fjall::KeyspaceCreateOptions::default)?;
        Ok(ForecastStore { forecasts })
    }

    /// Store `forecast`, superseding whatever was stored for its location
    #[tracing::instrument(name = "put_forecast", level = "debug", skip_all, fields(location = %forecast.location))]
    pub async fn put(&self, forecast: &WeeklyForecast) -> Result<()> {
        let store = self.forecasts.clone();
        let key = forecast.location.store_key().into_bytes();
        let bytes = postcard::to_stdvec(forecast)?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| WeatherboardError::store(e.to_string()))??;
        tracing::debug!(days = forecast.days.len(), "Forecast stored");
        Ok(())
    }

    /// Latest stored forecast for `location`, if any
    #[tracing::instrument(name = "get_forecast", level = "debug", skip(self))]
    pub async fn get(&self, location: PresetLocation) -> Result<Option<WeeklyForecast>> {
        let store = self.forecasts.clone();
        let key = location.store_key().into_bytes();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key))
            .await
            .map_err(|e| WeatherboardError::store(e.to_string()))??;

        match maybe_bytes {
            Some(bytes) => {
                tracing::debug!("Forecast found");
                Ok(Some(postcard::from_bytes(&bytes)?))
            }
            None => {
                tracing::debug!("No forecast stored");
                Ok(None)
            }
        }
    }

    /// Remove the stored forecast for `location`
    pub async fn remove(&self, location: PresetLocation) -> Result<()> {
        let store = self.forecasts.clone();
        let key = location.store_key().into_bytes();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(|e| WeatherboardError::store(e.to_string()))??;
        Ok(())
    }
}
