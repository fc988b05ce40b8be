//! Location model and the fixed set of dashboard presets

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::WeatherboardError;

/// Location coordinates
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Location name (city, resort, etc.)
    pub name: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country: Option<String>,
}

impl Location {
    #[must_use]
    pub fn with_country(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            latitude,
            longitude,
            name,
            country: Some(country),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One of the five locations the dashboard can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetLocation {
    London,
    Tignes,
    Whistler,
    Bologna,
    Vienna,
}

impl PresetLocation {
    /// Sidebar order
    pub const ALL: [PresetLocation; 5] = [
        PresetLocation::London,
        PresetLocation::Tignes,
        PresetLocation::Whistler,
        PresetLocation::Bologna,
        PresetLocation::Vienna,
    ];

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            PresetLocation::London => "london",
            PresetLocation::Tignes => "tignes",
            PresetLocation::Whistler => "whistler",
            PresetLocation::Bologna => "bologna",
            PresetLocation::Vienna => "vienna",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            PresetLocation::London => "London",
            PresetLocation::Tignes => "Tignes",
            PresetLocation::Whistler => "Whistler",
            PresetLocation::Bologna => "Bologna",
            PresetLocation::Vienna => "Vienna",
        }
    }

    #[must_use]
    pub fn location(self) -> Location {
        let (latitude, longitude, country) = match self {
            PresetLocation::London => (51.5074, -0.1278, "GB"),
            PresetLocation::Tignes => (45.4683, 6.9056, "FR"),
            PresetLocation::Whistler => (50.1163, -122.9574, "CA"),
            PresetLocation::Bologna => (44.4949, 11.3426, "IT"),
            PresetLocation::Vienna => (48.2082, 16.3738, "AT"),
        };
        Location::with_country(
            latitude,
            longitude,
            self.display_name().to_string(),
            country.to_string(),
        )
    }

    /// Timezone the forecast timestamps are expressed in
    #[must_use]
    pub fn timezone(self) -> Tz {
        match self {
            PresetLocation::London => chrono_tz::Europe::London,
            PresetLocation::Tignes => chrono_tz::Europe::Paris,
            PresetLocation::Whistler => chrono_tz::America::Vancouver,
            PresetLocation::Bologna => chrono_tz::Europe::Rome,
            PresetLocation::Vienna => chrono_tz::Europe::Vienna,
        }
    }

    /// Current calendar date at the location
    #[must_use]
    pub fn today(self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone()).date_naive()
    }

    /// Key under which the latest forecast for this location is stored
    #[must_use]
    pub fn store_key(self) -> String {
        format!("forecast:{}", self.slug())
    }
}

impl fmt::Display for PresetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PresetLocation {
    type Err = WeatherboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.slug()).collect();
                WeatherboardError::validation(format!(
                    "Unknown location '{s}'. Must be one of: {}",
                    known.join(", ")
                ))
            })
    }
}
