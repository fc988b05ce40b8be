//! WMO weather interpretation codes as returned by Open-Meteo

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw WMO weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherCode(pub u8);

/// Icon family drawn on the chart for a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    /// Fallback for codes outside the WMO table
    Generic,
}

impl WeatherCode {
    /// Human-readable description of the code
    #[must_use]
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "Clear sky",
            1 => "Mainly clear",
            2 => "Partly cloudy",
            3 => "Overcast",
            45 => "Fog",
            48 => "Depositing rime fog",
            51 => "Light drizzle",
            53 => "Moderate drizzle",
            55 => "Dense drizzle",
            56 => "Light freezing drizzle",
            57 => "Dense freezing drizzle",
            61 => "Slight rain",
            63 => "Moderate rain",
            65 => "Heavy rain",
            66 => "Light freezing rain",
            67 => "Heavy freezing rain",
            71 => "Slight snow fall",
            73 => "Moderate snow fall",
            75 => "Heavy snow fall",
            77 => "Snow grains",
            80 => "Slight rain showers",
            81 => "Moderate rain showers",
            82 => "Violent rain showers",
            85 => "Slight snow showers",
            86 => "Heavy snow showers",
            95 => "Thunderstorm",
            96 => "Thunderstorm with slight hail",
            99 => "Thunderstorm with heavy hail",
            _ => "Unknown",
        }
    }

    #[must_use]
    pub fn icon(self) -> WeatherIcon {
        match self.0 {
            0 => WeatherIcon::Clear,
            1 => WeatherIcon::MainlyClear,
            2 => WeatherIcon::PartlyCloudy,
            3 => WeatherIcon::Overcast,
            45 | 48 => WeatherIcon::Fog,
            51 | 53 | 55 => WeatherIcon::Drizzle,
            61 | 63 | 65 => WeatherIcon::Rain,
            56 | 57 | 66 | 67 => WeatherIcon::FreezingRain,
            71 | 73 | 75 | 77 => WeatherIcon::Snow,
            80..=82 => WeatherIcon::RainShowers,
            85 | 86 => WeatherIcon::SnowShowers,
            95 | 96 | 99 => WeatherIcon::Thunderstorm,
            _ => WeatherIcon::Generic,
        }
    }
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

impl WeatherIcon {
    /// Stable identifier used in markup and JSON
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "clear",
            WeatherIcon::MainlyClear => "mainly_clear",
            WeatherIcon::PartlyCloudy => "partly_cloudy",
            WeatherIcon::Overcast => "overcast",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Drizzle => "drizzle",
            WeatherIcon::Rain => "rain",
            WeatherIcon::FreezingRain => "freezing_rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::RainShowers => "rain_showers",
            WeatherIcon::SnowShowers => "snow_showers",
            WeatherIcon::Thunderstorm => "thunderstorm",
            WeatherIcon::Generic => "generic",
        }
    }

    /// Glyph drawn as the chart marker
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "\u{2600}",
            WeatherIcon::MainlyClear => "\u{1F324}",
            WeatherIcon::PartlyCloudy => "\u{26C5}",
            WeatherIcon::Overcast => "\u{2601}",
            WeatherIcon::Fog => "\u{1F32B}",
            WeatherIcon::Drizzle => "\u{1F326}",
            WeatherIcon::Rain => "\u{1F327}",
            WeatherIcon::FreezingRain => "\u{1F9CA}",
            WeatherIcon::Snow => "\u{2744}",
            WeatherIcon::RainShowers => "\u{2614}",
            WeatherIcon::SnowShowers => "\u{1F328}",
            WeatherIcon::Thunderstorm => "\u{26C8}",
            WeatherIcon::Generic => "\u{25CF}",
        }
    }
}
