use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// A point on the map the forecast is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    #[serde(default)]
    pub altitude: i32,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, altitude: i32) -> Result<Self> {
        let coords = Self {
            latitude,
            longitude,
            altitude,
        };
        coords.validate()?;
        Ok(coords)
    }

    pub fn validate(&self) -> Result<()> {
        let lat_ok = (-90.0..=90.0).contains(&self.latitude);
        let long_ok = (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && long_ok {
            Ok(())
        } else {
            Err(Error::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl Default for Coordinates {
    /// Malin Head, Co. Donegal.
    fn default() -> Self {
        Self {
            latitude: 54.7210798611,
            longitude: -8.7237392806,
            altitude: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMode {
    #[default]
    Daily,
    Hourly,
}

/// Weather selected for a single instant, either as the nearest hourly slot or
/// aggregated over the whole day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub datetime: DateTime<FixedOffset>,
    /// met.no symbol id, e.g. `PartlyCloud` or `LightRainSun`.
    pub condition: Option<String>,
    /// hPa
    pub pressure: Option<f64>,
    /// Relative humidity, percent.
    pub humidity: Option<f64>,
    /// Degrees.
    pub wind_bearing: Option<f64>,
    /// °C. The daily maximum in daily mode.
    pub temperature: Option<f64>,
    /// Daily minimum, °C. Daily mode only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub templow: Option<f64>,
    /// mm. Summed over the day in daily mode.
    pub precipitation: Option<f64>,
    /// km/h
    pub wind_speed: Option<f64>,
    /// km/h
    pub wind_gust: Option<f64>,
    /// Percent. Hourly mode only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cloudiness: Option<f64>,
}

/// Warning colour, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "String")]
pub enum WarningLevel {
    #[default]
    Unknown,
    Yellow,
    Orange,
    Red,
}

impl WarningLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Unknown => "Unknown",
            WarningLevel::Yellow => "Yellow",
            WarningLevel::Orange => "Orange",
            WarningLevel::Red => "Red",
        }
    }
}

/// Colours the feed does not use yet map to `Unknown`.
impl From<String> for WarningLevel {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "yellow" => WarningLevel::Yellow,
            "orange" => WarningLevel::Orange,
            "red" => WarningLevel::Red,
            _ => WarningLevel::Unknown,
        }
    }
}

impl fmt::Display for WarningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the warning feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Warning {
    pub id: String,
    pub cap_id: String,
    /// Wind, Rain, Snow-Ice, Thunderstorm, ...
    #[serde(rename = "type")]
    pub warning_type: String,
    pub severity: String,
    pub certainty: String,
    pub level: WarningLevel,
    pub issued: Option<DateTime<FixedOffset>>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub onset: Option<DateTime<FixedOffset>>,
    pub expiry: Option<DateTime<FixedOffset>>,
    pub headline: String,
    pub description: String,
    pub regions: Vec<String>,
    pub status: String,
}

/// Region code used to pick a warning feed, e.g. `IRELAND` or `EI07`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Region {
    fn default() -> Self {
        Self("IRELAND".to_string())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code = s.trim().to_uppercase();
        let valid =
            !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(Self(code))
        } else {
            Err(Error::InvalidRegion(s.to_string()))
        }
    }
}

impl TryFrom<String> for Region {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
