use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::forecast;

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Geographic coordinates of a resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Provider condition icon identifier, e.g. `01d` or `10n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconCode(String);

impl IconCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Image URL for this icon at 2x resolution.
    pub fn url(&self) -> String {
        format!("{ICON_URL_BASE}/{}@2x.png", self.0)
    }
}

impl fmt::Display for IconCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IconCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Snapshot of the observed weather at a resolved location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub pressure_hpa: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub condition: String,
    pub icon: IconCode,
}

/// One time slice (~3 hours) of the raw forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub temperature_c: f64,
    pub icon: IconCode,
}

/// Everything a single `fetch_by_city` call returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    /// Chronological forecast series for the same coordinates as `current`.
    pub forecast: Vec<ForecastEntry>,
    /// Offset of the location's timezone from UTC at query time.
    pub utc_offset_seconds: i32,
}

impl WeatherReport {
    /// Aggregate this report's forecast using its own UTC offset.
    pub fn daily_summaries(&self) -> Vec<DailySummary> {
        forecast::summarize(&self.forecast, self.utc_offset_seconds)
    }
}

/// Aggregated forecast for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub max_c: f64,
    pub min_c: f64,
    pub icon: IconCode,
}
